//! Image viewer collaborator for lightbox-flagged elements.

use fw_dom::Document;
use fw_dom::NodeId;

/// Overlay image viewer activated on flagged elements at page load.
pub trait ImageViewer {
    fn activate(&mut self, document: &Document, node: NodeId);
}

/// Default viewer: records which elements are wired for the overlay.
/// The overlay UI itself lives outside the page-scripting layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightboxViewer {
    activated: Vec<NodeId>,
}

impl LightboxViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activated(&self) -> &[NodeId] {
        &self.activated
    }

    pub fn is_active(&self, node: NodeId) -> bool {
        self.activated.contains(&node)
    }
}

impl ImageViewer for LightboxViewer {
    fn activate(&mut self, document: &Document, node: NodeId) {
        if !document.is_element(node) || self.is_active(node) {
            return;
        }

        self.activated.push(node);
    }
}
