//! Page controllers wired at page-load time.
//!
//! Control flow mirrors the browser: page load, controller `init`, click
//! dispatch, fixed DOM mutation. The surrounding page template picks one
//! controller per page; in-process that choice is the constructor called on
//! [`PageRuntime`].

mod file_listing;
mod viewer;
mod wiki;

pub use file_listing::FILE_LIST_CLASS;
pub use file_listing::FILE_PATH_CLASS;
pub use file_listing::FileListingController;
pub use file_listing::FileListingSummary;
pub use file_listing::LIGHTBOX_CLASS;
pub use file_listing::SelectState;
pub use viewer::ImageViewer;
pub use viewer::LightboxViewer;
pub use wiki::EXTERNAL_LINK_CLASS;
pub use wiki::MATH_CLASS;
pub use wiki::WikiPageController;
pub use wiki::WikiPageSummary;

use fw_core::WikiResult;
use fw_dom::Document;
use fw_dom::NodeId;
use fw_math::Typesetter;
use fw_selection::HostCapabilities;
use fw_selection::SelectionController;
use fw_selection::SelectionState;

#[derive(Debug)]
enum PageController {
    FileListing(FileListingController),
    Wiki(WikiPageController),
}

/// Merged load-time summary across page kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInitSummary {
    pub lightboxes_activated: usize,
    pub file_paths_bound: usize,
    pub links_scanned: usize,
    pub external_links: usize,
    pub math_rendered: usize,
}

/// Owns the document, the selection layer, the viewer, and the controller
/// chosen for the page; routes click dispatch synchronously.
#[derive(Debug)]
pub struct PageRuntime {
    document: Document,
    selection: SelectionController,
    viewer: LightboxViewer,
    controller: PageController,
}

impl PageRuntime {
    pub fn file_listing(document: Document, capabilities: &HostCapabilities) -> Self {
        Self::with_controller(
            document,
            capabilities,
            PageController::FileListing(FileListingController::new()),
        )
    }

    pub fn wiki_page(document: Document, capabilities: &HostCapabilities) -> Self {
        Self::with_controller(
            document,
            capabilities,
            PageController::Wiki(WikiPageController::new()),
        )
    }

    pub fn wiki_page_with_typesetter(
        document: Document,
        capabilities: &HostCapabilities,
        typesetter: Box<dyn Typesetter>,
    ) -> Self {
        Self::with_controller(
            document,
            capabilities,
            PageController::Wiki(WikiPageController::with_typesetter(typesetter)),
        )
    }

    fn with_controller(
        document: Document,
        capabilities: &HostCapabilities,
        controller: PageController,
    ) -> Self {
        Self {
            document,
            selection: SelectionController::new(capabilities),
            viewer: LightboxViewer::new(),
            controller,
        }
    }

    /// Runs the controller's one-shot load pass.
    pub fn init(&mut self) -> WikiResult<PageInitSummary> {
        match &mut self.controller {
            PageController::FileListing(controller) => {
                let summary =
                    controller.init(&self.document, &mut self.selection, &mut self.viewer);
                Ok(PageInitSummary {
                    lightboxes_activated: summary.lightboxes_activated,
                    file_paths_bound: summary.paths_bound,
                    ..PageInitSummary::default()
                })
            }
            PageController::Wiki(controller) => {
                let summary = controller.init(&mut self.document, &mut self.selection)?;
                Ok(PageInitSummary {
                    links_scanned: summary.links_scanned,
                    external_links: summary.external_links,
                    math_rendered: summary.math_rendered,
                    ..PageInitSummary::default()
                })
            }
        }
    }

    /// Synchronous click dispatch; wiki pages bind no click handlers, so
    /// their clicks fall through.
    pub fn click(&mut self, node: NodeId) {
        if let PageController::FileListing(controller) = &mut self.controller {
            controller.handle_click(&self.document, &mut self.selection, node);
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.selection()
    }

    pub fn viewer(&self) -> &LightboxViewer {
        &self.viewer
    }
}
