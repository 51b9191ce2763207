//! File-listing page controller.

use crate::viewer::ImageViewer;
use fw_dom::Document;
use fw_dom::NodeId;
use fw_selection::SelectionController;
use std::collections::HashMap;

/// Marker class activating the overlay image viewer.
pub const LIGHTBOX_CLASS: &str = "lightbox";
/// Marker class of the file listing container.
pub const FILE_LIST_CLASS: &str = "file-list";
/// Marker class of the clickable file-path cells inside the listing.
pub const FILE_PATH_CLASS: &str = "file-path";

/// Per-element toggle state; an absent map entry means `Unselected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectState {
    #[default]
    Unselected,
    Selected,
}

/// Load-time summary for a file-listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileListingSummary {
    pub lightboxes_activated: usize,
    pub paths_bound: usize,
}

/// Wires the file-browsing listing page: lightbox activation at load time
/// and a click-to-select toggle on every file path.
#[derive(Debug, Default)]
pub struct FileListingController {
    bound: Vec<NodeId>,
    states: HashMap<NodeId, SelectState>,
}

impl FileListingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(
        &mut self,
        document: &Document,
        selection: &mut SelectionController,
        viewer: &mut dyn ImageViewer,
    ) -> FileListingSummary {
        selection.init();

        let mut summary = FileListingSummary::default();
        for node in document.elements_with_class(LIGHTBOX_CLASS) {
            viewer.activate(document, node);
            summary.lightboxes_activated = summary.lightboxes_activated.saturating_add(1);
        }

        for list in document.elements_with_class(FILE_LIST_CLASS) {
            for node in document.elements_with_class_in(list, FILE_PATH_CLASS) {
                if self.is_bound(node) {
                    continue;
                }
                self.bound.push(node);
                summary.paths_bound = summary.paths_bound.saturating_add(1);
            }
        }

        summary
    }

    pub fn is_bound(&self, node: NodeId) -> bool {
        self.bound.contains(&node)
    }

    pub fn state(&self, node: NodeId) -> SelectState {
        self.states.get(&node).copied().unwrap_or_default()
    }

    /// Click toggle: an unselected path gets its text selected, a selected
    /// one clears the global selection. Clicks on unbound nodes are ignored.
    pub fn handle_click(
        &mut self,
        document: &Document,
        selection: &mut SelectionController,
        node: NodeId,
    ) {
        if !self.is_bound(node) {
            return;
        }

        match self.state(node) {
            SelectState::Unselected => {
                self.states.insert(node, SelectState::Selected);
                selection.select_text(document, node);
            }
            SelectState::Selected => {
                self.states.insert(node, SelectState::Unselected);
                selection.unselect_text();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FileListingController;
    use super::SelectState;
    use crate::viewer::LightboxViewer;
    use fw_dom::Document;
    use fw_dom::NodeId;
    use fw_selection::HostCapabilities;
    use fw_selection::SelectionController;

    fn listing_page() -> (Document, Vec<NodeId>, NodeId) {
        let mut doc = Document::new();
        let root = doc.create_element("html");
        let list = doc.create_element("div");
        assert!(doc.set_root(root).is_ok());
        assert!(doc.append_child(root, list).is_ok());
        assert!(doc.add_class(list, "file-list").is_ok());

        let mut paths = Vec::new();
        for name in ["a.txt", "b/c.csv"] {
            let cell = doc.create_element("span");
            let text = doc.create_text(name);
            assert!(doc.add_class(cell, "file-path").is_ok());
            assert!(doc.append_child(list, cell).is_ok());
            assert!(doc.append_child(cell, text).is_ok());
            paths.push(cell);
        }

        let image = doc.create_element("a");
        assert!(doc.add_class(image, "lightbox").is_ok());
        assert!(doc.append_child(root, image).is_ok());

        (doc, paths, image)
    }

    #[test]
    fn init_binds_paths_and_activates_lightboxes() {
        let (doc, paths, image) = listing_page();
        let mut controller = FileListingController::new();
        let mut selection = SelectionController::new(&HostCapabilities::modern());
        let mut viewer = LightboxViewer::new();

        let summary = controller.init(&doc, &mut selection, &mut viewer);
        assert_eq!(summary.paths_bound, 2);
        assert_eq!(summary.lightboxes_activated, 1);
        assert!(viewer.is_active(image));
        assert!(paths.iter().all(|path| controller.is_bound(*path)));
    }

    #[test]
    fn click_toggles_selection_state() {
        let (doc, paths, _) = listing_page();
        let mut controller = FileListingController::new();
        let mut selection = SelectionController::new(&HostCapabilities::modern());
        let mut viewer = LightboxViewer::new();
        controller.init(&doc, &mut selection, &mut viewer);

        let path = paths[0];
        assert_eq!(controller.state(path), SelectState::Unselected);

        controller.handle_click(&doc, &mut selection, path);
        assert_eq!(controller.state(path), SelectState::Selected);
        assert_eq!(selection.selected_text(), Some("a.txt"));

        controller.handle_click(&doc, &mut selection, path);
        assert_eq!(controller.state(path), SelectState::Unselected);
        assert!(selection.selection().is_empty());
    }

    #[test]
    fn even_click_counts_return_to_the_initial_state() {
        let (doc, paths, _) = listing_page();
        let mut controller = FileListingController::new();
        let mut selection = SelectionController::new(&HostCapabilities::modern());
        let mut viewer = LightboxViewer::new();
        controller.init(&doc, &mut selection, &mut viewer);

        let path = paths[1];
        for _ in 0..6 {
            controller.handle_click(&doc, &mut selection, path);
        }

        assert_eq!(controller.state(path), SelectState::Unselected);
        assert!(selection.selection().is_empty());
    }

    #[test]
    fn unselecting_clears_globally_even_after_other_selections() {
        let (doc, paths, _) = listing_page();
        let mut controller = FileListingController::new();
        let mut selection = SelectionController::new(&HostCapabilities::modern());
        let mut viewer = LightboxViewer::new();
        controller.init(&doc, &mut selection, &mut viewer);

        // Select a, then b, then un-click a: unselect is global, so b's
        // highlight goes away too.
        controller.handle_click(&doc, &mut selection, paths[0]);
        controller.handle_click(&doc, &mut selection, paths[1]);
        controller.handle_click(&doc, &mut selection, paths[0]);

        assert!(selection.selection().is_empty());
        assert_eq!(controller.state(paths[1]), SelectState::Selected);
    }

    #[test]
    fn clicks_on_unbound_nodes_are_ignored() {
        let (mut doc, _, _) = listing_page();
        let stray = doc.create_element("span");
        let root = doc.root().unwrap_or_default();
        assert!(doc.append_child(root, stray).is_ok());

        let mut controller = FileListingController::new();
        let mut selection = SelectionController::new(&HostCapabilities::modern());
        let mut viewer = LightboxViewer::new();
        controller.init(&doc, &mut selection, &mut viewer);

        controller.handle_click(&doc, &mut selection, stray);
        assert_eq!(controller.state(stray), SelectState::Unselected);
        assert!(selection.selection().is_empty());
    }

    #[test]
    fn toggle_still_works_on_headless_hosts() {
        let (doc, paths, _) = listing_page();
        let mut controller = FileListingController::new();
        let mut selection = SelectionController::new(&HostCapabilities::headless());
        let mut viewer = LightboxViewer::new();
        controller.init(&doc, &mut selection, &mut viewer);

        // The selection side effect degrades silently, the state machine
        // keeps toggling.
        controller.handle_click(&doc, &mut selection, paths[0]);
        assert_eq!(controller.state(paths[0]), SelectState::Selected);
        assert!(selection.selection().is_empty());
    }
}
