//! Text-selection primitives shared by all page controllers.
//!
//! Two generations of host selection APIs exist: the legacy "text range"
//! style (build a range, move it over the element, select) and the standard
//! selection/range style (clear ranges, span the element contents, add the
//! range). Capabilities are probed once at startup and the matching backend
//! is used for the lifetime of the page.

use fw_dom::Document;
use fw_dom::NodeId;
use std::fmt;

/// Selection APIs the host environment exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Legacy `createTextRange`-era element selection.
    pub legacy_text_range: bool,
    /// Standard selection object with range add/remove.
    pub standard_ranges: bool,
    /// Legacy `selection.empty` clearing call.
    pub legacy_selection_empty: bool,
}

impl HostCapabilities {
    /// Current browsers: standard ranges only.
    pub fn modern() -> Self {
        Self {
            legacy_text_range: false,
            standard_ranges: true,
            legacy_selection_empty: false,
        }
    }

    /// Old engines that predate the standard selection API.
    pub fn legacy() -> Self {
        Self {
            legacy_text_range: true,
            standard_ranges: false,
            legacy_selection_empty: true,
        }
    }

    /// Hosts with no selection API at all; every call becomes a no-op.
    pub fn headless() -> Self {
        Self {
            legacy_text_range: false,
            standard_ranges: false,
            legacy_selection_empty: false,
        }
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::modern()
    }
}

/// One highlighted range: the element it spans and its text at select time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRange {
    pub node: NodeId,
    pub text: String,
}

/// The single global selection object the host owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    active: Option<SelectedRange>,
}

impl SelectionState {
    pub fn active(&self) -> Option<&SelectedRange> {
        self.active.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    fn replace(&mut self, range: SelectedRange) {
        self.active = Some(range);
    }

    fn clear(&mut self) {
        self.active = None;
    }
}

trait SelectionBackend: fmt::Debug {
    fn select_node(&self, document: &Document, node: NodeId, state: &mut SelectionState);
    fn clear(&self, state: &mut SelectionState);
}

/// `createTextRange` generation: move the range over the element, select it.
#[derive(Debug)]
struct LegacyRangeBackend {
    /// Clearing still prefers the standard remove-all path when the host
    /// has it; `selection.empty` is the fallback.
    clear_via_standard: bool,
    clear_via_empty: bool,
}

impl SelectionBackend for LegacyRangeBackend {
    fn select_node(&self, document: &Document, node: NodeId, state: &mut SelectionState) {
        if !document.is_element(node) {
            return;
        }

        state.replace(SelectedRange {
            node,
            text: document.text_content(node),
        });
    }

    fn clear(&self, state: &mut SelectionState) {
        if self.clear_via_standard || self.clear_via_empty {
            state.clear();
        }
    }
}

/// Standard generation: remove existing ranges, add one over the contents.
#[derive(Debug)]
struct StandardRangeBackend;

impl SelectionBackend for StandardRangeBackend {
    fn select_node(&self, document: &Document, node: NodeId, state: &mut SelectionState) {
        if !document.is_element(node) {
            return;
        }

        state.clear();
        state.replace(SelectedRange {
            node,
            text: document.text_content(node),
        });
    }

    fn clear(&self, state: &mut SelectionState) {
        state.clear();
    }
}

/// Layout helper shared by every page controller.
#[derive(Debug)]
pub struct SelectionController {
    backend: Option<Box<dyn SelectionBackend>>,
    state: SelectionState,
}

impl SelectionController {
    pub fn new(capabilities: &HostCapabilities) -> Self {
        Self {
            backend: probe_backend(capabilities),
            state: SelectionState::default(),
        }
    }

    /// Shared page setup hook; nothing lives here yet but every controller
    /// calls it so future setup lands in one place.
    pub fn init(&mut self) {}

    /// Highlights the element's text; silent no-op without a backend.
    pub fn select_text(&mut self, document: &Document, node: NodeId) {
        if let Some(backend) = &self.backend {
            backend.select_node(document, node, &mut self.state);
        }
    }

    /// Clears the global selection; silent no-op without a backend.
    pub fn unselect_text(&mut self) {
        if let Some(backend) = &self.backend {
            backend.clear(&mut self.state);
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.state.active().map(|range| range.text.as_str())
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(&HostCapabilities::default())
    }
}

fn probe_backend(capabilities: &HostCapabilities) -> Option<Box<dyn SelectionBackend>> {
    if capabilities.legacy_text_range {
        return Some(Box::new(LegacyRangeBackend {
            clear_via_standard: capabilities.standard_ranges,
            clear_via_empty: capabilities.legacy_selection_empty,
        }));
    }

    if capabilities.standard_ranges {
        return Some(Box::new(StandardRangeBackend));
    }

    None
}
