//! Wiki page controller: external-link marking and math typesetting.

use fw_core::WikiResult;
use fw_dom::Document;
use fw_dom::NodeId;
use fw_math::RenderOptions;
use fw_math::Typesetter;
use fw_math::classify;
use fw_selection::SelectionController;

/// Marker class added to external links.
pub const EXTERNAL_LINK_CLASS: &str = "external";
/// Marker class of math placeholder elements.
pub const MATH_CLASS: &str = "math";

const MAIN_SECTION_TAG: &str = "section";
const MAIN_SECTION_CLASS: &str = "main";

/// Load-time summary for a wiki page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WikiPageSummary {
    pub links_scanned: usize,
    pub external_links: usize,
    pub math_rendered: usize,
}

/// One controller serves both wiki page variants; math typesetting is an
/// optional capability supplied at construction.
#[derive(Debug, Default)]
pub struct WikiPageController {
    typesetter: Option<Box<dyn Typesetter>>,
}

impl WikiPageController {
    pub fn new() -> Self {
        Self { typesetter: None }
    }

    pub fn with_typesetter(typesetter: Box<dyn Typesetter>) -> Self {
        Self {
            typesetter: Some(typesetter),
        }
    }

    pub fn math_enabled(&self) -> bool {
        self.typesetter.is_some()
    }

    /// One-shot scan at page load: marks and retargets external links in
    /// the main content region, then typesets math placeholders when the
    /// capability is present. Later DOM mutations are not observed.
    pub fn init(
        &self,
        document: &mut Document,
        selection: &mut SelectionController,
    ) -> WikiResult<WikiPageSummary> {
        selection.init();

        let mut summary = WikiPageSummary::default();
        for link in main_section_links(document) {
            summary.links_scanned = summary.links_scanned.saturating_add(1);
            if !is_external_link(document, link) {
                continue;
            }

            document.add_class(link, EXTERNAL_LINK_CLASS)?;
            document.set_attribute(link, "target", "_blank")?;
            summary.external_links = summary.external_links.saturating_add(1);
        }

        if let Some(typesetter) = &self.typesetter {
            summary.math_rendered = render_math(document, typesetter.as_ref())?;
        }

        Ok(summary)
    }
}

fn main_section_links(document: &Document) -> Vec<NodeId> {
    document
        .first_with_tag_and_class(MAIN_SECTION_TAG, MAIN_SECTION_CLASS)
        .map(|main| document.elements_with_tag_in(main, "a"))
        .unwrap_or_default()
}

/// A link is external when its `href` value literally starts with `http`;
/// a missing `href` counts as internal.
fn is_external_link(document: &Document, link: NodeId) -> bool {
    document
        .attribute(link, "href")
        .unwrap_or("")
        .starts_with("http")
}

fn render_math(document: &mut Document, typesetter: &dyn Typesetter) -> WikiResult<usize> {
    let mut rendered = 0_usize;

    for node in document.elements_with_class(MATH_CLASS) {
        let Some(expression) = classify(&document.text_content(node)) else {
            continue;
        };

        let options = RenderOptions {
            display_mode: expression.kind.display_mode(),
        };
        match typesetter.render(&expression.formula, options) {
            Ok(markup) => {
                document.set_text_content(node, &markup)?;
                rendered = rendered.saturating_add(1);
            }
            Err(_) => {
                // Unrenderable formulas keep their source text.
            }
        }
    }

    Ok(rendered)
}
