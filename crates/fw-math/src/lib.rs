//! Math notation detection and typesetting.

use core::fmt;
use fw_core::WikiError;
use fw_core::WikiResult;
use latex2mathml::DisplayStyle;
use latex2mathml::latex_to_mathml;

/// How a recognized formula should be laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathKind {
    Inline,
    Display,
}

impl MathKind {
    /// Value of the `display_mode` option passed to the typesetting call.
    pub fn display_mode(self) -> bool {
        matches!(self, Self::Display)
    }
}

/// A formula with its delimiters already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathExpression {
    pub formula: String,
    pub kind: MathKind,
}

/// Recognizes the two delimiter pairs on placeholder text.
///
/// `\( … \)` is inline math, `\[ … \]` is display math; anything else is
/// not math and stays untouched.
pub fn classify(text: &str) -> Option<MathExpression> {
    if let Some(formula) = text
        .strip_prefix("\\(")
        .and_then(|rest| rest.strip_suffix("\\)"))
    {
        return Some(MathExpression {
            formula: formula.to_owned(),
            kind: MathKind::Inline,
        });
    }

    if let Some(formula) = text
        .strip_prefix("\\[")
        .and_then(|rest| rest.strip_suffix("\\]"))
    {
        return Some(MathExpression {
            formula: formula.to_owned(),
            kind: MathKind::Display,
        });
    }

    None
}

/// The one recognized configuration option of the typesetting call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub display_mode: bool,
}

/// Typesetting collaborator invoked with a bare formula string.
pub trait Typesetter: fmt::Debug {
    fn render(&self, formula: &str, options: RenderOptions) -> WikiResult<String>;
}

/// Production typesetter producing MathML markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathMlTypesetter;

impl Typesetter for MathMlTypesetter {
    fn render(&self, formula: &str, options: RenderOptions) -> WikiResult<String> {
        let style = if options.display_mode {
            DisplayStyle::Block
        } else {
            DisplayStyle::Inline
        };

        latex_to_mathml(formula, style).map_err(|error| {
            WikiError::new(
                "math.typeset.failed",
                format!("failed to typeset `{formula}`: {error}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MathKind;
    use super::MathMlTypesetter;
    use super::RenderOptions;
    use super::Typesetter;
    use super::classify;

    #[test]
    fn classifies_inline_delimiters() {
        let expression = classify("\\(x^2\\)");
        assert!(expression.is_some());
        let expression = match expression {
            Some(value) => value,
            None => panic!("inline delimiters not recognized"),
        };
        assert_eq!(expression.formula, "x^2");
        assert_eq!(expression.kind, MathKind::Inline);
        assert!(!expression.kind.display_mode());
    }

    #[test]
    fn classifies_display_delimiters() {
        let expression = classify("\\[x^2\\]");
        assert!(expression.is_some());
        let expression = match expression {
            Some(value) => value,
            None => panic!("display delimiters not recognized"),
        };
        assert_eq!(expression.formula, "x^2");
        assert_eq!(expression.kind, MathKind::Display);
        assert!(expression.kind.display_mode());
    }

    #[test]
    fn rejects_bare_and_mismatched_text() {
        assert!(classify("x^2").is_none());
        assert!(classify("\\(x^2\\]").is_none());
        assert!(classify("\\(").is_none());
        assert!(classify("").is_none());
    }

    #[test]
    fn accepts_empty_formula_between_delimiters() {
        let expression = classify("\\(\\)");
        assert!(expression.is_some_and(|value| value.formula.is_empty()));
    }

    #[test]
    fn renders_inline_mathml() {
        let rendered = MathMlTypesetter.render("x^2", RenderOptions { display_mode: false });
        assert!(rendered.is_ok_and(|markup| markup.contains("<math")));
    }

    #[test]
    fn renders_block_mathml() {
        let rendered = MathMlTypesetter.render("x^2", RenderOptions { display_mode: true });
        assert!(rendered.is_ok_and(|markup| markup.contains("block")));
    }
}
