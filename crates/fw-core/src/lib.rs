//! Shared primitives used across FernWiki crates.

use core::fmt;

/// Result alias used across the workspace.
pub type WikiResult<T> = Result<T, WikiError>;

/// Top-level error type for page-scripting crates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiError {
    pub code: &'static str,
    pub message: String,
}

impl WikiError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for WikiError {}
