//! Error types for the construction engine.
//!
//! Every failure during resolution carries the diagnostic path at which
//! it occurred, rendered as a dotted string so the failing spot can be
//! located in the config tree. Errors are never retried or recovered
//! internally; a failing nested construction fails its enclosing
//! construction entirely.

use thiserror::Error;

use crate::constants::ERROR_PATH_LIMIT;

/// Unified error type for config resolution and construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MakeError {
    /// The config shape is invalid for the requested operation: unknown
    /// discriminator type, unknown template name, a non-array value where
    /// an array was required.
    #[error("invalid config at [{path}]: {reason}")]
    InvalidConfig { path: String, reason: String },

    /// The resolved value fails the expected-type contract.
    #[error("type check failed at [{path}]: expected [{expected}], found [{found}]")]
    TypeCheck {
        path: String,
        expected: String,
        found: String,
    },

    /// Raised by the schema model: missing factory, a field validation
    /// hook returning false, or an object validation returning false.
    #[error("construction failed at [{path}]: {reason}")]
    Construction { path: String, reason: String },
}

impl MakeError {
    /// The dotted diagnostic path at which the error occurred.
    pub fn path(&self) -> &str {
        match self {
            MakeError::InvalidConfig { path, .. }
            | MakeError::TypeCheck { path, .. }
            | MakeError::Construction { path, .. } => path,
        }
    }
}

/// Result alias used by all fallible engine operations.
pub type MakeResult<T> = Result<T, MakeError>;

/// Renders a path stack as the dotted string carried by errors, bounded
/// to the first [`ERROR_PATH_LIMIT`] segments.
pub(crate) fn render_path(segments: &[String]) -> String {
    segments
        .iter()
        .take(ERROR_PATH_LIMIT)
        .cloned()
        .collect::<Vec<_>>()
        .join(".")
}
