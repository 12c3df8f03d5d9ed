//! Error types for tessel_paint

use thiserror::Error;

/// Errors raised while parsing SVG path data
///
/// Offsets are byte offsets into the input string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("command '{command}' takes arguments in groups of {expected}, found {found}")]
    MissingArguments {
        command: char,
        expected: usize,
        found: usize,
    },

    #[error("invalid number at offset {offset}")]
    InvalidNumber { offset: usize },

    #[error("path data must start with a moveto command")]
    MissingMoveTo,
}

/// Result type for path operations
pub type Result<T> = std::result::Result<T, PathError>;
