//! Error types for Cutline.

use std::fmt;
use thiserror::Error;

/// Why a user-initiated action was turned down.
///
/// Rejections never change editor state; callers log them and carry on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// The action needs a selected element and none is selected.
    NoSelection,
    /// Paste was requested with nothing on the clipboard.
    ClipboardEmpty,
    /// Copy refuses to overwrite a clipboard that still holds an element.
    ClipboardOccupied,
    /// The selected element is shorter than the minimum splittable length.
    TooShortToSplit { duration_ms: f64 },
    /// The action needs a selected SVG element.
    InvalidSvgSelection,
    /// No animation with the requested id exists.
    UnknownAnimation,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSelection => write!(f, "no element selected"),
            Self::ClipboardEmpty => write!(f, "clipboard is empty"),
            Self::ClipboardOccupied => write!(f, "clipboard already holds an element"),
            Self::TooShortToSplit { duration_ms } => {
                write!(f, "element too short to split ({duration_ms} ms)")
            }
            Self::InvalidSvgSelection => write!(f, "no SVG element selected"),
            Self::UnknownAnimation => write!(f, "unknown animation"),
        }
    }
}

/// Main error type for Cutline operations.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Action rejected: {0}")]
    ActionRejected(Rejection),

    #[error("Resource missing: {0}")]
    ResourceMissing(String),

    #[error("External load failure: {0}")]
    ExternalLoad(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    /// Whether the editor can keep going after this error.
    ///
    /// Only an invariant violation signals that the model and the render
    /// surface have drifted apart.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvariantViolation(_))
    }

    /// The rejection reason, if this is a rejected user action.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::ActionRejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<Rejection> for EditorError {
    fn from(reason: Rejection) -> Self {
        Self::ActionRejected(reason)
    }
}

/// Result type alias for Cutline operations.
pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invariant_violation_is_fatal() {
        assert!(EditorError::from(Rejection::NoSelection).is_recoverable());
        assert!(EditorError::ResourceMissing("video-1".into()).is_recoverable());
        assert!(EditorError::ExternalLoad("svg".into()).is_recoverable());
        assert!(!EditorError::InvariantViolation("reorder".into()).is_recoverable());
    }

    #[test]
    fn test_rejection_display() {
        let err = EditorError::from(Rejection::TooShortToSplit { duration_ms: 1500.0 });
        assert_eq!(
            err.to_string(),
            "Action rejected: element too short to split (1500 ms)"
        );
        assert_eq!(
            err.rejection(),
            Some(Rejection::TooShortToSplit { duration_ms: 1500.0 })
        );
    }
}
