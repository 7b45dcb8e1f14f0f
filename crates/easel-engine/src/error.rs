use std::fmt;

use crate::surface::BackendKind;

/// Errors surfaced by drawing operations and resource acquisition.
///
/// Out-of-range numeric inputs never produce an error; they are clamped where
/// they are consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasError {
    /// A source surface belongs to a different backend than the destination.
    BackendMismatch {
        expected: BackendKind,
        found: BackendKind,
    },
    /// `restore()` was called without a matching `save()`.
    StateStackUnderflow,
    /// A native resource (texture, decoded image, GPU device) could not be acquired.
    ///
    /// Not retried internally.
    ResourceUnavailable(String),
    /// Requested surface dimensions are zero or not finite.
    InvalidDimensions { width: f32, height: f32 },
}

impl CanvasError {
    pub(crate) fn unavailable(msg: impl Into<String>) -> Self {
        CanvasError::ResourceUnavailable(msg.into())
    }
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanvasError::BackendMismatch { expected, found } => write!(
                f,
                "backend mismatch: expected a {expected:?} surface, got {found:?}"
            ),
            CanvasError::StateStackUnderflow => {
                write!(f, "restore() called with an empty state stack")
            }
            CanvasError::ResourceUnavailable(msg) => write!(f, "resource unavailable: {msg}"),
            CanvasError::InvalidDimensions { width, height } => {
                write!(f, "invalid surface dimensions {width}x{height}")
            }
        }
    }
}

impl std::error::Error for CanvasError {}

pub type Result<T> = std::result::Result<T, CanvasError>;
