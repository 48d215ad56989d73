// src/error.rs
// Error taxonomy surfaced by every fallible operation in the crate.

use thiserror::Error;

/// Errors raised synchronously when a batch or configuration is malformed.
///
/// There is no partial result: a malformed batch aborts the call.
#[derive(Debug, Clone, Error)]
pub enum OrdinalError {
    /// Dimensions of logits, levels, labels or weights disagree with each
    /// other or with the configured number of classes.
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A value is outside its valid domain (class count below 2, label
    /// outside `[0, K-1]`, empty batch, bad hyperparameter).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An ndarray reshape failed while moving parameter storage between
    /// dynamic and fixed dimensionality.
    #[error("array layout error: {0}")]
    Layout(#[from] ndarray::ShapeError),
}

impl OrdinalError {
    pub(crate) fn shape(context: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        OrdinalError::ShapeMismatch {
            context,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        OrdinalError::InvalidArgument(message.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, OrdinalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message_names_context() {
        let err = OrdinalError::shape("coral_loss levels", &[2, 4], &[2, 3]);
        assert_eq!(
            err.to_string(),
            "shape mismatch in coral_loss levels: expected [2, 4], got [2, 3]"
        );
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = OrdinalError::invalid("num_classes must be at least 2, got 1");
        assert_eq!(
            err.to_string(),
            "invalid argument: num_classes must be at least 2, got 1"
        );
    }
}
