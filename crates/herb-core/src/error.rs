//! Error types for the herb engine and its bindings
//!
//! Recoverable failures are reported through [`HerbError`]. Precondition
//! violations (out-of-bounds access on [`HbNarray`](crate::HbNarray)) are
//! not part of this taxonomy: they are programming errors and panic.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for herb operations
#[derive(Error, Debug)]
pub enum HerbError {
    /// Backing storage could not be allocated or grown
    #[error("Allocation failed: could not reserve {requested} bytes")]
    AllocationFailure {
        requested: usize,
    },

    /// Building a host value failed after the engine produced a result
    #[error("Conversion failed: {message}")]
    ConversionFailure {
        message: String,
    },

    /// A host argument had the wrong type
    #[error("Type error: expected {expected}, got {found}")]
    InputType {
        expected: &'static str,
        found: String,
    },

    /// Reading a source file failed
    #[error("IO error: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, HerbError>;

impl HerbError {
    /// Build a conversion failure from any displayable cause
    pub fn conversion(message: impl std::fmt::Display) -> Self {
        HerbError::ConversionFailure {
            message: message.to_string(),
        }
    }

    /// Build a type error for a host argument
    pub fn input_type(expected: &'static str, found: impl Into<String>) -> Self {
        HerbError::InputType {
            expected,
            found: found.into(),
        }
    }

    /// Whether the error came from an allocator refusing a request
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, HerbError::AllocationFailure { .. })
    }
}
