//! Error handling for Python bindings
//!
//! This module defines custom exception types and maps engine errors to
//! Python exceptions.

use herb_core::HerbError as CoreError;
use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyOSError, PyTypeError};
use pyo3::prelude::*;

// Define Python exception types directly
create_exception!(herb, HerbError, PyException);
create_exception!(herb, AllocationError, HerbError);
create_exception!(herb, ConversionError, HerbError);

/// Error raised out of a binding call
///
/// Wraps a `PyErr` so both engine errors and errors raised while building
/// Python values flow through the same `?`.
#[derive(Debug)]
pub struct PyHostError(PyErr);

impl From<CoreError> for PyHostError {
    fn from(error: CoreError) -> Self {
        let message = error.to_string();
        let err = match error {
            CoreError::AllocationFailure { .. } => AllocationError::new_err(message),
            CoreError::ConversionFailure { .. } => ConversionError::new_err(message),
            CoreError::InputType { .. } => PyTypeError::new_err(message),
            CoreError::Io { source, .. } => PyOSError::new_err((source.raw_os_error().unwrap_or(0), message)),
        };
        PyHostError(err)
    }
}

impl From<PyErr> for PyHostError {
    fn from(err: PyErr) -> Self {
        PyHostError(err)
    }
}

impl From<PyHostError> for PyErr {
    fn from(error: PyHostError) -> Self {
        error.0
    }
}
