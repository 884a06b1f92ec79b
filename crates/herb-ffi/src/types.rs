//! FFI-safe type definitions
//!
//! All types in this module are designed to be safely passed across
//! the FFI boundary with C ABI compatibility.

use herb_core::HerbError;

/// Result codes for FFI operations
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HerbResult {
    /// Operation completed successfully
    Success = 0,
    /// Invalid input parameters
    InvalidInput = -1,
    /// Null pointer provided
    NullPointer = -2,
    /// Invalid UTF-8 string
    Utf8Error = -3,
    /// Memory allocation failure
    MemoryError = -4,
    /// Reading a source file failed
    IoError = -5,
    /// Building a result value failed
    ConversionError = -6,
    /// Internal error, including contained panics
    InternalError = -9,
}

/// Kind of engine output a native handle owns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Token sequence from the lexer
    Tokens,
    /// Document tree from the parser
    Document,
    /// Text buffer from an extractor
    Text,
}

impl HerbResult {
    /// Check if the result indicates success
    pub fn is_success(self) -> bool {
        self == HerbResult::Success
    }

    /// Get a human-readable error message
    pub fn error_message(self) -> &'static str {
        match self {
            HerbResult::Success => "Success",
            HerbResult::InvalidInput => "Invalid input parameters",
            HerbResult::NullPointer => "Null pointer provided",
            HerbResult::Utf8Error => "Invalid UTF-8 string",
            HerbResult::MemoryError => "Memory allocation failed",
            HerbResult::IoError => "Could not read source file",
            HerbResult::ConversionError => "Result conversion failed",
            HerbResult::InternalError => "Internal error",
        }
    }
}

impl From<&HerbError> for HerbResult {
    fn from(error: &HerbError) -> Self {
        match error {
            HerbError::AllocationFailure { .. } => HerbResult::MemoryError,
            HerbError::ConversionFailure { .. } => HerbResult::ConversionError,
            HerbError::InputType { .. } => HerbResult::InvalidInput,
            HerbError::Io { .. } => HerbResult::IoError,
        }
    }
}

impl ResultKind {
    pub fn name(self) -> &'static str {
        match self {
            ResultKind::Tokens => "tokens",
            ResultKind::Document => "document",
            ResultKind::Text => "text",
        }
    }
}
