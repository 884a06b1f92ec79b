//! Error handling for FFI boundary
//!
//! This module provides utilities for safely propagating errors
//! across the FFI boundary without panics or undefined behavior.

use std::any::Any;
use std::panic;

use herb_core::HerbError;

use crate::memory::set_last_error;
use crate::types::HerbResult;

/// Convert a herb core error to an FFI result code
pub fn map_core_error(error: HerbError) -> HerbResult {
    let code = HerbResult::from(&error);
    match &error {
        HerbError::AllocationFailure { .. } => set_last_error(format!("Memory error: {}", error)),
        HerbError::Io { .. } => set_last_error(format!("IO error: {}", error)),
        _ => set_last_error(error.to_string()),
    }
    code
}

/// Safely execute a closure that might panic
///
/// This function catches any panics and converts them to appropriate
/// error codes, preventing undefined behavior at the FFI boundary.
pub fn catch_panic<F, R>(f: F) -> Result<R, HerbResult>
where
    F: FnOnce() -> Result<R, HerbResult> + panic::UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(result) => result,
        Err(panic_info) => {
            let msg = get_panic_message(&panic_info);
            set_last_error(format!("Panic occurred: {}", msg));
            Err(HerbResult::InternalError)
        }
    }
}

/// Run a precondition-checked operation; a violation aborts the process
///
/// Out-of-bounds access on a caller-owned array is a caller bug, so it is
/// reported and then treated as fatal instead of unwinding into C.
pub fn fatal_on_panic<F, R>(f: F) -> R
where
    F: FnOnce() -> R + panic::UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(result) => result,
        Err(panic_info) => {
            let msg = get_panic_message(&panic_info);
            tracing::error!(%msg, "precondition violated at the C boundary");
            eprintln!("herb: precondition violated: {}", msg);
            std::process::abort()
        }
    }
}

/// Extract a message from panic info
fn get_panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

/// Macro for safely executing FFI functions that return a status code
#[macro_export]
macro_rules! ffi_boundary {
    ($body:expr) => {{
        match $crate::error::catch_panic(|| $body) {
            Ok(result) => result,
            Err(code) => return code,
        }
    }};
}

/// Macro for FFI functions that return a pointer; failures yield null
#[macro_export]
macro_rules! ffi_boundary_ptr {
    ($body:expr) => {{
        match $crate::error::catch_panic(|| $body) {
            Ok(result) => result,
            Err(_) => return ::std::ptr::null_mut(),
        }
    }};
}

/// Validate that a pointer is not null
pub fn validate_ptr<T>(ptr: *const T, name: &str) -> Result<(), HerbResult> {
    if ptr.is_null() {
        set_last_error(format!("{} is null", name));
        Err(HerbResult::NullPointer)
    } else {
        Ok(())
    }
}

/// Validate that a mutable pointer is not null
pub fn validate_mut_ptr<T>(ptr: *mut T, name: &str) -> Result<(), HerbResult> {
    if ptr.is_null() {
        set_last_error(format!("{} is null", name));
        Err(HerbResult::NullPointer)
    } else {
        Ok(())
    }
}
