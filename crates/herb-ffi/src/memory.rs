//! Memory management utilities for FFI
//!
//! This module provides the thread-local last-error slot and the string
//! allocation/free pair used across the FFI boundary.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::types::HerbResult;

// Thread-local storage for last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message for the current thread
pub fn set_last_error<S: Into<String>>(err: S) {
    let message = err.into().replace('\0', "\\0");
    let error_string = CString::new(message).ok();

    LAST_ERROR.with(|e| {
        *e.borrow_mut() = error_string;
    });
}

/// Clear the last error message
pub fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Copy of the last error message, if any
pub fn last_error_message() -> Option<String> {
    LAST_ERROR.with(|e| e.borrow().as_ref().map(|s| s.to_string_lossy().into_owned()))
}

/// Allocate a new string for FFI return
///
/// # Safety
/// The caller must free this string using `herb_string_free`
pub unsafe fn allocate_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => {
            set_last_error("String contains null byte");
            ptr::null_mut()
        }
    }
}

/// Free a string allocated by herb
///
/// # Safety
/// The pointer must have been allocated by `allocate_string` or similar
#[no_mangle]
pub unsafe extern "C" fn herb_string_free(s: *mut c_char) {
    if s.is_null() {
        return;
    }

    // Reconstruct the CString and let it drop
    let _ = CString::from_raw(s);
}

/// Convert a C string to a Rust string
///
/// # Safety
/// The pointer must be a valid null-terminated C string
pub unsafe fn c_str_to_string(s: *const c_char) -> Result<String, HerbResult> {
    if s.is_null() {
        set_last_error("String argument is null");
        return Err(HerbResult::NullPointer);
    }

    match CStr::from_ptr(s).to_str() {
        Ok(str) => Ok(str.to_string()),
        Err(_) => {
            set_last_error("Invalid UTF-8 in input string");
            Err(HerbResult::Utf8Error)
        }
    }
}

/// Get the last error message
///
/// # Safety
/// Returns a pointer that should NOT be freed by the caller. It stays valid
/// until the next herb call on the same thread.
#[no_mangle]
pub unsafe extern "C" fn herb_get_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(err) => err.as_ptr(),
        None => ptr::null(),
    })
}

/// Clear the last error message
#[no_mangle]
pub extern "C" fn herb_clear_error() {
    clear_last_error();
}
