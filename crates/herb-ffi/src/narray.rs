//! C entry points for the growable array and the text buffer
//!
//! The structs live in caller-owned storage; these functions only manage
//! their backing allocations. Index preconditions are fatal: a bad index
//! aborts the process instead of unwinding into C.

use std::os::raw::{c_char, c_void};
use std::ptr;

use herb_core::{HbBuffer, HbNarray};

use crate::error::{fatal_on_panic, map_core_error};
use crate::memory::{clear_last_error, set_last_error};
use crate::native;

/// Initialize an array in caller-owned storage
///
/// Returns `false` on allocation failure or a zero size, leaving the array
/// in the released state.
///
/// # Safety
/// `array` must be valid for writes of one `HbNarray`
#[no_mangle]
pub unsafe extern "C" fn hb_narray_init(array: *mut HbNarray, item_size: usize, initial_capacity: usize) -> bool {
    clear_last_error();
    if array.is_null() {
        set_last_error("array is null");
        return false;
    }
    if item_size == 0 || initial_capacity == 0 {
        ptr::write(array, HbNarray::released());
        set_last_error("item size and initial capacity must be non-zero");
        return false;
    }

    match HbNarray::init(item_size, initial_capacity) {
        Ok(initialized) => {
            ptr::write(array, initialized);
            true
        }
        Err(err) => {
            ptr::write(array, HbNarray::released());
            map_core_error(err);
            false
        }
    }
}

/// Copy `item_size` bytes from `item` to the end of the array
///
/// On allocation failure the array is unchanged and `false` is returned.
///
/// # Safety
/// `array` must be initialized and `item` valid for reads of `item_size` bytes
#[no_mangle]
pub unsafe extern "C" fn hb_narray_append(array: *mut HbNarray, item: *const c_void) -> bool {
    clear_last_error();
    match (*array).append_raw(item as *const u8) {
        Ok(()) => true,
        Err(err) => {
            map_core_error(err);
            false
        }
    }
}

/// Pointer to the item at `index`; `index` must be below the size
///
/// # Safety
/// `array` must be initialized
#[no_mangle]
pub unsafe extern "C" fn hb_narray_get(array: *const HbNarray, index: usize) -> *mut c_void {
    let array = &*array;
    fatal_on_panic(|| array.get_ptr(index) as *mut c_void)
}

/// Remove the item at `index`, keeping the order of the rest
///
/// # Safety
/// `array` must be initialized
#[no_mangle]
pub unsafe extern "C" fn hb_narray_remove(array: *mut HbNarray, index: usize) {
    let array = &mut *array;
    fatal_on_panic(std::panic::AssertUnwindSafe(|| array.remove(index)))
}

/// First item, or null when empty
///
/// # Safety
/// `array` must be initialized
#[no_mangle]
pub unsafe extern "C" fn hb_narray_first(array: *const HbNarray) -> *mut c_void {
    let array = &*array;
    if array.is_empty() {
        return ptr::null_mut();
    }
    array.get_ptr(0) as *mut c_void
}

/// Last item, or null when empty
///
/// # Safety
/// `array` must be initialized
#[no_mangle]
pub unsafe extern "C" fn hb_narray_last(array: *const HbNarray) -> *mut c_void {
    let array = &*array;
    if array.is_empty() {
        return ptr::null_mut();
    }
    array.get_ptr(array.len() - 1) as *mut c_void
}

/// Move the last item into `out`; `false` when empty
///
/// # Safety
/// `array` must be initialized and `out` valid for writes of `item_size` bytes
#[no_mangle]
pub unsafe extern "C" fn hb_narray_pop(array: *mut HbNarray, out: *mut c_void) -> bool {
    (*array).pop_raw(out as *mut u8)
}

/// Release the backing storage and zero the fields
///
/// # Safety
/// `array` must be null, initialized or already released
#[no_mangle]
pub unsafe extern "C" fn hb_narray_deinit(array: *mut HbNarray) {
    if let Some(array) = array.as_mut() {
        array.deinit();
    }
}

/// Number of items; 0 for a null array
///
/// # Safety
/// `array` must be null or initialized
#[no_mangle]
pub unsafe extern "C" fn hb_narray_size(array: *const HbNarray) -> usize {
    HbNarray::size(array.as_ref())
}

/// Initialize a text buffer in caller-owned storage
///
/// # Safety
/// `buffer` must be valid for writes of one `HbBuffer`
#[no_mangle]
pub unsafe extern "C" fn hb_buffer_init(buffer: *mut HbBuffer, capacity: usize) -> bool {
    clear_last_error();
    if buffer.is_null() {
        set_last_error("buffer is null");
        return false;
    }

    match native::buffer_init(buffer, capacity) {
        Ok(()) => true,
        Err(err) => {
            map_core_error(err);
            false
        }
    }
}

/// Release a text buffer's storage
///
/// # Safety
/// `buffer` must be null, initialized or already released
#[no_mangle]
pub unsafe extern "C" fn hb_buffer_deinit(buffer: *mut HbBuffer) {
    if let Some(buffer) = buffer.as_mut() {
        buffer.deinit();
    }
}

/// Length in bytes; 0 for null
///
/// # Safety
/// `buffer` must be null or initialized
#[no_mangle]
pub unsafe extern "C" fn hb_buffer_length(buffer: *const HbBuffer) -> usize {
    buffer.as_ref().map_or(0, HbBuffer::len)
}

/// Pointer to the buffer's bytes; not null-terminated, see `hb_buffer_length`
///
/// # Safety
/// `buffer` must be initialized; the pointer is invalidated by any append
#[no_mangle]
pub unsafe extern "C" fn hb_buffer_value(buffer: *const HbBuffer) -> *const c_char {
    match buffer.as_ref() {
        Some(buffer) => buffer.as_str().as_ptr() as *const c_char,
        None => ptr::null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::MaybeUninit;

    unsafe fn ints(array: *const HbNarray) -> Vec<i32> {
        (0..hb_narray_size(array))
            .map(|i| *(hb_narray_get(array, i) as *const i32))
            .collect()
    }

    #[test]
    fn test_scenario_through_c_abi() {
        let mut storage = MaybeUninit::<HbNarray>::uninit();
        let array = storage.as_mut_ptr();

        unsafe {
            assert!(hb_narray_init(array, 4, 2));
            for value in [1i32, 2, 3, 4] {
                assert!(hb_narray_append(array, &value as *const i32 as *const c_void));
                if value == 3 {
                    assert_eq!((*array).capacity(), 4);
                }
            }
            assert_eq!(ints(array), [1, 2, 3, 4]);

            hb_narray_remove(array, 1);
            assert_eq!(ints(array), [1, 3, 4]);
            assert_eq!(*(hb_narray_first(array) as *const i32), 1);
            assert_eq!(*(hb_narray_last(array) as *const i32), 4);

            let mut out = 0i32;
            assert!(hb_narray_pop(array, &mut out as *mut i32 as *mut c_void));
            assert_eq!(out, 4);
            assert_eq!(hb_narray_size(array), 2);

            hb_narray_deinit(array);
            assert_eq!(hb_narray_size(array), 0);
            assert_eq!((*array).item_size(), 0);
            assert!(hb_narray_first(array).is_null());
            assert!(!hb_narray_pop(array, &mut out as *mut i32 as *mut c_void));

            storage.assume_init_drop();
        }
    }

    #[test]
    fn test_null_and_invalid_arrays() {
        let mut storage = MaybeUninit::<HbNarray>::uninit();
        unsafe {
            assert_eq!(hb_narray_size(ptr::null()), 0);
            assert!(!hb_narray_init(ptr::null_mut(), 4, 2));
            assert!(!hb_narray_init(storage.as_mut_ptr(), 4, 0));
            assert_eq!(hb_narray_size(storage.as_ptr()), 0);
            hb_narray_deinit(ptr::null_mut());
            storage.assume_init_drop();
        }
    }

    #[test]
    fn test_buffer_through_c_abi() {
        let mut storage = MaybeUninit::<HbBuffer>::uninit();
        let buffer = storage.as_mut_ptr();
        let source = std::ffi::CString::new("<p><%= x %></p>").unwrap();

        unsafe {
            assert!(hb_buffer_init(buffer, 4));
            assert!(crate::api::herb_extract_html_to_buffer(source.as_ptr(), buffer));

            let bytes = std::slice::from_raw_parts(hb_buffer_value(buffer) as *const u8, hb_buffer_length(buffer));
            assert_eq!(bytes, b"<p>        </p>");

            hb_buffer_deinit(buffer);
            assert_eq!(hb_buffer_length(buffer), 0);
            hb_buffer_deinit(buffer);
            storage.assume_init_drop();
        }
    }
}
