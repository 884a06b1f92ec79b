//! Type-erased growable array
//!
//! `HbNarray` stores fixed-size items as raw bytes in one contiguous
//! allocation. Capacity grows by doubling, so appends are amortized O(1);
//! removal shifts the tail left to keep insertion order.
//!
//! Items are copied bit for bit. The safe typed helpers only accept
//! [`Plain`] items, for which every byte pattern is a valid value; other
//! `Copy` types go through the `unsafe` `*_unchecked` accessors. Index
//! preconditions are asserted: reading or removing past the end is a caller
//! bug and panics rather than returning an error.

use std::alloc::{self, Layout};
use std::mem;
use std::ptr;

use tracing::trace;

use crate::error::{HerbError, Result};

/// Alignment of the backing storage, matching what `malloc` guarantees
pub const ITEM_ALIGN: usize = 16;

/// Item types for which any byte pattern of the right size is a valid value
///
/// The safe typed accessors of [`HbNarray`] are bounded on this trait, so
/// bytes appended through [`HbNarray::append_bytes`] can never be read back
/// as an invalid value:
///
/// ```compile_fail
/// use std::num::NonZeroU32;
/// use herb_core::HbNarray;
///
/// let mut array = HbNarray::init(4, 1).unwrap();
/// array.append_bytes(&[0, 0, 0, 0]).unwrap();
/// let _ = array.get::<NonZeroU32>(0);
/// ```
///
/// ```compile_fail
/// use herb_core::HbNarray;
///
/// let mut array = HbNarray::init(4, 1).unwrap();
/// array.append_bytes(&[0xFF; 4]).unwrap();
/// let _ = array.first::<char>();
/// ```
///
/// # Safety
/// Implementors must have no padding and no invalid bit patterns.
pub unsafe trait Plain: Copy + 'static {}

macro_rules! plain {
    ($($ty:ty),* $(,)?) => {
        $(unsafe impl Plain for $ty {})*
    };
}

plain!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

unsafe impl<T: Plain, const N: usize> Plain for [T; N] {}

/// Growable array of fixed-size items
#[repr(C)]
#[derive(Debug)]
pub struct HbNarray {
    item_size: usize,
    capacity: usize,
    size: usize,
    items: *mut u8,
}

impl HbNarray {
    /// Allocate room for `initial_capacity` items of `item_size` bytes
    ///
    /// # Panics
    /// Panics if `item_size` or `initial_capacity` is zero.
    pub fn init(item_size: usize, initial_capacity: usize) -> Result<Self> {
        assert!(item_size != 0, "HbNarray item size must be non-zero");
        assert!(initial_capacity != 0, "HbNarray initial capacity must be non-zero");

        let layout = storage_layout(item_size, initial_capacity)?;
        let items = unsafe { raw::allocate(layout) };
        if items.is_null() {
            return Err(HerbError::AllocationFailure {
                requested: layout.size(),
            });
        }

        Ok(Self {
            item_size,
            capacity: initial_capacity,
            size: 0,
            items,
        })
    }

    /// Allocate an array sized for items of type `T`
    pub fn init_for<T: Copy>(initial_capacity: usize) -> Result<Self> {
        assert!(mem::align_of::<T>() <= ITEM_ALIGN, "item alignment exceeds HbNarray storage alignment");
        Self::init(mem::size_of::<T>(), initial_capacity)
    }

    /// An array in the state `deinit` leaves behind
    pub const fn released() -> Self {
        Self {
            item_size: 0,
            capacity: 0,
            size: 0,
            items: ptr::null_mut(),
        }
    }

    /// Copy `item_size` bytes from `item` into the next slot
    ///
    /// On failure the array is left exactly as it was.
    ///
    /// # Safety
    /// `item` must be valid for reads of `item_size` bytes. If some of those
    /// bytes are uninitialized (struct padding), the array must not be read
    /// through [`get_bytes`](Self::get_bytes), [`pop_bytes`](Self::pop_bytes)
    /// or the [`Plain`] accessors afterwards.
    pub unsafe fn append_raw(&mut self, item: *const u8) -> Result<()> {
        assert!(self.item_size != 0, "HbNarray used after deinit");

        if self.size + 1 > self.capacity {
            self.grow_to(self.size + 1)?;
        }

        ptr::copy_nonoverlapping(item, self.slot(self.size), self.item_size);
        self.size += 1;

        Ok(())
    }

    /// Append one item given as its raw bytes
    pub fn append_bytes(&mut self, item: &[u8]) -> Result<()> {
        assert_eq!(item.len(), self.item_size, "item length does not match HbNarray item size");
        unsafe { self.append_raw(item.as_ptr()) }
    }

    /// Append a typed item
    pub fn append<T: Plain>(&mut self, item: &T) -> Result<()> {
        self.check_item::<T>();
        unsafe { self.append_raw(item as *const T as *const u8) }
    }

    /// Append an item of any `Copy` type
    ///
    /// # Safety
    /// Same contract as [`append_raw`](Self::append_raw) for the bytes of
    /// `item`.
    pub unsafe fn append_unchecked<T: Copy>(&mut self, item: &T) -> Result<()> {
        self.check_item::<T>();
        self.append_raw(item as *const T as *const u8)
    }

    /// Grow (by doubling) until `additional` more items fit
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        assert!(self.item_size != 0, "HbNarray used after deinit");

        let needed = self.size.checked_add(additional).ok_or(HerbError::AllocationFailure {
            requested: usize::MAX,
        })?;
        if needed > self.capacity {
            self.grow_to(needed)?;
        }
        Ok(())
    }

    /// Pointer to the item at `index`
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn get_ptr(&self, index: usize) -> *mut u8 {
        assert!(index < self.size, "HbNarray index {} out of bounds (size {})", index, self.size);
        self.slot(index)
    }

    /// Raw bytes of the item at `index`
    pub fn get_bytes(&self, index: usize) -> &[u8] {
        let item = self.get_ptr(index);
        unsafe { std::slice::from_raw_parts(item, self.item_size) }
    }

    /// Typed reference to the item at `index`
    pub fn get<T: Plain>(&self, index: usize) -> &T {
        unsafe { self.get_unchecked(index) }
    }

    /// Typed reference to an item of any `Copy` type
    ///
    /// # Safety
    /// The item at `index` must hold a valid `T`, for example because it was
    /// appended with [`append_unchecked::<T>`](Self::append_unchecked).
    pub unsafe fn get_unchecked<T: Copy>(&self, index: usize) -> &T {
        self.check_item::<T>();
        &*(self.get_ptr(index) as *const T)
    }

    /// Remove the item at `index`, shifting later items left
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn remove(&mut self, index: usize) {
        assert!(index < self.size, "HbNarray index {} out of bounds (size {})", index, self.size);

        let trailing = self.size - 1 - index;
        if trailing > 0 {
            unsafe {
                ptr::copy(self.slot(index + 1), self.slot(index), trailing * self.item_size);
            }
        }

        self.size -= 1;
    }

    /// First item, if any
    pub fn first<T: Plain>(&self) -> Option<&T> {
        if self.size == 0 {
            return None;
        }
        Some(self.get(0))
    }

    /// Last item, if any
    pub fn last<T: Plain>(&self) -> Option<&T> {
        if self.size == 0 {
            return None;
        }
        Some(self.get(self.size - 1))
    }

    /// Copy the last item into `out` and drop it from the array
    ///
    /// Returns `false` (leaving `out` untouched) when the array is empty.
    ///
    /// # Safety
    /// `out` must be valid for writes of `item_size` bytes.
    pub unsafe fn pop_raw(&mut self, out: *mut u8) -> bool {
        if self.size == 0 {
            return false;
        }

        ptr::copy_nonoverlapping(self.slot(self.size - 1), out, self.item_size);
        self.size -= 1;

        true
    }

    /// Byte-level pop into a caller buffer of exactly `item_size` bytes
    pub fn pop_bytes(&mut self, out: &mut [u8]) -> bool {
        assert_eq!(out.len(), self.item_size, "output length does not match HbNarray item size");
        unsafe { self.pop_raw(out.as_mut_ptr()) }
    }

    /// Typed pop
    pub fn pop<T: Plain>(&mut self) -> Option<T> {
        self.check_item::<T>();
        let mut out = mem::MaybeUninit::<T>::uninit();
        if unsafe { self.pop_raw(out.as_mut_ptr() as *mut u8) } {
            Some(unsafe { out.assume_init() })
        } else {
            None
        }
    }

    /// View every item as a typed slice
    pub fn as_slice<T: Plain>(&self) -> &[T] {
        unsafe { self.as_slice_unchecked() }
    }

    /// View every item as a slice of any `Copy` type
    ///
    /// # Safety
    /// Every item must hold a valid `T`.
    pub unsafe fn as_slice_unchecked<T: Copy>(&self) -> &[T] {
        self.check_item::<T>();
        if self.size == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.items as *const T, self.size)
    }

    /// Release the backing storage and zero the bookkeeping fields
    ///
    /// Calling it again is a no-op; any other operation afterwards panics.
    pub fn deinit(&mut self) {
        if !self.items.is_null() {
            if let Ok(layout) = storage_layout(self.item_size, self.capacity) {
                unsafe { alloc::dealloc(self.items, layout) };
            }
        }

        self.item_size = 0;
        self.capacity = 0;
        self.size = 0;
        self.items = ptr::null_mut();
    }

    /// Number of items; a missing array counts as empty
    pub fn size(array: Option<&HbNarray>) -> usize {
        array.map_or(0, HbNarray::len)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the array holds no items
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of items that fit without reallocating
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size in bytes of one item
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    fn grow_to(&mut self, needed: usize) -> Result<()> {
        let mut new_capacity = self.capacity;
        while new_capacity < needed {
            new_capacity = new_capacity.checked_mul(2).ok_or(HerbError::AllocationFailure {
                requested: usize::MAX,
            })?;
        }

        let old_layout = storage_layout(self.item_size, self.capacity)?;
        let new_layout = storage_layout(self.item_size, new_capacity)?;
        let items = unsafe { raw::reallocate(self.items, old_layout, new_layout.size()) };
        if items.is_null() {
            return Err(HerbError::AllocationFailure {
                requested: new_layout.size(),
            });
        }

        trace!(from = self.capacity, to = new_capacity, item_size = self.item_size, "grew narray");
        self.items = items;
        self.capacity = new_capacity;

        Ok(())
    }

    fn slot(&self, index: usize) -> *mut u8 {
        unsafe { self.items.add(index * self.item_size) }
    }

    fn check_item<T>(&self) {
        assert_eq!(mem::size_of::<T>(), self.item_size, "type size does not match HbNarray item size");
        assert!(mem::align_of::<T>() <= ITEM_ALIGN, "item alignment exceeds HbNarray storage alignment");
    }
}

impl Drop for HbNarray {
    fn drop(&mut self) {
        self.deinit();
    }
}

fn storage_layout(item_size: usize, capacity: usize) -> Result<Layout> {
    let bytes = item_size.checked_mul(capacity).ok_or(HerbError::AllocationFailure {
        requested: usize::MAX,
    })?;
    Layout::from_size_align(bytes, ITEM_ALIGN).map_err(|_| HerbError::AllocationFailure { requested: bytes })
}

/// Allocator calls, with a fault switch for unit tests
mod raw {
    use std::alloc::{self, Layout};

    pub(super) unsafe fn allocate(layout: Layout) -> *mut u8 {
        #[cfg(test)]
        if fault::tripped() {
            return std::ptr::null_mut();
        }
        alloc::alloc(layout)
    }

    pub(super) unsafe fn reallocate(items: *mut u8, old: Layout, new_size: usize) -> *mut u8 {
        #[cfg(test)]
        if fault::tripped() {
            return std::ptr::null_mut();
        }
        alloc::realloc(items, old, new_size)
    }

}

#[cfg(test)]
pub(crate) use raw::fault;

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(array: &HbNarray) -> Vec<i32> {
        array.as_slice::<i32>().to_vec()
    }

    #[test]
    fn test_append_doubles_capacity() {
        let mut array = HbNarray::init(4, 2).unwrap();

        array.append(&1i32).unwrap();
        array.append(&2i32).unwrap();
        assert_eq!(array.capacity(), 2);

        array.append(&3i32).unwrap();
        assert_eq!(array.capacity(), 4);

        array.append(&4i32).unwrap();
        assert_eq!(array.capacity(), 4);
        assert_eq!(array.len(), 4);

        for (i, expected) in [1, 2, 3, 4].iter().enumerate() {
            assert_eq!(array.get::<i32>(i), expected);
        }

        array.remove(1);
        assert_eq!(ints(&array), vec![1, 3, 4]);
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn test_remove_last_and_first() {
        let mut array = HbNarray::init_for::<u64>(1).unwrap();
        for value in 10u64..15 {
            array.append(&value).unwrap();
        }

        array.remove(4);
        assert_eq!(array.as_slice::<u64>(), &[10, 11, 12, 13]);

        array.remove(0);
        assert_eq!(array.as_slice::<u64>(), &[11, 12, 13]);
    }

    #[test]
    fn test_first_last_pop() {
        let mut array = HbNarray::init_for::<i32>(4).unwrap();
        assert!(array.first::<i32>().is_none());
        assert!(array.last::<i32>().is_none());
        assert_eq!(array.pop::<i32>(), None);
        assert_eq!(array.len(), 0);

        array.append(&7i32).unwrap();
        array.append(&8i32).unwrap();
        assert_eq!(array.first::<i32>(), Some(&7));
        assert_eq!(array.last::<i32>(), Some(&8));

        assert_eq!(array.pop::<i32>(), Some(8));
        assert_eq!(array.len(), 1);
        assert_eq!(array.pop::<i32>(), Some(7));
        assert_eq!(array.pop::<i32>(), None);
    }

    #[test]
    fn test_byte_level_operations() {
        let mut array = HbNarray::init(3, 1).unwrap();
        array.append_bytes(b"abc").unwrap();
        array.append_bytes(b"def").unwrap();
        assert_eq!(array.get_bytes(1), b"def");

        let mut out = [0u8; 3];
        assert!(array.pop_bytes(&mut out));
        assert_eq!(&out, b"def");
        assert!(array.pop_bytes(&mut out));
        assert_eq!(&out, b"abc");
        assert!(!array.pop_bytes(&mut out));
        assert_eq!(&out, b"abc");
    }

    #[test]
    fn test_plain_items_read_any_bytes() {
        let mut array = HbNarray::init_for::<u32>(1).unwrap();
        array.append_bytes(&[0xFF; 4]).unwrap();
        array.append_bytes(&[0, 0, 0, 0]).unwrap();

        assert_eq!(array.get::<u32>(0), &u32::MAX);
        assert_eq!(array.last::<u32>(), Some(&0));
        assert_eq!(array.as_slice::<[u8; 4]>(), &[[0xFF; 4], [0; 4]]);
    }

    #[test]
    fn test_unchecked_items_round_trip() {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Kind {
            Open,
            Close(char),
        }

        let mut array = HbNarray::init_for::<Kind>(1).unwrap();
        unsafe {
            array.append_unchecked(&Kind::Open).unwrap();
            array.append_unchecked(&Kind::Close('>')).unwrap();
            assert_eq!(array.get_unchecked::<Kind>(1), &Kind::Close('>'));
            assert_eq!(array.as_slice_unchecked::<Kind>(), &[Kind::Open, Kind::Close('>')]);
        }
    }

    #[test]
    fn test_failed_growth_leaves_array_unchanged() {
        let mut array = HbNarray::init_for::<i32>(2).unwrap();
        array.append(&1i32).unwrap();
        array.append(&2i32).unwrap();

        fault::fail_next_allocation();
        let err = array.append(&3i32).unwrap_err();
        assert!(err.is_allocation_failure());
        assert_eq!(array.len(), 2);
        assert_eq!(array.capacity(), 2);
        assert_eq!(ints(&array), vec![1, 2]);

        array.append(&3i32).unwrap();
        assert_eq!(ints(&array), vec![1, 2, 3]);
    }

    #[test]
    fn test_failed_init() {
        fault::fail_next_allocation();
        assert!(HbNarray::init(4, 2).unwrap_err().is_allocation_failure());

        let err = HbNarray::init(usize::MAX / 2, 4).unwrap_err();
        assert!(err.is_allocation_failure());
    }

    #[test]
    fn test_reserve_grows_by_doubling() {
        let mut array = HbNarray::init(1, 3).unwrap();
        array.reserve(2).unwrap();
        assert_eq!(array.capacity(), 3);

        array.reserve(10).unwrap();
        assert_eq!(array.capacity(), 12);
    }

    #[test]
    fn test_deinit_zeroes_fields() {
        let mut array = HbNarray::init_for::<i32>(4).unwrap();
        array.append(&1i32).unwrap();

        array.deinit();
        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
        assert_eq!(array.item_size(), 0);

        array.deinit();
    }

    #[test]
    fn test_size_tolerates_missing_array() {
        assert_eq!(HbNarray::size(None), 0);

        let mut array = HbNarray::init(1, 1).unwrap();
        array.append_bytes(b"x").unwrap();
        assert_eq!(HbNarray::size(Some(&array)), 1);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds_panics() {
        let mut array = HbNarray::init_for::<i32>(1).unwrap();
        array.append(&1i32).unwrap();
        let _ = array.get::<i32>(1);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_remove_out_of_bounds_panics() {
        let mut array = HbNarray::init_for::<i32>(1).unwrap();
        array.remove(0);
    }

    #[test]
    #[should_panic(expected = "initial capacity")]
    fn test_zero_capacity_panics() {
        let _ = HbNarray::init(4, 0);
    }
}
