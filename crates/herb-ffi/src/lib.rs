//! Herb FFI - boundary between the native engine and host bindings
//!
//! This crate provides the C-compatible surface of the herb engine and the
//! machinery every host binding is built from:
//!
//! - **C ABI**: `herb_*`, `hb_narray_*` and `hb_buffer_*` functions
//! - **Native handles**: [`NativeHandle`] owns one engine result and frees it
//!   exactly once
//! - **Scoped conversion**: [`convert_scoped`] runs produce, convert and
//!   release in that order on every exit path
//! - **Option normalization**: [`normalize_parser_options`] and
//!   [`normalize_extract_options`] over any [`OptionSource`]
//! - **Host contract**: [`HostAdapter`] and the generic operations in [`host`]
//!
//! # Safety
//!
//! All FFI functions are marked `unsafe` as they deal with raw pointers
//! and cross-language boundaries. Users must ensure:
//! - Every returned result is freed with its matching free function
//! - Strings are valid UTF-8 and null-terminated
//! - Pointers are non-null where required

#[macro_use]
pub mod error;
mod api;
pub mod handle;
pub mod host;
pub mod json;
mod memory;
pub mod native;
mod narray;
pub mod options;
pub mod protocol;
pub mod snapshot;
mod types;

// Re-export public API
pub use api::*;
pub use handle::{NativeHandle, NativeResource, RawDocument, RawText, RawTokens};
pub use host::HostAdapter;
pub use memory::{herb_clear_error, herb_get_last_error, herb_string_free, last_error_message};
pub use narray::*;
pub use options::{
    normalize_extract_options, normalize_parser_options, KeyForm, OptionKey, OptionMap, OptionSource, NO_OPTIONS,
};
pub use protocol::{convert_produced, convert_scoped};
pub use snapshot::{ErrorSnapshot, LexSnapshot, NodeSnapshot, ParseSnapshot, TokenSnapshot};
pub use types::{HerbResult, ResultKind};
