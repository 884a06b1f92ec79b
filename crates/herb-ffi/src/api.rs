//! FFI API function definitions
//!
//! This module contains the extern "C" functions that drive the engine.
//! Results are returned as owned pointers with a matching free function;
//! failures return null or `false` and leave a message in the last-error
//! slot.

use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use std::sync::OnceLock;

use herb_core::{
    extract_html_to_buffer, extract_ruby_to_buffer, read_source, DocumentNode, ExtractRubyOptions, HbBuffer,
    ParserOptions, Token, TokenList,
};

use crate::error::{catch_panic, map_core_error, validate_mut_ptr};
use crate::host;
use crate::json::JsonHost;
use crate::memory::{allocate_string, c_str_to_string, clear_last_error, set_last_error};
use crate::native;
use crate::options::OptionMap;
use crate::types::HerbResult;
use crate::{ffi_boundary, ffi_boundary_ptr};

/// Lex a template
///
/// # Safety
/// - `source` must be a valid null-terminated C string
/// - The result must be freed with `herb_free_tokens`
#[no_mangle]
pub unsafe extern "C" fn herb_lex(source: *const c_char) -> *mut TokenList {
    clear_last_error();
    ffi_boundary_ptr!({
        let source = c_str_to_string(source)?;
        native::lex(&source).map_err(map_core_error)
    })
}

/// Read and lex a template file
///
/// # Safety
/// - `path` must be a valid null-terminated C string
/// - The result must be freed with `herb_free_tokens`
#[no_mangle]
pub unsafe extern "C" fn herb_lex_file(path: *const c_char) -> *mut TokenList {
    clear_last_error();
    ffi_boundary_ptr!({
        let path = c_str_to_string(path)?;
        let source = read_source(&path).map_err(map_core_error)?;
        native::lex(&source).map_err(map_core_error)
    })
}

/// Free a token list and null the caller's pointer
///
/// # Safety
/// `tokens` must be null or point to a pointer returned by `herb_lex`
#[no_mangle]
pub unsafe extern "C" fn herb_free_tokens(tokens: *mut *mut TokenList) {
    if tokens.is_null() {
        return;
    }

    native::free_tokens(*tokens);
    *tokens = ptr::null_mut();
}

/// Number of tokens in a list; 0 for null
///
/// # Safety
/// `tokens` must be null or a live token list
#[no_mangle]
pub unsafe extern "C" fn herb_token_count(tokens: *const TokenList) -> usize {
    tokens.as_ref().map_or(0, TokenList::len)
}

/// Token at `index`, or null when out of range
///
/// # Safety
/// `tokens` must be null or a live token list. The token is owned by the
/// list.
#[no_mangle]
pub unsafe extern "C" fn herb_token_at(tokens: *const TokenList, index: usize) -> *const Token {
    tokens
        .as_ref()
        .and_then(|tokens| tokens.get(index))
        .map_or(ptr::null(), |token| token as *const Token)
}

/// Parse a template; null options mean defaults
///
/// # Safety
/// - `source` must be a valid null-terminated C string
/// - `options` must be null or point to valid `ParserOptions`
/// - The result must be freed with `herb_free_document`
#[no_mangle]
pub unsafe extern "C" fn herb_parse(source: *const c_char, options: *const ParserOptions) -> *mut DocumentNode {
    clear_last_error();
    ffi_boundary_ptr!({
        let source = c_str_to_string(source)?;
        let options = options.as_ref().copied().unwrap_or_default();
        native::parse(&source, &options).map_err(map_core_error)
    })
}

/// Free a document
///
/// # Safety
/// `document` must be null or come from `herb_parse`, and not be freed twice
#[no_mangle]
pub unsafe extern "C" fn herb_free_document(document: *mut DocumentNode) {
    native::free_document(document);
}

/// Number of errors anywhere in a document; 0 for null
///
/// # Safety
/// `document` must be null or a live document
#[no_mangle]
pub unsafe extern "C" fn herb_document_error_count(document: *const DocumentNode) -> usize {
    document.as_ref().map_or(0, |document| document.all_errors().len())
}

/// Append the Ruby code of `source` to an initialized buffer
///
/// # Safety
/// - `source` must be a valid null-terminated C string
/// - `output` must point to a buffer initialized with `hb_buffer_init`
/// - `options` must be null or point to valid `ExtractRubyOptions`
#[no_mangle]
pub unsafe extern "C" fn herb_extract_ruby_to_buffer_with_options(
    source: *const c_char,
    output: *mut HbBuffer,
    options: *const ExtractRubyOptions,
) -> bool {
    clear_last_error();
    catch_panic(|| {
        validate_mut_ptr(output, "output")?;
        let source = c_str_to_string(source)?;
        let options = options.as_ref().copied().unwrap_or_default();
        extract_ruby_to_buffer(&source, &mut *output, &options).map_err(map_core_error)
    })
    .is_ok()
}

/// [`herb_extract_ruby_to_buffer_with_options`] with default options
///
/// # Safety
/// As for [`herb_extract_ruby_to_buffer_with_options`]
#[no_mangle]
pub unsafe extern "C" fn herb_extract_ruby_to_buffer(source: *const c_char, output: *mut HbBuffer) -> bool {
    herb_extract_ruby_to_buffer_with_options(source, output, ptr::null())
}

/// Append the HTML of `source`, ERB blanked, to an initialized buffer
///
/// # Safety
/// - `source` must be a valid null-terminated C string
/// - `output` must point to a buffer initialized with `hb_buffer_init`
#[no_mangle]
pub unsafe extern "C" fn herb_extract_html_to_buffer(source: *const c_char, output: *mut HbBuffer) -> bool {
    clear_last_error();
    catch_panic(|| {
        validate_mut_ptr(output, "output")?;
        let source = c_str_to_string(source)?;
        extract_html_to_buffer(&source, &mut *output).map_err(map_core_error)
    })
    .is_ok()
}

/// Lex a template into a JSON document
///
/// # Parameters
/// - `source`: the template
/// - `out_json`: Output parameter for the resulting JSON string
///
/// # Safety
/// - `source` must be a valid null-terminated C string
/// - The output string must be freed with `herb_string_free`
#[no_mangle]
pub unsafe extern "C" fn herb_lex_to_json(source: *const c_char, out_json: *mut *mut c_char) -> HerbResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_json, "out_json")?;
        *out_json = ptr::null_mut();

        let source = c_str_to_string(source)?;
        let json = host::lex(&JsonHost, &source).map_err(map_core_error)?;

        *out_json = allocated(&json)?;
        Ok(HerbResult::Success)
    })
}

/// Parse a template into a JSON document
///
/// # Parameters
/// - `source`: the template
/// - `options_json`: null, or a JSON object of option keys; keys written
///   `":name"` count as the symbolic form
/// - `out_json`: Output parameter for the resulting JSON string
///
/// # Safety
/// - String arguments must be valid null-terminated C strings (`options_json` may be null)
/// - The output string must be freed with `herb_string_free`
#[no_mangle]
pub unsafe extern "C" fn herb_parse_to_json(
    source: *const c_char,
    options_json: *const c_char,
    out_json: *mut *mut c_char,
) -> HerbResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_json, "out_json")?;
        *out_json = ptr::null_mut();

        let source = c_str_to_string(source)?;
        let options = options_from_json(options_json)?;
        let json = host::parse(&JsonHost, &source, options.as_ref()).map_err(map_core_error)?;

        *out_json = allocated(&json)?;
        Ok(HerbResult::Success)
    })
}

/// Extract the Ruby code of a template into a new string
///
/// # Parameters
/// - `source`: the template
/// - `options_json`: null, or a JSON object of extraction option keys
/// - `out_ruby`: Output parameter for the extracted code
///
/// # Returns
/// `MemoryError` when no result could be produced
///
/// # Safety
/// - String arguments must be valid null-terminated C strings (`options_json` may be null)
/// - The output string must be freed with `herb_string_free`
#[no_mangle]
pub unsafe extern "C" fn herb_extract_ruby(
    source: *const c_char,
    options_json: *const c_char,
    out_ruby: *mut *mut c_char,
) -> HerbResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_ruby, "out_ruby")?;
        *out_ruby = ptr::null_mut();

        let source = c_str_to_string(source)?;
        let options = options_from_json(options_json)?;
        let ruby = match host::extract_ruby(&JsonHost, &source, options.as_ref()).map_err(map_core_error)? {
            Some(ruby) => ruby,
            None => {
                set_last_error("Memory error: no extraction result");
                return Err(HerbResult::MemoryError);
            }
        };

        *out_ruby = allocated(&ruby)?;
        Ok(HerbResult::Success)
    })
}

/// Engine version; static, do not free
#[no_mangle]
pub extern "C" fn herb_version() -> *const c_char {
    static VERSION: OnceLock<CString> = OnceLock::new();
    static_c_str(&VERSION, herb_core::VERSION)
}

/// Grammar version; static, do not free
#[no_mangle]
pub extern "C" fn herb_grammar_version() -> *const c_char {
    static GRAMMAR_VERSION: OnceLock<CString> = OnceLock::new();
    static_c_str(&GRAMMAR_VERSION, herb_core::GRAMMAR_VERSION)
}

fn static_c_str(cell: &'static OnceLock<CString>, text: &str) -> *const c_char {
    cell.get_or_init(|| CString::new(text).unwrap_or_default()).as_ptr()
}

unsafe fn options_from_json(options_json: *const c_char) -> Result<Option<OptionMap>, HerbResult> {
    if options_json.is_null() {
        return Ok(None);
    }

    let text = c_str_to_string(options_json)?;
    let document: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        set_last_error(format!("Invalid options JSON: {}", e));
        HerbResult::InvalidInput
    })?;

    Ok(Some(OptionMap::from_json(&document)))
}

unsafe fn allocated(text: &str) -> Result<*mut c_char, HerbResult> {
    let ptr = allocate_string(text);
    if ptr.is_null() {
        return Err(HerbResult::ConversionError);
    }
    Ok(ptr)
}
