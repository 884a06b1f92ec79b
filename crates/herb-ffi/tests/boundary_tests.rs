//! FFI boundary tests
//!
//! These tests verify the safety and correctness of the C layer,
//! including null pointer handling, memory management, and error propagation.

use herb_ffi::*;
use std::ffi::{CStr, CString};
use std::io::Write;
use std::os::raw::c_char;
use std::ptr;

/// Helper to convert Rust string to C string
fn to_c_string(s: &str) -> CString {
    CString::new(s).unwrap()
}

/// Helper to convert C string pointer to Rust string
unsafe fn from_c_string(s: *const c_char) -> String {
    if s.is_null() {
        String::new()
    } else {
        CStr::from_ptr(s).to_string_lossy().into_owned()
    }
}

#[test]
fn test_null_pointer_handling() {
    unsafe {
        assert!(herb_lex(ptr::null()).is_null());
        assert!(!herb_get_last_error().is_null());

        let mut output: *mut c_char = ptr::null_mut();
        let result = herb_lex_to_json(ptr::null(), &mut output);
        assert_eq!(result, HerbResult::NullPointer);
        assert!(output.is_null());

        let source = to_c_string("<p></p>");
        let result = herb_lex_to_json(source.as_ptr(), ptr::null_mut());
        assert_eq!(result, HerbResult::NullPointer);
        assert_eq!(from_c_string(herb_get_last_error()), "out_json is null");

        herb_clear_error();
        assert!(herb_get_last_error().is_null());

        assert!(!herb_extract_html_to_buffer(source.as_ptr(), ptr::null_mut()));
        assert_eq!(herb_token_count(ptr::null()), 0);
        herb_free_tokens(ptr::null_mut());
        herb_free_document(ptr::null_mut());
    }
}

#[test]
fn test_invalid_utf8_handling() {
    unsafe {
        let invalid_utf8 = [0xFF, 0xFE, 0x00];
        let invalid_ptr = invalid_utf8.as_ptr() as *const c_char;

        let mut output: *mut c_char = ptr::null_mut();
        let result = herb_parse_to_json(invalid_ptr, ptr::null(), &mut output);
        assert_eq!(result, HerbResult::Utf8Error);
        assert!(output.is_null());

        assert!(herb_parse(invalid_ptr, ptr::null()).is_null());
        assert!(from_c_string(herb_get_last_error()).contains("UTF-8"));
    }
}

#[test]
fn test_json_output_allocation_and_deallocation() {
    unsafe {
        let source = to_c_string("<div><%= user.name %></div>");
        let options = to_c_string(r#"{":track_whitespace": true}"#);
        let mut output: *mut c_char = ptr::null_mut();

        let result = herb_parse_to_json(source.as_ptr(), options.as_ptr(), &mut output);
        assert_eq!(result, HerbResult::Success);
        assert!(!output.is_null());

        let json: serde_json::Value = serde_json::from_str(&from_c_string(output)).unwrap();
        assert_eq!(json["value"]["children"][0]["tag_name"], "div");
        herb_string_free(output);

        let result = herb_lex_to_json(source.as_ptr(), &mut output);
        assert_eq!(result, HerbResult::Success);
        assert!(from_c_string(output).contains("TOKEN_ERB_START"));
        herb_string_free(output);
    }
}

#[test]
fn test_error_propagation() {
    unsafe {
        let source = to_c_string("<p></p>");
        let options = to_c_string("not valid json");
        let mut output: *mut c_char = ptr::null_mut();

        let result = herb_parse_to_json(source.as_ptr(), options.as_ptr(), &mut output);
        assert_eq!(result, HerbResult::InvalidInput);

        let error_msg = from_c_string(herb_get_last_error());
        assert!(error_msg.contains("Invalid options JSON"));
    }
}

#[test]
fn test_non_object_options_are_ignored() {
    unsafe {
        let source = to_c_string("<% end %>");
        let options = to_c_string(r#"["analyze", false]"#);
        let mut output: *mut c_char = ptr::null_mut();

        let result = herb_parse_to_json(source.as_ptr(), options.as_ptr(), &mut output);
        assert_eq!(result, HerbResult::Success);

        let json: serde_json::Value = serde_json::from_str(&from_c_string(output)).unwrap();
        assert_eq!(json["errors"][0]["type"], "UnmatchedERBEndError");
        herb_string_free(output);
    }
}

#[test]
fn test_extract_ruby_with_options() {
    unsafe {
        let source = to_c_string("<% a %>\n<% b %>");
        let options = to_c_string(r#"{"semicolons": true}"#);
        let mut output: *mut c_char = ptr::null_mut();

        let result = herb_extract_ruby(source.as_ptr(), options.as_ptr(), &mut output);
        assert_eq!(result, HerbResult::Success);
        assert_eq!(from_c_string(output), "   a ; \n   b ; ");
        herb_string_free(output);
    }
}

#[test]
fn test_lex_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "<%# hello %>").unwrap();
    let path = to_c_string(file.path().to_str().unwrap());

    unsafe {
        let mut tokens = herb_lex_file(path.as_ptr());
        assert!(!tokens.is_null());
        assert_eq!(herb_token_count(tokens), 4);
        herb_free_tokens(&mut tokens);
        assert!(tokens.is_null());

        let missing = to_c_string("/no/such/template.html.erb");
        assert!(herb_lex_file(missing.as_ptr()).is_null());
        assert!(from_c_string(herb_get_last_error()).starts_with("IO error"));
    }
}

#[test]
fn test_extract_into_caller_buffer() {
    let mut buffer = std::mem::MaybeUninit::<herb_core::HbBuffer>::uninit();
    let source = to_c_string("<b><%= x %></b>");
    let options = herb_core::ExtractRubyOptions {
        preserve_positions: false,
        ..Default::default()
    };

    unsafe {
        assert!(hb_buffer_init(buffer.as_mut_ptr(), 0));
        assert!(herb_extract_ruby_to_buffer_with_options(
            source.as_ptr(),
            buffer.as_mut_ptr(),
            &options
        ));
        assert_eq!(hb_buffer_length(buffer.as_ptr()), 2);
        hb_buffer_deinit(buffer.as_mut_ptr());
        buffer.assume_init_drop();
    }
}

#[test]
fn test_version_string() {
    unsafe {
        let version = from_c_string(herb_version());
        assert_eq!(version, herb_core::VERSION);

        let grammar = from_c_string(herb_grammar_version());
        assert_eq!(grammar.split('.').count(), 3);

        // Version strings are static and must NOT be freed
    }
}
