//! Herb WebAssembly bindings
//!
//! Every export returns a response object shaped like
//! `{ status: "ok", data }` or `{ status: "err", error: { kind, message } }`.
//! Results are plain JavaScript values that own their data.
//!
//! The option-source tests need a JavaScript engine and run with
//! `wasm-pack test --node`; the rest run natively under `cargo test`.

use herb_core::HerbError;
use herb_ffi::{host, HostAdapter, LexSnapshot, OptionSource, ParseSnapshot};
use js_sys::JSON;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use wasm_bindgen::prelude::*;

mod options;

use options::JsOptions;

/// Lex a template into tokens
#[wasm_bindgen]
pub fn lex(source: JsValue) -> Result<JsValue, JsValue> {
    let response = match source_text(&source) {
        Ok(source) => lex_internal(&source),
        Err(err) => WorkerResponse::err(err),
    };
    to_js_value(&response)
}

/// Parse a template into a document tree
#[wasm_bindgen]
pub fn parse(source: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let response = match source_text(&source) {
        Ok(source) => parse_internal(&source, Some(&JsOptions::new(&options))),
        Err(err) => WorkerResponse::err(err),
    };
    to_js_value(&response)
}

/// Extract the Ruby code of a template; `data` is `null` when no result
/// could be produced
#[wasm_bindgen(js_name = extractRuby)]
pub fn extract_ruby(source: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let response = match source_text(&source) {
        Ok(source) => extract_ruby_internal(&source, Some(&JsOptions::new(&options))),
        Err(err) => WorkerResponse::err(err),
    };
    to_js_value(&response)
}

/// Extract the HTML of a template, with ERB tags blanked
#[wasm_bindgen(js_name = extractHTML)]
pub fn extract_html(source: JsValue) -> Result<JsValue, JsValue> {
    let response = match source_text(&source) {
        Ok(source) => extract_html_internal(&source),
        Err(err) => WorkerResponse::err(err),
    };
    to_js_value(&response)
}

/// Versions of the bindings, the grammar and the engine
#[wasm_bindgen]
pub fn version() -> String {
    host::version(&WasmHost)
}

fn lex_internal(source: &str) -> WorkerResponse<Value> {
    WorkerResponse::from(host::lex(&WasmHost, source))
}

fn parse_internal<S: OptionSource>(source: &str, options: Option<&S>) -> WorkerResponse<Value> {
    WorkerResponse::from(host::parse(&WasmHost, source, options))
}

fn extract_ruby_internal<S: OptionSource>(source: &str, options: Option<&S>) -> WorkerResponse<Option<Value>> {
    WorkerResponse::from(host::extract_ruby(&WasmHost, source, options))
}

fn extract_html_internal(source: &str) -> WorkerResponse<Option<Value>> {
    WorkerResponse::from(host::extract_html(&WasmHost, source))
}

fn source_text(source: &JsValue) -> Result<String, HerbError> {
    source.as_string().ok_or_else(|| {
        let found = source.js_typeof().as_string().unwrap_or_else(|| "unknown".to_owned());
        HerbError::input_type("string", found)
    })
}

/// Host whose values are JSON trees, serialized into JavaScript at the
/// boundary
#[derive(Debug, Clone, Copy, Default)]
struct WasmHost;

impl WasmHost {
    fn encode<T: Serialize>(value: &T) -> Result<Value, HerbError> {
        serde_json::to_value(value).map_err(HerbError::conversion)
    }
}

impl HostAdapter for WasmHost {
    type Value = Value;
    type Error = HerbError;

    const HOST_KIND: &'static str = "WebAssembly";
    const PACKAGE_NAME: &'static str = "@herb-tools/browser";

    fn package_version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn token_list(&self, tokens: LexSnapshot) -> Result<Value, HerbError> {
        Self::encode(&tokens)
    }

    fn document(&self, document: ParseSnapshot) -> Result<Value, HerbError> {
        Self::encode(&document)
    }

    fn string(&self, text: &str) -> Result<Value, HerbError> {
        Ok(Value::String(text.to_owned()))
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum WorkerResponse<T> {
    Ok { data: T },
    Err { error: WorkerError },
}

impl<T> WorkerResponse<T> {
    fn ok(data: T) -> Self {
        WorkerResponse::Ok { data }
    }

    fn err(error: HerbError) -> Self {
        debug!(%error, "herb call failed");
        WorkerResponse::Err {
            error: WorkerError::from(error),
        }
    }
}

impl<T> From<Result<T, HerbError>> for WorkerResponse<T> {
    fn from(result: Result<T, HerbError>) -> Self {
        match result {
            Ok(data) => WorkerResponse::ok(data),
            Err(err) => WorkerResponse::err(err),
        }
    }
}

#[derive(Debug, Serialize)]
struct WorkerError {
    kind: &'static str,
    message: String,
}

impl From<HerbError> for WorkerError {
    fn from(error: HerbError) -> Self {
        let kind = match &error {
            HerbError::AllocationFailure { .. } => "allocation",
            HerbError::ConversionFailure { .. } => "conversion",
            HerbError::InputType { .. } => "type",
            HerbError::Io { .. } => "io",
        };
        WorkerError {
            kind,
            message: error.to_string(),
        }
    }
}

fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|err| JsValue::from_str(&err.to_string()))?;
    JSON::parse(&json)
}
