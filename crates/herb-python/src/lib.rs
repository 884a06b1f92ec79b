//! Herb Python Bindings
//!
//! This crate provides the `herb` Python extension module: lexing, parsing
//! and Ruby/HTML extraction of ERB templates. Failures raise exceptions;
//! results are plain dicts, lists and strings that own their data.
//!
//! # Testing
//!
//! `tests/test_herb.py` exercises the built module with
//! `maturin develop && pytest`. The Rust unit tests link against
//! libpython and run with `cargo test -p herb-python --no-default-features`.

#![allow(non_local_definitions)] // PyO3 macros generate non-local impl blocks

use std::path::PathBuf;

use herb_ffi::host;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyString};
use pyo3::wrap_pyfunction;

mod error;
mod adapter;
mod options;

use error::*;
use adapter::PythonHost;
use options::PyOptions;

/// Herb Python module
#[pymodule]
fn herb(py: Python<'_>, m: &PyModule) -> PyResult<()> {
    // Add exception types
    m.add("HerbError", py.get_type::<HerbError>())?;
    m.add("AllocationError", py.get_type::<AllocationError>())?;
    m.add("ConversionError", py.get_type::<ConversionError>())?;

    m.add_function(wrap_pyfunction!(lex, m)?)?;
    m.add_function(wrap_pyfunction!(lex_file, m)?)?;
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add_function(wrap_pyfunction!(parse_file, m)?)?;
    m.add_function(wrap_pyfunction!(extract_ruby, m)?)?;
    m.add_function(wrap_pyfunction!(extract_html, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}

/// Lex a template into tokens
///
/// Args:
///     source (str): The template
///
/// Returns:
///     dict: `{"value": [token, ...], "source": str}`
#[pyfunction]
fn lex(py: Python<'_>, source: &PyAny) -> PyResult<PyObject> {
    let source = source_text(source)?;
    Ok(host::lex(&PythonHost::new(py), source)?)
}

/// Read a template file and lex it
#[pyfunction]
fn lex_file(py: Python<'_>, path: &PyAny) -> PyResult<PyObject> {
    let path = source_path(path)?;
    Ok(host::lex_file(&PythonHost::new(py), path)?)
}

/// Parse a template into a document tree
///
/// Args:
///     source (str): The template
///     options (dict, optional): `track_whitespace`, `analyze`, `strict`
///     **kwargs: The same keys as keyword arguments; `options` wins
///
/// Returns:
///     dict: `{"value": document, "source": str, "errors": [error, ...]}`
#[pyfunction]
#[pyo3(signature = (source, options=None, **kwargs))]
fn parse(py: Python<'_>, source: &PyAny, options: Option<&PyAny>, kwargs: Option<&PyDict>) -> PyResult<PyObject> {
    let source = source_text(source)?;
    let options = PyOptions::new(options, kwargs);
    Ok(host::parse(&PythonHost::new(py), source, Some(&options))?)
}

/// Read a template file and parse it
#[pyfunction]
#[pyo3(signature = (path, options=None, **kwargs))]
fn parse_file(py: Python<'_>, path: &PyAny, options: Option<&PyAny>, kwargs: Option<&PyDict>) -> PyResult<PyObject> {
    let path = source_path(path)?;
    let options = PyOptions::new(options, kwargs);
    Ok(host::parse_file(&PythonHost::new(py), path, Some(&options))?)
}

/// Extract the Ruby code of a template
///
/// Args:
///     source (str): The template
///     options (dict, optional): `semicolons`, `comments`, `preserve_positions`
///     **kwargs: The same keys as keyword arguments; `options` wins
///
/// Returns:
///     str | None: The code, or None when no result could be produced
#[pyfunction]
#[pyo3(signature = (source, options=None, **kwargs))]
fn extract_ruby(
    py: Python<'_>,
    source: &PyAny,
    options: Option<&PyAny>,
    kwargs: Option<&PyDict>,
) -> PyResult<Option<PyObject>> {
    let source = source_text(source)?;
    let options = PyOptions::new(options, kwargs);
    Ok(host::extract_ruby(&PythonHost::new(py), source, Some(&options))?)
}

/// Extract the HTML of a template, with ERB tags blanked
#[pyfunction]
fn extract_html(py: Python<'_>, source: &PyAny) -> PyResult<Option<PyObject>> {
    let source = source_text(source)?;
    Ok(host::extract_html(&PythonHost::new(py), source)?)
}

/// Get the versions of the bindings, the grammar and the engine
#[pyfunction]
fn version(py: Python<'_>) -> String {
    host::version(&PythonHost::new(py))
}

fn source_text(source: &PyAny) -> Result<&str, PyHostError> {
    match source.downcast::<PyString>() {
        Ok(text) => Ok(text.to_str()?),
        Err(_) => Err(herb_core::HerbError::input_type("str", type_name(source)).into()),
    }
}

fn source_path(path: &PyAny) -> Result<PathBuf, PyHostError> {
    path.extract::<PathBuf>()
        .map_err(|_| herb_core::HerbError::input_type("str or os.PathLike", type_name(path)).into())
}

fn type_name(value: &PyAny) -> String {
    value.get_type().name().map(str::to_owned).unwrap_or_else(|_| "object".to_owned())
}
