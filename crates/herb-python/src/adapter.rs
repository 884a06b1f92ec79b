//! Python value construction for the shared host operations

use herb_ffi::{HostAdapter, LexSnapshot, ParseSnapshot};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyString};
use serde::Serialize;
use serde_json::Value;

use crate::error::PyHostError;

/// Builds Python objects while holding the GIL
pub struct PythonHost<'py> {
    py: Python<'py>,
}

impl<'py> PythonHost<'py> {
    pub fn new(py: Python<'py>) -> Self {
        Self { py }
    }

    fn from_snapshot<T: Serialize>(&self, snapshot: &T) -> Result<PyObject, PyHostError> {
        let value = serde_json::to_value(snapshot).map_err(herb_core::HerbError::conversion)?;
        Ok(json_to_py(self.py, &value)?)
    }
}

impl HostAdapter for PythonHost<'_> {
    type Value = PyObject;
    type Error = PyHostError;

    const HOST_KIND: &'static str = "Python native extension";
    const PACKAGE_NAME: &'static str = "herb";

    fn package_version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn token_list(&self, tokens: LexSnapshot) -> Result<PyObject, PyHostError> {
        self.from_snapshot(&tokens)
    }

    fn document(&self, document: ParseSnapshot) -> Result<PyObject, PyHostError> {
        self.from_snapshot(&document)
    }

    fn string(&self, text: &str) -> Result<PyObject, PyHostError> {
        Ok(PyString::new(self.py, text).to_object(self.py))
    }
}

/// Convert a JSON value into the matching Python object
pub fn json_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    match value {
        Value::Null => Ok(py.None()),
        Value::Bool(b) => Ok(b.to_object(py)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_object(py))
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_object(py))
            } else if let Some(f) = n.as_f64() {
                Ok(f.to_object(py))
            } else {
                Ok(n.to_string().to_object(py))
            }
        }
        Value::String(s) => Ok(s.to_object(py)),
        Value::Array(arr) => {
            let py_list = PyList::empty(py);
            for item in arr {
                py_list.append(json_to_py(py, item)?)?;
            }
            Ok(py_list.to_object(py))
        }
        Value::Object(obj) => {
            let py_dict = PyDict::new(py);
            for (k, v) in obj {
                py_dict.set_item(k, json_to_py(py, v)?)?;
            }
            Ok(py_dict.to_object(py))
        }
    }
}
