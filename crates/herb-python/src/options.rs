//! Python option sources
//!
//! The textual form of a key is a `str` key of the `options` dict, the
//! symbolic form a keyword argument. `None` values count as absent and
//! anything else goes through Python truthiness.

use herb_ffi::{KeyForm, OptionSource};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use tracing::debug;

pub struct PyOptions<'py> {
    options: Option<&'py PyDict>,
    keywords: Option<&'py PyDict>,
}

impl<'py> PyOptions<'py> {
    /// Collect the options mapping and keyword arguments of a call
    ///
    /// An `options` value that is not a dict is ignored.
    pub fn new(options: Option<&'py PyAny>, keywords: Option<&'py PyDict>) -> Self {
        let options = options.filter(|value| !value.is_none()).and_then(|value| match value.downcast::<PyDict>() {
            Ok(dict) => Some(dict),
            Err(_) => {
                debug!(type_name = ?value.get_type().name().ok(), "ignoring non-dict options");
                None
            }
        });

        Self { options, keywords }
    }
}

impl OptionSource for PyOptions<'_> {
    fn lookup(&self, key: &str, form: KeyForm) -> Option<bool> {
        let dict = match form {
            KeyForm::Textual => self.options?,
            KeyForm::Symbolic => self.keywords?,
        };

        let value = dict.get_item(key).ok()??;
        if value.is_none() {
            return None;
        }
        value.is_true().ok()
    }
}

#[cfg(all(test, not(feature = "extension-module")))]
mod tests {
    use super::*;
    use herb_ffi::{normalize_extract_options, normalize_parser_options};
    use herb_core::ExtractRubyOptions;
    use pyo3::types::{IntoPyDict, PyList};

    fn with_gil<R>(f: impl FnOnce(Python<'_>) -> R) -> R {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(f)
    }

    #[test]
    fn test_options_dict_wins_over_keywords() {
        with_gil(|py| {
            let options = [("strict", false)].into_py_dict(py);
            let keywords = [("strict", true)].into_py_dict(py);
            let source = PyOptions::new(Some(options.as_ref()), Some(keywords));

            assert_eq!(source.lookup("strict", KeyForm::Textual), Some(false));
            assert_eq!(source.lookup("strict", KeyForm::Symbolic), Some(true));
            assert!(!normalize_parser_options(Some(&source)).strict);
        });
    }

    #[test]
    fn test_keyword_used_when_dict_lacks_key() {
        with_gil(|py| {
            let options = PyDict::new(py);
            options.set_item("strict", py.None()).unwrap();
            let keywords = [("strict", true)].into_py_dict(py);
            let source = PyOptions::new(Some(options.as_ref()), Some(keywords));

            assert_eq!(source.lookup("strict", KeyForm::Textual), None);
            assert!(normalize_parser_options(Some(&source)).strict);

            let source = PyOptions::new(None, Some(keywords));
            assert!(normalize_parser_options(Some(&source)).strict);
        });
    }

    #[test]
    fn test_python_truthiness() {
        with_gil(|py| {
            let options = [("semicolons", 1), ("preserve_positions", 0)].into_py_dict(py);
            let source = PyOptions::new(Some(options.as_ref()), None);

            let config = normalize_extract_options(Some(&source), ExtractRubyOptions::DEFAULT);
            assert!(config.semicolons);
            assert!(!config.preserve_positions);
        });
    }

    #[test]
    fn test_non_dict_options_are_ignored() {
        with_gil(|py| {
            let options = PyList::new(py, ["strict"]);
            let source = PyOptions::new(Some(options.as_ref()), None);
            assert_eq!(source.lookup("strict", KeyForm::Textual), None);

            let source = PyOptions::new(Some(py.None().into_ref(py)), None);
            assert_eq!(source.lookup("strict", KeyForm::Textual), None);
        });
    }
}
