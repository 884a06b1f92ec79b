//! Source file reading

use std::path::Path;

use crate::error::{HerbError, Result};

/// Read a template file as UTF-8 text
pub fn read_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| HerbError::Io {
        path: path.to_path_buf(),
        source,
    })
}
