//! JSON instantiation of the host contract, used by the C ABI

use herb_core::HerbError;
use serde::Serialize;

use crate::host::HostAdapter;
use crate::snapshot::{LexSnapshot, ParseSnapshot};

/// Host whose values are JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHost;

impl JsonHost {
    fn encode<T: Serialize>(value: &T) -> Result<String, HerbError> {
        serde_json::to_string(value).map_err(HerbError::conversion)
    }
}

impl HostAdapter for JsonHost {
    type Value = String;
    type Error = HerbError;

    const HOST_KIND: &'static str = "C ABI";
    const PACKAGE_NAME: &'static str = "herb-ffi";

    fn package_version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn token_list(&self, tokens: LexSnapshot) -> Result<String, HerbError> {
        Self::encode(&tokens)
    }

    fn document(&self, document: ParseSnapshot) -> Result<String, HerbError> {
        Self::encode(&document)
    }

    fn string(&self, text: &str) -> Result<String, HerbError> {
        Ok(text.to_owned())
    }
}
