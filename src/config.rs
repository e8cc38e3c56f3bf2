//! Store options, loadable from a JSON file.
//!
//! ```json
//! { "byte_order": "big-endian", "open_mode": "open" }
//! ```
//!
//! Missing fields take their [`Default`] values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::byte_order::ByteOrder;
use crate::error::Result;
use crate::store::OpenMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub byte_order: ByteOrder,
    pub open_mode:  OpenMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::LittleEndian,
            open_mode:  OpenMode::Open,
        }
    }
}

impl Options {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let opts = Options::from_json(br#"{ "byte_order": "big-endian" }"#).unwrap();
        assert_eq!(opts.byte_order, ByteOrder::BigEndian);
        assert_eq!(opts.open_mode, OpenMode::Open);
    }

    #[test]
    fn json_round_trip() {
        let opts = Options { byte_order: ByteOrder::Unset, open_mode: OpenMode::Create };
        let back = Options::from_json(&opts.to_json().unwrap()).unwrap();
        assert_eq!(back, opts);
    }

    #[test]
    fn unknown_order_is_a_config_error() {
        let err = Options::from_json(br#"{ "byte_order": "middle" }"#).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
