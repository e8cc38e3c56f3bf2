use serde::{Deserialize, Serialize};
use std::fmt;

/// Order in which a multi-byte value's bytes are laid out in the store.
///
/// `Unset` means no primitive codec is installed; every byte-order-dependent
/// read or write fails with [`crate::Error::ByteOrderUnset`] until an order
/// is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByteOrder {
    #[default]
    Unset,
    /// `0x0123` is stored as `01 23`.
    BigEndian,
    /// `0x0123` is stored as `23 01`.
    LittleEndian,
}

impl ByteOrder {
    /// Byte order of the host.  Diagnostics only; the codec never consults it.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    pub fn is_set(self) -> bool {
        self != ByteOrder::Unset
    }

    pub fn name(self) -> &'static str {
        match self {
            ByteOrder::Unset        => "unset",
            ByteOrder::BigEndian    => "big-endian",
            ByteOrder::LittleEndian => "little-endian",
        }
    }

    /// Parse from a CLI or config string.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unset" | "none"                  => Some(ByteOrder::Unset),
            "be" | "big" | "big-endian"       => Some(ByteOrder::BigEndian),
            "le" | "little" | "little-endian" => Some(ByteOrder::LittleEndian),
            _                                 => None,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for order in [ByteOrder::Unset, ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            assert_eq!(ByteOrder::from_name(order.name()), Some(order));
        }
        assert_eq!(ByteOrder::from_name("BE"), Some(ByteOrder::BigEndian));
        assert_eq!(ByteOrder::from_name("le"), Some(ByteOrder::LittleEndian));
        assert_eq!(ByteOrder::from_name("middle"), None);
    }

    #[test]
    fn default_is_unset() {
        assert_eq!(ByteOrder::default(), ByteOrder::Unset);
        assert!(!ByteOrder::default().is_set());
    }

    #[test]
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn native_is_little_on_x86() {
        assert_eq!(ByteOrder::native(), ByteOrder::LittleEndian);
    }

    #[test]
    fn serde_uses_kebab_names() {
        let json = serde_json::to_string(&ByteOrder::BigEndian).unwrap();
        assert_eq!(json, "\"big-endian\"");
        let back: ByteOrder = serde_json::from_str("\"little-endian\"").unwrap();
        assert_eq!(back, ByteOrder::LittleEndian);
    }
}
