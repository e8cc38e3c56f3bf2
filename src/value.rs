//! Closed set of value kinds accepted by the indexed write path.
//!
//! [`Value`] is the tagged union [`crate::Writer::write_value`] dispatches on.
//! Every kind is matched exhaustively there, so adding a kind is a compile
//! error until the writer handles it.  [`Kind`] is the payload-free tag used
//! for diagnostics, the CLI and [`crate::Reader::read_value`].

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

// ── Kind ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    U8,
    I8,
    Char,
    Bool,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bytes,
    I8s,
    Chars,
    Bools,
    I16s,
    U16s,
    I32s,
    U32s,
    I64s,
    U64s,
    F32s,
    F64s,
}

impl Kind {
    pub const SCALARS: [Kind; 12] = [
        Kind::U8, Kind::I8, Kind::Char, Kind::Bool,
        Kind::I16, Kind::U16, Kind::I32, Kind::U32,
        Kind::I64, Kind::U64, Kind::F32, Kind::F64,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Kind::U8    => "u8",
            Kind::I8    => "i8",
            Kind::Char  => "char",
            Kind::Bool  => "bool",
            Kind::I16   => "i16",
            Kind::U16   => "u16",
            Kind::I32   => "i32",
            Kind::U32   => "u32",
            Kind::I64   => "i64",
            Kind::U64   => "u64",
            Kind::F32   => "f32",
            Kind::F64   => "f64",
            Kind::Bytes => "[u8]",
            Kind::I8s   => "[i8]",
            Kind::Chars => "[char]",
            Kind::Bools => "[bool]",
            Kind::I16s  => "[i16]",
            Kind::U16s  => "[u16]",
            Kind::I32s  => "[i32]",
            Kind::U32s  => "[u32]",
            Kind::I64s  => "[i64]",
            Kind::U64s  => "[u64]",
            Kind::F32s  => "[f32]",
            Kind::F64s  => "[f64]",
        }
    }

    /// Parse a scalar kind name (`u16`, `f64`, `byte`, ...).
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "u8" | "byte"           => Some(Kind::U8),
            "i8" | "sbyte"          => Some(Kind::I8),
            "char"                  => Some(Kind::Char),
            "bool"                  => Some(Kind::Bool),
            "i16"                   => Some(Kind::I16),
            "u16"                   => Some(Kind::U16),
            "i32"                   => Some(Kind::I32),
            "u32"                   => Some(Kind::U32),
            "i64"                   => Some(Kind::I64),
            "u64"                   => Some(Kind::U64),
            "f32" | "float"         => Some(Kind::F32),
            "f64" | "double"        => Some(Kind::F64),
            _                       => None,
        }
    }

    pub fn is_array(self) -> bool {
        !Kind::SCALARS.contains(&self)
    }

    /// Encoded width of one scalar, `None` for array kinds.
    pub fn width(self) -> Option<usize> {
        match self {
            Kind::U8 | Kind::I8 | Kind::Char | Kind::Bool => Some(1),
            Kind::I16 | Kind::U16                         => Some(2),
            Kind::I32 | Kind::U32 | Kind::F32             => Some(4),
            Kind::I64 | Kind::U64 | Kind::F64             => Some(8),
            _                                             => None,
        }
    }

    /// Parse `input` as a scalar of this kind.  Integers accept a `0x` prefix.
    pub fn parse(self, input: &str) -> Result<Value<'static>> {
        let s = input.trim();
        let invalid = || Error::InvalidValue { kind: self.name(), input: input.to_string() };
        macro_rules! int {
            ($ty:ty, $variant:ident) => {{
                let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                    Some(hex) => <$ty>::from_str_radix(hex, 16),
                    None      => s.parse::<$ty>(),
                };
                parsed.map(Value::$variant).map_err(|_| invalid())
            }};
        }
        match self {
            Kind::U8  => int!(u8, U8),
            Kind::I8  => int!(i8, I8),
            Kind::I16 => int!(i16, I16),
            Kind::U16 => int!(u16, U16),
            Kind::I32 => int!(i32, I32),
            Kind::U32 => int!(u32, U32),
            Kind::I64 => int!(i64, I64),
            Kind::U64 => int!(u64, U64),
            Kind::F32 => s.parse().map(Value::F32).map_err(|_| invalid()),
            Kind::F64 => s.parse().map(Value::F64).map_err(|_| invalid()),
            Kind::Bool => match s.to_lowercase().as_str() {
                "true" | "1"  => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _             => Err(invalid()),
            },
            Kind::Char => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _               => Err(invalid()),
                }
            }
            _ => Err(Error::UnsupportedKind { kind: self.name(), op: "parse" }),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Value ───────────────────────────────────────────────────────────────────

/// A value the writer knows how to encode.  Slice kinds are written
/// element by element, in order, with no length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value<'a> {
    U8(u8),
    I8(i8),
    Char(char),
    Bool(bool),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Bytes(&'a [u8]),
    I8s(&'a [i8]),
    Chars(&'a [char]),
    Bools(&'a [bool]),
    I16s(&'a [i16]),
    U16s(&'a [u16]),
    I32s(&'a [i32]),
    U32s(&'a [u32]),
    I64s(&'a [i64]),
    U64s(&'a [u64]),
    F32s(&'a [f32]),
    F64s(&'a [f64]),
}

impl Value<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Value::U8(_)    => Kind::U8,
            Value::I8(_)    => Kind::I8,
            Value::Char(_)  => Kind::Char,
            Value::Bool(_)  => Kind::Bool,
            Value::I16(_)   => Kind::I16,
            Value::U16(_)   => Kind::U16,
            Value::I32(_)   => Kind::I32,
            Value::U32(_)   => Kind::U32,
            Value::I64(_)   => Kind::I64,
            Value::U64(_)   => Kind::U64,
            Value::F32(_)   => Kind::F32,
            Value::F64(_)   => Kind::F64,
            Value::Bytes(_) => Kind::Bytes,
            Value::I8s(_)   => Kind::I8s,
            Value::Chars(_) => Kind::Chars,
            Value::Bools(_) => Kind::Bools,
            Value::I16s(_)  => Kind::I16s,
            Value::U16s(_)  => Kind::U16s,
            Value::I32s(_)  => Kind::I32s,
            Value::U32s(_)  => Kind::U32s,
            Value::I64s(_)  => Kind::I64s,
            Value::U64s(_)  => Kind::U64s,
            Value::F32s(_)  => Kind::F32s,
            Value::F64s(_)  => Kind::F64s,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v)    => write!(f, "{v}"),
            Value::I8(v)    => write!(f, "{v}"),
            Value::Char(v)  => write!(f, "{v:?}"),
            Value::Bool(v)  => write!(f, "{v}"),
            Value::I16(v)   => write!(f, "{v}"),
            Value::U16(v)   => write!(f, "{v}"),
            Value::I32(v)   => write!(f, "{v}"),
            Value::U32(v)   => write!(f, "{v}"),
            Value::I64(v)   => write!(f, "{v}"),
            Value::U64(v)   => write!(f, "{v}"),
            Value::F32(v)   => write!(f, "{v}"),
            Value::F64(v)   => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "{}", hex::encode(v)),
            Value::I8s(v)   => write!(f, "{v:?}"),
            Value::Chars(v) => write!(f, "{v:?}"),
            Value::Bools(v) => write!(f, "{v:?}"),
            Value::I16s(v)  => write!(f, "{v:?}"),
            Value::U16s(v)  => write!(f, "{v:?}"),
            Value::I32s(v)  => write!(f, "{v:?}"),
            Value::U32s(v)  => write!(f, "{v:?}"),
            Value::I64s(v)  => write!(f, "{v:?}"),
            Value::U64s(v)  => write!(f, "{v:?}"),
            Value::F32s(v)  => write!(f, "{v:?}"),
            Value::F64s(v)  => write!(f, "{v:?}"),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $scalar:ident, $slice:ident;)*) => {$(
        impl From<$ty> for Value<'_> {
            fn from(v: $ty) -> Self {
                Value::$scalar(v)
            }
        }

        impl<'a> From<&'a [$ty]> for Value<'a> {
            fn from(v: &'a [$ty]) -> Self {
                Value::$slice(v)
            }
        }

        impl<'a, const N: usize> From<&'a [$ty; N]> for Value<'a> {
            fn from(v: &'a [$ty; N]) -> Self {
                Value::$slice(&v[..])
            }
        }

        impl<'a> From<&'a Vec<$ty>> for Value<'a> {
            fn from(v: &'a Vec<$ty>) -> Self {
                Value::$slice(v.as_slice())
            }
        }
    )*};
}

value_from! {
    u8   => U8,   Bytes;
    i8   => I8,   I8s;
    char => Char, Chars;
    bool => Bool, Bools;
    i16  => I16,  I16s;
    u16  => U16,  U16s;
    i32  => I32,  I32s;
    u32  => U32,  U32s;
    i64  => I64,  I64s;
    u64  => U64,  U64s;
    f32  => F32,  F32s;
    f64  => F64,  F64s;
}
