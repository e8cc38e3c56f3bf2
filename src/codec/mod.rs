//! Codec strategy tables: one bound set of primitive routines per byte order.
//!
//! # Dispatch
//! A [`Decoders`] / [`Encoders`] value is a plain struct of eight function
//! pointers.  [`Decoders::select`] picks the routines for a [`ByteOrder`]
//! once; every later call goes straight through the stored pointer with no
//! per-call branch on the order.  Replacing the whole struct is the rebind,
//! so a reader or writer never holds a half-switched table.
//!
//! # Byte exactness
//! The routines are `byteorder` instantiations for `BigEndian` and
//! `LittleEndian`.  They assemble values from the store bytes in the stated
//! order regardless of the host's native order.  Floats go through their
//! IEEE-754 bit pattern, so NaN payloads survive a round trip unchanged.
//!
//! # Unset
//! With [`ByteOrder::Unset`] every slot is bound to a routine that fails
//! with [`Error::ByteOrderUnset`] naming the operation.

use std::fmt;
use std::io::{Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::byte_order::ByteOrder;
use crate::error::{Error, Result};

// ── Bound routines ──────────────────────────────────────────────────────────

macro_rules! decode_fn {
    ($name:ident, $ty:ty, $method:ident, $width:expr) => {
        fn $name<R: Read, B: byteorder::ByteOrder>(r: &mut R) -> Result<$ty> {
            r.$method::<B>().map_err(|e| Error::on_read(e, $width))
        }
    };
}

macro_rules! encode_fn {
    ($name:ident, $ty:ty, $method:ident) => {
        fn $name<W: Write, B: byteorder::ByteOrder>(w: &mut W, v: $ty) -> Result<()> {
            w.$method::<B>(v)?;
            Ok(())
        }
    };
}

decode_fn!(decode_i16, i16, read_i16, 2);
decode_fn!(decode_u16, u16, read_u16, 2);
decode_fn!(decode_i32, i32, read_i32, 4);
decode_fn!(decode_u32, u32, read_u32, 4);
decode_fn!(decode_i64, i64, read_i64, 8);
decode_fn!(decode_u64, u64, read_u64, 8);
decode_fn!(decode_f32, f32, read_f32, 4);
decode_fn!(decode_f64, f64, read_f64, 8);

encode_fn!(encode_i16, i16, write_i16);
encode_fn!(encode_u16, u16, write_u16);
encode_fn!(encode_i32, i32, write_i32);
encode_fn!(encode_u32, u32, write_u32);
encode_fn!(encode_i64, i64, write_i64);
encode_fn!(encode_u64, u64, write_u64);
encode_fn!(encode_f32, f32, write_f32);
encode_fn!(encode_f64, f64, write_f64);

// ── Unset routines ──────────────────────────────────────────────────────────

macro_rules! unset_decode_fn {
    ($name:ident, $ty:ty, $op:literal) => {
        fn $name<R>(_: &mut R) -> Result<$ty> {
            Err(Error::ByteOrderUnset { op: $op })
        }
    };
}

macro_rules! unset_encode_fn {
    ($name:ident, $ty:ty, $op:literal) => {
        fn $name<W>(_: &mut W, _: $ty) -> Result<()> {
            Err(Error::ByteOrderUnset { op: $op })
        }
    };
}

unset_decode_fn!(unset_read_i16, i16, "read_i16");
unset_decode_fn!(unset_read_u16, u16, "read_u16");
unset_decode_fn!(unset_read_i32, i32, "read_i32");
unset_decode_fn!(unset_read_u32, u32, "read_u32");
unset_decode_fn!(unset_read_i64, i64, "read_i64");
unset_decode_fn!(unset_read_u64, u64, "read_u64");
unset_decode_fn!(unset_read_f32, f32, "read_f32");
unset_decode_fn!(unset_read_f64, f64, "read_f64");

unset_encode_fn!(unset_write_i16, i16, "write_i16");
unset_encode_fn!(unset_write_u16, u16, "write_u16");
unset_encode_fn!(unset_write_i32, i32, "write_i32");
unset_encode_fn!(unset_write_u32, u32, "write_u32");
unset_encode_fn!(unset_write_i64, i64, "write_i64");
unset_encode_fn!(unset_write_u64, u64, "write_u64");
unset_encode_fn!(unset_write_f32, f32, "write_f32");
unset_encode_fn!(unset_write_f64, f64, "write_f64");

// ── Decoders ────────────────────────────────────────────────────────────────

/// Decode half of the strategy table, bound to one byte order.
pub struct Decoders<R> {
    order:        ByteOrder,
    pub read_i16: fn(&mut R) -> Result<i16>,
    pub read_u16: fn(&mut R) -> Result<u16>,
    pub read_i32: fn(&mut R) -> Result<i32>,
    pub read_u32: fn(&mut R) -> Result<u32>,
    pub read_i64: fn(&mut R) -> Result<i64>,
    pub read_u64: fn(&mut R) -> Result<u64>,
    pub read_f32: fn(&mut R) -> Result<f32>,
    pub read_f64: fn(&mut R) -> Result<f64>,
}

impl<R: Read> Decoders<R> {
    pub fn select(order: ByteOrder) -> Self {
        match order {
            ByteOrder::BigEndian    => Self::bound::<BigEndian>(order),
            ByteOrder::LittleEndian => Self::bound::<LittleEndian>(order),
            ByteOrder::Unset => Self {
                order,
                read_i16: unset_read_i16::<R>,
                read_u16: unset_read_u16::<R>,
                read_i32: unset_read_i32::<R>,
                read_u32: unset_read_u32::<R>,
                read_i64: unset_read_i64::<R>,
                read_u64: unset_read_u64::<R>,
                read_f32: unset_read_f32::<R>,
                read_f64: unset_read_f64::<R>,
            },
        }
    }

    fn bound<B: byteorder::ByteOrder>(order: ByteOrder) -> Self {
        Self {
            order,
            read_i16: decode_i16::<R, B>,
            read_u16: decode_u16::<R, B>,
            read_i32: decode_i32::<R, B>,
            read_u32: decode_u32::<R, B>,
            read_i64: decode_i64::<R, B>,
            read_u64: decode_u64::<R, B>,
            read_f32: decode_f32::<R, B>,
            read_f64: decode_f64::<R, B>,
        }
    }
}

impl<R> Decoders<R> {
    /// The order this table was selected for.
    pub fn order(&self) -> ByteOrder {
        self.order
    }
}

impl<R> Clone for Decoders<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Decoders<R> {}

impl<R> fmt::Debug for Decoders<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoders").field("order", &self.order).finish()
    }
}

// ── Encoders ────────────────────────────────────────────────────────────────

/// Encode half of the strategy table, bound to one byte order.
pub struct Encoders<W> {
    order:         ByteOrder,
    pub write_i16: fn(&mut W, i16) -> Result<()>,
    pub write_u16: fn(&mut W, u16) -> Result<()>,
    pub write_i32: fn(&mut W, i32) -> Result<()>,
    pub write_u32: fn(&mut W, u32) -> Result<()>,
    pub write_i64: fn(&mut W, i64) -> Result<()>,
    pub write_u64: fn(&mut W, u64) -> Result<()>,
    pub write_f32: fn(&mut W, f32) -> Result<()>,
    pub write_f64: fn(&mut W, f64) -> Result<()>,
}

impl<W: Write> Encoders<W> {
    pub fn select(order: ByteOrder) -> Self {
        match order {
            ByteOrder::BigEndian    => Self::bound::<BigEndian>(order),
            ByteOrder::LittleEndian => Self::bound::<LittleEndian>(order),
            ByteOrder::Unset => Self {
                order,
                write_i16: unset_write_i16::<W>,
                write_u16: unset_write_u16::<W>,
                write_i32: unset_write_i32::<W>,
                write_u32: unset_write_u32::<W>,
                write_i64: unset_write_i64::<W>,
                write_u64: unset_write_u64::<W>,
                write_f32: unset_write_f32::<W>,
                write_f64: unset_write_f64::<W>,
            },
        }
    }

    fn bound<B: byteorder::ByteOrder>(order: ByteOrder) -> Self {
        Self {
            order,
            write_i16: encode_i16::<W, B>,
            write_u16: encode_u16::<W, B>,
            write_i32: encode_i32::<W, B>,
            write_u32: encode_u32::<W, B>,
            write_i64: encode_i64::<W, B>,
            write_u64: encode_u64::<W, B>,
            write_f32: encode_f32::<W, B>,
            write_f64: encode_f64::<W, B>,
        }
    }
}

impl<W> Encoders<W> {
    pub fn order(&self) -> ByteOrder {
        self.order
    }
}

impl<W> Clone for Encoders<W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for Encoders<W> {}

impl<W> fmt::Debug for Encoders<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoders").field("order", &self.order).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_u32(order: ByteOrder, v: u32) -> Vec<u8> {
        let enc = Encoders::<Vec<u8>>::select(order);
        let mut out = Vec::new();
        (enc.write_u32)(&mut out, v).unwrap();
        out
    }

    #[test]
    fn big_endian_is_msb_first() {
        assert_eq!(encode_u32(ByteOrder::BigEndian, 0x0102_0304), [1, 2, 3, 4]);
    }

    #[test]
    fn little_endian_is_lsb_first() {
        assert_eq!(encode_u32(ByteOrder::LittleEndian, 0x0102_0304), [4, 3, 2, 1]);
    }

    #[test]
    fn float_layout_is_reversed_not_bit_flipped() {
        let enc_be = Encoders::<Vec<u8>>::select(ByteOrder::BigEndian);
        let enc_le = Encoders::<Vec<u8>>::select(ByteOrder::LittleEndian);
        let (mut be, mut le) = (Vec::new(), Vec::new());
        (enc_be.write_f64)(&mut be, 1.5).unwrap();
        (enc_le.write_f64)(&mut le, 1.5).unwrap();
        assert_eq!(be, 1.5f64.to_bits().to_be_bytes());
        le.reverse();
        assert_eq!(be, le);
    }

    #[test]
    fn decode_consumes_exactly_width() {
        let dec = Decoders::<Cursor<Vec<u8>>>::select(ByteOrder::BigEndian);
        let mut cur = Cursor::new(vec![0x12, 0x34, 0xAA]);
        assert_eq!((dec.read_u16)(&mut cur).unwrap(), 0x1234);
        assert_eq!(cur.position(), 2);
    }

    #[test]
    fn short_input_reports_width() {
        let dec = Decoders::<Cursor<Vec<u8>>>::select(ByteOrder::LittleEndian);
        let mut cur = Cursor::new(vec![0x01, 0x02, 0x03]);
        match (dec.read_u64)(&mut cur) {
            Err(Error::UnexpectedEof { need }) => assert_eq!(need, 8),
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[test]
    fn unset_names_the_operation() {
        let dec = Decoders::<Cursor<Vec<u8>>>::select(ByteOrder::Unset);
        let mut cur = Cursor::new(vec![0; 8]);
        match (dec.read_f32)(&mut cur) {
            Err(Error::ByteOrderUnset { op }) => assert_eq!(op, "read_f32"),
            other => panic!("expected ByteOrderUnset, got {other:?}"),
        }
        assert_eq!(cur.position(), 0);

        let enc = Encoders::<Vec<u8>>::select(ByteOrder::Unset);
        let mut out = Vec::new();
        assert!(matches!(
            (enc.write_i64)(&mut out, 7),
            Err(Error::ByteOrderUnset { op: "write_i64" })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn select_records_order() {
        assert_eq!(Decoders::<Cursor<Vec<u8>>>::select(ByteOrder::BigEndian).order(), ByteOrder::BigEndian);
        assert_eq!(Encoders::<Vec<u8>>::select(ByteOrder::Unset).order(), ByteOrder::Unset);
    }
}
