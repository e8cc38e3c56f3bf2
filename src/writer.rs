//! Byte-order-aware writer, the output mirror of [`crate::Reader`].
//!
//! # Fixed-width string fields
//! `force_length = Some(n)` makes a string field exactly `n` bytes on the
//! wire.  A terminated field holds at most `n - 1` text bytes followed by
//! zero padding; an unterminated field holds at most `n` text bytes.  With
//! `None` the field is as long as the text (plus one terminator byte for
//! C strings).
//!
//! # Indexed writes
//! [`Writer::write_at`] seeks, writes one [`Value`], and restores the cursor.
//! [`Writer::write_object_at`] does the same for any [`Writable`]; the view
//! layer writes through it.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::WriteBytesExt;
use tracing::{debug, trace};

use crate::byte_order::ByteOrder;
use crate::codec::Encoders;
use crate::error::Result;
use crate::object::Writable;
use crate::reader::Reader;
use crate::store::{self, ByteStore, OpenMode};
use crate::text::{encode_latin1, encode_latin1_chars, latin1_byte};
use crate::value::Value;

pub struct Writer<W> {
    inner:    W,
    encoders: Encoders<W>,
}

impl Writer<Cursor<Vec<u8>>> {
    /// A writer over a fresh, growable in-memory buffer.
    pub fn in_memory(order: ByteOrder) -> Self {
        Self::new(Cursor::new(Vec::new()), order)
    }

    /// Wrap an existing buffer; writes start at offset 0 and overwrite in place.
    pub fn from_bytes(bytes: Vec<u8>, order: ByteOrder) -> Self {
        Self::new(Cursor::new(bytes), order)
    }
}

impl Writer<File> {
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode, order: ByteOrder) -> Result<Self> {
        Ok(Self::new(store::open_for_write(path, mode)?, order))
    }
}

impl<W: Write + Seek> Writer<W> {
    pub fn new(inner: W, order: ByteOrder) -> Self {
        Self { inner, encoders: Encoders::select(order) }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.encoders.order()
    }

    pub fn set_byte_order(&mut self, order: ByteOrder) {
        if self.encoders.order() == order {
            return;
        }
        debug!(from = %self.encoders.order(), to = %order, "writer byte order changed");
        self.encoders = Encoders::select(order);
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Flush and hand back the store.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    // ── Cursor ──────────────────────────────────────────────────────────────

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.store_position()?)
    }

    /// Move the cursor.  Seeking past the end is allowed; the next write
    /// extends the store and the gap reads back as zeros.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    pub fn len(&mut self) -> Result<u64> {
        Ok(self.inner.store_len()?)
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn is_at_end(&mut self) -> Result<bool> {
        Ok(self.inner.at_end()?)
    }

    fn scoped<T>(&mut self, offset: u64, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.position()?;
        self.seek(offset)?;
        let out = f(self);
        self.seek(saved)?;
        out
    }

    // ── Byte-order agnostic ─────────────────────────────────────────────────

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.inner.write_u8(v)?;
        Ok(())
    }

    pub fn write_i8(&mut self, v: i8) -> Result<()> {
        self.inner.write_i8(v)?;
        Ok(())
    }

    /// One byte.  Chars above U+00FF fail with [`crate::Error::Unencodable`].
    pub fn write_char(&mut self, ch: char) -> Result<()> {
        self.write_u8(latin1_byte(ch)?)
    }

    /// `1` for true, `0` for false.
    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(u8::from(v))
    }

    // ── Byte-order dependent ────────────────────────────────────────────────

    pub fn write_i16(&mut self, v: i16) -> Result<()> {
        (self.encoders.write_i16)(&mut self.inner, v)
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        (self.encoders.write_u16)(&mut self.inner, v)
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        (self.encoders.write_i32)(&mut self.inner, v)
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        (self.encoders.write_u32)(&mut self.inner, v)
    }

    pub fn write_i64(&mut self, v: i64) -> Result<()> {
        (self.encoders.write_i64)(&mut self.inner, v)
    }

    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        (self.encoders.write_u64)(&mut self.inner, v)
    }

    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        (self.encoders.write_f32)(&mut self.inner, v)
    }

    pub fn write_f64(&mut self, v: f64) -> Result<()> {
        (self.encoders.write_f64)(&mut self.inner, v)
    }

    // ── Strings ─────────────────────────────────────────────────────────────

    /// Write a NUL-terminated string, optionally as a fixed `n`-byte field.
    pub fn write_cstring(&mut self, value: &str, force_length: Option<usize>) -> Result<()> {
        let text = encode_latin1(value)?;
        let field = force_length.unwrap_or(text.len() + 1);
        let used = text.len().min(field.saturating_sub(1));
        self.write_field(&text[..used], field)
    }

    /// Write a string with no terminator, optionally padded to `n` bytes.
    pub fn write_unterminated_string(&mut self, value: &str, force_length: Option<usize>) -> Result<()> {
        let text = encode_latin1(value)?;
        let field = force_length.unwrap_or(text.len());
        let used = text.len().min(field);
        self.write_field(&text[..used], field)
    }

    fn write_field(&mut self, text: &[u8], width: usize) -> Result<()> {
        let mut field = Vec::with_capacity(width);
        field.extend_from_slice(text);
        field.resize(width, 0);
        self.write_bytes(&field)
    }

    // ── Values and objects ──────────────────────────────────────────────────

    /// Write one value of any supported kind at the cursor.
    pub fn write_value(&mut self, value: Value<'_>) -> Result<()> {
        match value {
            Value::U8(v)    => self.write_u8(v),
            Value::I8(v)    => self.write_i8(v),
            Value::Char(v)  => self.write_char(v),
            Value::Bool(v)  => self.write_bool(v),
            Value::I16(v)   => self.write_i16(v),
            Value::U16(v)   => self.write_u16(v),
            Value::I32(v)   => self.write_i32(v),
            Value::U32(v)   => self.write_u32(v),
            Value::I64(v)   => self.write_i64(v),
            Value::U64(v)   => self.write_u64(v),
            Value::F32(v)   => self.write_f32(v),
            Value::F64(v)   => self.write_f64(v),
            Value::Bytes(v) => self.write_bytes(v),
            Value::I8s(v)   => v.iter().try_for_each(|&x| self.write_i8(x)),
            Value::Chars(v) => self.write_bytes(&encode_latin1_chars(v.iter().copied())?),
            Value::Bools(v) => v.iter().try_for_each(|&x| self.write_bool(x)),
            Value::I16s(v)  => v.iter().try_for_each(|&x| self.write_i16(x)),
            Value::U16s(v)  => v.iter().try_for_each(|&x| self.write_u16(x)),
            Value::I32s(v)  => v.iter().try_for_each(|&x| self.write_i32(x)),
            Value::U32s(v)  => v.iter().try_for_each(|&x| self.write_u32(x)),
            Value::I64s(v)  => v.iter().try_for_each(|&x| self.write_i64(x)),
            Value::U64s(v)  => v.iter().try_for_each(|&x| self.write_u64(x)),
            Value::F32s(v)  => v.iter().try_for_each(|&x| self.write_f32(x)),
            Value::F64s(v)  => v.iter().try_for_each(|&x| self.write_f64(x)),
        }
    }

    /// Write `value` at `offset`, then restore the cursor.
    pub fn write_at<'a>(&mut self, offset: u64, value: impl Into<Value<'a>>) -> Result<()> {
        let value = value.into();
        trace!(offset, kind = %value.kind(), "indexed write");
        self.scoped(offset, |w| w.write_value(value))
    }

    pub fn write_object<T: Writable + ?Sized>(&mut self, object: &T) -> Result<()> {
        object.write_to(self)
    }

    /// Write a composite object at `offset`, then restore the cursor.
    pub fn write_object_at<T: Writable + ?Sized>(&mut self, offset: u64, object: &T) -> Result<()> {
        trace!(offset, "indexed object write");
        self.scoped(offset, |w| object.write_to(w))
    }
}

impl<W: Read + Write + Seek> Writer<W> {
    /// Copy of the whole store.  The cursor is left where it was.
    pub fn snapshot(&mut self) -> Result<Vec<u8>> {
        self.scoped(0, |w| {
            let mut bytes = Vec::new();
            w.inner.read_to_end(&mut bytes)?;
            Ok(bytes)
        })
    }
}

impl<W: Read + Write + Seek + Clone> Writer<W> {
    /// A reader over the same store, using this writer's current byte order.
    pub fn reader(&self) -> Reader<W> {
        Reader::new(self.inner.clone(), self.byte_order())
    }
}
