//! Byte-order-aware reader.
//!
//! Single bytes, booleans and raw ranges are read directly.  Multi-byte
//! primitives go through the installed [`Decoders`] table.
//!
//! # Strings
//! All string reads treat each byte as one code point (U+0000..=U+00FF) unless
//! a [`TextEncoding`] is given.  They stop at end-of-data instead of failing:
//!
//! | Method | Stops at | Consumes |
//! |--------|----------|----------|
//! | [`Reader::read_cstring`] | `0x00` or end | text + terminator |
//! | [`Reader::read_cstring_until`] | given byte or end | text + terminator |
//! | [`Reader::read_cstring_fixed`] | `0x00` within the field | the whole field |
//! | [`Reader::read_unterminated_string`] | `0x00` within the field | the whole field |
//!
//! A fixed-width field that runs past the end of the store is consumed up to
//! the end.  Fixed-width primitive reads, in contrast, fail with
//! [`Error::UnexpectedEof`].

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::ReadBytesExt;
use tracing::debug;

use crate::byte_order::ByteOrder;
use crate::codec::Decoders;
use crate::error::{Error, Result};
use crate::object::Readable;
use crate::store::{self, ByteStore};
use crate::text::TextEncoding;
use crate::value::{Kind, Value};

pub struct Reader<R> {
    inner:    R,
    decoders: Decoders<R>,
}

impl Reader<Cursor<Vec<u8>>> {
    /// Wrap an existing buffer.
    pub fn from_bytes(bytes: Vec<u8>, order: ByteOrder) -> Self {
        Self::new(Cursor::new(bytes), order)
    }

    /// Load the file at `path` into memory and read from there.
    pub fn open<P: AsRef<Path>>(path: P, order: ByteOrder) -> Result<Self> {
        Ok(Self::new(store::load(path)?, order))
    }

    /// Read from a stream that cannot seek by buffering all of it first.
    pub fn buffered<S: Read>(stream: S, order: ByteOrder) -> Result<Self> {
        Ok(Self::new(store::buffer_stream(stream)?, order))
    }
}

impl<R: Read + Seek> Reader<R> {
    pub fn new(inner: R, order: ByteOrder) -> Self {
        Self { inner, decoders: Decoders::select(order) }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.decoders.order()
    }

    /// Install the decode table for `order`.  Bytes already consumed are
    /// unaffected; only later reads use the new order.
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        if self.decoders.order() == order {
            return;
        }
        debug!(from = %self.decoders.order(), to = %order, "reader byte order changed");
        self.decoders = Decoders::select(order);
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    // ── Cursor ──────────────────────────────────────────────────────────────

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.store_position()?)
    }

    /// Move the cursor to `offset`.  Seeking past the end of the store fails.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        let len = self.inner.store_len()?;
        if offset > len {
            return Err(Error::SeekOutOfRange { offset, len });
        }
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    pub fn len(&mut self) -> Result<u64> {
        Ok(self.inner.store_len()?)
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// True once the cursor has reached the end of the store.
    pub fn is_at_end(&mut self) -> Result<bool> {
        Ok(self.inner.at_end()?)
    }

    /// Seek to `offset`, run `f`, then put the cursor back where it was.
    /// The cursor is restored whether or not `f` succeeds.
    pub fn at<T>(&mut self, offset: u64, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.position()?;
        self.seek(offset)?;
        let out = f(self);
        self.inner.seek(SeekFrom::Start(saved))?;
        out
    }

    // ── Byte-order agnostic ─────────────────────────────────────────────────

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf).map_err(|e| Error::on_read(e, n))?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.inner.read_u8().map_err(|e| Error::on_read(e, 1))
    }

    /// One byte, two's complement.
    pub fn read_i8(&mut self) -> Result<i8> {
        self.inner.read_i8().map_err(|e| Error::on_read(e, 1))
    }

    /// One byte taken as a code point in U+0000..=U+00FF.
    pub fn read_char(&mut self) -> Result<char> {
        Ok(char::from(self.read_u8()?))
    }

    /// Any nonzero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    // ── Byte-order dependent ────────────────────────────────────────────────

    pub fn read_i16(&mut self) -> Result<i16> {
        (self.decoders.read_i16)(&mut self.inner)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        (self.decoders.read_u16)(&mut self.inner)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        (self.decoders.read_i32)(&mut self.inner)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        (self.decoders.read_u32)(&mut self.inner)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        (self.decoders.read_i64)(&mut self.inner)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        (self.decoders.read_u64)(&mut self.inner)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        (self.decoders.read_f32)(&mut self.inner)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        (self.decoders.read_f64)(&mut self.inner)
    }

    // ── Objects and bulk reads ──────────────────────────────────────────────

    pub fn read<T: Readable>(&mut self) -> Result<T> {
        T::read_from(self)
    }

    /// Read `count` items with `f`, in order.
    pub fn read_many<T>(
        &mut self,
        count: usize,
        mut f: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(f(self)?);
        }
        Ok(out)
    }

    /// Read one scalar selected at run time.
    pub fn read_value(&mut self, kind: Kind) -> Result<Value<'static>> {
        Ok(match kind {
            Kind::U8   => Value::U8(self.read_u8()?),
            Kind::I8   => Value::I8(self.read_i8()?),
            Kind::Char => Value::Char(self.read_char()?),
            Kind::Bool => Value::Bool(self.read_bool()?),
            Kind::I16  => Value::I16(self.read_i16()?),
            Kind::U16  => Value::U16(self.read_u16()?),
            Kind::I32  => Value::I32(self.read_i32()?),
            Kind::U32  => Value::U32(self.read_u32()?),
            Kind::I64  => Value::I64(self.read_i64()?),
            Kind::U64  => Value::U64(self.read_u64()?),
            Kind::F32  => Value::F32(self.read_f32()?),
            Kind::F64  => Value::F64(self.read_f64()?),
            _ => return Err(Error::UnsupportedKind { kind: kind.name(), op: "read_value" }),
        })
    }

    // ── Strings ─────────────────────────────────────────────────────────────

    /// Read up to a `0x00` byte or the end of the store.  The terminator is
    /// consumed but not returned.
    pub fn read_cstring(&mut self) -> Result<String> {
        self.read_cstring_until(0)
    }

    /// Like [`Reader::read_cstring`] with a caller-chosen stop byte.
    pub fn read_cstring_until(&mut self, terminator: u8) -> Result<String> {
        let mut text = String::new();
        while let Some(b) = self.next_byte()? {
            if b == terminator {
                break;
            }
            text.push(char::from(b));
        }
        Ok(text)
    }

    /// Read a terminated string stored in a field of `buffer_size` bytes.
    /// The cursor always ends `buffer_size` bytes past where it started.
    pub fn read_cstring_fixed(&mut self, buffer_size: usize) -> Result<String> {
        self.read_padded_field(buffer_size)
    }

    /// Read a `length`-byte field with no required terminator.  A `0x00`
    /// inside the field ends the text; the padding after it is skipped.
    pub fn read_unterminated_string(&mut self, length: usize) -> Result<String> {
        self.read_padded_field(length)
    }

    /// Decode a `length`-byte field with `encoding` and drop trailing NULs.
    pub fn read_unterminated_string_with(
        &mut self,
        length: usize,
        encoding: &dyn TextEncoding,
    ) -> Result<String> {
        let field = self.take_available(length)?;
        let text = encoding.decode(&field)?;
        Ok(text.trim_end_matches('\0').to_string())
    }

    /// `length` bytes as chars, NULs included.
    pub fn read_char_array(&mut self, length: usize) -> Result<Vec<char>> {
        Ok(self.read_bytes(length)?.into_iter().map(char::from).collect())
    }

    fn read_padded_field(&mut self, width: usize) -> Result<String> {
        let field = self.take_available(width)?;
        Ok(field.iter().take_while(|&&b| b != 0).map(|&b| char::from(b)).collect())
    }

    /// Up to `n` bytes, fewer only if the store ends first.  `n` is
    /// caller-supplied and may far exceed the store, so the buffer grows
    /// with what is actually read.
    fn take_available(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.inner.by_ref().take(n as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> Reader<Cursor<Vec<u8>>> {
        Reader::from_bytes(bytes.to_vec(), ByteOrder::LittleEndian)
    }

    #[test]
    fn signed_byte_is_twos_complement() {
        let mut r = reader(&[0x7F, 0x80, 0xFF]);
        assert_eq!(r.read_i8().unwrap(), 127);
        assert_eq!(r.read_i8().unwrap(), -128);
        assert_eq!(r.read_i8().unwrap(), -1);
    }

    #[test]
    fn bool_is_nonzero() {
        let mut r = reader(&[0x00, 0x01, 0x80, 0xFF]);
        assert!(!r.read_bool().unwrap());
        assert!(r.read_bool().unwrap());
        assert!(r.read_bool().unwrap());
        assert!(r.read_bool().unwrap());
    }

    #[test]
    fn same_bytes_both_orders() {
        let mut r = reader(&[0x12, 0x34, 0x12, 0x34]);
        assert_eq!(r.read_u16().unwrap(), 0x3412);
        r.set_byte_order(ByteOrder::BigEndian);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
    }

    #[test]
    fn unset_order_fails_without_consuming() {
        let mut r = Reader::from_bytes(vec![1, 2, 3, 4], ByteOrder::Unset);
        assert!(matches!(r.read_u32(), Err(Error::ByteOrderUnset { op: "read_u32" })));
        assert_eq!(r.position().unwrap(), 0);
        // agnostic reads still work
        assert_eq!(r.read_u8().unwrap(), 1);
    }

    #[test]
    fn primitive_past_end_is_an_error() {
        let mut r = reader(&[0x01, 0x02, 0x03]);
        assert!(matches!(r.read_u32(), Err(Error::UnexpectedEof { need: 4 })));
        let mut r = reader(&[]);
        assert!(matches!(r.read_u8(), Err(Error::UnexpectedEof { need: 1 })));
    }

    #[test]
    fn cstring_consumes_terminator() {
        let mut r = reader(b"hi\0next\0");
        assert_eq!(r.read_cstring().unwrap(), "hi");
        assert_eq!(r.position().unwrap(), 3);
        assert_eq!(r.read_cstring().unwrap(), "next");
        assert!(r.is_at_end().unwrap());
    }

    #[test]
    fn cstring_stops_at_end_of_data() {
        let mut r = reader(b"abc");
        assert_eq!(r.read_cstring().unwrap(), "abc");
        assert!(r.is_at_end().unwrap());
        assert_eq!(r.read_cstring().unwrap(), "");
    }

    #[test]
    fn cstring_custom_terminator() {
        let mut r = reader(b"key=value");
        assert_eq!(r.read_cstring_until(b'=').unwrap(), "key");
        assert_eq!(r.read_cstring_until(b'=').unwrap(), "value");
    }

    #[test]
    fn cstring_bytes_are_code_points() {
        let mut r = reader(&[0xE9, 0x41, 0x00]);
        assert_eq!(r.read_cstring().unwrap(), "\u{e9}A");
    }

    #[test]
    fn fixed_cstring_consumes_whole_field() {
        let mut r = reader(b"hi\0\0\0\0\0\0XY");
        assert_eq!(r.read_cstring_fixed(8).unwrap(), "hi");
        assert_eq!(r.position().unwrap(), 8);
        assert_eq!(r.read_u8().unwrap(), b'X');
    }

    #[test]
    fn fixed_cstring_full_field_without_terminator() {
        let mut r = reader(b"abcdeZ");
        assert_eq!(r.read_cstring_fixed(5).unwrap(), "abcde");
        assert_eq!(r.position().unwrap(), 5);
    }

    #[test]
    fn fixed_field_clamps_at_end_of_store() {
        let mut r = reader(b"ab");
        assert_eq!(r.read_cstring_fixed(16).unwrap(), "ab");
        assert!(r.is_at_end().unwrap());
    }

    #[test]
    fn oversized_field_width_reads_to_end() {
        let mut r = reader(b"ab\0");
        assert_eq!(r.read_cstring_fixed(usize::MAX).unwrap(), "ab");
        assert!(r.is_at_end().unwrap());

        let mut r = reader(b"xy");
        assert_eq!(r.read_unterminated_string(1 << 62).unwrap(), "xy");
        assert_eq!(r.position().unwrap(), 2);

        let mut r = reader(b"h\0\0");
        assert_eq!(r.read_unterminated_string_with(usize::MAX, &crate::text::Latin1).unwrap(), "h");
        assert!(r.is_at_end().unwrap());
    }

    #[test]
    fn empty_store_reports_empty() {
        assert!(reader(&[]).is_empty().unwrap());
        let mut r = reader(&[1]);
        r.read_u8().unwrap();
        assert!(!r.is_empty().unwrap());
    }

    #[test]
    fn unterminated_string_skips_padding() {
        let mut r = reader(b"ab\0cdX");
        assert_eq!(r.read_unterminated_string(5).unwrap(), "ab");
        assert_eq!(r.position().unwrap(), 5);
        assert_eq!(r.read_char().unwrap(), 'X');
    }

    #[test]
    fn unterminated_string_with_encoding_trims_nuls() {
        let mut r = reader(&[0x68, 0x00, 0x69, 0x00, 0x00, 0x00, 0x00, 0x00]);
        let text = r.read_unterminated_string_with(8, &crate::text::Utf16Le).unwrap();
        assert_eq!(text, "hi");
        assert_eq!(r.position().unwrap(), 8);
    }

    #[test]
    fn at_restores_cursor_even_on_error() {
        let mut r = reader(&[1, 2, 3, 4]);
        r.seek(1).unwrap();
        assert_eq!(r.at(2, |r| r.read_u8()).unwrap(), 3);
        assert_eq!(r.position().unwrap(), 1);

        assert!(r.at(3, |r| r.read_u32()).is_err());
        assert_eq!(r.position().unwrap(), 1);
    }

    #[test]
    fn seek_past_end_is_rejected() {
        let mut r = reader(&[1, 2]);
        assert!(r.seek(2).is_ok());
        assert!(matches!(r.seek(3), Err(Error::SeekOutOfRange { offset: 3, len: 2 })));
    }

    #[test]
    fn read_many_and_char_array() {
        let mut r = Reader::from_bytes(vec![0, 1, 0, 2, b'o', b'k', 0], ByteOrder::BigEndian);
        assert_eq!(r.read_many(2, |r| r.read_u16()).unwrap(), vec![1, 2]);
        assert_eq!(r.read_char_array(3).unwrap(), vec!['o', 'k', '\0']);
    }

    #[test]
    fn read_value_by_kind() {
        let mut r = Reader::from_bytes(vec![0x12, 0x34], ByteOrder::BigEndian);
        assert_eq!(r.read_value(Kind::U16).unwrap(), Value::U16(0x1234));
        assert!(matches!(
            r.read_value(Kind::Bytes),
            Err(Error::UnsupportedKind { op: "read_value", .. })
        ));
    }

    #[test]
    fn buffered_stream_reads_from_start() {
        let src: &[u8] = &[0x00, 0x00, 0x80, 0x3F];
        let mut r = Reader::buffered(src, ByteOrder::LittleEndian).unwrap();
        assert_eq!(r.read_f32().unwrap(), 1.0);
    }
}
