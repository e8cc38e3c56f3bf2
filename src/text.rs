//! Text codecs for fixed-width string fields read with an explicit encoding.

use crate::error::{Error, Result};

pub trait TextEncoding {
    fn name(&self) -> &'static str;
    fn decode(&self, bytes: &[u8]) -> Result<String>;
}

/// One byte per code point (U+0000..=U+00FF).  Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

impl TextEncoding for Latin1 {
    fn name(&self) -> &'static str { "latin-1" }
    fn decode(&self, bytes: &[u8]) -> Result<String> {
        Ok(bytes.iter().map(|&b| char::from(b)).collect())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8;

impl TextEncoding for Utf8 {
    fn name(&self) -> &'static str { "utf-8" }
    fn decode(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::InvalidText {
            encoding: "utf-8",
            message:  e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Utf16Le;

#[derive(Debug, Clone, Copy, Default)]
pub struct Utf16Be;

fn decode_utf16(bytes: &[u8], encoding: &'static str, unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::InvalidText {
            encoding,
            message: format!("odd byte count {}", bytes.len()),
        });
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
    String::from_utf16(&units).map_err(|e| Error::InvalidText {
        encoding,
        message: e.to_string(),
    })
}

impl TextEncoding for Utf16Le {
    fn name(&self) -> &'static str { "utf-16le" }
    fn decode(&self, bytes: &[u8]) -> Result<String> {
        decode_utf16(bytes, "utf-16le", u16::from_le_bytes)
    }
}

impl TextEncoding for Utf16Be {
    fn name(&self) -> &'static str { "utf-16be" }
    fn decode(&self, bytes: &[u8]) -> Result<String> {
        decode_utf16(bytes, "utf-16be", u16::from_be_bytes)
    }
}

/// One char as one byte; anything above U+00FF is [`Error::Unencodable`].
pub(crate) fn latin1_byte(ch: char) -> Result<u8> {
    u8::try_from(u32::from(ch)).map_err(|_| Error::Unencodable { ch })
}

/// Encode `chars` one byte each.  Validates every char before returning,
/// so a caller never writes half a field.
pub(crate) fn encode_latin1_chars<I: IntoIterator<Item = char>>(chars: I) -> Result<Vec<u8>> {
    chars.into_iter().map(latin1_byte).collect()
}

pub(crate) fn encode_latin1(text: &str) -> Result<Vec<u8>> {
    encode_latin1_chars(text.chars())
}
