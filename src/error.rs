use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A byte-order-dependent primitive was used before an order was set.
    /// This is a configuration bug in the caller, not a data error.
    #[error("{op}: no byte order configured")]
    ByteOrderUnset { op: &'static str },
    #[error("Unexpected end of data (need {need} bytes)")]
    UnexpectedEof { need: usize },
    #[error("Kind '{kind}' is not supported by {op}")]
    UnsupportedKind { kind: &'static str, op: &'static str },
    #[error("Store is not writable: {path}")]
    NotWritable { path: PathBuf },
    #[error("Character {ch:?} does not fit in one byte")]
    Unencodable { ch: char },
    #[error("Invalid {encoding} text: {message}")]
    InvalidText { encoding: &'static str, message: String },
    #[error("Invalid {kind} value: {input:?}")]
    InvalidValue { kind: &'static str, input: String },
    #[error("Seek to {offset} is past the end of the store ({len} bytes)")]
    SeekOutOfRange { offset: u64, len: u64 },
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Map an I/O failure on a fixed-width read of `need` bytes.
    pub(crate) fn on_read(err: io::Error, need: usize) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof { need }
        } else {
            Error::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
