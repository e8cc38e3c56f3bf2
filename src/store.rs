//! Byte stores: the cursor-addressable sequences every reader and writer sits on.
//!
//! Any `Seek` type is a store through [`ByteStore`].  Files, in-memory
//! buffers (`Cursor<Vec<u8>>`) and caller streams all qualify.
//!
//! # Sharing
//! [`SharedStore`] lets several readers and writers address one store.  The
//! cursor lives inside the wrapped store, so every handle sees the same
//! position; handles that move it must put it back (see
//! [`crate::Reader::at`] and [`crate::Writer::write_at`]).  There is no
//! locking: `SharedStore` is `!Send`, and callers serialize access to a given
//! offset themselves.  The wrapped store is dropped when the last handle is.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

// ── ByteStore ───────────────────────────────────────────────────────────────

/// Position, length and end-of-data queries over any seekable store.
pub trait ByteStore: Seek {
    fn store_position(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    /// Total length in bytes.  The cursor is left where it was.
    fn store_len(&mut self) -> io::Result<u64> {
        let pos = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        if pos != end {
            self.seek(SeekFrom::Start(pos))?;
        }
        Ok(end)
    }

    fn at_end(&mut self) -> io::Result<bool> {
        let pos = self.stream_position()?;
        Ok(pos >= self.store_len()?)
    }
}

impl<T: Seek + ?Sized> ByteStore for T {}

// ── SharedStore ─────────────────────────────────────────────────────────────

/// Single-threaded shared handle to one store and its one cursor.
#[derive(Debug)]
pub struct SharedStore<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> SharedStore<T> {
    pub fn new(store: T) -> Self {
        Self { inner: Rc::new(RefCell::new(store)) }
    }

    /// Number of live handles to the underlying store.
    pub fn handles(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Recover the store if this is the last handle.
    pub fn try_unwrap(self) -> std::result::Result<T, Self> {
        Rc::try_unwrap(self.inner)
            .map(RefCell::into_inner)
            .map_err(|inner| Self { inner })
    }

    /// Run `f` with exclusive access to the store.
    pub fn with<O>(&self, f: impl FnOnce(&mut T) -> O) -> O {
        let mut store = self.inner.borrow_mut();
        f(&mut *store)
    }
}

impl<T> Clone for SharedStore<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T: Read> Read for SharedStore<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.borrow_mut().read(buf)
    }
}

impl<T: Write> Write for SharedStore<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.borrow_mut().flush()
    }
}

impl<T: Seek> Seek for SharedStore<T> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.borrow_mut().seek(pos)
    }
}

// ── Opening ─────────────────────────────────────────────────────────────────

/// How a path is opened for writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenMode {
    /// Create the file, truncating any existing contents.
    Create,
    /// Open the existing file in place, creating it empty if missing.
    #[default]
    Open,
    /// Open the existing file in place; a missing file is an error.
    Existing,
}

impl OpenMode {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create" | "overwrite" => Some(OpenMode::Create),
            "open"                 => Some(OpenMode::Open),
            "existing"             => Some(OpenMode::Existing),
            _                      => None,
        }
    }
}

/// Open `path` read-write.  A path the process may not write to fails here
/// with [`Error::NotWritable`]; there is no read-only fallback.
pub fn open_for_write<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<File> {
    let path = path.as_ref();
    let mut opts = OpenOptions::new();
    opts.read(true)
        .write(true)
        .create(mode != OpenMode::Existing)
        .truncate(mode == OpenMode::Create);
    let file = opts.open(path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => Error::NotWritable { path: path.to_path_buf() },
        _ => Error::Io(e),
    })?;
    debug!(path = %path.display(), ?mode, "opened store for writing");
    Ok(file)
}

/// Load the whole of `path` into an in-memory store.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Cursor<Vec<u8>>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), len = bytes.len(), "loaded store into memory");
    Ok(Cursor::new(bytes))
}

/// Copy a stream that cannot seek into an in-memory store positioned at 0.
pub fn buffer_stream<R: Read>(mut stream: R) -> Result<Cursor<Vec<u8>>> {
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(Cursor::new(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_len_keeps_cursor() {
        let mut cur = Cursor::new(vec![0u8; 10]);
        cur.set_position(3);
        assert_eq!(cur.store_len().unwrap(), 10);
        assert_eq!(cur.store_position().unwrap(), 3);
        assert!(!cur.at_end().unwrap());
        cur.set_position(10);
        assert!(cur.at_end().unwrap());
    }

    #[test]
    fn shared_handles_see_one_cursor() {
        let mut a = SharedStore::new(Cursor::new(vec![1u8, 2, 3, 4]));
        let mut b = a.clone();
        assert_eq!(a.handles(), 2);

        let mut byte = [0u8; 1];
        a.read_exact(&mut byte).unwrap();
        assert_eq!(byte[0], 1);
        b.read_exact(&mut byte).unwrap();
        assert_eq!(byte[0], 2);
        assert_eq!(a.store_position().unwrap(), 2);
    }

    #[test]
    fn try_unwrap_only_succeeds_for_last_handle() {
        let a = SharedStore::new(Cursor::new(vec![9u8]));
        let b = a.clone();
        let a = a.try_unwrap().unwrap_err();
        drop(b);
        let inner = a.try_unwrap().unwrap();
        assert_eq!(inner.into_inner(), vec![9u8]);
    }

    #[test]
    fn buffer_stream_starts_at_zero() {
        let src: &[u8] = b"abc";
        let cur = buffer_stream(src).unwrap();
        assert_eq!(cur.position(), 0);
        assert_eq!(cur.get_ref(), b"abc");
    }

    #[test]
    fn open_mode_names() {
        assert_eq!(OpenMode::from_name("Create"), Some(OpenMode::Create));
        assert_eq!(OpenMode::from_name("open"), Some(OpenMode::Open));
        assert_eq!(OpenMode::from_name("existing"), Some(OpenMode::Existing));
        assert_eq!(OpenMode::from_name("append"), None);
    }

    #[test]
    fn existing_mode_neither_creates_nor_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.bin");
        assert!(matches!(open_for_write(&missing, OpenMode::Existing), Err(Error::Io(_))));
        assert!(!missing.exists());

        let present = dir.path().join("present.bin");
        std::fs::write(&present, [1u8, 2, 3]).unwrap();
        let mut file = open_for_write(&present, OpenMode::Existing).unwrap();
        file.seek(SeekFrom::Start(1)).unwrap();
        file.write_all(&[9]).unwrap();
        drop(file);
        assert_eq!(std::fs::read(&present).unwrap(), [1, 9, 3]);
    }

    #[cfg(unix)]
    #[test]
    fn read_only_file_is_not_writable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.bin");
        std::fs::write(&path, [0u8; 4]).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();

        // Privileged users bypass file modes; nothing to check there.
        if OpenOptions::new().write(true).open(&path).is_ok() {
            return;
        }
        for mode in [OpenMode::Open, OpenMode::Existing, OpenMode::Create] {
            match crate::Writer::open(&path, mode, crate::ByteOrder::LittleEndian) {
                Err(Error::NotWritable { path: p }) => assert_eq!(p, path),
                other => panic!("expected NotWritable, got {:?}", other.map(|_| ())),
            }
        }
        assert_eq!(std::fs::read(&path).unwrap(), [0u8; 4]);
    }
}
