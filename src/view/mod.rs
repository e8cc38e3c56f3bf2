//! Live typed views of fixed store offsets.
//!
//! A [`MappedValue`] binds a shared [`Writer`], a [`Reader`] derived from it
//! over the same store, and an offset.  [`MappedValue::get`] is a scoped
//! seek-read on the reader and [`MappedValue::set`] an indexed write on the
//! writer; both leave the shared cursor where they found it, so views can be
//! used in the middle of sequential writing.
//!
//! # Single-threaded contract
//! Views hold `Rc` handles and are `!Send`.  Two views over the same bytes
//! are not coordinated: a bitfield update is a read-modify-write of the whole
//! byte, and an interleaved direct write to that byte can be lost.  Callers
//! must not hold a `borrow_mut()` of the shared writer across a view call.

mod bitfield;

pub use bitfield::{Bit, ByteBitfield};

use std::cell::RefCell;
use std::io::{Read, Seek, Write};
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::trace;

use crate::byte_order::ByteOrder;
use crate::error::Result;
use crate::object::{Readable, Writable};
use crate::reader::Reader;
use crate::store::SharedStore;
use crate::writer::Writer;

/// Writer handle that views bind to.
pub type SharedWriter<S> = Rc<RefCell<Writer<SharedStore<S>>>>;

/// Put `store` behind a shared writer so views can be created over it.
pub fn share<S: Read + Write + Seek>(store: S, order: ByteOrder) -> SharedWriter<S> {
    Rc::new(RefCell::new(Writer::new(SharedStore::new(store), order)))
}

impl<S: Read + Write + Seek> Writer<SharedStore<S>> {
    pub fn into_shared(self) -> SharedWriter<S> {
        Rc::new(RefCell::new(self))
    }
}

// ── MappedValue ─────────────────────────────────────────────────────────────

pub struct MappedValue<T, S> {
    writer:  SharedWriter<S>,
    reader:  RefCell<Reader<SharedStore<S>>>,
    offset:  u64,
    _value:  PhantomData<fn() -> T>,
}

pub type MappedU8<S>  = MappedValue<u8, S>;
pub type MappedU16<S> = MappedValue<u16, S>;
pub type MappedU32<S> = MappedValue<u32, S>;
pub type MappedU64<S> = MappedValue<u64, S>;

impl<T: Readable + Writable, S: Read + Write + Seek> MappedValue<T, S> {
    pub fn new(writer: &SharedWriter<S>, offset: u64) -> Self {
        let reader = writer.borrow().reader();
        Self {
            writer: Rc::clone(writer),
            reader: RefCell::new(reader),
            offset,
            _value: PhantomData,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Decode the value currently stored at the offset, in the writer's
    /// current byte order.
    pub fn get(&self) -> Result<T> {
        let order = self.writer.borrow().byte_order();
        let mut reader = self.reader.borrow_mut();
        reader.set_byte_order(order);
        trace!(offset = self.offset, "view read");
        reader.at(self.offset, |r| r.read::<T>())
    }

    pub fn set(&self, value: T) -> Result<()> {
        self.writer.borrow_mut().write_object_at(self.offset, &value)
    }

    /// Read, transform, write back.
    pub fn update(&self, f: impl FnOnce(T) -> T) -> Result<()> {
        let current = self.get()?;
        self.set(f(current))
    }
}

macro_rules! describe_hex {
    ($($ty:ty => $width:literal;)*) => {$(
        impl<S: Read + Write + Seek> MappedValue<$ty, S> {
            /// Zero-padded hex rendering of the current value.
            pub fn describe(&self) -> Result<String> {
                Ok(format!("0x{:0width$X}", self.get()?, width = $width))
            }
        }
    )*};
}

describe_hex! {
    u8  => 2;
    u16 => 4;
    u32 => 8;
    u64 => 16;
}
