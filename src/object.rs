//! Extension point for composite values.
//!
//! A type that knows how to read itself from a [`Reader`] and write itself
//! to a [`Writer`] can be used with [`Reader::read`],
//! [`Writer::write_object_at`] and [`crate::view::MappedValue`].  Every
//! scalar kind implements both traits, so primitives and composites share
//! one path through the view layer.

use std::io::{Read, Seek, Write};

use crate::error::Result;
use crate::reader::Reader;
use crate::value::Value;
use crate::writer::Writer;

pub trait Readable: Sized {
    fn read_from<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self>;
}

pub trait Writable {
    fn write_to<W: Write + Seek>(&self, writer: &mut Writer<W>) -> Result<()>;
}

macro_rules! scalar_object {
    ($($ty:ty => $read:ident;)*) => {$(
        impl Readable for $ty {
            fn read_from<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self> {
                reader.$read()
            }
        }

        impl Writable for $ty {
            fn write_to<W: Write + Seek>(&self, writer: &mut Writer<W>) -> Result<()> {
                writer.write_value(Value::from(*self))
            }
        }
    )*};
}

scalar_object! {
    u8   => read_u8;
    i8   => read_i8;
    char => read_char;
    bool => read_bool;
    i16  => read_i16;
    u16  => read_u16;
    i32  => read_i32;
    u32  => read_u32;
    i64  => read_i64;
    u64  => read_u64;
    f32  => read_f32;
    f64  => read_f64;
}
