pub mod byte_order;
pub mod error;
pub mod codec;
pub mod store;
pub mod text;
pub mod value;
pub mod object;
pub mod reader;
pub mod writer;
pub mod view;
pub mod config;

pub use byte_order::ByteOrder;
pub use error::{Error, Result};
pub use codec::{Decoders, Encoders};
pub use store::{ByteStore, OpenMode, SharedStore};
pub use text::{Latin1, TextEncoding, Utf16Be, Utf16Le, Utf8};
pub use value::{Kind, Value};
pub use object::{Readable, Writable};
pub use reader::Reader;
pub use writer::Writer;
pub use view::{share, Bit, ByteBitfield, MappedU16, MappedU32, MappedU64, MappedU8, MappedValue, SharedWriter};
pub use config::Options;
