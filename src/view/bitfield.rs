use std::io::{Read, Seek, Write};

use crate::error::Result;
use crate::view::{MappedU8, SharedWriter};

/// One of the eight flags in a byte, by mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Bit {
    B0 = 0x01,
    B1 = 0x02,
    B2 = 0x04,
    B3 = 0x08,
    B4 = 0x10,
    B5 = 0x20,
    B6 = 0x40,
    B7 = 0x80,
}

impl Bit {
    pub const ALL: [Bit; 8] = [
        Bit::B0, Bit::B1, Bit::B2, Bit::B3,
        Bit::B4, Bit::B5, Bit::B6, Bit::B7,
    ];

    pub fn mask(self) -> u8 {
        self as u8
    }

    /// `0` is the least significant bit.
    pub fn from_index(index: u8) -> Option<Self> {
        Bit::ALL.get(usize::from(index)).copied()
    }
}

/// A single byte in the store read and written as eight flags.
///
/// Every update rewrites the whole byte through the writer's indexed write;
/// there is never a sub-byte write.
pub struct ByteBitfield<S> {
    byte: MappedU8<S>,
}

impl<S: Read + Write + Seek> ByteBitfield<S> {
    pub fn new(writer: &SharedWriter<S>, offset: u64) -> Self {
        Self { byte: MappedU8::new(writer, offset) }
    }

    pub fn offset(&self) -> u64 {
        self.byte.offset()
    }

    pub fn value(&self) -> Result<u8> {
        self.byte.get()
    }

    pub fn set_value(&self, value: u8) -> Result<()> {
        self.byte.set(value)
    }

    pub fn get(&self, bit: Bit) -> Result<bool> {
        Ok(self.value()? & bit.mask() != 0)
    }

    pub fn set(&self, bit: Bit, on: bool) -> Result<()> {
        let current = self.value()?;
        let next = if on {
            current | bit.mask()
        } else {
            current & !bit.mask()
        };
        self.set_value(next)
    }

    /// Flip `bit` and return its new state.
    pub fn toggle(&self, bit: Bit) -> Result<bool> {
        let on = !self.get(bit)?;
        self.set(bit, on)?;
        Ok(on)
    }

    pub fn describe(&self) -> Result<String> {
        Ok(format!("0b{:08b}", self.value()?))
    }
}
