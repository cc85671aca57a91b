use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::ConstBitLength,
    serde::Serde,
};

/// Fixed-width unsigned wire integer.
///
/// Unlike raw `write_uint` calls, construction checks the value fits the
/// declared width — the typed wrapper is for fields whose widths are part of
/// the protocol contract, where a silent truncation would be a bug rather
/// than wire behavior.
// The outer generic wraps a non-generic inner to limit monomorphization bloat.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct UnsignedInteger<const BITS: u8> {
    inner: UintInner,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
struct UintInner {
    value: u64,
    bits: u8,
}

impl UintInner {
    fn new(bits: u8, value: u64) -> Self {
        if bits == 0 {
            panic!("can't create an integer with 0 bits...");
        }
        if bits > 64 {
            panic!("can't create an integer with more than 64 bits...");
        }
        if bits < 64 && value >> bits != 0 {
            panic!("with {bits} bits, can't encode number greater than {}", (1u64 << bits) - 1);
        }

        Self { value, bits }
    }

    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_uint(self.value, self.bits as u32);
    }

    fn de(reader: &mut BitReader, bits: u8) -> Result<Self, SerdeErr> {
        let value = reader.read_uint(bits as u32)?;
        Ok(Self { value, bits })
    }
}

impl<const BITS: u8> UnsignedInteger<BITS> {
    pub fn new<T: Into<u64>>(value: T) -> Self {
        Self {
            inner: UintInner::new(BITS, value.into()),
        }
    }

    pub fn get(&self) -> u64 {
        self.inner.value
    }

    pub fn set<T: Into<u64>>(&mut self, value: T) {
        self.inner = UintInner::new(BITS, value.into());
    }
}

impl<const BITS: u8> Serde for UnsignedInteger<BITS> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.inner.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let inner = UintInner::de(reader, BITS)?;
        Ok(Self { inner })
    }

    fn bit_length(&self) -> u32 {
        BITS as u32
    }
}

impl<const BITS: u8> ConstBitLength for UnsignedInteger<BITS> {
    fn const_bit_length() -> u32 {
        BITS as u32
    }
}

impl<const BITS: u8, T: Into<u64>> From<T> for UnsignedInteger<BITS> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

// Tests
