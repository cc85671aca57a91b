use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

/// Width of the length prefix used when a `String` is serialized through the
/// `Serde` trait rather than an explicit `write_wide_string` call.
const STRING_LENGTH_BITS: u32 = 16;

/// A value that can be written to and read from a bit stream.
///
/// Implementations must be symmetric: `de` consumes exactly the bits `ser`
/// produced, in the same order.
pub trait Serde: Sized + Clone + PartialEq {
    fn ser(&self, writer: &mut dyn BitWrite);

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    fn bit_length(&self) -> u32;
}

/// A `Serde` type whose encoded width does not depend on the value.
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

macro_rules! impl_serde_uint {
    ($type:ty, $bits:expr) => {
        impl Serde for $type {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_uint(u64::from(*self), $bits);
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                Ok(reader.read_uint($bits)? as $type)
            }

            fn bit_length(&self) -> u32 {
                $bits
            }
        }

        impl ConstBitLength for $type {
            fn const_bit_length() -> u32 {
                $bits
            }
        }
    };
}

impl_serde_uint!(u8, 8);
impl_serde_uint!(u16, 16);
impl_serde_uint!(u32, 32);

impl Serde for u64 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_uint(*self, 64);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_uint(64)
    }

    fn bit_length(&self) -> u32 {
        64
    }
}

impl ConstBitLength for u64 {
    fn const_bit_length() -> u32 {
        64
    }
}

impl Serde for f32 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_float32(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_float32()
    }

    fn bit_length(&self) -> u32 {
        32
    }
}

impl ConstBitLength for f32 {
    fn const_bit_length() -> u32 {
        32
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_wide_string(self, STRING_LENGTH_BITS);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_wide_string(STRING_LENGTH_BITS)
    }

    fn bit_length(&self) -> u32 {
        STRING_LENGTH_BITS + 16 * self.encode_utf16().count() as u32
    }
}

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_flag(true);
                value.ser(writer);
            }
            None => writer.write_flag(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_flag()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }

    fn bit_length(&self) -> u32 {
        match self {
            Some(value) => 1 + value.bit_length(),
            None => 1,
        }
    }
}
