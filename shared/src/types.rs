use worldcore_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

pub type Tick = u16;

/// Handle into a world's entity table.
///
/// Relations between entities (caster → target, trap → activator) are
/// expressed through these handles, never through owning references, so
/// entity destruction invalidates lookups instead of dangling pointers.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Stable numeric key of a quest, creature template, or effect definition.
///
/// Used both for game-data lookup and for binding script hooks.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct ContentId(pub u32);

/// Process-unique identifier of one effect cast.
///
/// Monotonic, never reused while the process runs — repeated casts of the
/// same effect by the same caster get distinct ids.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct CastingId(pub u64);

macro_rules! impl_serde_id {
    ($type:ty, $repr:ty, $bits:expr) => {
        impl Serde for $type {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_uint(u64::from(self.0), $bits);
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                Ok(Self(reader.read_uint($bits)? as $repr))
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

impl_serde_id!(EntityId, u32, 32);
impl_serde_id!(ContentId, u32, 32);

impl Serde for CastingId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_uint(self.0, 64);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(reader.read_uint(64)?))
    }

    fn bit_length(&self) -> u32 {
        64
    }
}

impl ConstBitLength for CastingId {
    fn const_bit_length() -> u32 {
        64
    }
}
