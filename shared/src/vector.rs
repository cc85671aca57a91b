use worldcore_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

/// Three-component world vector, serialized as three raw float32s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Serde for Vec3 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_float32(self.x);
        writer.write_float32(self.y);
        writer.write_float32(self.z);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            x: reader.read_float32()?,
            y: reader.read_float32()?,
            z: reader.read_float32()?,
        })
    }

    fn bit_length(&self) -> u32 {
        Self::const_bit_length()
    }
}

impl ConstBitLength for Vec3 {
    fn const_bit_length() -> u32 {
        96
    }
}
