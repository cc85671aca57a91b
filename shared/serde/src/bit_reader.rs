use crate::error::SerdeErr;

/// Mirrors `BitWrite`: consumes the same widths in the same order.
///
/// Reading past the end of the buffer is a `SerdeErr`, never a panic —
/// the reader sits on the untrusted side of the wire.
pub struct BitReader<'b> {
    buffer: &'b [u8],
    scratch: u8,
    scratch_index: u8,
    buffer_index: usize,
    bits_read: u32,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            scratch: 0,
            scratch_index: 0,
            buffer_index: 0,
            bits_read: 0,
        }
    }

    pub fn bits_read(&self) -> u32 {
        self.bits_read
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        if self.scratch_index == 0 {
            let Some(byte) = self.buffer.get(self.buffer_index) else {
                return Err(SerdeErr::UnexpectedEnd {
                    bits_read: self.bits_read,
                });
            };
            self.scratch = *byte;
            self.scratch_index = 8;
            self.buffer_index += 1;
        }

        let bit = self.scratch & 1 != 0;
        self.scratch >>= 1;
        self.scratch_index -= 1;
        self.bits_read += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        Ok(self.read_uint(8)? as u8)
    }

    /// Reads `bits` bits (1..=64) written by `BitWrite::write_uint`.
    pub fn read_uint(&mut self, bits: u32) -> Result<u64, SerdeErr> {
        debug_assert!((1..=64).contains(&bits), "bit width must be within 1..=64");
        let mut output: u64 = 0;
        for index in 0..bits {
            if self.read_bit()? {
                output |= 1 << index;
            }
        }
        Ok(output)
    }

    pub fn read_float32(&mut self) -> Result<f32, SerdeErr> {
        Ok(f32::from_bits(self.read_uint(32)? as u32))
    }

    pub fn read_flag(&mut self) -> Result<bool, SerdeErr> {
        self.read_bit()
    }

    /// Reads a UTF-16 string written by `BitWrite::write_wide_string`.
    pub fn read_wide_string(&mut self, length_prefix_bits: u32) -> Result<String, SerdeErr> {
        let code_units = self.read_uint(length_prefix_bits)? as usize;
        let mut units = Vec::new();
        for _ in 0..code_units {
            units.push(self.read_uint(16)? as u16);
        }
        String::from_utf16(&units).map_err(|_| SerdeErr::InvalidWideString { code_units })
    }
}
