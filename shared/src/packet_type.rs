use worldcore_serde::{BitReader, BitWrite};

use crate::protocol::ProtocolError;

const PACKET_TYPE_BITS: u32 = 2;

/// Discriminates the payload kind of one outbound packet.
#[derive(Copy, Debug, Clone, Eq, PartialEq)]
pub enum PacketType {
    /// An entity id followed by a continue-flagged command batch
    EntityCommands,
    /// A single tagged [`crate::ServerMessage`]
    Message,
}

impl PacketType {
    pub fn ser(&self, writer: &mut dyn BitWrite) {
        let index: u64 = match self {
            Self::EntityCommands => 0,
            Self::Message => 1,
        };
        writer.write_uint(index, PACKET_TYPE_BITS);
    }

    /// An out-of-range index indicates a malformed or hostile packet and
    /// surfaces as a protocol error for the session reader to handle.
    pub fn de(reader: &mut BitReader) -> Result<Self, ProtocolError> {
        match reader.read_uint(PACKET_TYPE_BITS)? as u8 {
            0 => Ok(Self::EntityCommands),
            1 => Ok(Self::Message),
            index => Err(ProtocolError::UnknownPacketType { index }),
        }
    }
}
