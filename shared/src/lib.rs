//! # Worldcore Shared
//! Entity command model and wire protocol shared between the worldcore
//! server and its tools.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use worldcore_serde::{
    BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, UnsignedInteger,
};

mod command;
mod message;
mod packet_type;
mod protocol;
mod types;
mod vector;

pub use command::{
    read_commands, write_commands, CommandKinds, EntityCommand, EntityState, COMMAND_TAG_BITS,
};
pub use message::{ServerMessage, MESSAGE_TAG_BITS};
pub use packet_type::PacketType;
pub use protocol::{Protocol, ProtocolError};
pub use types::{CastingId, ContentId, EntityId, Tick};
pub use vector::Vec3;
