use thiserror::Error;

use worldcore_serde::SerdeErr;

/// Errors surfaced while reading the wire protocol.
///
/// All of these are recoverable at the message boundary: the caller aborts
/// the offending message (or the stream) and carries on; none are fatal to
/// the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A command tag absent from the registry was read off the stream
    #[error("Unknown command tag {tag} read from stream")]
    UnknownCommandTag { tag: u8 },

    /// A message tag outside the declared set was read off the stream
    #[error("Unknown message tag {tag} read from stream")]
    UnknownMessageTag { tag: u8 },

    /// A packet type index outside the declared set (malformed or hostile packet)
    #[error("Invalid packet type index {index} received")]
    UnknownPacketType { index: u8 },

    /// The underlying bit stream was truncated or malformed
    #[error("Decode error: {0}")]
    Serde(#[from] SerdeErr),
}
