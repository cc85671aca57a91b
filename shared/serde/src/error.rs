use thiserror::Error;

/// Errors that can occur while decoding a bit stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// A read ran past the end of the buffer (truncated or malformed stream)
    #[error("Bit stream ended after {bits_read} bits; the requested read needs more data")]
    UnexpectedEnd { bits_read: u32 },

    /// A wide-string payload did not decode to valid UTF-16
    #[error("Wide string payload of {code_units} code units is not valid UTF-16")]
    InvalidWideString { code_units: usize },
}
