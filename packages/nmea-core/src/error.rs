//! error.rs — Frame and payload error kinds
//!
//! A frame that fails any of these checks is dropped; the connection that
//! carried it keeps running.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No `*` separator, or the checksum part is not two hex digits.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Checksum computed over the body disagrees with the one on the wire.
    #[error("checksum mismatch: computed {computed:02X}, frame carries {carried}")]
    ChecksumMismatch { computed: u8, carried: String },

    /// A field of the sentence body is missing or unparsable.
    #[error("invalid sentence field: {0}")]
    InvalidField(String),

    /// An armored payload byte is outside the 6-bit ASCII set.
    #[error("invalid 6-bit armor byte: {0:#04x}")]
    InvalidArmorByte(u8),

    /// Multi-fragment sequence skipped or arrived before its predecessor.
    #[error("fragment sequence broken: {0}")]
    FragmentGap(String),

    /// Payload too short for the message type it claims to be.
    #[error("payload truncated: {0}")]
    PayloadTruncated(String),

    /// Message types this receiver does not decode.
    #[error("unsupported message type {0}")]
    UnsupportedMessage(u64),
}
