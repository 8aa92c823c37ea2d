//! Packet framing errors

use thiserror::Error;

use super::OpCode;
use crate::codec;

/// Errors raised while framing or unframing an Art-Net packet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PacketError {
    /// Datagram shorter than the Art-Net header
    #[error("datagram truncated: need {needed} bytes, got {len}")]
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes received
        len: usize,
    },

    /// Datagram does not start with `Art-Net\0`
    #[error("invalid packet id: {found:02x?}")]
    InvalidId {
        /// The eight bytes found instead
        found: [u8; 8],
    },

    /// Datagram carries a different opcode than the packet type decoded
    #[error("unexpected opcode: expected {expected}, got {found}")]
    UnexpectedOpCode {
        /// Opcode of the requested packet type
        expected: OpCode,
        /// Opcode in the datagram
        found: OpCode,
    },

    /// Body could not be marshalled
    #[error("codec error: {0}")]
    Codec(#[from] codec::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PacketError>;
