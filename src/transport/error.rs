//! Transport-level error types covering socket and packet failures.

use std::io;

use thiserror::Error;

use crate::packets::PacketError;

/// Unified error type for Art-Net socket operations.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Underlying socket failure
    #[error("socket error: {0}")]
    Io(#[from] io::Error),

    /// Datagram could not be framed or unframed
    #[error("packet error: {0}")]
    Packet(#[from] PacketError),

    /// The socket was closed
    #[error("socket closed")]
    Closed,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TransportError>;
