//! UDP transport for Art-Net packets.
//!
//! [`ArtNetSocket`] wraps a blocking [`std::net::UdpSocket`] bound with
//! broadcast enabled. Periodic senders and the receive loop run on their
//! own threads and stop when the socket is closed.

mod error;
mod metrics;
mod socket;

pub use error::{Result, TransportError};
pub use metrics::MetricsSnapshot;
pub use socket::{
    ArtNetSocket, IntervalHandle, MIN_DATAGRAM_LEN, SocketConfig, broadcast_address,
};
