//! Art-Net 4 lighting-control protocol on a schema-driven binary codec.
//!
//! The crate has three layers:
//!
//! - [`codec`] marshals object graphs to and from byte buffers. Types
//!   describe their wire layout with [`wire_schema!`]; the engine handles
//!   endianness, strings, arrays, nested objects, version-gated fields and
//!   type remapping.
//! - [`packets`] defines the Art-Net packets as schemas and dispatches
//!   received datagrams on their opcode.
//! - [`transport`] sends and receives packets over UDP.
//!
//! # Quick Start
//!
//! ```rust
//! use artnet::packets::{ArtDmx, ArtNetPacket, Packet};
//!
//! let dmx = ArtDmx::with_data(1, vec![255, 128, 0]);
//! let bytes = dmx.to_bytes()?;
//!
//! match Packet::from_bytes(&bytes)? {
//!     Packet::Dmx(decoded) => assert_eq!(decoded.data, [255, 128, 0]),
//!     other => panic!("unexpected packet {other:?}"),
//! }
//! # Ok::<(), artnet::packets::PacketError>(())
//! ```
//!
//! # Features
//!
//! - **Declarative schemas** - field order, widths and lengths in one table
//! - **Version gates** - one type covers Art-Net 3 and Art-Net 4 layouts
//! - **Open code tables** - unknown opcodes and codes survive a round trip
//! - **`serde`** - optional derives on configuration types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod codec;
pub mod packets;
pub mod transport;

pub use codec::{Config, Endianness, Error, Result, Session, decode, encode};
pub use packets::{ArtNetPacket, OpCode, PORT, Packet, PacketError};
pub use transport::{ArtNetSocket, SocketConfig, TransportError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
