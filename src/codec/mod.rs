//! Schema-driven binary marshalling engine.
//!
//! Types describe their wire layout once, as an ordered list of field
//! descriptors, and the engine turns that description into encode and
//! decode behavior:
//!
//! - [`Cursor`]: seekable buffer with endian-aware primitive access
//! - [`describe`]: process-wide descriptor cache
//! - field strategies for primitives, enums, fixed and terminated strings,
//!   fixed and length-referenced arrays, and nested objects
//! - [`VersionGate`]: drops fields outside the session version
//! - [`Remapper`]: primitive and object substitution
//!
//! ```rust
//! use artnet::codec::{self, Config, Endianness};
//!
//! let little = codec::encode(&0x0102_0304u32, &Config::default())?;
//! assert_eq!(little, [0x04, 0x03, 0x02, 0x01]);
//!
//! let big = Config::default().with_endianness(Endianness::Big);
//! assert_eq!(codec::encode(&0x0102_0304u32, &big)?, [0x01, 0x02, 0x03, 0x04]);
//! # Ok::<(), codec::Error>(())
//! ```

mod config;
mod cursor;
mod error;
mod object;
mod remap;
mod resolver;
mod schema;
mod value;
mod version;

use tracing::instrument;

pub use config::{Config, TextEncoding};
pub use cursor::{Cursor, Endianness};
pub use error::{Error, Result};
pub use object::{Context, Session, Wire, read_object, write_object};
pub use remap::{ObjectType, Remapper};
pub use schema::{
    Element, Field, FieldDescriptor, FieldKind, LengthSource, Schema, SchemaDescriptor, describe,
};
pub use value::{FieldValue, Primitive, PrimitiveValue, Record, Value, WireEnum};
pub use version::{VersionGate, VersionRange};

/// Decode a `T` from `bytes`, starting `offset` bytes in.
#[instrument(level = "trace", skip(bytes, config), fields(len = bytes.len(), version = config.version))]
pub fn decode<T: Wire>(bytes: &[u8], offset: usize, config: &Config) -> Result<T> {
    let mut cursor = Cursor::from_bytes(bytes, config.endianness);
    cursor.seek(offset)?;
    T::decode_from(&mut Context::new(&mut cursor, config))
}

/// Encode `value` into a new buffer.
#[instrument(level = "trace", skip(value, config), fields(version = config.version))]
pub fn encode<T: Wire>(value: &T, config: &Config) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(config.endianness);
    value.encode_into(&mut Context::new(&mut cursor, config))?;
    Ok(cursor.into_inner())
}
