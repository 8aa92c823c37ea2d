//! Common Art-Net framing: eight-byte ID and little-endian opcode.

use super::{ARTNET_ID, HEADER_SIZE, OpCode, PacketError, Result};
use crate::codec::{self, Field};

/// The ten bytes every Art-Net packet starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Protocol identifier, `Art-Net\0`
    pub id: [u8; 8],
    /// Packet opcode
    pub op_code: OpCode,
}

impl Default for PacketHeader {
    fn default() -> Self {
        Self::new(OpCode::default())
    }
}

crate::wire_schema! {
    PacketHeader {
        id: Field::bytes(8),
        op_code: Field::enumeration::<OpCode>(),
    }
}

impl PacketHeader {
    /// Header for the given opcode.
    #[must_use]
    pub const fn new(op_code: OpCode) -> Self {
        Self {
            id: ARTNET_ID,
            op_code,
        }
    }

    /// Parse and validate the header at the start of a datagram.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(PacketError::Truncated {
                needed: HEADER_SIZE,
                len: data.len(),
            });
        }
        let header: Self = codec::decode(&data[..HEADER_SIZE], 0, &super::wire_config())?;
        if header.id != ARTNET_ID {
            return Err(PacketError::InvalidId { found: header.id });
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let bytes = codec::encode(&PacketHeader::new(OpCode::Poll), &super::super::wire_config())
            .unwrap();
        assert_eq!(bytes, b"Art-Net\0\x00\x20");
    }

    #[test]
    fn test_parse_rejects_short_datagram() {
        assert_eq!(
            PacketHeader::parse(b"Art-Net\0\x00"),
            Err(PacketError::Truncated { needed: 10, len: 9 })
        );
    }

    #[test]
    fn test_parse_rejects_foreign_id() {
        let err = PacketHeader::parse(b"Art-Nex\0\x00\x50").unwrap_err();
        assert!(matches!(err, PacketError::InvalidId { .. }));
    }

    #[test]
    fn test_parse_unknown_opcode() {
        let header = PacketHeader::parse(b"Art-Net\0\x34\x12trailing").unwrap();
        assert_eq!(header.op_code, OpCode::Other(0x1234));
    }
}
