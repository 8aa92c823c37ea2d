//! ArtRdm: RDM messages tunnelled over Art-Net.

use bytes::Bytes;

use super::{ArtNetPacket, OpCode, RdmCommand, protocol_version};
use crate::codec::{self, Context, Field, Wire};

/// Carries one RDM packet, without its start code, for a port-address.
///
/// `rdm_packet` is not part of the schema: it is whatever follows the
/// fixed fields in the datagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtRdm {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// RDM standard version
    pub rdm_ver: u8,
    /// Unused
    pub filler: u8,
    /// Unused
    pub spare: [u8; 7],
    /// Bits 14-8 of the port-address
    pub net: u8,
    /// Processing command
    pub command: RdmCommand,
    /// Low byte of the port-address
    pub address: u8,
    /// RDM message
    pub rdm_packet: Bytes,
}

crate::wire_schema! {
    ArtRdm {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        rdm_ver: Field::u8(),
        filler: Field::u8(),
        spare: Field::bytes(7),
        net: Field::u8(),
        command: Field::enumeration::<RdmCommand>(),
        address: Field::u8(),
    }
}

protocol_version!(ArtRdm);

impl ArtNetPacket for ArtRdm {
    const OP_CODE: OpCode = OpCode::Rdm;

    fn encode_body(&self, ctx: &mut Context<'_>) -> codec::Result<()> {
        self.encode_into(ctx)?;
        ctx.cursor().write_bytes(&self.rdm_packet);
        Ok(())
    }

    fn decode_body(ctx: &mut Context<'_>) -> codec::Result<Self> {
        let mut rdm = Self::decode_from(ctx)?;
        let cursor = ctx.cursor();
        let rest = cursor.remaining();
        rdm.rdm_packet = Bytes::copy_from_slice(cursor.read_bytes(rest)?);
        Ok(rdm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_rdm_packet() {
        let mut rdm = ArtRdm::new();
        rdm.rdm_ver = 1;
        rdm.address = 3;
        rdm.rdm_packet = Bytes::from_static(&[0x01, 0x18, 0x7A, 0x70]);
        let bytes = rdm.to_bytes().unwrap();
        assert_eq!(bytes.len(), 24 + 4);
        assert_eq!(&bytes[24..], &[0x01, 0x18, 0x7A, 0x70]);
        assert_eq!(ArtRdm::from_bytes(&bytes).unwrap(), rdm);
    }

    #[test]
    fn test_empty_rdm_packet() {
        let bytes = ArtRdm::new().to_bytes().unwrap();
        assert!(ArtRdm::from_bytes(&bytes).unwrap().rdm_packet.is_empty());
    }
}
