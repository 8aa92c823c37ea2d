//! ArtFirmwareReply: firmware upload acknowledgement.

use super::{ArtNetPacket, FirmwareReplyCode, OpCode, protocol_version};
use crate::codec::Field;

/// Sent by a node for each firmware block it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtFirmwareReply {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// Unused
    pub filler: [u8; 2],
    /// Upload status
    pub reply_type: FirmwareReplyCode,
    /// Unused
    pub spare: [u8; 21],
}

crate::wire_schema! {
    ArtFirmwareReply {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        filler: Field::bytes(2),
        reply_type: Field::enumeration::<FirmwareReplyCode>(),
        spare: Field::bytes(21),
    }
}

protocol_version!(ArtFirmwareReply);

impl ArtNetPacket for ArtFirmwareReply {
    const OP_CODE: OpCode = OpCode::FirmwareReply;
}
