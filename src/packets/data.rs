//! ArtDataRequest and ArtDataReply: product data lookup.

use super::{ArtNetPacket, DataRequestCode, OpCode, hi_lo, protocol_version};
use crate::codec::Field;

/// Asks a node for product information such as URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtDataRequest {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// ESTA manufacturer code, high byte
    pub esta_man_hi: u8,
    /// ESTA manufacturer code, low byte
    pub esta_man_lo: u8,
    /// OEM code, high byte
    pub oem_hi: u8,
    /// OEM code, low byte
    pub oem_lo: u8,
    /// Request code, high byte
    pub request_hi: u8,
    /// Request code, low byte
    pub request_lo: u8,
    /// Unused
    pub spare: [u8; 22],
}

crate::wire_schema! {
    ArtDataRequest {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        esta_man_hi: Field::u8(),
        esta_man_lo: Field::u8(),
        oem_hi: Field::u8(),
        oem_lo: Field::u8(),
        request_hi: Field::u8(),
        request_lo: Field::u8(),
        spare: Field::bytes(22),
    }
}

protocol_version!(ArtDataRequest);

impl ArtDataRequest {
    /// Request addressed to a manufacturer and OEM.
    #[must_use]
    pub fn for_product(esta_man: u16, oem: u16, request: DataRequestCode) -> Self {
        let mut packet = Self::new();
        [packet.esta_man_hi, packet.esta_man_lo] = esta_man.to_be_bytes();
        [packet.oem_hi, packet.oem_lo] = oem.to_be_bytes();
        packet.set_request(request);
        packet
    }

    /// ESTA manufacturer code.
    #[must_use]
    pub const fn esta_man(&self) -> u16 {
        hi_lo(self.esta_man_hi, self.esta_man_lo)
    }

    /// OEM code.
    #[must_use]
    pub const fn oem(&self) -> u16 {
        hi_lo(self.oem_hi, self.oem_lo)
    }

    /// Requested data.
    #[must_use]
    pub const fn request(&self) -> DataRequestCode {
        DataRequestCode::from_raw(hi_lo(self.request_hi, self.request_lo))
    }

    /// Set the requested data.
    pub fn set_request(&mut self, request: DataRequestCode) {
        [self.request_hi, self.request_lo] = request.raw().to_be_bytes();
    }
}

impl ArtNetPacket for ArtDataRequest {
    const OP_CODE: OpCode = OpCode::DataRequest;
}

/// Answer to an [`ArtDataRequest`], usually a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtDataReply {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// ESTA manufacturer code, high byte
    pub esta_man_hi: u8,
    /// ESTA manufacturer code, low byte
    pub esta_man_lo: u8,
    /// OEM code, high byte
    pub oem_hi: u8,
    /// OEM code, low byte
    pub oem_lo: u8,
    /// Request code, high byte
    pub request_hi: u8,
    /// Request code, low byte
    pub request_lo: u8,
    /// Payload length, high byte
    pub pay_len_hi: u8,
    /// Payload length, low byte
    pub pay_len_lo: u8,
    /// Payload text
    pub payload: String,
}

crate::wire_schema! {
    ArtDataReply {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        esta_man_hi: Field::u8(),
        esta_man_lo: Field::u8(),
        oem_hi: Field::u8(),
        oem_lo: Field::u8(),
        request_hi: Field::u8(),
        request_lo: Field::u8(),
        pay_len_hi: Field::u8(),
        pay_len_lo: Field::u8(),
        payload: Field::string_by("pay_len"),
    }
    properties {
        "pay_len" => |p| p.pay_len(),
    }
}

protocol_version!(ArtDataReply);

impl ArtDataReply {
    /// Reply echoing the request's addressing with the given payload.
    #[must_use]
    pub fn answer(request: &ArtDataRequest, payload: impl Into<String>) -> Self {
        let mut reply = Self {
            esta_man_hi: request.esta_man_hi,
            esta_man_lo: request.esta_man_lo,
            oem_hi: request.oem_hi,
            oem_lo: request.oem_lo,
            request_hi: request.request_hi,
            request_lo: request.request_lo,
            ..Self::new()
        };
        reply.set_payload(payload);
        reply
    }

    /// Requested data.
    #[must_use]
    pub const fn request(&self) -> DataRequestCode {
        DataRequestCode::from_raw(hi_lo(self.request_hi, self.request_lo))
    }

    /// Declared payload length.
    #[must_use]
    pub const fn pay_len(&self) -> u16 {
        hi_lo(self.pay_len_hi, self.pay_len_lo)
    }

    /// Replace the payload and its length.
    pub fn set_payload(&mut self, payload: impl Into<String>) {
        self.payload = payload.into();
        let len = u16::try_from(self.payload.len()).unwrap_or(u16::MAX);
        [self.pay_len_hi, self.pay_len_lo] = len.to_be_bytes();
    }
}

impl ArtNetPacket for ArtDataReply {
    const OP_CODE: OpCode = OpCode::DataReply;
}
