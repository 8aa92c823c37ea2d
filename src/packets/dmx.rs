//! ArtDmx: DMX512 universe data.

use super::{ArtNetPacket, OpCode, hi_lo, protocol_version};
use crate::codec::Field;

/// Largest DMX512 payload
pub const MAX_CHANNELS: usize = 512;

/// One universe of DMX512 data.
///
/// `data` is counted by the big-endian `length_hi`/`length_lo` pair. Use
/// [`set_data`](ArtDmx::set_data) to keep the two in step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtDmx {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// Reordering sequence, 0 disables
    pub sequence: u8,
    /// Physical input port the data came from
    pub physical: u8,
    /// Low byte of the port-address
    pub sub_uni: u8,
    /// Bits 14-8 of the port-address
    pub net: u8,
    /// Payload length, high byte
    pub length_hi: u8,
    /// Payload length, low byte
    pub length_lo: u8,
    /// Channel levels
    pub data: Vec<u8>,
}

crate::wire_schema! {
    ArtDmx {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        sequence: Field::u8(),
        physical: Field::u8(),
        sub_uni: Field::u8(),
        net: Field::u8(),
        length_hi: Field::u8(),
        length_lo: Field::u8(),
        data: Field::bytes_by("length"),
    }
    properties {
        "length" => |p| p.length(),
    }
}

protocol_version!(ArtDmx);

impl ArtDmx {
    /// Packet for a port-address carrying the given levels.
    #[must_use]
    pub fn with_data(port_address: u16, data: Vec<u8>) -> Self {
        let mut dmx = Self::new();
        dmx.set_port_address(port_address);
        dmx.set_data(data);
        dmx
    }

    /// Declared payload length.
    #[must_use]
    pub const fn length(&self) -> u16 {
        hi_lo(self.length_hi, self.length_lo)
    }

    /// Replace the payload and update the length, truncating at
    /// [`MAX_CHANNELS`].
    pub fn set_data(&mut self, mut data: Vec<u8>) {
        data.truncate(MAX_CHANNELS);
        let len = u16::try_from(data.len()).unwrap_or(u16::MAX);
        [self.length_hi, self.length_lo] = len.to_be_bytes();
        self.data = data;
    }

    /// 15-bit port-address: net, sub-net and universe.
    #[must_use]
    pub const fn port_address(&self) -> u16 {
        hi_lo(self.net & 0x7F, self.sub_uni)
    }

    /// Set the 15-bit port-address.
    pub const fn set_port_address(&mut self, port_address: u16) {
        let [net, sub_uni] = port_address.to_be_bytes();
        self.net = net & 0x7F;
        self.sub_uni = sub_uni;
    }
}

impl ArtNetPacket for ArtDmx {
    const OP_CODE: OpCode = OpCode::Dmx;
}
