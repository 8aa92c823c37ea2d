//! Table of devices packets for RDM discovery.

use super::{
    ArtNetPacket, OpCode, TodControlCommand, TodDataCommand, TodRequestCommand, Uid, hi_lo,
    protocol_version,
};
use crate::codec::Field;

/// Largest number of UIDs a single ArtTodData block carries
pub const MAX_TOD_BLOCK: usize = 200;

/// Asks nodes for their table of devices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtTodRequest {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// Unused
    pub filler: [u8; 2],
    /// Unused
    pub spare: [u8; 7],
    /// Bits 14-8 of the port-addresses
    pub net: u8,
    /// Request command
    pub command: TodRequestCommand,
    /// Number of entries in `address`
    pub ad_count: u8,
    /// Low bytes of the requested port-addresses
    pub address: Vec<u8>,
}

crate::wire_schema! {
    ArtTodRequest {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        filler: Field::bytes(2),
        spare: Field::bytes(7),
        net: Field::u8(),
        command: Field::enumeration::<TodRequestCommand>(),
        ad_count: Field::u8(),
        address: Field::bytes_by("ad_count"),
    }
}

protocol_version!(ArtTodRequest);

impl ArtTodRequest {
    /// Replace the requested addresses and their count. At most 32 are
    /// kept.
    pub fn set_addresses(&mut self, mut address: Vec<u8>) {
        address.truncate(32);
        self.ad_count = u8::try_from(address.len()).unwrap_or(u8::MAX);
        self.address = address;
    }
}

impl ArtNetPacket for ArtTodRequest {
    const OP_CODE: OpCode = OpCode::TodRequest;
}

/// One block of a node's table of devices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtTodData {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// RDM standard version
    pub rdm_ver: u8,
    /// Physical port
    pub port: u8,
    /// Unused
    pub spare: [u8; 6],
    /// Bound device index
    pub bind_index: u8,
    /// Bits 14-8 of the port-address
    pub net: u8,
    /// Whether the table is included
    pub command_response: TodDataCommand,
    /// Low byte of the port-address
    pub address: u8,
    /// Total UIDs in the table, high byte
    pub uid_total_hi: u8,
    /// Total UIDs in the table, low byte
    pub uid_total_lo: u8,
    /// Index of this block
    pub block_count: u8,
    /// Number of UIDs in this block
    pub uid_count: u8,
    /// UIDs in this block
    pub tod: Vec<Uid>,
}

crate::wire_schema! {
    ArtTodData {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        rdm_ver: Field::u8(),
        port: Field::u8(),
        spare: Field::bytes(6),
        bind_index: Field::u8(),
        net: Field::u8(),
        command_response: Field::enumeration::<TodDataCommand>(),
        address: Field::u8(),
        uid_total_hi: Field::u8(),
        uid_total_lo: Field::u8(),
        block_count: Field::u8(),
        uid_count: Field::u8(),
        tod: Field::object_array_by::<Uid>("uid_count"),
    }
}

protocol_version!(ArtTodData);

impl ArtTodData {
    /// Total UIDs across every block.
    #[must_use]
    pub const fn uid_total(&self) -> u16 {
        hi_lo(self.uid_total_hi, self.uid_total_lo)
    }

    /// Set the total UID count.
    pub fn set_uid_total(&mut self, total: u16) {
        [self.uid_total_hi, self.uid_total_lo] = total.to_be_bytes();
    }

    /// Replace this block's UIDs and their count, truncating at
    /// [`MAX_TOD_BLOCK`].
    pub fn set_tod(&mut self, mut tod: Vec<Uid>) {
        tod.truncate(MAX_TOD_BLOCK);
        self.uid_count = u8::try_from(tod.len()).unwrap_or(u8::MAX);
        self.tod = tod;
    }
}

impl ArtNetPacket for ArtTodData {
    const OP_CODE: OpCode = OpCode::TodData;
}

/// Controls RDM discovery on a port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtTodControl {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// Unused
    pub filler: [u8; 2],
    /// Unused
    pub spare: [u8; 7],
    /// Bits 14-8 of the port-address
    pub net: u8,
    /// Discovery command
    pub command: TodControlCommand,
    /// Low byte of the port-address
    pub address: u8,
}

crate::wire_schema! {
    ArtTodControl {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        filler: Field::bytes(2),
        spare: Field::bytes(7),
        net: Field::u8(),
        command: Field::enumeration::<TodControlCommand>(),
        address: Field::u8(),
    }
}

protocol_version!(ArtTodControl);

impl ArtNetPacket for ArtTodControl {
    const OP_CODE: OpCode = OpCode::TodControl;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_addresses() {
        let mut request = ArtTodRequest::new();
        request.set_addresses(vec![1, 2, 3]);
        let bytes = request.to_bytes().unwrap();
        assert_eq!(bytes.len(), 27);
        assert_eq!(bytes[23], 3);
        assert_eq!(&bytes[24..], &[1, 2, 3]);
        assert_eq!(ArtTodRequest::from_bytes(&bytes).unwrap(), request);
    }

    #[test]
    fn test_tod_data_uids() {
        let mut data = ArtTodData::new();
        data.rdm_ver = 1;
        data.set_uid_total(2);
        data.set_tod(vec![Uid::new(0x7A70, 1), Uid::new(0x7A70, 2)]);
        let bytes = data.to_bytes().unwrap();
        assert_eq!(bytes.len(), 28 + 12);
        assert_eq!(bytes[27], 2);
        assert_eq!(&bytes[28..34], &[0x7A, 0x70, 0, 0, 0, 1]);
        let decoded = ArtTodData::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.tod, data.tod);
        assert_eq!(decoded.uid_total(), 2);
    }

    #[test]
    fn test_tod_count_bounds_uids() {
        let mut data = ArtTodData::new();
        data.set_tod(vec![Uid::new(1, 1), Uid::new(2, 2)]);
        let mut bytes = data.to_bytes().unwrap();
        bytes[27] = 1;
        let decoded = ArtTodData::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.tod, [Uid::new(1, 1)]);
    }

    #[test]
    fn test_control_layout() {
        let mut control = ArtTodControl::new();
        control.command = TodControlCommand::Flush;
        control.address = 0x21;
        let bytes = control.to_bytes().unwrap();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[22..], &[0x01, 0x21]);
    }
}
