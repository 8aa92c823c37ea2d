//! ArtAddress: remote node programming.

use super::{AddressCommand, ArtNetPacket, OpCode, protocol_version};
use crate::codec::Field;

/// Value telling a node to leave a switch setting unchanged
pub const NO_CHANGE: u8 = 0x7F;

/// Reprograms names, switches and behaviour of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtAddress {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// New net switch, bit 7 set to program
    pub net_switch: u8,
    /// Bound device the packet is meant for
    pub bind_index: u8,
    /// New short name, empty for no change
    pub port_name: String,
    /// New long name, empty for no change
    pub long_name: String,
    /// New input universes, bit 7 set to program
    pub sw_in: [u8; 4],
    /// New output universes, bit 7 set to program
    pub sw_out: [u8; 4],
    /// New sub-net switch, bit 7 set to program
    pub sub_switch: u8,
    /// New sACN priority
    pub acn_priority: u8,
    /// Action to perform
    pub command: AddressCommand,
}

crate::wire_schema! {
    ArtAddress {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        net_switch: Field::u8(),
        bind_index: Field::u8(),
        port_name: Field::fixed_string(18),
        long_name: Field::fixed_string(64),
        sw_in: Field::bytes(4),
        sw_out: Field::bytes(4),
        sub_switch: Field::u8(),
        acn_priority: Field::u8(),
        command: Field::enumeration::<AddressCommand>(),
    }
}

protocol_version!(ArtAddress);

impl ArtAddress {
    /// Packet performing `command` and leaving every switch unchanged.
    #[must_use]
    pub fn command(command: AddressCommand) -> Self {
        Self {
            net_switch: NO_CHANGE,
            sw_in: [NO_CHANGE; 4],
            sw_out: [NO_CHANGE; 4],
            sub_switch: NO_CHANGE,
            acn_priority: 0xFF,
            command,
            ..Self::new()
        }
    }
}

impl ArtNetPacket for ArtAddress {
    const OP_CODE: OpCode = OpCode::Address;
}
