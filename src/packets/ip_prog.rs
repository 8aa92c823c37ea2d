//! ArtIpProg and ArtIpProgReply: IP reprogramming.

use std::net::Ipv4Addr;

use super::{ArtNetPacket, OpCode, protocol_version};
use crate::codec::Field;

/// Changes the IP settings of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtIpProg {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// Unused
    pub filler: [u8; 2],
    /// Action flags, see [`IpProgCommand`]
    pub command: u8,
    /// Unused
    pub filler4: u8,
    /// New IP address
    pub prog_ip: [u8; 4],
    /// New subnet mask
    pub prog_sm: [u8; 4],
    /// Deprecated port field
    pub prog_port: [u8; 2],
    /// New default gateway
    pub prog_dg: [u8; 4],
    /// Unused
    pub spare: [u8; 4],
}

crate::wire_schema! {
    ArtIpProg {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        filler: Field::bytes(2),
        command: Field::u8(),
        filler4: Field::u8(),
        prog_ip: Field::bytes(4),
        prog_sm: Field::bytes(4),
        prog_port: Field::bytes(2),
        prog_dg: Field::bytes(4),
        spare: Field::bytes(4),
    }
}

protocol_version!(ArtIpProg);

impl ArtIpProg {
    /// Decoded action flags.
    #[must_use]
    pub const fn ip_command(&self) -> IpProgCommand {
        IpProgCommand::from_bits(self.command)
    }

    /// Replace the action flags.
    pub const fn set_ip_command(&mut self, command: IpProgCommand) {
        self.command = command.bits();
    }

    /// Program a static address, mask and gateway.
    pub fn program(&mut self, ip: Ipv4Addr, mask: Ipv4Addr, gateway: Ipv4Addr) {
        self.prog_ip = ip.octets();
        self.prog_sm = mask.octets();
        self.prog_dg = gateway.octets();
        self.set_ip_command(IpProgCommand {
            enable: true,
            program_ip: true,
            program_mask: true,
            program_gateway: true,
            ..IpProgCommand::default()
        });
    }
}

impl ArtNetPacket for ArtIpProg {
    const OP_CODE: OpCode = OpCode::IpProg;
}

/// ArtIpProg action flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct IpProgCommand {
    /// Apply the programming flags below
    pub enable: bool,
    /// Enable DHCP
    pub dhcp: bool,
    /// Program the default gateway
    pub program_gateway: bool,
    /// Return every setting to its default
    pub reset: bool,
    /// Program the IP address
    pub program_ip: bool,
    /// Program the subnet mask
    pub program_mask: bool,
    /// Program the port
    pub program_port: bool,
}

impl IpProgCommand {
    /// Decode from the command byte.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            enable: bits & 0x80 != 0,
            dhcp: bits & 0x40 != 0,
            program_gateway: bits & 0x10 != 0,
            reset: bits & 0x08 != 0,
            program_ip: bits & 0x04 != 0,
            program_mask: bits & 0x02 != 0,
            program_port: bits & 0x01 != 0,
        }
    }

    /// Encode into the command byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        (self.enable as u8) << 7
            | (self.dhcp as u8) << 6
            | (self.program_gateway as u8) << 4
            | (self.reset as u8) << 3
            | (self.program_ip as u8) << 2
            | (self.program_mask as u8) << 1
            | self.program_port as u8
    }
}

/// Current IP settings reported by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtIpProgReply {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// Unused
    pub filler: [u8; 4],
    /// Current IP address
    pub prog_ip: [u8; 4],
    /// Current subnet mask
    pub prog_sm: [u8; 4],
    /// Deprecated port field
    pub prog_port: [u8; 2],
    /// Bit 6 set when DHCP is enabled
    pub status: u8,
    /// Unused
    pub spare2: u8,
    /// Current default gateway
    pub prog_dg: [u8; 4],
    /// Unused
    pub spare7: [u8; 2],
}

crate::wire_schema! {
    ArtIpProgReply {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        filler: Field::bytes(4),
        prog_ip: Field::bytes(4),
        prog_sm: Field::bytes(4),
        prog_port: Field::bytes(2),
        status: Field::u8(),
        spare2: Field::u8(),
        prog_dg: Field::bytes(4),
        spare7: Field::bytes(2),
    }
}

protocol_version!(ArtIpProgReply);

impl ArtIpProgReply {
    /// Current IP address.
    #[must_use]
    pub const fn ip(&self) -> Ipv4Addr {
        let [a, b, c, d] = self.prog_ip;
        Ipv4Addr::new(a, b, c, d)
    }

    /// Whether DHCP is enabled.
    #[must_use]
    pub const fn dhcp(&self) -> bool {
        self.status & 0x40 != 0
    }
}

impl ArtNetPacket for ArtIpProgReply {
    const OP_CODE: OpCode = OpCode::IpProgReply;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_layout() {
        let mut prog = ArtIpProg::new();
        prog.program(
            Ipv4Addr::new(10, 0, 0, 7),
            Ipv4Addr::new(255, 0, 0, 0),
            Ipv4Addr::new(10, 0, 0, 1),
        );
        let bytes = prog.to_bytes().unwrap();
        assert_eq!(bytes.len(), 34);
        assert_eq!(bytes[14], 0x96);
        assert_eq!(&bytes[16..20], &[10, 0, 0, 7]);
        assert_eq!(&bytes[26..30], &[10, 0, 0, 1]);
        assert_eq!(ArtIpProg::from_bytes(&bytes).unwrap(), prog);
    }

    #[test]
    fn test_command_bits() {
        let command = IpProgCommand::from_bits(0xDF);
        assert!(command.enable && command.dhcp && command.program_port);
        assert_eq!(command.bits(), 0xDF);
    }

    #[test]
    fn test_reply_layout() {
        let mut reply = ArtIpProgReply::new();
        reply.prog_ip = [2, 0, 0, 9];
        reply.status = 0x40;
        let bytes = reply.to_bytes().unwrap();
        assert_eq!(bytes.len(), 34);
        let decoded = ArtIpProgReply::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.ip(), Ipv4Addr::new(2, 0, 0, 9));
        assert!(decoded.dhcp());
    }
}
