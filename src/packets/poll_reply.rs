//! ArtPollReply: discovery reply.

use std::net::Ipv4Addr;

use super::{ArtNetPacket, OpCode, PORT, StyleCode, Uid, hi_lo};
use crate::codec::Field;

/// Node description sent in answer to an [`ArtPoll`](super::ArtPoll).
///
/// Everything after `status2` depends on the session version: Art-Net 4
/// (version 4.0 and up) carries the extended node fields, Art-Net 3
/// (up to 3.0) pads with 26 zero bytes instead. Both layouts are 239 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtPollReply {
    /// Node IP address
    pub ip_address: [u8; 4],
    /// UDP port, always 0x1936
    pub port: u16,
    /// Firmware revision, high byte
    pub vers_info_h: u8,
    /// Firmware revision, low byte
    pub vers_info_l: u8,
    /// Bits 14-8 of the port-address
    pub net_switch: u8,
    /// Bits 7-4 of the port-address
    pub sub_switch: u8,
    /// OEM code, high byte
    pub oem_hi: u8,
    /// OEM code, low byte
    pub oem_lo: u8,
    /// UBEA firmware revision
    pub ubea_version: u8,
    /// General status flags
    pub status1: u8,
    /// ESTA manufacturer code, low byte
    pub esta_man_lo: u8,
    /// ESTA manufacturer code, high byte
    pub esta_man_hi: u8,
    /// Short node name, 18 bytes on the wire
    pub short_name: String,
    /// Long node name, 64 bytes on the wire
    pub long_name: String,
    /// Node status text, 64 bytes on the wire
    pub node_report: String,
    /// Number of ports, high byte
    pub num_ports_hi: u8,
    /// Number of ports, low byte
    pub num_ports_lo: u8,
    /// Port types
    pub port_types: [u8; 4],
    /// Input status per port
    pub good_input: [u8; 4],
    /// Output status per port
    pub good_output_a: [u8; 4],
    /// Input universes, bits 3-0
    pub sw_in: [u8; 4],
    /// Output universes, bits 3-0
    pub sw_out: [u8; 4],
    /// sACN priority
    pub acn_priority: u8,
    /// Macro key inputs
    pub sw_macro: u8,
    /// Remote trigger inputs
    pub sw_remote: u8,
    /// Unused
    pub spare: [u8; 3],
    /// Equipment style
    pub style: StyleCode,
    /// MAC address
    pub mac: [u8; 6],
    /// IP of the root device when bound
    pub bind_ip: [u8; 4],
    /// Order of bound devices
    pub bind_index: u8,
    /// Extended status flags
    pub status2: u8,
    /// Further output status per port
    pub good_output_b: [u8; 4],
    /// Further status flags
    pub status3: u8,
    /// Default RDM responder
    pub default_resp_uid: Uid,
    /// User data, high byte
    pub user_hi: u8,
    /// User data, low byte
    pub user_lo: u8,
    /// Maximum refresh rate, high byte
    pub refresh_rate_hi: u8,
    /// Maximum refresh rate, low byte
    pub refresh_rate_lo: u8,
    /// RDM background queue policy
    pub background_queue_policy: u8,
    /// Art-Net 4 padding
    pub filler: [u8; 10],
    /// Art-Net 3 padding
    pub filler_v3: [u8; 26],
}

impl Default for ArtPollReply {
    fn default() -> Self {
        Self {
            ip_address: [0; 4],
            port: PORT,
            vers_info_h: 0,
            vers_info_l: 0,
            net_switch: 0,
            sub_switch: 0,
            oem_hi: 0,
            oem_lo: 0,
            ubea_version: 0,
            status1: 0,
            esta_man_lo: 0,
            esta_man_hi: 0,
            short_name: String::new(),
            long_name: String::new(),
            node_report: String::new(),
            num_ports_hi: 0,
            num_ports_lo: 0,
            port_types: [0; 4],
            good_input: [0; 4],
            good_output_a: [0; 4],
            sw_in: [0; 4],
            sw_out: [0; 4],
            acn_priority: 0,
            sw_macro: 0,
            sw_remote: 0,
            spare: [0; 3],
            style: StyleCode::Node,
            mac: [0; 6],
            bind_ip: [0; 4],
            bind_index: 0,
            status2: 0,
            good_output_b: [0; 4],
            status3: 0,
            default_resp_uid: Uid::default(),
            user_hi: 0,
            user_lo: 0,
            refresh_rate_hi: 0,
            refresh_rate_lo: 0,
            background_queue_policy: 0,
            filler: [0; 10],
            filler_v3: [0; 26],
        }
    }
}

crate::wire_schema! {
    ArtPollReply {
        ip_address: Field::bytes(4),
        port: Field::u16(),
        vers_info_h: Field::u8(),
        vers_info_l: Field::u8(),
        net_switch: Field::u8(),
        sub_switch: Field::u8(),
        oem_hi: Field::u8(),
        oem_lo: Field::u8(),
        ubea_version: Field::u8(),
        status1: Field::u8(),
        esta_man_lo: Field::u8(),
        esta_man_hi: Field::u8(),
        short_name: Field::fixed_string(18),
        long_name: Field::fixed_string(64),
        node_report: Field::fixed_string(64),
        num_ports_hi: Field::u8(),
        num_ports_lo: Field::u8(),
        port_types: Field::bytes(4),
        good_input: Field::bytes(4),
        good_output_a: Field::bytes(4),
        sw_in: Field::bytes(4),
        sw_out: Field::bytes(4),
        acn_priority: Field::u8(),
        sw_macro: Field::u8(),
        sw_remote: Field::u8(),
        spare: Field::bytes(3),
        style: Field::enumeration::<StyleCode>(),
        mac: Field::bytes(6),
        bind_ip: Field::bytes(4),
        bind_index: Field::u8(),
        status2: Field::u8(),
        good_output_b: Field::bytes(4).since(4.0),
        status3: Field::u8().since(4.0),
        default_resp_uid: Field::object::<Uid>().since(4.0),
        user_hi: Field::u8().since(4.0),
        user_lo: Field::u8().since(4.0),
        refresh_rate_hi: Field::u8().since(4.0),
        refresh_rate_lo: Field::u8().since(4.0),
        background_queue_policy: Field::u8().since(4.0),
        filler: Field::bytes(10).since(4.0),
        filler_v3: Field::bytes(26).until(3.0),
    }
    properties {
        "oem" => |p| p.oem(),
        "esta_man" => |p| p.esta_man(),
        "num_ports" => |p| p.num_ports(),
    }
}

impl ArtPollReply {
    /// Reply with the standard port and node style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node IP address.
    #[must_use]
    pub const fn ip(&self) -> Ipv4Addr {
        let [a, b, c, d] = self.ip_address;
        Ipv4Addr::new(a, b, c, d)
    }

    /// Set the node IP address.
    pub const fn set_ip(&mut self, ip: Ipv4Addr) {
        self.ip_address = ip.octets();
    }

    /// OEM code.
    #[must_use]
    pub const fn oem(&self) -> u16 {
        hi_lo(self.oem_hi, self.oem_lo)
    }

    /// Set the OEM code.
    pub fn set_oem(&mut self, oem: u16) {
        [self.oem_hi, self.oem_lo] = oem.to_be_bytes();
    }

    /// ESTA manufacturer code.
    #[must_use]
    pub const fn esta_man(&self) -> u16 {
        hi_lo(self.esta_man_hi, self.esta_man_lo)
    }

    /// Set the ESTA manufacturer code.
    pub fn set_esta_man(&mut self, esta_man: u16) {
        [self.esta_man_hi, self.esta_man_lo] = esta_man.to_be_bytes();
    }

    /// Number of ports.
    #[must_use]
    pub const fn num_ports(&self) -> u16 {
        hi_lo(self.num_ports_hi, self.num_ports_lo)
    }

    /// Set the number of ports.
    pub fn set_num_ports(&mut self, num_ports: u16) {
        [self.num_ports_hi, self.num_ports_lo] = num_ports.to_be_bytes();
    }

    /// Firmware revision.
    #[must_use]
    pub const fn firmware_version(&self) -> u16 {
        hi_lo(self.vers_info_h, self.vers_info_l)
    }
}

impl ArtNetPacket for ArtPollReply {
    const OP_CODE: OpCode = OpCode::PollReply;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Config;

    fn sample() -> ArtPollReply {
        let mut reply = ArtPollReply::new();
        reply.set_ip(Ipv4Addr::new(192, 168, 1, 20));
        reply.short_name = "dimmer".into();
        reply.long_name = "Dimmer rack 1".into();
        reply.set_oem(0x2BE9);
        reply.set_esta_man(0x7A70);
        reply.set_num_ports(2);
        reply.mac = [0, 1, 2, 3, 4, 5];
        reply.default_resp_uid = Uid::new(0x7A70, 1);
        reply
    }

    #[test]
    fn test_art_net4_layout() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(bytes.len(), 239);
        assert_eq!(&bytes[10..14], &[192, 168, 1, 20]);
        assert_eq!(&bytes[14..16], &[0x36, 0x19]);
        assert_eq!(&bytes[20..22], &[0x2B, 0xE9]);
        assert_eq!(&bytes[24..26], &[0x70, 0x7A]);
        assert_eq!(&bytes[26..32], b"dimmer");
        assert_eq!(bytes[43], 0);
        assert_eq!(&bytes[201..207], &[0, 1, 2, 3, 4, 5]);
        assert_eq!(&bytes[218..224], &[0x7A, 0x70, 0, 0, 0, 1]);
    }

    #[test]
    fn test_round_trip() {
        let reply = sample();
        let bytes = reply.to_bytes().unwrap();
        let decoded = ArtPollReply::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, reply);
        assert_eq!(decoded.ip(), Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(decoded.num_ports(), 2);
    }

    #[test]
    fn test_art_net3_layout() {
        let config = Config::default().with_version(3.0);
        let bytes = sample().to_bytes_with(&config).unwrap();
        assert_eq!(bytes.len(), 239);
        assert!(bytes[213..].iter().all(|&b| b == 0));
        let decoded = ArtPollReply::from_bytes_with(&bytes, &config).unwrap();
        assert_eq!(decoded.default_resp_uid, Uid::default());
        assert_eq!(decoded.short_name, "dimmer");
    }

    #[test]
    fn test_intermediate_version_has_no_tail() {
        let config = Config::default().with_version(3.5);
        let bytes = sample().to_bytes_with(&config).unwrap();
        assert_eq!(bytes.len(), 213);
    }
}
