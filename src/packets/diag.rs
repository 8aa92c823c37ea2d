//! ArtDiagData and ArtCommand: text carried in a length-counted field.

use super::{ArtNetPacket, DiagPriority, OpCode, hi_lo, protocol_version};
use crate::codec::Field;

/// Encoded byte length of `text`, saturating at the wire maximum.
fn text_len(text: &str) -> [u8; 2] {
    u16::try_from(text.len()).unwrap_or(u16::MAX).to_be_bytes()
}

/// Diagnostics text sent by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtDiagData {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// Unused
    pub filler1: u8,
    /// Message priority
    pub priority: DiagPriority,
    /// Port the message relates to
    pub logical_port: u8,
    /// Unused
    pub filler3: u8,
    /// Text length, high byte
    pub length_hi: u8,
    /// Text length, low byte
    pub length_lo: u8,
    /// Message text
    pub data: String,
}

crate::wire_schema! {
    ArtDiagData {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        filler1: Field::u8(),
        priority: Field::enumeration::<DiagPriority>(),
        logical_port: Field::u8(),
        filler3: Field::u8(),
        length_hi: Field::u8(),
        length_lo: Field::u8(),
        data: Field::string_by("length"),
    }
    properties {
        "length" => |p| p.length(),
    }
}

protocol_version!(ArtDiagData);

impl ArtDiagData {
    /// Diagnostics message with the given priority.
    #[must_use]
    pub fn message(priority: DiagPriority, text: impl Into<String>) -> Self {
        let mut diag = Self::new();
        diag.priority = priority;
        diag.set_data(text);
        diag
    }

    /// Declared text length.
    #[must_use]
    pub const fn length(&self) -> u16 {
        hi_lo(self.length_hi, self.length_lo)
    }

    /// Replace the text and its length. The length assumes a
    /// single-byte-per-character encoding.
    pub fn set_data(&mut self, text: impl Into<String>) {
        self.data = text.into();
        [self.length_hi, self.length_lo] = text_len(&self.data);
    }
}

impl ArtNetPacket for ArtDiagData {
    const OP_CODE: OpCode = OpCode::DiagData;
}

/// Text command addressed to nodes of one manufacturer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtCommand {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// ESTA manufacturer code, high byte; 0xFFFF addresses everyone
    pub esta_man_hi: u8,
    /// ESTA manufacturer code, low byte
    pub esta_man_lo: u8,
    /// Text length, high byte
    pub length_hi: u8,
    /// Text length, low byte
    pub length_lo: u8,
    /// Command text, `Name=Value&` pairs
    pub data: String,
}

crate::wire_schema! {
    ArtCommand {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        esta_man_hi: Field::u8(),
        esta_man_lo: Field::u8(),
        length_hi: Field::u8(),
        length_lo: Field::u8(),
        data: Field::string_by("length"),
    }
    properties {
        "length" => |p| p.length(),
    }
}

protocol_version!(ArtCommand);

impl ArtCommand {
    /// Declared text length.
    #[must_use]
    pub const fn length(&self) -> u16 {
        hi_lo(self.length_hi, self.length_lo)
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

    /// Replace the text and its length.
    pub fn set_data(&mut self, text: impl Into<String>) {
        self.data = text.into();
        [self.length_hi, self.length_lo] = text_len(&self.data);
    }
}

impl ArtNetPacket for ArtCommand {
    const OP_CODE: OpCode = OpCode::Command;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TextEncoding;

    #[test]
    fn test_diag_layout() {
        let diag = ArtDiagData::message(DiagPriority::Critical, "overheat");
        let bytes = diag.to_bytes().unwrap();
        assert_eq!(bytes.len(), 26);
        assert_eq!(bytes[13], 0xE0);
        assert_eq!(&bytes[16..18], &[0, 8]);
        assert_eq!(&bytes[18..], b"overheat");
        assert_eq!(ArtDiagData::from_bytes(&bytes).unwrap(), diag);
    }

    #[test]
    fn test_text_stops_at_nul() {
        let data = b"Art-Net\0\x00\x23\x00\x0e\x00\x10\x00\x00\x00\x04ok\0\0";
        let diag = ArtDiagData::from_bytes(data).unwrap();
        assert_eq!(diag.data, "ok");
        assert_eq!(diag.length(), 4);
    }

    #[test]
    fn test_command_with_ascii_encoding() {
        let mut command = ArtCommand::new();
        command.set_esta_man(0xFFFF);
        command.set_data("SwoutText=Playback&");
        let config = crate::packets::wire_config().with_encoding(TextEncoding::Ascii);
        let bytes = command.to_bytes_with(&config).unwrap();
        assert_eq!(&bytes[12..14], &[0xFF, 0xFF]);
        let decoded = ArtCommand::from_bytes_with(&bytes, &config).unwrap();
        assert_eq!(decoded.data, "SwoutText=Playback&");
        assert_eq!(decoded.esta_man(), 0xFFFF);
    }
}
