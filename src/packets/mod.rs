//! Art-Net 4 packet schemas.
//!
//! Every packet starts with the ten-byte [`PacketHeader`] followed by a body
//! described with [`wire_schema!`](crate::wire_schema). Bodies are encoded
//! little endian under session version 4.0 unless another [`Config`] is
//! supplied. [`Packet`] dispatches a received datagram on its opcode.

mod address;
mod codes;
mod data;
mod diag;
mod dmx;
mod error;
mod firmware;
mod header;
mod ip_prog;
mod poll;
mod poll_reply;
mod rdm;
mod tod;
mod uid;

use bytes::Bytes;
use tracing::trace;

use crate::codec::{self, Config, Context, Cursor, Endianness, Schema, Wire};

pub use address::{ArtAddress, NO_CHANGE};
pub use codes::{
    AddressCommand, DataRequestCode, DiagPriority, FirmwareReplyCode, OpCode, RdmCommand,
    StyleCode, TodControlCommand, TodDataCommand, TodRequestCommand,
};
pub use data::{ArtDataReply, ArtDataRequest};
pub use diag::{ArtCommand, ArtDiagData};
pub use dmx::{ArtDmx, MAX_CHANNELS};
pub use error::{PacketError, Result};
pub use firmware::ArtFirmwareReply;
pub use header::PacketHeader;
pub use ip_prog::{ArtIpProg, ArtIpProgReply, IpProgCommand};
pub use poll::{ArtPoll, TalkToMe};
pub use poll_reply::ArtPollReply;
pub use rdm::ArtRdm;
pub use tod::{ArtTodControl, ArtTodData, ArtTodRequest, MAX_TOD_BLOCK};
pub use uid::{ParseUidError, Uid};

/// Protocol identifier opening every packet
pub const ARTNET_ID: [u8; 8] = *b"Art-Net\0";

/// UDP port used by Art-Net
pub const PORT: u16 = 0x1936;

/// Protocol revision sent in `ProtVer` fields
pub const PROTOCOL_VERSION: u16 = 14;

/// Length of the ID and opcode header
pub const HEADER_SIZE: usize = 10;

/// Session version packet bodies are encoded under (Art-Net 4)
pub const WIRE_VERSION: f64 = 4.0;

/// Configuration for Art-Net bodies: little endian, version 4.0.
#[must_use]
pub fn wire_config() -> Config {
    Config::default()
        .with_endianness(Endianness::Little)
        .with_version(WIRE_VERSION)
}

/// A packet type with a fixed opcode.
///
/// Bodies go through the schema engine. Packets carrying data outside their
/// schema override [`encode_body`](Self::encode_body) and
/// [`decode_body`](Self::decode_body).
pub trait ArtNetPacket: Schema + Wire {
    /// Opcode identifying the packet type
    const OP_CODE: OpCode;

    /// Encode everything after the header.
    fn encode_body(&self, ctx: &mut Context<'_>) -> codec::Result<()> {
        self.encode_into(ctx)
    }

    /// Decode everything after the header.
    fn decode_body(ctx: &mut Context<'_>) -> codec::Result<Self> {
        Self::decode_from(ctx)
    }

    /// Encode with [`wire_config`].
    fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(&wire_config())
    }

    /// Encode with a custom body configuration. The header is always
    /// little endian.
    fn to_bytes_with(&self, config: &Config) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Endianness::Little);
        cursor.write_bytes(&ARTNET_ID);
        cursor.write_u16(Self::OP_CODE.raw());
        cursor.set_endianness(config.endianness);
        self.encode_body(&mut Context::new(&mut cursor, config))?;
        trace!(op_code = %Self::OP_CODE, len = cursor.len(), "packet encoded");
        Ok(cursor.into_inner())
    }

    /// Decode with [`wire_config`].
    fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, &wire_config())
    }

    /// Decode with a custom body configuration.
    fn from_bytes_with(data: &[u8], config: &Config) -> Result<Self> {
        let header = PacketHeader::parse(data)?;
        if header.op_code != Self::OP_CODE {
            return Err(PacketError::UnexpectedOpCode {
                expected: Self::OP_CODE,
                found: header.op_code,
            });
        }
        let mut cursor = Cursor::from_bytes(data, config.endianness);
        cursor.seek(HEADER_SIZE)?;
        Ok(Self::decode_body(&mut Context::new(&mut cursor, config))?)
    }
}

/// Adds `ProtVer` accessors and a constructor stamping the current revision.
macro_rules! protocol_version {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $ty {
                /// Packet with the protocol revision set to [`PROTOCOL_VERSION`].
                #[must_use]
                pub fn new() -> Self {
                    let mut packet = Self::default();
                    packet.set_protocol_version($crate::packets::PROTOCOL_VERSION);
                    packet
                }

                /// Protocol revision carried by the packet.
                #[must_use]
                pub const fn protocol_version(&self) -> u16 {
                    u16::from_be_bytes([self.prot_ver_hi, self.prot_ver_lo])
                }

                /// Set the protocol revision.
                pub fn set_protocol_version(&mut self, version: u16) {
                    [self.prot_ver_hi, self.prot_ver_lo] = version.to_be_bytes();
                }
            }
        )+
    };
}

pub(crate) use protocol_version;

/// Joins a `Hi`/`Lo` byte pair.
pub(crate) const fn hi_lo(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

/// Any Art-Net packet, dispatched on its opcode.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// ArtPoll
    Poll(ArtPoll),
    /// ArtPollReply
    PollReply(Box<ArtPollReply>),
    /// ArtDmx
    Dmx(ArtDmx),
    /// ArtAddress
    Address(ArtAddress),
    /// ArtDiagData
    DiagData(ArtDiagData),
    /// ArtCommand
    Command(ArtCommand),
    /// ArtDataRequest
    DataRequest(ArtDataRequest),
    /// ArtDataReply
    DataReply(ArtDataReply),
    /// ArtIpProg
    IpProg(ArtIpProg),
    /// ArtIpProgReply
    IpProgReply(ArtIpProgReply),
    /// ArtTodRequest
    TodRequest(ArtTodRequest),
    /// ArtTodData
    TodData(ArtTodData),
    /// ArtTodControl
    TodControl(ArtTodControl),
    /// ArtRdm
    Rdm(ArtRdm),
    /// ArtFirmwareReply
    FirmwareReply(ArtFirmwareReply),
    /// Valid header with an opcode this crate has no schema for
    Unknown {
        /// Opcode from the header
        op_code: OpCode,
        /// The whole datagram
        data: Bytes,
    },
}

impl Packet {
    /// Decode a datagram, choosing the packet type from its opcode.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = PacketHeader::parse(data)?;
        Ok(match header.op_code {
            OpCode::Poll => Self::Poll(ArtPoll::from_bytes(data)?),
            OpCode::PollReply => Self::PollReply(Box::new(ArtPollReply::from_bytes(data)?)),
            OpCode::Dmx => Self::Dmx(ArtDmx::from_bytes(data)?),
            OpCode::Address => Self::Address(ArtAddress::from_bytes(data)?),
            OpCode::DiagData => Self::DiagData(ArtDiagData::from_bytes(data)?),
            OpCode::Command => Self::Command(ArtCommand::from_bytes(data)?),
            OpCode::DataRequest => Self::DataRequest(ArtDataRequest::from_bytes(data)?),
            OpCode::DataReply => Self::DataReply(ArtDataReply::from_bytes(data)?),
            OpCode::IpProg => Self::IpProg(ArtIpProg::from_bytes(data)?),
            OpCode::IpProgReply => Self::IpProgReply(ArtIpProgReply::from_bytes(data)?),
            OpCode::TodRequest => Self::TodRequest(ArtTodRequest::from_bytes(data)?),
            OpCode::TodData => Self::TodData(ArtTodData::from_bytes(data)?),
            OpCode::TodControl => Self::TodControl(ArtTodControl::from_bytes(data)?),
            OpCode::Rdm => Self::Rdm(ArtRdm::from_bytes(data)?),
            OpCode::FirmwareReply => Self::FirmwareReply(ArtFirmwareReply::from_bytes(data)?),
            op_code => Self::Unknown {
                op_code,
                data: Bytes::copy_from_slice(data),
            },
        })
    }

    /// Encode the packet with [`wire_config`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Poll(p) => p.to_bytes(),
            Self::PollReply(p) => p.to_bytes(),
            Self::Dmx(p) => p.to_bytes(),
            Self::Address(p) => p.to_bytes(),
            Self::DiagData(p) => p.to_bytes(),
            Self::Command(p) => p.to_bytes(),
            Self::DataRequest(p) => p.to_bytes(),
            Self::DataReply(p) => p.to_bytes(),
            Self::IpProg(p) => p.to_bytes(),
            Self::IpProgReply(p) => p.to_bytes(),
            Self::TodRequest(p) => p.to_bytes(),
            Self::TodData(p) => p.to_bytes(),
            Self::TodControl(p) => p.to_bytes(),
            Self::Rdm(p) => p.to_bytes(),
            Self::FirmwareReply(p) => p.to_bytes(),
            Self::Unknown { data, .. } => Ok(data.to_vec()),
        }
    }

    /// Opcode of the packet.
    #[must_use]
    pub const fn op_code(&self) -> OpCode {
        match self {
            Self::Poll(_) => ArtPoll::OP_CODE,
            Self::PollReply(_) => ArtPollReply::OP_CODE,
            Self::Dmx(_) => ArtDmx::OP_CODE,
            Self::Address(_) => ArtAddress::OP_CODE,
            Self::DiagData(_) => ArtDiagData::OP_CODE,
            Self::Command(_) => ArtCommand::OP_CODE,
            Self::DataRequest(_) => ArtDataRequest::OP_CODE,
            Self::DataReply(_) => ArtDataReply::OP_CODE,
            Self::IpProg(_) => ArtIpProg::OP_CODE,
            Self::IpProgReply(_) => ArtIpProgReply::OP_CODE,
            Self::TodRequest(_) => ArtTodRequest::OP_CODE,
            Self::TodData(_) => ArtTodData::OP_CODE,
            Self::TodControl(_) => ArtTodControl::OP_CODE,
            Self::Rdm(_) => ArtRdm::OP_CODE,
            Self::FirmwareReply(_) => ArtFirmwareReply::OP_CODE,
            Self::Unknown { op_code, .. } => *op_code,
        }
    }
}

macro_rules! packet_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Packet {
                fn from(packet: $ty) -> Self {
                    Self::$variant(packet.into())
                }
            }
        )+
    };
}

packet_from! {
    ArtPoll => Poll,
    ArtPollReply => PollReply,
    ArtDmx => Dmx,
    ArtAddress => Address,
    ArtDiagData => DiagData,
    ArtCommand => Command,
    ArtDataRequest => DataRequest,
    ArtDataReply => DataReply,
    ArtIpProg => IpProg,
    ArtIpProgReply => IpProgReply,
    ArtTodRequest => TodRequest,
    ArtTodData => TodData,
    ArtTodControl => TodControl,
    ArtRdm => Rdm,
    ArtFirmwareReply => FirmwareReply,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_config() {
        let config = wire_config();
        assert_eq!(config.endianness, Endianness::Little);
        assert!((config.version - WIRE_VERSION).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_opcode_is_preserved() {
        let data = b"Art-Net\0\x00\x97timecode".to_vec();
        let packet = Packet::from_bytes(&data).unwrap();
        assert_eq!(packet.op_code(), OpCode::TimeCode);
        assert!(matches!(packet, Packet::Unknown { .. }));
        assert_eq!(packet.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_opcode_mismatch() {
        let bytes = ArtPoll::new().to_bytes().unwrap();
        assert_eq!(
            ArtDmx::from_bytes(&bytes),
            Err(PacketError::UnexpectedOpCode {
                expected: OpCode::Dmx,
                found: OpCode::Poll
            })
        );
    }

    #[test]
    fn test_header_precedes_body() {
        let bytes = ArtPoll::new().to_bytes().unwrap();
        assert_eq!(&bytes[..8], &ARTNET_ID);
        assert_eq!(&bytes[8..10], &[0x00, 0x20]);
        assert_eq!(&bytes[10..12], &[0, 14]);
    }
}
