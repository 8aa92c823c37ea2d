//! ArtPoll: discovery request.

use super::{ArtNetPacket, DiagPriority, OpCode, hi_lo, protocol_version};
use crate::codec::{self, Context, Field, Wire};

/// Discovery request broadcast by controllers.
///
/// The four trailing words are optional on the wire: older senders stop
/// after `priority`, so they are only read while bytes remain. They are
/// always written, most significant byte first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtPoll {
    /// Protocol revision, high byte
    pub prot_ver_hi: u8,
    /// Protocol revision, low byte
    pub prot_ver_lo: u8,
    /// Behaviour flags, see [`TalkToMe`]
    pub flags: u8,
    /// Lowest diagnostics priority the controller wants
    pub priority: DiagPriority,
    /// Top of the targeted port-address range
    pub target_port_top: u16,
    /// Bottom of the targeted port-address range
    pub target_port_bottom: u16,
    /// ESTA manufacturer code of the sender
    pub esta_man: u16,
    /// OEM code of the sender
    pub oem: u16,
}

crate::wire_schema! {
    ArtPoll {
        prot_ver_hi: Field::u8(),
        prot_ver_lo: Field::u8(),
        flags: Field::u8(),
        priority: Field::enumeration::<DiagPriority>(),
        target_port_top: Field::u16().skip(),
        target_port_bottom: Field::u16().skip(),
        esta_man: Field::u16().skip(),
        oem: Field::u16().skip(),
    }
}

protocol_version!(ArtPoll);

impl ArtPoll {
    /// Decoded behaviour flags.
    #[must_use]
    pub const fn talk_to_me(&self) -> TalkToMe {
        TalkToMe::from_bits(self.flags)
    }

    /// Replace the behaviour flags.
    pub const fn set_talk_to_me(&mut self, talk_to_me: TalkToMe) {
        self.flags = talk_to_me.bits();
    }
}

impl ArtNetPacket for ArtPoll {
    const OP_CODE: OpCode = OpCode::Poll;

    fn encode_body(&self, ctx: &mut Context<'_>) -> codec::Result<()> {
        self.encode_into(ctx)?;
        let cursor = ctx.cursor();
        for word in [
            self.target_port_top,
            self.target_port_bottom,
            self.esta_man,
            self.oem,
        ] {
            cursor.write_bytes(&word.to_be_bytes());
        }
        Ok(())
    }

    fn decode_body(ctx: &mut Context<'_>) -> codec::Result<Self> {
        let mut poll = Self::decode_from(ctx)?;
        let cursor = ctx.cursor();
        for word in [
            &mut poll.target_port_top,
            &mut poll.target_port_bottom,
            &mut poll.esta_man,
            &mut poll.oem,
        ] {
            if cursor.remaining() < 2 {
                break;
            }
            let raw = cursor.read_bytes(2)?;
            *word = hi_lo(raw[0], raw[1]);
        }
        Ok(poll)
    }
}

/// ArtPoll behaviour flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TalkToMe {
    /// Nodes reply whenever their state changes
    pub reply_on_change: bool,
    /// Nodes send diagnostics messages
    pub send_diagnostics: bool,
    /// Diagnostics are unicast rather than broadcast
    pub diag_unicast: bool,
    /// VLC transmission disabled
    pub vlc_disabled: bool,
    /// Only nodes within the target port range reply
    pub targeted: bool,
}

impl TalkToMe {
    /// Decode from the flags byte.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            reply_on_change: bits & 0x02 != 0,
            send_diagnostics: bits & 0x04 != 0,
            diag_unicast: bits & 0x08 != 0,
            vlc_disabled: bits & 0x10 != 0,
            targeted: bits & 0x20 != 0,
        }
    }

    /// Encode into the flags byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        (self.reply_on_change as u8) << 1
            | (self.send_diagnostics as u8) << 2
            | (self.diag_unicast as u8) << 3
            | (self.vlc_disabled as u8) << 4
            | (self.targeted as u8) << 5
    }
}
