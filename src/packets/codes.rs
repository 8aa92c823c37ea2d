//! Art-Net code tables.
//!
//! Each table is open: values without a name decode to `Other` and encode
//! back unchanged, since the engine does not judge protocol semantics.

use std::fmt;

use crate::codec::{self, FieldValue, Primitive, Value, WireEnum};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident: $repr:ty => $prim:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Value without a name in this table
            Other($repr),
        }

        impl $name {
            /// Map a raw wire value onto the table.
            #[must_use]
            pub const fn from_raw(raw: $repr) -> Self {
                match raw {
                    $( $value => Self::$variant, )+
                    other => Self::Other(other),
                }
            }

            /// Raw wire value.
            #[must_use]
            pub const fn raw(self) -> $repr {
                match self {
                    $( Self::$variant => $value, )+
                    Self::Other(raw) => raw,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::from_raw(0)
            }
        }

        impl WireEnum for $name {
            const REPR: Primitive = Primitive::$prim;
        }

        impl FieldValue for $name {
            fn to_value(&self) -> Value {
                self.raw().to_value()
            }

            fn from_value(value: Value) -> codec::Result<Self> {
                <$repr>::from_value(value).map(Self::from_raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( Self::$variant => write!(f, "{}({:#x})", stringify!($variant), $value), )+
                    Self::Other(raw) => write!(f, "{raw:#x}"),
                }
            }
        }
    };
}

wire_enum! {
    /// Packet opcodes, transmitted low byte first
    OpCode: u16 => U16 {
        /// Discovery request
        Poll = 0x2000,
        /// Discovery reply
        PollReply = 0x2100,
        /// Diagnostics and text
        DiagData = 0x2300,
        /// Text-based parameter commands
        Command = 0x2400,
        /// Product data request
        DataRequest = 0x2700,
        /// Product data reply
        DataReply = 0x2800,
        /// DMX512 data
        Dmx = 0x5000,
        /// Non-zero start code DMX512 data
        Nzs = 0x5100,
        /// Output synchronisation
        Sync = 0x5200,
        /// Remote node programming
        Address = 0x6000,
        /// Input enable and disable
        Input = 0x7000,
        /// Table of devices request
        TodRequest = 0x8000,
        /// Table of devices reply
        TodData = 0x8100,
        /// RDM discovery control
        TodControl = 0x8200,
        /// RDM data
        Rdm = 0x8300,
        /// RDM sub-device data
        RdmSub = 0x8400,
        /// Timecode
        TimeCode = 0x9700,
        /// Time synchronisation
        TimeSync = 0x9800,
        /// Trigger macros
        Trigger = 0x9900,
        /// File list request
        Directory = 0x9A00,
        /// File list reply
        DirectoryReply = 0x9B00,
        /// Firmware upload
        FirmwareMaster = 0xF200,
        /// Firmware upload acknowledgement
        FirmwareReply = 0xF300,
        /// IP reprogramming
        IpProg = 0xF800,
        /// IP reprogramming reply
        IpProgReply = 0xF900,
    }
}

wire_enum! {
    /// Diagnostics message priority
    DiagPriority: u8 => U8 {
        /// Low priority
        Low = 0x10,
        /// Medium priority
        Medium = 0x40,
        /// High priority
        High = 0x80,
        /// Critical priority
        Critical = 0xE0,
        /// Volatile, single line display
        Volatile = 0xF0,
    }
}

wire_enum! {
    /// Kind of equipment replying to a poll
    StyleCode: u8 => U8 {
        /// DMX to or from Art-Net device
        Node = 0x00,
        /// Lighting console
        Controller = 0x01,
        /// Media server
        Media = 0x02,
        /// Network routing device
        Route = 0x03,
        /// Backup device
        Backup = 0x04,
        /// Configuration or diagnostic tool
        Config = 0x05,
        /// Visualiser
        Visual = 0x06,
    }
}

wire_enum! {
    /// ArtAddress node commands
    AddressCommand: u8 => U8 {
        /// No action
        None = 0x00,
        /// Cancel merge mode
        CancelMerge = 0x01,
        /// Front panel indicators normal
        LedNormal = 0x02,
        /// Front panel indicators off
        LedMute = 0x03,
        /// Fast flash for locating
        LedLocate = 0x04,
        /// Reset receive error flags
        ResetRxFlags = 0x05,
        /// Enable analysis and debug
        AnalysisOn = 0x06,
        /// Disable analysis and debug
        AnalysisOff = 0x07,
        /// Hold last state on data loss
        FailHold = 0x08,
        /// Outputs to zero on data loss
        FailZero = 0x09,
        /// Outputs to full on data loss
        FailFull = 0x0A,
        /// Play fail-safe scene on data loss
        FailScene = 0x0B,
        /// Record current output as fail-safe scene
        FailRecord = 0x0C,
    }
}

wire_enum! {
    /// ArtTodRequest commands
    TodRequestCommand: u8 => U8 {
        /// Send the entire table of devices
        TodFull = 0x00,
    }
}

wire_enum! {
    /// ArtTodData responses
    TodDataCommand: u8 => U8 {
        /// The packet contains the entire table of devices
        TodFull = 0x00,
        /// The table of devices is not available
        TodNak = 0xFF,
    }
}

wire_enum! {
    /// ArtTodControl commands
    TodControlCommand: u8 => U8 {
        /// No action
        None = 0x00,
        /// Flush the table and rediscover
        Flush = 0x01,
        /// End discovery and mute devices
        End = 0x02,
        /// Enable incremental discovery
        IncOn = 0x03,
        /// Disable incremental discovery
        IncOff = 0x04,
    }
}

wire_enum! {
    /// ArtRdm commands
    RdmCommand: u8 => U8 {
        /// Process the RDM packet
        Process = 0x00,
    }
}

wire_enum! {
    /// ArtFirmwareReply status
    FirmwareReplyCode: u8 => U8 {
        /// Last block received
        BlockGood = 0x00,
        /// Whole file received
        AllGood = 0x01,
        /// Upload failed
        Fail = 0xFF,
    }
}

wire_enum! {
    /// ArtDataRequest and ArtDataReply request codes
    DataRequestCode: u16 => U16 {
        /// Presence check
        Poll = 0x0000,
        /// Product URL
        UrlProduct = 0x0001,
        /// User guide URL
        UrlUserGuide = 0x0002,
        /// Support URL
        UrlSupport = 0x0003,
        /// UDR personality URL
        UrlPersUdr = 0x0004,
        /// GDTF personality URL
        UrlPersGdtf = 0x0005,
        /// Start of the manufacturer specific range
        ManSpec = 0x8000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_codes() {
        assert_eq!(OpCode::from_raw(0x5000), OpCode::Dmx);
        assert_eq!(OpCode::Dmx.raw(), 0x5000);
        assert_eq!(OpCode::from_raw(0x1234), OpCode::Other(0x1234));
        assert_eq!(OpCode::Other(0x1234).raw(), 0x1234);
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(StyleCode::default(), StyleCode::Node);
        assert_eq!(OpCode::default(), OpCode::Other(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(OpCode::Poll.to_string(), "Poll(0x2000)");
        assert_eq!(DiagPriority::Other(0x20).to_string(), "0x20");
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(FirmwareReplyCode::Fail.to_value(), Value::U8(0xFF));
        assert_eq!(
            FirmwareReplyCode::from_value(Value::U8(1)).unwrap(),
            FirmwareReplyCode::AllGood
        );
        assert!(FirmwareReplyCode::from_value(Value::U16(0x100)).is_err());
        assert_eq!(<DataRequestCode as WireEnum>::REPR, Primitive::U16);
    }
}
