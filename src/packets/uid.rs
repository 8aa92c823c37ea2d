//! RDM unique identifiers.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::codec::Field;

/// 48-bit RDM device identifier: 16-bit ESTA manufacturer plus 32-bit
/// device number, both most significant byte first on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uid {
    manufacturer: [u8; 2],
    device: [u8; 4],
}

crate::wire_schema! {
    Uid {
        manufacturer: Field::bytes(2),
        device: Field::bytes(4),
    }
}

impl Uid {
    /// Build from manufacturer and device numbers.
    #[must_use]
    pub const fn new(manufacturer_id: u16, device_id: u32) -> Self {
        Self {
            manufacturer: manufacturer_id.to_be_bytes(),
            device: device_id.to_be_bytes(),
        }
    }

    /// ESTA manufacturer number.
    #[must_use]
    pub const fn manufacturer_id(&self) -> u16 {
        u16::from_be_bytes(self.manufacturer)
    }

    /// Device number.
    #[must_use]
    pub const fn device_id(&self) -> u32 {
        u32::from_be_bytes(self.device)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}:{:08X}", self.manufacturer_id(), self.device_id())
    }
}

/// Text that is not `MMMM:DDDDDDDD` hex.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid uid: {0}")]
pub struct ParseUidError(String);

impl FromStr for Uid {
    type Err = ParseUidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseUidError(s.to_owned());
        let (manufacturer, device) = s.split_once(':').ok_or_else(invalid)?;
        let manufacturer = u16::from_str_radix(manufacturer.trim(), 16).map_err(|_| invalid())?;
        let device = u32::from_str_radix(device.trim(), 16).map_err(|_| invalid())?;
        Ok(Self::new(manufacturer, device))
    }
}
