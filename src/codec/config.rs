//! Session configuration

use std::sync::Arc;

use super::{Endianness, Remapper};

/// Text encoding applied to string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextEncoding {
    /// UTF-8; invalid sequences decode as U+FFFD
    #[default]
    Utf8,
    /// 7-bit ASCII; anything else becomes `?`
    Ascii,
    /// ISO-8859-1; characters above U+00FF encode as `?`
    Latin1,
}

impl TextEncoding {
    /// Decode bytes into text, replacing what cannot be represented.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { '?' })
                .collect(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }

    /// Encode text into bytes, replacing what cannot be represented.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Ascii => text
                .chars()
                .map(|c| u8::try_from(c).ok().filter(u8::is_ascii).unwrap_or(b'?'))
                .collect(),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(c).unwrap_or(b'?'))
                .collect(),
        }
    }
}

/// Policy shared by every encode and decode of a session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte order of multi-byte primitives
    pub endianness: Endianness,
    /// Active protocol version, compared against field version ranges
    pub version: f64,
    /// Encoding of string fields
    pub encoding: TextEncoding,
    /// Primitive and object substitution tables
    pub remap: Arc<Remapper>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endianness: Endianness::Little,
            version: 1.0,
            encoding: TextEncoding::Utf8,
            remap: Arc::new(Remapper::default()),
        }
    }
}

impl Config {
    /// Set the byte order.
    #[must_use]
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Set the session version.
    ///
    /// Versions are not validated. NaN lies outside every bounded range, so
    /// only ungated fields take part; a negative version falls below every
    /// lower bound.
    #[must_use]
    pub fn with_version(mut self, version: f64) -> Self {
        self.version = version;
        self
    }

    /// Set the string encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Install substitution tables.
    #[must_use]
    pub fn with_remapper(mut self, remap: Remapper) -> Self {
        self.remap = Arc::new(remap);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{VersionGate, VersionRange};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endianness, Endianness::Little);
        assert!((config.version - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_endianness(Endianness::Big)
            .with_version(2.5)
            .with_encoding(TextEncoding::Latin1);
        assert_eq!(config.endianness, Endianness::Big);
        assert!((config.version - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.encoding, TextEncoding::Latin1);
    }

    #[test]
    fn test_nan_version_closes_ranged_gates() {
        let config = Config::default().with_version(f64::NAN);
        assert!(!VersionRange::since(0.0).contains(config.version));
        assert!(!VersionRange::until(10.0).contains(config.version));
        assert!(VersionGate::Always.is_open(config.version));
    }

    #[test]
    fn test_ascii_replaces_non_ascii() {
        assert_eq!(TextEncoding::Ascii.encode("caf\u{e9}"), b"caf?");
        assert_eq!(TextEncoding::Ascii.decode(&[0x41, 0xE9]), "A?");
    }

    #[test]
    fn test_latin1_round_trip() {
        let bytes = TextEncoding::Latin1.encode("caf\u{e9}");
        assert_eq!(bytes, [0x63, 0x61, 0x66, 0xE9]);
        assert_eq!(TextEncoding::Latin1.decode(&bytes), "caf\u{e9}");
        assert_eq!(TextEncoding::Latin1.encode("\u{263A}"), b"?");
    }

    #[test]
    fn test_utf8_decode_is_lossy() {
        assert_eq!(TextEncoding::Utf8.decode(&[0x48, 0xFF]), "H\u{FFFD}");
    }
}
