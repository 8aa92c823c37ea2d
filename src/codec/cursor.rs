//! Seekable byte buffer with endian-aware primitive access.

use std::fmt;

use super::{Error, Result};

/// Byte order applied to multi-byte primitives.
///
/// Little endian is the transmission order of the buffer; big endian
/// reverses every 16, 32 and 64-bit value on the way in and out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endianness {
    /// Least significant byte first
    #[default]
    Little,
    /// Most significant byte first
    Big,
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Little => f.write_str("little"),
            Self::Big => f.write_str("big"),
        }
    }
}

/// Growable byte buffer with a current position.
///
/// Reads are bounds checked and fail with [`Error::OutOfRange`]. Writes
/// overwrite bytes under the position and extend the buffer past its end.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    buf: Vec<u8>,
    pos: usize,
    endianness: Endianness,
}

macro_rules! endian_ops {
    ($($ty:ty => $read:ident, $write:ident, $read_at:ident, $write_at:ident;)+) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` honoring the cursor endianness.")]
            pub fn $read(&mut self) -> Result<$ty> {
                let raw = self.take::<{ size_of::<$ty>() }>()?;
                Ok(match self.endianness {
                    Endianness::Little => <$ty>::from_le_bytes(raw),
                    Endianness::Big => <$ty>::from_be_bytes(raw),
                })
            }

            #[doc = concat!("Write a `", stringify!($ty), "` honoring the cursor endianness.")]
            pub fn $write(&mut self, value: $ty) {
                match self.endianness {
                    Endianness::Little => self.put(&value.to_le_bytes()),
                    Endianness::Big => self.put(&value.to_be_bytes()),
                }
            }

            #[doc = concat!("Seek to `addr` and read a `", stringify!($ty), "`.")]
            ///
            /// The cursor stays after the value; the previous position is not restored.
            pub fn $read_at(&mut self, addr: usize) -> Result<$ty> {
                self.seek(addr)?;
                self.$read()
            }

            #[doc = concat!("Seek to `addr` and write a `", stringify!($ty), "`.")]
            ///
            /// The cursor stays after the value; the previous position is not restored.
            pub fn $write_at(&mut self, addr: usize, value: $ty) -> Result<()> {
                self.seek(addr)?;
                self.$write(value);
                Ok(())
            }
        )+
    };
}

impl Cursor {
    /// Create an empty cursor for writing.
    #[must_use]
    pub const fn new(endianness: Endianness) -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            endianness,
        }
    }

    /// Wrap existing bytes, positioned at the start.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, endianness: Endianness) -> Self {
        Self {
            buf: bytes.into(),
            pos: 0,
            endianness,
        }
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute position. Seeking to the end is allowed.
    pub fn seek(&mut self, addr: usize) -> Result<()> {
        if addr > self.buf.len() {
            return Err(Error::OutOfRange {
                offset: addr,
                needed: 0,
                len: self.buf.len(),
            });
        }
        self.pos = addr;
        Ok(())
    }

    /// Active byte order.
    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Change the byte order for subsequent operations.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Total buffer length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left between the position and the end.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Whole buffer contents.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the cursor and return its buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// Read `len` raw bytes. Byte order is never applied to raw runs.
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        let start = self.pos;
        self.check(len)?;
        self.pos += len;
        Ok(&self.buf[start..start + len])
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.put(bytes);
    }

    /// Write `len` zero bytes.
    pub fn write_zeros(&mut self, len: usize) {
        self.put(&vec![0; len]);
    }

    /// Seek to `addr` and read `len` raw bytes.
    pub fn read_bytes_at(&mut self, addr: usize, len: usize) -> Result<&[u8]> {
        self.seek(addr)?;
        self.read_bytes(len)
    }

    /// Seek to `addr` and write raw bytes.
    pub fn write_bytes_at(&mut self, addr: usize, bytes: &[u8]) -> Result<()> {
        self.seek(addr)?;
        self.put(bytes);
        Ok(())
    }

    /// Read bytes up to a zero terminator, consuming the terminator.
    ///
    /// The returned slice excludes the terminator. A buffer that ends before
    /// a zero byte is found fails with [`Error::OutOfRange`].
    pub fn read_terminated(&mut self) -> Result<&[u8]> {
        let start = self.pos;
        let Some(end) = self.buf[start..].iter().position(|&b| b == 0) else {
            return Err(Error::OutOfRange {
                offset: start,
                needed: self.remaining() + 1,
                len: self.buf.len(),
            });
        };
        self.pos = start + end + 1;
        Ok(&self.buf[start..start + end])
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    /// Write one byte.
    pub fn write_u8(&mut self, value: u8) {
        self.put(&[value]);
    }

    /// Read one signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_ne_bytes(self.take::<1>()?))
    }

    /// Write one signed byte.
    pub fn write_i8(&mut self, value: i8) {
        self.put(&value.to_ne_bytes());
    }

    /// Read a boolean stored as one byte; any non-zero value is true.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Write a boolean as one byte.
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// Seek to `addr` and read one byte.
    pub fn read_u8_at(&mut self, addr: usize) -> Result<u8> {
        self.seek(addr)?;
        self.read_u8()
    }

    /// Seek to `addr` and write one byte.
    pub fn write_u8_at(&mut self, addr: usize, value: u8) -> Result<()> {
        self.seek(addr)?;
        self.write_u8(value);
        Ok(())
    }

    endian_ops! {
        u16 => read_u16, write_u16, read_u16_at, write_u16_at;
        i16 => read_i16, write_i16, read_i16_at, write_i16_at;
        u32 => read_u32, write_u32, read_u32_at, write_u32_at;
        i32 => read_i32, write_i32, read_i32_at, write_i32_at;
        u64 => read_u64, write_u64, read_u64_at, write_u64_at;
        i64 => read_i64, write_i64, read_i64_at, write_i64_at;
        f32 => read_f32, write_f32, read_f32_at, write_f32_at;
        f64 => read_f64, write_f64, read_f64_at, write_f64_at;
    }

    fn check(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(Error::OutOfRange {
                offset: self.pos,
                needed,
                len: self.buf.len(),
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_little_endian_layout() {
        let mut cursor = Cursor::new(Endianness::Little);
        cursor.write_u32(0x0102_0304);
        assert_eq!(cursor.as_slice(), &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_u32_big_endian_layout() {
        let mut cursor = Cursor::new(Endianness::Big);
        cursor.write_u32(0x0102_0304);
        assert_eq!(cursor.as_slice(), &[0x01, 0x02, 0x03, 0x04]);

        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_u32().unwrap(), 0x0102_0304);
    }

    #[test]
    fn test_single_bytes_ignore_endianness() {
        let mut cursor = Cursor::new(Endianness::Big);
        cursor.write_u8(0xAB);
        cursor.write_i8(-2);
        cursor.write_bool(true);
        assert_eq!(cursor.as_slice(), &[0xAB, 0xFE, 0x01]);
    }

    #[test]
    fn test_read_past_end_is_out_of_range() {
        let mut cursor = Cursor::from_bytes(vec![1, 2, 3], Endianness::Little);
        let err = cursor.read_u32().unwrap_err();
        assert_eq!(
            err,
            Error::OutOfRange {
                offset: 0,
                needed: 4,
                len: 3
            }
        );
        // a failed read does not move the cursor
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_seek_past_end_is_out_of_range() {
        let mut cursor = Cursor::from_bytes(vec![0; 4], Endianness::Little);
        assert!(cursor.seek(4).is_ok());
        assert!(matches!(cursor.seek(5), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_addressed_ops_do_not_restore_position() {
        let mut cursor = Cursor::from_bytes(vec![0; 8], Endianness::Little);
        cursor.write_u16_at(4, 0xBEEF).unwrap();
        assert_eq!(cursor.position(), 6);
        assert_eq!(cursor.read_u16_at(4).unwrap(), 0xBEEF);
        assert_eq!(cursor.position(), 6);
        assert_eq!(cursor.as_slice()[4..6], [0xEF, 0xBE]);
    }

    #[test]
    fn test_write_overwrites_then_extends() {
        let mut cursor = Cursor::from_bytes(vec![9, 9, 9], Endianness::Little);
        cursor.seek(2).unwrap();
        cursor.write_u16(0x0201);
        assert_eq!(cursor.as_slice(), &[9, 9, 1, 2]);
    }

    #[test]
    fn test_read_terminated() {
        let mut cursor = Cursor::from_bytes(b"Hi\0rest".to_vec(), Endianness::Little);
        assert_eq!(cursor.read_terminated().unwrap(), b"Hi");
        assert_eq!(cursor.position(), 3);
        assert!(matches!(
            cursor.read_terminated(),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_float_round_trip_big_endian() {
        let mut cursor = Cursor::new(Endianness::Big);
        cursor.write_f64(-1.5);
        cursor.write_f32(0.25);
        cursor.seek(0).unwrap();
        assert!((cursor.read_f64().unwrap() + 1.5).abs() < f64::EPSILON);
        assert!((cursor.read_f32().unwrap() - 0.25).abs() < f32::EPSILON);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_i64_round_trip(value: i64, big: bool) {
                let endianness = if big { Endianness::Big } else { Endianness::Little };
                let mut cursor = Cursor::new(endianness);
                cursor.write_i64(value);
                cursor.seek(0).unwrap();
                prop_assert_eq!(cursor.read_i64().unwrap(), value);
            }

            #[test]
            fn prop_big_endian_reverses_little(value: u32) {
                let mut little = Cursor::new(Endianness::Little);
                let mut big = Cursor::new(Endianness::Big);
                little.write_u32(value);
                big.write_u32(value);
                let mut reversed = little.into_inner();
                reversed.reverse();
                prop_assert_eq!(reversed, big.into_inner());
            }
        }
    }
}
