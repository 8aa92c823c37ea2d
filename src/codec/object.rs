//! Object graph reader and writer, and the lockable session.

use std::any::TypeId;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use super::resolver::{read_field, read_scalar, write_field, write_scalar};
use super::{
    Config, Cursor, Endianness, Error, FieldValue, PrimitiveValue, Result, Schema, describe,
};

/// Cursor plus policy for one encode or decode pass.
pub struct Context<'s> {
    pub(crate) cursor: &'s mut Cursor,
    pub(crate) config: &'s Config,
    /// Logical types currently carried through a session stand-in.
    substituting: Vec<TypeId>,
}

impl<'s> Context<'s> {
    /// Pair a cursor with a configuration.
    pub fn new(cursor: &'s mut Cursor, config: &'s Config) -> Self {
        Self {
            cursor,
            config,
            substituting: Vec::new(),
        }
    }

    /// Run `f` with `T` marked as substituted.
    ///
    /// Fails with `InvalidConfiguration` if `T` is already being substituted,
    /// which happens when the session's object mappings form a cycle.
    fn substitute<T: Schema, R>(
        &mut self,
        stand_in: &'static str,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let id = TypeId::of::<T>();
        if self.substituting.contains(&id) {
            return Err(Error::invalid(
                T::NAME,
                format!("object mapping through {stand_in} leads back to {}", T::NAME),
            ));
        }
        self.substituting.push(id);
        let result = f(self);
        self.substituting.pop();
        result
    }

    /// Underlying cursor.
    pub fn cursor(&mut self) -> &mut Cursor {
        &mut *self.cursor
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        self.config
    }
}

/// Types the engine can encode and decode.
///
/// Primitives and strings have built-in implementations; schema types get
/// theirs from [`wire_schema!`](crate::wire_schema).
pub trait Wire: Sized {
    /// Decode a value at the cursor.
    fn decode_from(ctx: &mut Context<'_>) -> Result<Self>;

    /// Encode the value at the cursor.
    fn encode_into(&self, ctx: &mut Context<'_>) -> Result<()>;
}

macro_rules! primitive_wire {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Wire for $ty {
                fn decode_from(ctx: &mut Context<'_>) -> Result<Self> {
                    let value = read_scalar(ctx, <$ty as PrimitiveValue>::PRIMITIVE, None)?;
                    <$ty as FieldValue>::from_value(value)
                }

                fn encode_into(&self, ctx: &mut Context<'_>) -> Result<()> {
                    write_scalar(ctx, <$ty as PrimitiveValue>::PRIMITIVE, None, self.to_value())
                }
            }
        )+
    };
}

primitive_wire!(bool, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Strings stand alone as zero-terminated text.
impl Wire for String {
    fn decode_from(ctx: &mut Context<'_>) -> Result<Self> {
        let bytes = ctx.cursor.read_terminated()?;
        Ok(ctx.config.encoding.decode(bytes))
    }

    fn encode_into(&self, ctx: &mut Context<'_>) -> Result<()> {
        let bytes = ctx.config.encoding.encode(self);
        ctx.cursor.write_bytes(&bytes);
        ctx.cursor.write_u8(0);
        Ok(())
    }
}

/// Decode a schema type field by field.
///
/// If the session maps `T` to a stand-in, the stand-in is decoded instead
/// and its fields are copied into `T` by name.
pub fn read_object<T: Schema + FieldValue>(ctx: &mut Context<'_>) -> Result<T> {
    if let Some(stand_in) = ctx.config.remap.object(TypeId::of::<T>()) {
        if stand_in.id() != TypeId::of::<T>() {
            trace!(schema = T::NAME, stand_in = stand_in.name(), "decoding through stand-in");
            let value = ctx.substitute::<T, _>(stand_in.name(), |ctx| stand_in.read(ctx))?;
            return T::from_value(value);
        }
    }

    let mut target = T::default();
    for field in describe::<T>().fields() {
        if !field.gate().is_open(ctx.config.version) {
            trace!(schema = T::NAME, field = field.name(), "field gated out");
            continue;
        }
        read_field(&mut target, field, ctx)?;
    }
    Ok(target)
}

/// Encode a schema type field by field.
///
/// If the session maps `T` to a stand-in, `value` is copied into the
/// stand-in by name and the stand-in is encoded instead.
pub fn write_object<T: Schema + FieldValue>(value: &T, ctx: &mut Context<'_>) -> Result<()> {
    if let Some(stand_in) = ctx.config.remap.object(TypeId::of::<T>()) {
        if stand_in.id() != TypeId::of::<T>() {
            trace!(schema = T::NAME, stand_in = stand_in.name(), "encoding through stand-in");
            return ctx.substitute::<T, _>(stand_in.name(), |ctx| {
                stand_in.write(ctx, value.to_value())
            });
        }
    }

    for field in describe::<T>().fields() {
        if !field.gate().is_open(ctx.config.version) {
            trace!(schema = T::NAME, field = field.name(), "field gated out");
            continue;
        }
        write_field(value, field, ctx)?;
    }
    Ok(())
}

/// A buffer and its policy, reusable across many operations.
///
/// Positional operations take `&mut self` and run without locking; the
/// borrow already rules out concurrent use. Addressed operations take
/// `&self`, seek and run under the session's lock, so threads sharing one
/// session cannot interleave a seek with another thread's read or write.
/// The position is left after the last value; it is never restored.
#[derive(Debug)]
pub struct Session {
    cursor: Mutex<Cursor>,
    config: Config,
}

impl Session {
    /// Session over existing bytes, positioned at the start.
    #[must_use]
    pub fn reader(bytes: impl Into<Vec<u8>>, config: Config) -> Self {
        let cursor = Cursor::from_bytes(bytes, config.endianness);
        Self {
            cursor: Mutex::new(cursor),
            config,
        }
    }

    /// Session over an empty, growable buffer.
    #[must_use]
    pub fn writer(config: Config) -> Self {
        Self::reader(Vec::new(), config)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.lock().position()
    }

    /// Bytes left after the position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lock().remaining()
    }

    /// Move to an absolute position.
    pub fn seek(&mut self, addr: usize) -> Result<()> {
        self.cursor_mut().seek(addr)
    }

    /// Change the byte order for subsequent operations.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.config.endianness = endianness;
        self.cursor_mut().set_endianness(endianness);
    }

    /// Decode a value at the current position.
    pub fn decode<T: Wire>(&mut self) -> Result<T> {
        let cursor = self
            .cursor
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        T::decode_from(&mut Context::new(cursor, &self.config))
    }

    /// Encode a value at the current position.
    pub fn encode<T: Wire>(&mut self, value: &T) -> Result<()> {
        let cursor = self
            .cursor
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        value.encode_into(&mut Context::new(cursor, &self.config))
    }

    /// Seek to `addr` and decode a value, under the session lock.
    pub fn decode_at<T: Wire>(&self, addr: usize) -> Result<T> {
        let mut cursor = self.lock();
        cursor.seek(addr)?;
        T::decode_from(&mut Context::new(&mut cursor, &self.config))
    }

    /// Seek to `addr` and encode a value, under the session lock.
    pub fn encode_at<T: Wire>(&self, addr: usize, value: &T) -> Result<()> {
        let mut cursor = self.lock();
        cursor.seek(addr)?;
        value.encode_into(&mut Context::new(&mut cursor, &self.config))
    }

    /// Seek to `addr` and copy out `len` raw bytes, under the session lock.
    pub fn read_bytes_at(&self, addr: usize, len: usize) -> Result<Vec<u8>> {
        let mut cursor = self.lock();
        cursor.read_bytes_at(addr, len).map(<[u8]>::to_vec)
    }

    /// Seek to `addr` and write raw bytes, under the session lock.
    pub fn write_bytes_at(&self, addr: usize, bytes: &[u8]) -> Result<()> {
        self.lock().write_bytes_at(addr, bytes)
    }

    /// Consume the session and return its buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.cursor
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_inner()
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        self.cursor.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    // The guarded state is plain bytes and a position, both valid after a
    // panic mid-operation, so a poisoned lock is recovered.
    fn lock(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Field, Primitive, Remapper};

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i16,
        y: i16,
    }

    crate::wire_schema! {
        Point {
            x: Field::i16(),
            y: Field::i16(),
        }
    }

    #[test]
    fn test_primitive_wire_honors_session_table() {
        let config = Config::default()
            .with_remapper(Remapper::new().with_primitive(Primitive::U32, Primitive::U8));
        let mut session = Session::writer(config);
        session.encode(&7u32).unwrap();
        session.encode(&0x0102u16).unwrap();
        assert_eq!(session.into_bytes(), [7, 0x02, 0x01]);
    }

    #[test]
    fn test_string_wire_is_terminated() {
        let mut session = Session::writer(Config::default());
        session.encode(&String::from("Hi")).unwrap();
        assert_eq!(session.position(), 3);
        session.seek(0).unwrap();
        assert_eq!(session.decode::<String>().unwrap(), "Hi");
    }

    #[test]
    fn test_addressed_decode_leaves_position_after_value() {
        let session = Session::reader(vec![0, 0, 1, 0, 2, 0], Config::default());
        let point: Point = session.decode_at(2).unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
        assert_eq!(session.position(), 6);
        assert_eq!(session.remaining(), 0);
    }

    #[test]
    fn test_addressed_encode_overwrites_in_place() {
        let session = Session::reader(vec![0xFF; 6], Config::default());
        session.encode_at(1, &Point { x: -1, y: 0x0203 }).unwrap();
        assert_eq!(session.read_bytes_at(0, 6).unwrap(), [0xFF, 0xFF, 0xFF, 0x03, 0x02, 0xFF]);
        session.write_bytes_at(5, &[0xAA, 0xBB]).unwrap();
        assert_eq!(session.into_bytes(), [0xFF, 0xFF, 0xFF, 0x03, 0x02, 0xAA, 0xBB]);
    }

    #[test]
    fn test_addressed_read_out_of_range() {
        let session = Session::reader(vec![0; 3], Config::default());
        assert!(session.decode_at::<Point>(2).is_err());
        assert!(session.decode_at::<Point>(4).is_err());
    }

    #[test]
    fn test_set_endianness_applies_to_following_ops() {
        let mut session = Session::writer(Config::default());
        session.encode(&0x0102u16).unwrap();
        session.set_endianness(Endianness::Big);
        session.encode(&0x0102u16).unwrap();
        assert_eq!(session.config().endianness, Endianness::Big);
        assert_eq!(session.into_bytes(), [0x02, 0x01, 0x01, 0x02]);
    }

    #[test]
    fn test_concurrent_addressed_reads() {
        let mut bytes = Vec::new();
        for i in 0..64i16 {
            bytes.extend_from_slice(&i.to_le_bytes());
            bytes.extend_from_slice(&(-i).to_le_bytes());
        }
        let session = Session::reader(bytes, Config::default());

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let session = &session;
                scope.spawn(move || {
                    for round in 0..200 {
                        let i = (worker * 13 + round) % 64;
                        let point: Point = session.decode_at(i * 4).unwrap();
                        assert_eq!(point.x, i16::try_from(i).unwrap());
                        assert_eq!(point.y, -point.x);
                    }
                });
            }
        });
    }
}
