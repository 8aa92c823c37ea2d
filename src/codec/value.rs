//! Dynamic field values and the conversions between them.
//!
//! Generated schema code moves field contents in and out of objects as
//! [`Value`]s. Conversions between primitive kinds follow one rule set,
//! shared by primitive substitution and by-name object mapping.

use std::fmt;

use super::{Error, Result};

/// Closed set of primitive kinds the engine has codecs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    /// One byte, non-zero is true
    Bool,
    /// Unsigned 8-bit integer
    U8,
    /// Signed 8-bit integer
    I8,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 16-bit integer
    I16,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 64-bit integer
    U64,
    /// Signed 64-bit integer
    I64,
    /// IEEE 754 single precision
    F32,
    /// IEEE 754 double precision
    F64,
}

impl Primitive {
    /// Encoded width in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Returns true for the integer kinds.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Bool | Self::F32 | Self::F64)
    }

    /// The zero value of this kind.
    #[must_use]
    pub const fn zero(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::U8 => Value::U8(0),
            Self::I8 => Value::I8(0),
            Self::U16 => Value::U16(0),
            Self::I16 => Value::I16(0),
            Self::U32 => Value::U32(0),
            Self::I32 => Value::I32(0),
            Self::U64 => Value::U64(0),
            Self::I64 => Value::I64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field value detached from its owning object.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Signed 8-bit integer
    I8(i8),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Signed 16-bit integer
    I16(i16),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 32-bit integer
    I32(i32),
    /// Unsigned 64-bit integer
    U64(u64),
    /// Signed 64-bit integer
    I64(i64),
    /// Single precision float
    F32(f32),
    /// Double precision float
    F64(f64),
    /// Text
    Str(String),
    /// Sequence of element values
    Array(Vec<Value>),
    /// Nested object, fields keyed by name
    Record(Record),
}

impl Value {
    /// Short description of the value's kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Record(record) => record.name(),
            other => other.primitive().map_or("value", Primitive::name),
        }
    }

    /// The primitive kind, if this is a primitive value.
    #[must_use]
    pub const fn primitive(&self) -> Option<Primitive> {
        Some(match self {
            Self::Bool(_) => Primitive::Bool,
            Self::U8(_) => Primitive::U8,
            Self::I8(_) => Primitive::I8,
            Self::U16(_) => Primitive::U16,
            Self::I16(_) => Primitive::I16,
            Self::U32(_) => Primitive::U32,
            Self::I32(_) => Primitive::I32,
            Self::U64(_) => Primitive::U64,
            Self::I64(_) => Primitive::I64,
            Self::F32(_) => Primitive::F32,
            Self::F64(_) => Primitive::F64,
            Self::Str(_) | Self::Array(_) | Self::Record(_) => return None,
        })
    }

    /// Integer view of the value.
    ///
    /// Floats round half to even, strings are parsed. Non-finite floats,
    /// unparsable strings, arrays and records have no integer view.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Bool(v) => Some(i128::from(*v)),
            Self::U8(v) => Some(i128::from(*v)),
            Self::I8(v) => Some(i128::from(*v)),
            Self::U16(v) => Some(i128::from(*v)),
            Self::I16(v) => Some(i128::from(*v)),
            Self::U32(v) => Some(i128::from(*v)),
            Self::I32(v) => Some(i128::from(*v)),
            Self::U64(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            Self::F32(v) => round_float(f64::from(*v)),
            Self::F64(v) => round_float(*v),
            Self::Str(s) => {
                let s = s.trim();
                s.parse::<i128>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(round_float))
            }
            Self::Array(_) | Self::Record(_) => None,
        }
    }

    /// Floating point view of the value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Array(_) | Self::Record(_) => None,
            other => other.as_i128().map(|v| v as f64),
        }
    }

    /// Element count view, for values used as array or string lengths.
    #[must_use]
    pub fn as_length(&self) -> Option<usize> {
        self.as_i128().and_then(|v| usize::try_from(v).ok())
    }

    /// Text view: strings as-is, primitives formatted.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Bool(v) => Some(v.to_string()),
            Self::Array(_) | Self::Record(_) => None,
            Self::F32(v) => Some(v.to_string()),
            Self::F64(v) => Some(v.to_string()),
            other => other.as_i128().map(|v| v.to_string()),
        }
    }

    /// Convert into the given primitive kind.
    ///
    /// Integers convert when the target can hold them, floats round half to
    /// even, strings are parsed. Anything else fails with
    /// [`Error::IncompatibleMapping`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn coerce(self, target: Primitive) -> Result<Self> {
        if self.primitive() == Some(target) {
            return Ok(self);
        }

        let converted = match target {
            Primitive::Bool => self.as_bool().map(Self::Bool),
            Primitive::U8 => self.narrow().map(Self::U8),
            Primitive::I8 => self.narrow().map(Self::I8),
            Primitive::U16 => self.narrow().map(Self::U16),
            Primitive::I16 => self.narrow().map(Self::I16),
            Primitive::U32 => self.narrow().map(Self::U32),
            Primitive::I32 => self.narrow().map(Self::I32),
            Primitive::U64 => self.narrow().map(Self::U64),
            Primitive::I64 => self.narrow().map(Self::I64),
            Primitive::F32 => self.as_f64().map(|v| Self::F32(v as f32)),
            Primitive::F64 => self.as_f64().map(Self::F64),
        };

        converted.ok_or_else(|| Error::mapping(self.kind(), target.name()))
    }

    fn as_bool(&self) -> Option<bool> {
        if let Self::Str(s) = self {
            if let Ok(flag) = s.trim().parse::<bool>() {
                return Some(flag);
            }
        }
        self.as_f64().map(|v| v != 0.0)
    }

    fn narrow<T: TryFrom<i128>>(&self) -> Option<T> {
        self.as_i128().and_then(|v| T::try_from(v).ok())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_float(v: f64) -> Option<i128> {
    if !v.is_finite() {
        return None;
    }
    let rounded = v.round_ties_even();
    // i128 covers every integer primitive; out-of-range floats have no view
    if rounded.abs() >= 1.7e38 {
        return None;
    }
    Some(rounded as i128)
}

/// Named field values of one object, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    name: &'static str,
    entries: Vec<(&'static str, Value)>,
}

impl Record {
    /// Create an empty record for the named type.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    /// Name of the type the record was taken from.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Append a field value.
    pub fn push(&mut self, field: &'static str, value: Value) {
        self.entries.push((field, value));
    }

    /// Look up a field value by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the record holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|(name, value)| (*name, value))
    }
}

impl IntoIterator for Record {
    type Item = (&'static str, Value);
    type IntoIter = std::vec::IntoIter<(&'static str, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Conversion between a Rust field type and a [`Value`].
pub trait FieldValue: Sized {
    /// Snapshot the field as a value.
    fn to_value(&self) -> Value;

    /// Rebuild the field from a value, converting where possible.
    fn from_value(value: Value) -> Result<Self>;
}

/// Field types that map onto exactly one [`Primitive`].
pub trait PrimitiveValue: FieldValue + Copy {
    /// Primitive kind of this type
    const PRIMITIVE: Primitive;
}

/// Enumerations carried on the wire as their underlying integer.
pub trait WireEnum: FieldValue {
    /// Underlying representation; only integer kinds have a codec
    const REPR: Primitive;
}

macro_rules! primitive_values {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value.coerce(Primitive::$variant)? {
                        Value::$variant(v) => Ok(v),
                        other => Err(Error::mapping(other.kind(), stringify!($ty))),
                    }
                }
            }

            impl PrimitiveValue for $ty {
                const PRIMITIVE: Primitive = Primitive::$variant;
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )+
    };
}

primitive_values! {
    bool => Bool,
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => other
                .to_text()
                .ok_or_else(|| Error::mapping(other.kind(), "string")),
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(Error::mapping(other.kind(), "array")),
        }
    }
}

/// Fixed-size arrays accept shorter inputs and default-fill the tail.
impl<T: FieldValue + Default + Copy, const N: usize> FieldValue for [T; N] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(Error::mapping(other.kind(), format!("[_; {N}]"))),
        };
        if items.len() > N {
            return Err(Error::mapping(
                format!("array of {}", items.len()),
                format!("[_; {N}]"),
            ));
        }
        let mut out = [T::default(); N];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = T::from_value(item)?;
        }
        Ok(out)
    }
}
