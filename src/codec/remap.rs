//! Primitive and object substitution tables.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use super::{Context, FieldValue, Primitive, Result, Schema, Value, Wire};

/// Type-erased handle to a schema type's codec.
///
/// Lets descriptors and substitution tables refer to nested object types
/// without being generic over them.
#[derive(Clone, Copy)]
pub struct ObjectType {
    name: &'static str,
    id: TypeId,
    read: fn(&mut Context<'_>) -> Result<Value>,
    write: fn(&mut Context<'_>, Value) -> Result<()>,
    default: fn() -> Value,
}

impl ObjectType {
    /// Handle for `T`.
    #[must_use]
    pub fn of<T: Schema + Wire + FieldValue>() -> Self {
        Self {
            name: T::NAME,
            id: TypeId::of::<T>(),
            read: read_erased::<T>,
            write: write_erased::<T>,
            default: default_erased::<T>,
        }
    }

    /// Name of the type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Identity of the type.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Decode one instance and return it as a record value.
    pub fn read(&self, ctx: &mut Context<'_>) -> Result<Value> {
        (self.read)(ctx)
    }

    /// Convert `value` into this type by name and encode it.
    pub fn write(&self, ctx: &mut Context<'_>, value: Value) -> Result<()> {
        (self.write)(ctx, value)
    }

    /// Default instance as a record value.
    #[must_use]
    pub fn default_value(&self) -> Value {
        (self.default)()
    }
}

fn read_erased<T: Wire + FieldValue>(ctx: &mut Context<'_>) -> Result<Value> {
    T::decode_from(ctx).map(|value| value.to_value())
}

fn write_erased<T: Wire + FieldValue>(ctx: &mut Context<'_>, value: Value) -> Result<()> {
    T::from_value(value)?.encode_into(ctx)
}

fn default_erased<T: Schema + FieldValue>() -> Value {
    T::default().to_value()
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectType").field(&self.name).finish()
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectType {}

/// Substitution tables consulted during encode and decode.
///
/// Populated before a session starts and read-only afterwards. A primitive
/// entry changes the wire width of every field of that logical kind; an
/// object entry reads and writes a stand-in type and copies fields across
/// by name. Names present in only one of the two types are dropped.
#[derive(Debug, Clone, Default)]
pub struct Remapper {
    primitives: HashMap<Primitive, Primitive>,
    objects: HashMap<TypeId, ObjectType>,
}

impl Remapper {
    /// Empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Carry every `logical` primitive on the wire as `wire`.
    #[must_use]
    pub fn with_primitive(mut self, logical: Primitive, wire: Primitive) -> Self {
        self.primitives.insert(logical, wire);
        self
    }

    /// Carry every `T` on the wire as `S`.
    #[must_use]
    pub fn with_object<T: Schema, S: Schema + Wire + FieldValue>(mut self) -> Self {
        self.objects.insert(TypeId::of::<T>(), ObjectType::of::<S>());
        self
    }

    /// Wire substitute for a logical primitive.
    #[must_use]
    pub fn primitive(&self, logical: Primitive) -> Option<Primitive> {
        self.primitives.get(&logical).copied()
    }

    /// Stand-in for a logical object type.
    #[must_use]
    pub fn object(&self, logical: TypeId) -> Option<ObjectType> {
        self.objects.get(&logical).copied()
    }

    /// Returns true if neither table has entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty() && self.objects.is_empty()
    }
}
