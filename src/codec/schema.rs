//! Schema descriptors and the process-wide descriptor cache.
//!
//! A schema type lists its fields once, in declaration order, through the
//! [`wire_schema!`](crate::wire_schema) macro. The first encode or decode
//! of the type builds an immutable [`SchemaDescriptor`] from that list and
//! publishes it in a global cache; later lookups read it without locking.

use std::any::TypeId;
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::debug;

use super::{
    FieldValue, ObjectType, Primitive, PrimitiveValue, Record, Result, Value, VersionGate,
    VersionRange, Wire, WireEnum,
};

/// Where an array or string field takes its element count from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthSource {
    /// Literal size
    Fixed(usize),
    /// Current value of a sibling field or computed property
    Field(&'static str),
}

/// Element type of an array field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Element {
    /// Primitive elements
    Primitive(Primitive),
    /// Nested objects
    Object(ObjectType),
}

/// Byte-level strategy for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Single primitive value
    Primitive(Primitive),
    /// Enumeration carried as its underlying integer
    Enum(Primitive),
    /// String occupying exactly the resolved number of bytes, zero padded
    FixedString(LengthSource),
    /// String followed by one zero byte
    TerminatedString,
    /// Array with a literal element count
    FixedArray {
        /// Element type
        element: Element,
        /// Element count
        len: usize,
    },
    /// Array whose element count is read from a sibling field or property
    ReferencedArray {
        /// Element type
        element: Element,
        /// Name of the field or property holding the count
        source: &'static str,
    },
    /// Nested object
    Object(ObjectType),
}

/// Builder for a [`FieldDescriptor`].
///
/// Used inside [`wire_schema!`](crate::wire_schema) blocks:
///
/// ```rust,ignore
/// count: Field::u8(),
/// data: Field::bytes_by("count").since(2.0),
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct Field {
    kind: FieldKind,
    gate: VersionGate,
    primitive_override: Option<Primitive>,
    object_override: Option<ObjectType>,
}

macro_rules! primitive_fields {
    ($($name:ident => $variant:ident),+ $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($name), "` field.")]
            pub const fn $name() -> Self {
                Self::new(FieldKind::Primitive(Primitive::$variant))
            }
        )+
    };
}

impl Field {
    /// Field with the given strategy, always active, no overrides.
    pub const fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            gate: VersionGate::Always,
            primitive_override: None,
            object_override: None,
        }
    }

    primitive_fields! {
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

    /// Primitive field of type `T`.
    pub const fn primitive<T: PrimitiveValue>() -> Self {
        Self::new(FieldKind::Primitive(T::PRIMITIVE))
    }

    /// Enumeration field carried as `E`'s underlying integer.
    pub const fn enumeration<E: WireEnum>() -> Self {
        Self::new(FieldKind::Enum(E::REPR))
    }

    /// String of exactly `len` bytes.
    pub const fn fixed_string(len: usize) -> Self {
        Self::new(FieldKind::FixedString(LengthSource::Fixed(len)))
    }

    /// String whose byte length is held by a sibling field or property.
    pub const fn string_by(source: &'static str) -> Self {
        Self::new(FieldKind::FixedString(LengthSource::Field(source)))
    }

    /// Zero-terminated string.
    pub const fn terminated_string() -> Self {
        Self::new(FieldKind::TerminatedString)
    }

    /// `len` raw bytes.
    pub const fn bytes(len: usize) -> Self {
        Self::array::<u8>(len)
    }

    /// Raw bytes counted by a sibling field or property.
    pub const fn bytes_by(source: &'static str) -> Self {
        Self::array_by::<u8>(source)
    }

    /// Array of `len` primitives.
    pub const fn array<T: PrimitiveValue>(len: usize) -> Self {
        Self::new(FieldKind::FixedArray {
            element: Element::Primitive(T::PRIMITIVE),
            len,
        })
    }

    /// Array of primitives counted by a sibling field or property.
    pub const fn array_by<T: PrimitiveValue>(source: &'static str) -> Self {
        Self::new(FieldKind::ReferencedArray {
            element: Element::Primitive(T::PRIMITIVE),
            source,
        })
    }

    /// Nested object of type `T`.
    pub fn object<T: Schema + Wire + FieldValue>() -> Self {
        Self::new(FieldKind::Object(ObjectType::of::<T>()))
    }

    /// Array of `len` nested objects.
    pub fn object_array<T: Schema + Wire + FieldValue>(len: usize) -> Self {
        Self::new(FieldKind::FixedArray {
            element: Element::Object(ObjectType::of::<T>()),
            len,
        })
    }

    /// Array of nested objects counted by a sibling field or property.
    pub fn object_array_by<T: Schema + Wire + FieldValue>(source: &'static str) -> Self {
        Self::new(FieldKind::ReferencedArray {
            element: Element::Object(ObjectType::of::<T>()),
            source,
        })
    }

    /// Restrict the field to the given version ranges.
    pub fn versions(mut self, ranges: impl IntoIterator<Item = VersionRange>) -> Self {
        for range in ranges {
            self.gate.push(range);
        }
        self
    }

    /// Present from version `min` on.
    pub fn since(self, min: f64) -> Self {
        self.versions([VersionRange::since(min)])
    }

    /// Present up to and including version `max`.
    pub fn until(self, max: f64) -> Self {
        self.versions([VersionRange::until(max)])
    }

    /// Present within `[min, max]`.
    pub fn between(self, min: f64, max: f64) -> Self {
        self.versions([VersionRange::between(min, max)])
    }

    /// Never read or written; the field keeps its default on decode.
    pub fn skip(mut self) -> Self {
        self.gate = VersionGate::Never;
        self
    }

    /// Carry the value on the wire as a different primitive.
    pub fn wire_as(mut self, primitive: Primitive) -> Self {
        self.primitive_override = Some(primitive);
        self
    }

    /// Read and write nested objects as `S`, copying fields across by name.
    pub fn stand_in<S: Schema + Wire + FieldValue>(mut self) -> Self {
        self.object_override = Some(ObjectType::of::<S>());
        self
    }

    /// Finish the descriptor under the given field name.
    #[must_use]
    pub fn named(self, name: &'static str) -> FieldDescriptor {
        FieldDescriptor {
            name,
            kind: self.kind,
            gate: self.gate,
            primitive_override: self.primitive_override,
            object_override: self.object_override,
        }
    }
}

/// Immutable metadata for one field of a schema type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: &'static str,
    kind: FieldKind,
    gate: VersionGate,
    primitive_override: Option<Primitive>,
    object_override: Option<ObjectType>,
}

impl FieldDescriptor {
    /// Field name, unique within its owner.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Byte-level strategy.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Version gate.
    #[must_use]
    pub const fn gate(&self) -> &VersionGate {
        &self.gate
    }

    /// Wire primitive replacing the logical one, if any.
    #[must_use]
    pub const fn primitive_override(&self) -> Option<Primitive> {
        self.primitive_override
    }

    /// Stand-in object type, if any.
    #[must_use]
    pub const fn object_override(&self) -> Option<ObjectType> {
        self.object_override
    }
}

/// Ordered field list of one schema type.
#[derive(Debug, PartialEq)]
pub struct SchemaDescriptor {
    type_name: &'static str,
    type_id: TypeId,
    fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    /// Name of the described type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Identity of the described type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A type whose layout is described by an ordered field list.
///
/// Implemented by [`wire_schema!`](crate::wire_schema); hand-written
/// implementations must keep `fields`, `get` and `set` in agreement.
pub trait Schema: Default + 'static {
    /// Type name used in descriptors and error messages
    const NAME: &'static str;

    /// Field list in declaration order.
    fn fields() -> Vec<FieldDescriptor>;

    /// Current value of a field.
    fn get(&self, field: &str) -> Option<Value>;

    /// Replace a field's value. Returns `false` for unknown names.
    fn set(&mut self, field: &str, value: Value) -> Result<bool>;

    /// Computed property usable as a length source.
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Snapshot every field by name.
    fn to_record(&self) -> Record {
        let mut record = Record::new(Self::NAME);
        for field in describe::<Self>().fields() {
            if let Some(value) = self.get(field.name()) {
                record.push(field.name(), value);
            }
        }
        record
    }

    /// Build a value from a record by name.
    ///
    /// Fields missing from the record keep their defaults and record entries
    /// with no matching field are dropped.
    fn from_record(record: Record) -> Result<Self> {
        let mut out = Self::default();
        for (name, value) in record {
            out.set(name, value)?;
        }
        Ok(out)
    }
}

/// Return the cached descriptor for `T`, building it on first use.
pub fn describe<T: Schema>() -> &'static SchemaDescriptor {
    let type_id = TypeId::of::<T>();
    if let Some(found) = CACHE.find(type_id) {
        return found;
    }

    let descriptor = SchemaDescriptor {
        type_name: T::NAME,
        type_id,
        fields: T::fields(),
    };
    CACHE.insert(descriptor)
}

static CACHE: SchemaCache = SchemaCache {
    head: OnceLock::new(),
    insert: Mutex::new(()),
};

/// Append-only list of leaked descriptors.
///
/// Each link is published through a `OnceLock`, so a reader either sees a
/// fully built entry or none at all.
struct SchemaCache {
    head: OnceLock<&'static Entry>,
    insert: Mutex<()>,
}

struct Entry {
    type_id: TypeId,
    descriptor: SchemaDescriptor,
    next: OnceLock<&'static Entry>,
}

impl SchemaCache {
    /// Linear in the number of cached types.
    fn find(&'static self, type_id: TypeId) -> Option<&'static SchemaDescriptor> {
        let mut node = self.head.get().copied();
        while let Some(entry) = node {
            if entry.type_id == type_id {
                return Some(&entry.descriptor);
            }
            node = entry.next.get().copied();
        }
        None
    }

    fn insert(&'static self, descriptor: SchemaDescriptor) -> &'static SchemaDescriptor {
        let _guard = self.insert.lock().unwrap_or_else(PoisonError::into_inner);

        // another thread may have published while this one was building
        if let Some(found) = self.find(descriptor.type_id) {
            return found;
        }

        let entry: &'static Entry = Box::leak(Box::new(Entry {
            type_id: descriptor.type_id,
            descriptor,
            next: OnceLock::new(),
        }));

        let mut slot = &self.head;
        while let Some(last) = slot.get() {
            slot = &last.next;
        }
        // the insert lock is held, so the tail slot is still empty
        let _ = slot.set(entry);

        debug!(
            schema = entry.descriptor.type_name,
            fields = entry.descriptor.fields.len(),
            "schema descriptor cached"
        );
        &entry.descriptor
    }
}

/// Implement [`Schema`], [`Wire`] and [`FieldValue`] for a struct.
///
/// Fields are listed in wire order with their [`Field`] builder. Computed
/// properties, usable as length sources, follow in an optional block.
///
/// ```rust
/// use artnet::codec::{self, Config, Field};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Frame {
///     count_hi: u8,
///     count_lo: u8,
///     data: Vec<u8>,
/// }
///
/// artnet::wire_schema! {
///     Frame {
///         count_hi: Field::u8(),
///         count_lo: Field::u8(),
///         data: Field::bytes_by("count"),
///     }
///     properties {
///         "count" => |frame| u16::from_be_bytes([frame.count_hi, frame.count_lo]),
///     }
/// }
///
/// let frame = Frame { count_hi: 0, count_lo: 2, data: vec![7, 8] };
/// let bytes = codec::encode(&frame, &Config::default())?;
/// assert_eq!(bytes, [0, 2, 7, 8]);
/// assert_eq!(codec::decode::<Frame>(&bytes, 0, &Config::default())?, frame);
/// # Ok::<(), artnet::codec::Error>(())
/// ```
#[macro_export]
macro_rules! wire_schema {
    (
        $ty:ident {
            $( $field:ident : $spec:expr ),* $(,)?
        }
        $(
            properties {
                $( $prop:literal => |$this:ident| $body:expr ),* $(,)?
            }
        )?
    ) => {
        impl $crate::codec::Schema for $ty {
            const NAME: &'static str = stringify!($ty);

            fn fields() -> ::std::vec::Vec<$crate::codec::FieldDescriptor> {
                ::std::vec![
                    $( $crate::codec::Field::named($spec, stringify!($field)) ),*
                ]
            }

            fn get(&self, field: &str) -> ::std::option::Option<$crate::codec::Value> {
                $(
                    if field == stringify!($field) {
                        return ::std::option::Option::Some(
                            $crate::codec::FieldValue::to_value(&self.$field),
                        );
                    }
                )*
                let _ = field;
                ::std::option::Option::None
            }

            fn set(
                &mut self,
                field: &str,
                value: $crate::codec::Value,
            ) -> $crate::codec::Result<bool> {
                $(
                    if field == stringify!($field) {
                        self.$field = $crate::codec::FieldValue::from_value(value)?;
                        return ::std::result::Result::Ok(true);
                    }
                )*
                let _ = (field, value);
                ::std::result::Result::Ok(false)
            }

            $(
                fn property(&self, name: &str) -> ::std::option::Option<$crate::codec::Value> {
                    $(
                        if name == $prop {
                            let $this = self;
                            return ::std::option::Option::Some($crate::codec::Value::from($body));
                        }
                    )*
                    ::std::option::Option::None
                }
            )?
        }

        impl $crate::codec::Wire for $ty {
            fn decode_from(ctx: &mut $crate::codec::Context<'_>) -> $crate::codec::Result<Self> {
                $crate::codec::read_object::<Self>(ctx)
            }

            fn encode_into(&self, ctx: &mut $crate::codec::Context<'_>) -> $crate::codec::Result<()> {
                $crate::codec::write_object(self, ctx)
            }
        }

        impl $crate::codec::FieldValue for $ty {
            fn to_value(&self) -> $crate::codec::Value {
                $crate::codec::Value::Record($crate::codec::Schema::to_record(self))
            }

            fn from_value(value: $crate::codec::Value) -> $crate::codec::Result<Self> {
                match value {
                    $crate::codec::Value::Record(record) => {
                        <Self as $crate::codec::Schema>::from_record(record)
                    }
                    other => ::std::result::Result::Err($crate::codec::Error::IncompatibleMapping {
                        from: other.kind().to_owned(),
                        to: stringify!($ty).to_owned(),
                    }),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Probe {
        flags: u8,
        name: String,
        values: Vec<u16>,
    }

    crate::wire_schema! {
        Probe {
            flags: Field::u8().since(2.0),
            name: Field::fixed_string(8),
            values: Field::array_by::<u16>("flags"),
        }
    }

    #[derive(Debug, Default)]
    struct Unrelated {
        flags: u8,
    }

    crate::wire_schema! {
        Unrelated {
            flags: Field::u8().skip(),
        }
    }

    #[test]
    fn test_describe_keeps_declaration_order() {
        let descriptor = describe::<Probe>();
        let names: Vec<_> = descriptor.fields().iter().map(FieldDescriptor::name).collect();
        assert_eq!(names, ["flags", "name", "values"]);
        assert_eq!(descriptor.type_name(), "Probe");
        assert_eq!(descriptor.type_id(), TypeId::of::<Probe>());
    }

    #[test]
    fn test_describe_returns_same_instance() {
        let first = describe::<Probe>();
        let second = describe::<Probe>();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_descriptors_are_keyed_by_type() {
        let probe = describe::<Probe>();
        let other = describe::<Unrelated>();
        assert!(!std::ptr::eq(probe, other));
        assert_eq!(other.fields()[0].gate(), &VersionGate::Never);
    }

    #[test]
    fn test_field_metadata() {
        let descriptor = describe::<Probe>();
        let flags = descriptor.field("flags").unwrap();
        assert_eq!(flags.kind(), &FieldKind::Primitive(Primitive::U8));
        assert!(!flags.gate().is_open(1.0));
        assert!(flags.gate().is_open(2.0));

        let values = descriptor.field("values").unwrap();
        assert_eq!(
            values.kind(),
            &FieldKind::ReferencedArray {
                element: Element::Primitive(Primitive::U16),
                source: "flags"
            }
        );
        assert!(descriptor.field("missing").is_none());
    }

    #[test]
    fn test_get_set_by_name() {
        let mut probe = Probe::default();
        assert!(probe.set("name", Value::from("lamp")).unwrap());
        assert!(probe.set("flags", Value::U32(3)).unwrap());
        assert!(!probe.set("unknown", Value::U8(1)).unwrap());
        assert_eq!(probe.name, "lamp");
        assert_eq!(probe.flags, 3);
        assert_eq!(probe.get("flags"), Some(Value::U8(3)));
        assert_eq!(probe.get("unknown"), None);
    }

    #[test]
    fn test_record_round_trip() {
        let probe = Probe {
            flags: 2,
            name: "x".into(),
            values: vec![1, 2],
        };
        let record = probe.to_record();
        assert_eq!(record.name(), "Probe");
        assert_eq!(record.len(), 3);
        assert_eq!(Probe::from_record(record).unwrap(), probe);
    }

    #[test]
    fn test_wire_as_and_versions() {
        let field = Field::u32()
            .wire_as(Primitive::U16)
            .between(1.0, 2.0)
            .since(4.0)
            .named("mixed");
        assert_eq!(field.primitive_override(), Some(Primitive::U16));
        assert!(field.gate().is_open(1.5));
        assert!(!field.gate().is_open(3.0));
        assert!(field.gate().is_open(4.5));
    }
}
