//! Per-field byte-level strategies.

use tracing::trace;

use super::{
    Config, Context, Cursor, Element, Error, FieldDescriptor, FieldKind, LengthSource,
    ObjectType, Primitive, Result, Schema, Value,
};

/// Read one primitive of the given wire kind.
pub(crate) fn read_primitive(cursor: &mut Cursor, wire: Primitive) -> Result<Value> {
    Ok(match wire {
        Primitive::Bool => Value::Bool(cursor.read_bool()?),
        Primitive::U8 => Value::U8(cursor.read_u8()?),
        Primitive::I8 => Value::I8(cursor.read_i8()?),
        Primitive::U16 => Value::U16(cursor.read_u16()?),
        Primitive::I16 => Value::I16(cursor.read_i16()?),
        Primitive::U32 => Value::U32(cursor.read_u32()?),
        Primitive::I32 => Value::I32(cursor.read_i32()?),
        Primitive::U64 => Value::U64(cursor.read_u64()?),
        Primitive::I64 => Value::I64(cursor.read_i64()?),
        Primitive::F32 => Value::F32(cursor.read_f32()?),
        Primitive::F64 => Value::F64(cursor.read_f64()?),
    })
}

/// Convert `value` to the wire kind and write it.
pub(crate) fn write_primitive(cursor: &mut Cursor, wire: Primitive, value: Value) -> Result<()> {
    match value.coerce(wire)? {
        Value::Bool(v) => cursor.write_bool(v),
        Value::U8(v) => cursor.write_u8(v),
        Value::I8(v) => cursor.write_i8(v),
        Value::U16(v) => cursor.write_u16(v),
        Value::I16(v) => cursor.write_i16(v),
        Value::U32(v) => cursor.write_u32(v),
        Value::I32(v) => cursor.write_i32(v),
        Value::U64(v) => cursor.write_u64(v),
        Value::I64(v) => cursor.write_i64(v),
        Value::F32(v) => cursor.write_f32(v),
        Value::F64(v) => cursor.write_f64(v),
        other => return Err(Error::UnsupportedType(other.kind().to_owned())),
    }
    Ok(())
}

/// Read a logical primitive, honoring field and session substitutions.
pub(crate) fn read_scalar(
    ctx: &mut Context<'_>,
    logical: Primitive,
    field_override: Option<Primitive>,
) -> Result<Value> {
    let wire = wire_kind(ctx.config, logical, field_override);
    read_primitive(ctx.cursor, wire)?.coerce(logical)
}

/// Write a logical primitive, honoring field and session substitutions.
pub(crate) fn write_scalar(
    ctx: &mut Context<'_>,
    logical: Primitive,
    field_override: Option<Primitive>,
    value: Value,
) -> Result<()> {
    let wire = wire_kind(ctx.config, logical, field_override);
    write_primitive(ctx.cursor, wire, value.coerce(logical)?)
}

/// Field override first, then the session table, then the logical kind.
fn wire_kind(config: &Config, logical: Primitive, field_override: Option<Primitive>) -> Primitive {
    field_override
        .or_else(|| config.remap.primitive(logical))
        .unwrap_or(logical)
}

fn check_enum_repr(field: &FieldDescriptor, repr: Primitive) -> Result<()> {
    if repr.is_integer() {
        Ok(())
    } else {
        Err(Error::UnsupportedType(format!(
            "enum field `{}` backed by {repr}",
            field.name()
        )))
    }
}

/// Resolve an element or byte count from a literal or from the owner.
pub(crate) fn resolve_length<T: Schema>(
    owner: &T,
    field: &FieldDescriptor,
    source: LengthSource,
) -> Result<usize> {
    match source {
        LengthSource::Fixed(0) => Err(Error::invalid(field.name(), "fixed size must be positive")),
        LengthSource::Fixed(len) => Ok(len),
        LengthSource::Field(name) => {
            let value = owner
                .get(name)
                .or_else(|| owner.property(name))
                .ok_or_else(|| {
                    Error::invalid(
                        field.name(),
                        format!("length source `{name}` is not a field or property of {}", T::NAME),
                    )
                })?;
            value.as_length().ok_or_else(|| {
                Error::invalid(
                    field.name(),
                    format!("length source `{name}` holds {value:?}, not a count"),
                )
            })
        }
    }
}

fn object_codec(field: &FieldDescriptor, declared: ObjectType) -> ObjectType {
    field.object_override().unwrap_or(declared)
}

/// Decode one field from the cursor into `owner`.
pub(crate) fn read_field<T: Schema>(
    owner: &mut T,
    field: &FieldDescriptor,
    ctx: &mut Context<'_>,
) -> Result<()> {
    let start = ctx.cursor.position();
    let value = match field.kind() {
        FieldKind::Primitive(logical) => {
            read_scalar(ctx, *logical, field.primitive_override())?
        }
        FieldKind::Enum(repr) => {
            check_enum_repr(field, *repr)?;
            read_primitive(ctx.cursor, *repr)?
        }
        FieldKind::FixedString(source) => {
            let len = resolve_length(owner, field, *source)?;
            let bytes = ctx.cursor.read_bytes(len)?;
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            Value::Str(ctx.config.encoding.decode(&bytes[..end]))
        }
        FieldKind::TerminatedString => {
            let bytes = ctx.cursor.read_terminated()?;
            Value::Str(ctx.config.encoding.decode(bytes))
        }
        FieldKind::FixedArray { element, len } => {
            let len = resolve_length(owner, field, LengthSource::Fixed(*len))?;
            read_array(ctx, field, *element, len)?
        }
        FieldKind::ReferencedArray { element, source } => {
            let len = resolve_length(owner, field, LengthSource::Field(*source))?;
            read_array(ctx, field, *element, len)?
        }
        FieldKind::Object(declared) => object_codec(field, *declared).read(ctx)?,
    };

    trace!(
        field = field.name(),
        offset = start,
        width = ctx.cursor.position() - start,
        "field read"
    );
    owner.set(field.name(), value)?;
    Ok(())
}

fn read_array(
    ctx: &mut Context<'_>,
    field: &FieldDescriptor,
    element: Element,
    len: usize,
) -> Result<Value> {
    // a corrupt count must not drive allocation past what the buffer holds
    let mut items = Vec::with_capacity(len.min(ctx.cursor.remaining()));
    for _ in 0..len {
        let item = match element {
            Element::Primitive(logical) => read_scalar(ctx, logical, field.primitive_override())?,
            Element::Object(declared) => object_codec(field, declared).read(ctx)?,
        };
        items.push(item);
    }
    Ok(Value::Array(items))
}

/// Encode one field of `owner` at the cursor.
pub(crate) fn write_field<T: Schema>(
    owner: &T,
    field: &FieldDescriptor,
    ctx: &mut Context<'_>,
) -> Result<()> {
    let start = ctx.cursor.position();
    let value = owner.get(field.name());

    match field.kind() {
        FieldKind::Primitive(logical) => {
            let value = value.unwrap_or_else(|| logical.zero());
            write_scalar(ctx, *logical, field.primitive_override(), value)?;
        }
        FieldKind::Enum(repr) => {
            check_enum_repr(field, *repr)?;
            write_primitive(ctx.cursor, *repr, value.unwrap_or_else(|| repr.zero()))?;
        }
        FieldKind::FixedString(source) => {
            let len = resolve_length(owner, field, *source)?;
            let bytes = encode_text(ctx, field, value)?;
            if bytes.len() > len {
                return Err(Error::invalid(
                    field.name(),
                    format!("{} encoded bytes exceed fixed size {len}", bytes.len()),
                ));
            }
            ctx.cursor.write_bytes(&bytes);
            ctx.cursor.write_zeros(len - bytes.len());
        }
        FieldKind::TerminatedString => {
            let bytes = encode_text(ctx, field, value)?;
            ctx.cursor.write_bytes(&bytes);
            ctx.cursor.write_u8(0);
        }
        FieldKind::FixedArray { element, len } => {
            let len = resolve_length(owner, field, LengthSource::Fixed(*len))?;
            write_array(ctx, field, *element, len, value)?;
        }
        FieldKind::ReferencedArray { element, source } => {
            let len = resolve_length(owner, field, LengthSource::Field(*source))?;
            write_array(ctx, field, *element, len, value)?;
        }
        FieldKind::Object(declared) => {
            let value = value.unwrap_or_else(|| declared.default_value());
            object_codec(field, *declared).write(ctx, value)?;
        }
    }

    trace!(
        field = field.name(),
        offset = start,
        width = ctx.cursor.position() - start,
        "field written"
    );
    Ok(())
}

fn encode_text(ctx: &Context<'_>, field: &FieldDescriptor, value: Option<Value>) -> Result<Vec<u8>> {
    let text = match value {
        None => String::new(),
        Some(value) => value.to_text().ok_or_else(|| {
            Error::mapping(value.kind(), format!("string field `{}`", field.name()))
        })?,
    };
    Ok(ctx.config.encoding.encode(&text))
}

/// Write exactly `len` elements, truncating longer values and filling
/// missing elements with zeros or default objects.
fn write_array(
    ctx: &mut Context<'_>,
    field: &FieldDescriptor,
    element: Element,
    len: usize,
    value: Option<Value>,
) -> Result<()> {
    let mut items = match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(Error::mapping(
                other.kind(),
                format!("array field `{}`", field.name()),
            ));
        }
    };
    items.truncate(len);
    let provided = items.len();
    let mut items = items.into_iter();

    for _ in 0..len {
        let item = items.next();
        match element {
            Element::Primitive(logical) => {
                let item = item.unwrap_or_else(|| logical.zero());
                write_scalar(ctx, logical, field.primitive_override(), item)?;
            }
            Element::Object(declared) => {
                let item = item.unwrap_or_else(|| declared.default_value());
                object_codec(field, declared).write(ctx, item)?;
            }
        }
    }

    if provided < len {
        trace!(
            field = field.name(),
            provided,
            len,
            "array backfilled with default elements"
        );
    }
    Ok(())
}
