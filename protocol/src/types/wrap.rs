//! Conversions from native values to typed values, always selecting the
//! smallest admissible encoding.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use uuid::Uuid;

use super::{
    constants::TypeCode, ArrayConstructor, Category, Descriptor, Map, Primitive, Typed, Value,
};
use crate::error::EncodeError;

const MAX_UINT: i128 = 1 << 32;
const MIN_INT: i128 = -2147483647;
const MAX_SMALL: usize = u8::MAX as usize;

pub fn wrap_boolean(value: bool) -> Typed {
    if value {
        Typed::empty(TypeCode::True)
    } else {
        Typed::empty(TypeCode::False)
    }
}

pub fn wrap_ubyte(value: u8) -> Typed {
    Typed::new(TypeCode::Ubyte, Primitive::Ubyte(value))
}

pub fn wrap_ushort(value: u16) -> Typed {
    Typed::new(TypeCode::Ushort, Primitive::Ushort(value))
}

pub fn wrap_uint(value: u32) -> Typed {
    if value == 0 {
        Typed::empty(TypeCode::Uint0)
    } else if value > u32::from(u8::MAX) {
        Typed::new(TypeCode::Uint, Primitive::Uint(value))
    } else {
        Typed::new(TypeCode::SmallUint, Primitive::Uint(value))
    }
}

pub fn wrap_ulong(value: u64) -> Typed {
    if value == 0 {
        Typed::empty(TypeCode::Ulong0)
    } else if value > u64::from(u8::MAX) {
        Typed::new(TypeCode::Ulong, Primitive::Ulong(value))
    } else {
        Typed::new(TypeCode::SmallUlong, Primitive::Ulong(value))
    }
}

pub fn wrap_byte(value: i8) -> Typed {
    Typed::new(TypeCode::Byte, Primitive::Byte(value))
}

pub fn wrap_short(value: i16) -> Typed {
    Typed::new(TypeCode::Short, Primitive::Short(value))
}

pub fn wrap_int(value: i32) -> Typed {
    if i8::try_from(value).is_ok() {
        Typed::new(TypeCode::SmallInt, Primitive::Int(value))
    } else {
        Typed::new(TypeCode::Int, Primitive::Int(value))
    }
}

pub fn wrap_long(value: i64) -> Typed {
    if i8::try_from(value).is_ok() {
        Typed::new(TypeCode::SmallLong, Primitive::Long(value))
    } else {
        Typed::new(TypeCode::Long, Primitive::Long(value))
    }
}

pub fn wrap_float(value: f32) -> Typed {
    Typed::new(TypeCode::Float, Primitive::Float(OrderedFloat(value)))
}

pub fn wrap_double(value: f64) -> Typed {
    Typed::new(TypeCode::Double, Primitive::Double(OrderedFloat(value)))
}

pub fn wrap_timestamp(value: DateTime<Utc>) -> Typed {
    Typed::new(TypeCode::Timestamp, Primitive::Timestamp(value.timestamp_millis()))
}

pub fn wrap_char(value: char) -> Typed {
    Typed::new(TypeCode::CharUTF32, Primitive::Char(value))
}

pub fn wrap_uuid(value: Uuid) -> Typed {
    Typed::new(TypeCode::Uuid, Primitive::Uuid(value))
}

pub fn wrap_binary(value: impl Into<Vec<u8>>) -> Typed {
    let bytes = value.into();
    let code = if bytes.len() > MAX_SMALL {
        TypeCode::Vbin32
    } else {
        TypeCode::Vbin8
    };
    Typed::new(code, Primitive::Binary(bytes))
}

pub fn wrap_string(value: impl Into<String>) -> Typed {
    let text = value.into();
    let code = if text.len() > MAX_SMALL {
        TypeCode::Str32
    } else {
        TypeCode::Str8
    };
    Typed::new(code, Primitive::Text(text))
}

pub fn wrap_symbol(value: impl Into<String>) -> Typed {
    let text = value.into();
    let code = if text.len() > MAX_SMALL {
        TypeCode::Sym32
    } else {
        TypeCode::Sym8
    };
    Typed::new(code, Primitive::Text(text))
}

pub fn wrap_list(values: Vec<Value>) -> Result<Typed, EncodeError> {
    if values.is_empty() {
        return Ok(Typed::empty(TypeCode::List0));
    }
    let items = values.into_iter().map(wrap).collect::<Result<Vec<_>, _>>()?;
    Ok(Typed::new(TypeCode::List32, Primitive::Items(items)))
}

fn wrap_map_with(
    map: Map,
    key_wrapper: impl Fn(Value) -> Result<Typed, EncodeError>,
) -> Result<Typed, EncodeError> {
    let mut items = Vec::with_capacity(map.len() * 2);
    for (k, v) in map {
        items.push(key_wrapper(k)?);
        items.push(wrap(v)?);
    }
    Ok(Typed::new(TypeCode::Map32, Primitive::Items(items)))
}

pub fn wrap_map(map: Map) -> Result<Typed, EncodeError> {
    wrap_map_with(map, wrap)
}

/// Wraps a map forcing every key to a symbol.
pub fn wrap_symbolic_map(map: Map) -> Result<Typed, EncodeError> {
    wrap_map_with(map, |key| match key {
        Value::String(s) => Ok(wrap_symbol(s)),
        Value::Typed(t) if t.is_symbol() => Ok(t),
        other => Err(EncodeError::InvalidValue(format!(
            "symbolic map keys must be strings, got {:?}",
            other
        ))),
    })
}

/// Wraps `values` as an AMQP array whose elements all use `code`.
pub fn wrap_array(
    values: Vec<Value>,
    code: Option<TypeCode>,
    descriptor: Option<Descriptor>,
) -> Result<Typed, EncodeError> {
    let code = code.ok_or_else(|| {
        EncodeError::InvalidValue("an array must specify a type for its elements".to_string())
    })?;
    let element = code.descriptor();
    if element.category() == Category::Fixed && element.width() == 0 {
        return Err(EncodeError::InvalidValue(format!(
            "{} has no content and cannot be an array element type",
            element
        )));
    }
    let items = values
        .into_iter()
        .map(|v| wrap_as(code, v))
        .collect::<Result<Vec<_>, _>>()?;
    let constructor = ArrayConstructor {
        code,
        descriptors: descriptor.iter().map(Descriptor::to_typed).collect(),
    };
    Ok(Typed::array(TypeCode::Array32, items, constructor))
}

/// Converts a single array element to the array's element type.
fn wrap_as(code: TypeCode, value: Value) -> Result<Typed, EncodeError> {
    let t = code.descriptor();
    let mismatch =
        |value: &Value| EncodeError::InvalidValue(format!("cannot use {:?} as {}", value, t));
    if let Value::Typed(typed) = value {
        return if typed.code() == code {
            Ok(typed)
        } else {
            Err(mismatch(&Value::Typed(typed)))
        };
    }
    let primitive = match (t.category(), value) {
        (Category::Variable, Value::String(s)) if t.encoding().is_some() => Primitive::Text(s),
        (Category::Variable, Value::Binary(b)) if t.encoding().is_none() => Primitive::Binary(b),
        (Category::Compound, Value::List(values)) if !is_map_code(code) => {
            Primitive::Items(values.into_iter().map(wrap).collect::<Result<_, _>>()?)
        }
        (Category::Compound, Value::Map(map)) if is_map_code(code) => wrap_map(map)?.into_value(),
        (Category::Fixed, value) => {
            let typed = wrap_fixed(code, &value).ok_or_else(|| mismatch(&value))?;
            typed.into_value()
        }
        (_, value) => return Err(mismatch(&value)),
    };
    Ok(Typed::new(code, primitive))
}

fn is_map_code(code: TypeCode) -> bool {
    matches!(code, TypeCode::Map8 | TypeCode::Map32)
}

fn wrap_fixed(code: TypeCode, value: &Value) -> Option<Typed> {
    let typed = match (code, value) {
        (TypeCode::Boolean, Value::Boolean(b)) => Typed::new(code, Primitive::Boolean(*b)),
        (TypeCode::Ubyte, Value::Integer(n)) => wrap_ubyte(u8::try_from(*n).ok()?),
        (TypeCode::Ushort, Value::Integer(n)) => wrap_ushort(u16::try_from(*n).ok()?),
        (TypeCode::Uint | TypeCode::SmallUint, Value::Integer(n)) => {
            Typed::new(code, Primitive::Uint(u32::try_from(*n).ok()?))
        }
        (TypeCode::Ulong | TypeCode::SmallUlong, Value::Integer(n)) => {
            Typed::new(code, Primitive::Ulong(u64::try_from(*n).ok()?))
        }
        (TypeCode::Byte, Value::Integer(n)) => wrap_byte(i8::try_from(*n).ok()?),
        (TypeCode::Short, Value::Integer(n)) => wrap_short(i16::try_from(*n).ok()?),
        (TypeCode::Int | TypeCode::SmallInt, Value::Integer(n)) => {
            Typed::new(code, Primitive::Int(i32::try_from(*n).ok()?))
        }
        (TypeCode::Long | TypeCode::SmallLong, Value::Integer(n)) => {
            Typed::new(code, Primitive::Long(i64::try_from(*n).ok()?))
        }
        (TypeCode::Float, Value::Double(d)) => wrap_float(d.0 as f32),
        (TypeCode::Double, Value::Double(d)) => wrap_double(d.0),
        (TypeCode::CharUTF32, Value::Char(c)) => wrap_char(*c),
        (TypeCode::Timestamp, Value::Timestamp(ts)) => wrap_timestamp(*ts),
        (TypeCode::Uuid, Value::Uuid(uuid)) => wrap_uuid(*uuid),
        (TypeCode::Decimal32 | TypeCode::Decimal64 | TypeCode::Decimal128, Value::Binary(b))
            if b.len() == usize::from(code.descriptor().width()) =>
        {
            Typed::new(code, Primitive::Raw(b.clone()))
        }
        _ => return None,
    };
    Some(typed)
}

fn wrap_integer(n: i128) -> Result<Typed, EncodeError> {
    let out_of_range = || EncodeError::InvalidValue(format!("integer {} out of range", n));
    if n >= 0 {
        if n < MAX_UINT {
            Ok(wrap_uint(n as u32))
        } else {
            u64::try_from(n).map(wrap_ulong).map_err(|_| out_of_range())
        }
    } else if n >= MIN_INT {
        Ok(wrap_int(n as i32))
    } else {
        i64::try_from(n).map(wrap_long).map_err(|_| out_of_range())
    }
}

/// Wraps a native value, dispatching on its shape.
///
/// Already typed values are returned unchanged and composites are wrapped
/// as their described list form.
pub fn wrap(value: impl Into<Value>) -> Result<Typed, EncodeError> {
    match value.into() {
        Value::Null => Ok(Typed::null()),
        Value::Boolean(b) => Ok(wrap_boolean(b)),
        Value::Integer(n) => wrap_integer(n),
        Value::Double(d) if d.0.is_nan() => {
            Err(EncodeError::InvalidValue("cannot wrap NaN".to_string()))
        }
        Value::Double(d) => Ok(wrap_double(d.0)),
        Value::Char(c) => Ok(wrap_char(c)),
        Value::Timestamp(ts) => Ok(wrap_timestamp(ts)),
        Value::Uuid(uuid) => Ok(wrap_uuid(uuid)),
        Value::String(s) => Ok(wrap_string(s)),
        Value::Binary(b) => Ok(wrap_binary(b)),
        Value::List(values) => wrap_list(values),
        Value::Map(map) => wrap_map(map),
        Value::Typed(typed) => Ok(typed),
        Value::Composite(composite) => Ok(composite.described()),
    }
}

/// Wraps `value` and marks it described by `descriptor`.
pub fn wrap_described(
    value: impl Into<Value>,
    descriptor: impl Into<Descriptor>,
) -> Result<Typed, EncodeError> {
    Ok(wrap(value)?.described(descriptor.into().to_typed()))
}

/// Wraps a message identifier: a string, an unsigned integer or a 16 byte
/// uuid.
pub fn wrap_message_id(value: impl Into<Value>) -> Result<Typed, EncodeError> {
    match value.into() {
        Value::String(s) => Ok(wrap_string(s)),
        Value::Integer(n) => u64::try_from(n)
            .map(wrap_ulong)
            .map_err(|_| EncodeError::InvalidValue(format!("invalid message id: {}", n))),
        Value::Uuid(uuid) => Ok(wrap_uuid(uuid)),
        Value::Binary(bytes) => Uuid::from_slice(&bytes)
            .map(wrap_uuid)
            .map_err(|_| EncodeError::InvalidValue(format!("invalid message id: {:?}", bytes))),
        other => Err(EncodeError::InvalidValue(format!(
            "invalid message id: {:?}",
            other
        ))),
    }
}
