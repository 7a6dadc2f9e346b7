//! Conversions from typed values back to native values.

use chrono::{TimeZone, Utc};
use ordered_float::OrderedFloat;
use tracing::trace;

use super::{Composite, DescriptorRegistry, Map, Primitive, Typed, Value};
use crate::error::DecodeError;

impl DescriptorRegistry {
    /// Converts `value` to native form, recursing into lists and maps.
    ///
    /// Described values whose descriptor is registered become composites.
    /// Other described values are kept typed when `leave_described` is set,
    /// otherwise their descriptor is dropped.
    pub fn unwrap(
        &self,
        value: impl Into<Value>,
        leave_described: bool,
    ) -> Result<Value, DecodeError> {
        match value.into() {
            Value::Typed(typed) => self.unwrap_typed(typed, leave_described),
            Value::List(values) => values
                .into_iter()
                .map(|v| self.unwrap(v, true))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| Ok((self.unwrap(k, true)?, self.unwrap(v, true)?)))
                .collect::<Result<Map, DecodeError>>()
                .map(Value::Map),
            other => Ok(other),
        }
    }

    pub fn unwrap_typed(&self, typed: Typed, leave_described: bool) -> Result<Value, DecodeError> {
        if typed.is_described() {
            if let Some(definition) = self.lookup_typed(&typed) {
                trace!("promoting described value to {}", definition);
                return Composite::from_typed(definition.clone(), typed)
                    .map(|composite| Value::Composite(composite.with_registry(self.clone())));
            }
            if leave_described {
                return Ok(Value::Typed(typed));
            }
        }

        let code = typed.code();
        let is_map = typed.is_map();
        let value = match typed.into_value() {
            Primitive::Null => Value::Null,
            Primitive::Boolean(b) => Value::Boolean(b),
            Primitive::Ubyte(v) => Value::Integer(v.into()),
            Primitive::Ushort(v) => Value::Integer(v.into()),
            Primitive::Uint(v) => Value::Integer(v.into()),
            Primitive::Ulong(v) => Value::Integer(v.into()),
            Primitive::Byte(v) => Value::Integer(v.into()),
            Primitive::Short(v) => Value::Integer(v.into()),
            Primitive::Int(v) => Value::Integer(v.into()),
            Primitive::Long(v) => Value::Integer(v.into()),
            Primitive::Float(f) => Value::Double(OrderedFloat(f64::from(f.0))),
            Primitive::Double(d) => Value::Double(d),
            Primitive::Char(c) => Value::Char(c),
            // Instants chrono cannot represent stay typed.
            Primitive::Timestamp(millis) => match Utc.timestamp_millis_opt(millis).single() {
                Some(ts) => Value::Timestamp(ts),
                None => Value::Typed(Typed::new(code, Primitive::Timestamp(millis))),
            },
            Primitive::Uuid(uuid) => Value::Uuid(uuid),
            // Decimals have no native form.
            Primitive::Raw(bytes) => Value::Typed(Typed::new(code, Primitive::Raw(bytes))),
            Primitive::Binary(bytes) => Value::Binary(bytes),
            Primitive::Text(text) => Value::String(text),
            Primitive::Items(items) => {
                let values = items
                    .into_iter()
                    .map(|item| self.unwrap_typed(item, true))
                    .collect::<Result<Vec<_>, _>>()?;
                if is_map {
                    Value::Map(mapify(values)?)
                } else {
                    Value::List(values)
                }
            }
        };
        Ok(value)
    }
}

/// Unwraps with the standard registry.
pub fn unwrap(value: impl Into<Value>, leave_described: bool) -> Result<Value, DecodeError> {
    DescriptorRegistry::standard().unwrap(value, leave_described)
}

/// Pairs a flat key/value sequence into a map. Later duplicates win.
pub fn mapify(values: Vec<Value>) -> Result<Map, DecodeError> {
    if values.len() % 2 != 0 {
        return Err(DecodeError::MalformedMap(values.len()));
    }
    let mut map = Map::new();
    let mut values = values.into_iter();
    while let (Some(key), Some(value)) = (values.next(), values.next()) {
        map.insert(key, value);
    }
    Ok(map)
}
