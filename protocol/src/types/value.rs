use chrono::{DateTime, Utc};
use derive_more::{From, TryInto};
use ordered_float::OrderedFloat;
use uuid::Uuid;

use super::{Composite, Map, Typed};

/// Native value, the counterpart of a [`Typed`] value before an encoding is
/// chosen or after it has been unwrapped.
///
/// Integers of every AMQP width share [`Value::Integer`], wide enough for
/// the whole `u64` and `i64` ranges.
#[derive(Debug, Clone, PartialEq, Eq, From, TryInto)]
#[try_into(owned, ref, ref_mut)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i128),
    Double(OrderedFloat<f64>),
    Char(char),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    String(String),
    Binary(Vec<u8>),
    List(Vec<Value>),
    Map(Map),
    Typed(Typed),
    Composite(Composite),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }
}

macro_rules! impl_integer_value {
    ($($type:ty),*) => {
        $(
            impl From<$type> for Value {
                fn from(value: $type) -> Value {
                    Value::Integer(i128::from(value))
                }
            }
        )*
    };
}

impl_integer_value!(u8, u16, u32, u64, i8, i16, i32, i64);

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Double(OrderedFloat(value))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Value {
        Value::Double(OrderedFloat(f64::from(value)))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::String(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Value {
        Value::Binary(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Value {
        value.map_or(Value::Null, Into::into)
    }
}
