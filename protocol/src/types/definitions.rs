//! Built-in composite types.

use std::{fmt, sync::Arc, sync::OnceLock};

use super::{Composite, CompositeDefinition, FieldDefinition, FieldType, Map, Typed, Value};
use crate::{composite_accessors, error::EncodeError};

pub const ERROR_CODE: u64 = 0x1d;

pub fn error_definition() -> &'static Arc<CompositeDefinition> {
    static ERROR: OnceLock<Arc<CompositeDefinition>> = OnceLock::new();
    ERROR.get_or_init(|| {
        Arc::new(CompositeDefinition {
            name: "error".to_string(),
            code: ERROR_CODE,
            fields: vec![
                FieldDefinition::new("condition", FieldType::Symbol).mandatory(),
                FieldDefinition::new("description", FieldType::String),
                FieldDefinition::new("info", FieldType::Map),
            ],
        })
    })
}

/// The `error` composite carried by detach, end and close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmqpError(Composite);

composite_accessors!(AmqpError {
    0 => condition, set_condition;
    1 => description, set_description;
    2 => info, set_info;
});

impl AmqpError {
    pub fn new(
        condition: impl Into<String>,
        description: Option<String>,
        info: Option<Map>,
    ) -> Result<Self, EncodeError> {
        Composite::create(
            error_definition(),
            vec![
                ("condition", Value::String(condition.into())),
                ("description", description.into()),
                ("info", info.map(Value::Map).unwrap_or(Value::Null)),
            ],
        )
        .map(AmqpError)
    }

    /// Views `composite` as an error when it carries the error descriptor.
    pub fn from_composite(composite: Composite) -> Option<Self> {
        if composite.definition().code() == ERROR_CODE {
            Some(AmqpError(composite))
        } else {
            None
        }
    }

    pub fn as_composite(&self) -> &Composite {
        &self.0
    }

    pub fn into_composite(self) -> Composite {
        self.0
    }

    pub fn described(&self) -> Typed {
        self.0.described()
    }
}

impl From<AmqpError> for Value {
    fn from(error: AmqpError) -> Self {
        Value::Composite(error.0)
    }
}

impl fmt::Display for AmqpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let condition = self.condition().ok();
        let description = self.description().ok();
        match (
            condition.as_ref().and_then(Value::as_str),
            description.as_ref().and_then(Value::as_str),
        ) {
            (Some(c), Some(d)) => write!(f, "{}: {}", c, d),
            (Some(c), None) => f.write_str(c),
            _ => fmt::Display::fmt(&self.0, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{unwrap, wrap_ulong, TypeCode};

    #[test]
    fn error_round_trips_through_unwrap() {
        let info: Map = vec![("retry", 5u32)].into_iter().collect();
        let error = AmqpError::new(
            "amqp:internal-error",
            Some("boom".to_string()),
            Some(info.clone()),
        )
        .unwrap();
        let typed = error.described();
        assert_eq!(typed.descriptor(), Some(&wrap_ulong(ERROR_CODE)));
        assert_eq!(typed.items().unwrap()[0].code(), TypeCode::Sym8);

        let value = unwrap(typed, false).unwrap();
        let decoded = match value {
            Value::Composite(c) => AmqpError::from_composite(c).unwrap(),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(decoded.condition().unwrap(), Value::from("amqp:internal-error"));
        assert_eq!(decoded.description().unwrap(), Value::from("boom"));
        assert_eq!(decoded.info().unwrap(), Value::Map(info));
        assert_eq!(decoded.to_string(), "amqp:internal-error: boom");
    }

    #[test]
    fn condition_is_mandatory() {
        let mut error = AmqpError::new("amqp:not-found", None, None).unwrap();
        assert_eq!(error.description().unwrap(), Value::Null);
        assert!(matches!(
            error.set_condition(Value::Null),
            Err(EncodeError::MandatoryFieldMissing(f)) if f == "condition"
        ));
        error.set_description("missing").unwrap();
        assert_eq!(error.description().unwrap(), Value::from("missing"));
    }
}
