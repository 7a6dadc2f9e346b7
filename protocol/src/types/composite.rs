use std::{collections::HashSet, fmt, str::FromStr, sync::Arc};

use super::{
    constants::TypeCode, wrap, wrap_array, wrap_binary, wrap_boolean, wrap_byte, wrap_char,
    wrap_double, wrap_float, wrap_int, wrap_list, wrap_long, wrap_map, wrap_message_id,
    wrap_short, wrap_string, wrap_symbol, wrap_symbolic_map, wrap_timestamp, wrap_ubyte,
    wrap_uint, wrap_ulong, wrap_ushort, wrap_uuid, Descriptor, DescriptorRegistry, Primitive,
    Typed, Value,
};
use crate::error::{DecodeError, EncodeError};

/// Declared element type of a composite field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `*`, the value is stored as given.
    Any,
    Boolean,
    Ubyte,
    Ushort,
    Uint,
    Ulong,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Timestamp,
    Char,
    Uuid,
    Binary,
    String,
    Symbol,
    List,
    Map,
    SymbolicMap,
    MessageId,
    /// Another composite, by numeric descriptor.
    Composite(u64),
}

impl FieldType {
    /// Whether a `multiple` field of this type can be encoded as an array.
    pub fn supports_multiple(self) -> bool {
        matches!(
            self,
            FieldType::Symbol | FieldType::String | FieldType::Uint | FieldType::Ulong
        )
    }

    fn array_code(self, values: &[Value]) -> Option<TypeCode> {
        let long = values
            .iter()
            .any(|v| v.as_str().map_or(false, |s| s.len() > u8::MAX as usize));
        match (self, long) {
            (FieldType::Symbol, false) => Some(TypeCode::Sym8),
            (FieldType::Symbol, true) => Some(TypeCode::Sym32),
            (FieldType::String, false) => Some(TypeCode::Str8),
            (FieldType::String, true) => Some(TypeCode::Str32),
            (FieldType::Uint, _) => Some(TypeCode::Uint),
            (FieldType::Ulong, _) => Some(TypeCode::Ulong),
            _ => None,
        }
    }

    /// Whether an already typed value belongs to this field type.
    pub fn accepts(self, typed: &Typed) -> bool {
        let code = typed.code();
        if code == TypeCode::Null {
            return true;
        }
        match self {
            FieldType::Any => true,
            FieldType::Boolean => {
                matches!(code, TypeCode::Boolean | TypeCode::True | TypeCode::False)
            }
            FieldType::Ubyte => code == TypeCode::Ubyte,
            FieldType::Ushort => code == TypeCode::Ushort,
            FieldType::Uint => {
                matches!(code, TypeCode::Uint | TypeCode::SmallUint | TypeCode::Uint0)
            }
            FieldType::Ulong => {
                matches!(code, TypeCode::Ulong | TypeCode::SmallUlong | TypeCode::Ulong0)
            }
            FieldType::Byte => code == TypeCode::Byte,
            FieldType::Short => code == TypeCode::Short,
            FieldType::Int => matches!(code, TypeCode::Int | TypeCode::SmallInt),
            FieldType::Long => matches!(code, TypeCode::Long | TypeCode::SmallLong),
            FieldType::Float => code == TypeCode::Float,
            FieldType::Double => code == TypeCode::Double,
            FieldType::Timestamp => code == TypeCode::Timestamp,
            FieldType::Char => code == TypeCode::CharUTF32,
            FieldType::Uuid => code == TypeCode::Uuid,
            FieldType::Binary => matches!(code, TypeCode::Vbin8 | TypeCode::Vbin32),
            FieldType::String => matches!(code, TypeCode::Str8 | TypeCode::Str32),
            FieldType::Symbol => matches!(code, TypeCode::Sym8 | TypeCode::Sym32),
            FieldType::List => {
                matches!(code, TypeCode::List0 | TypeCode::List8 | TypeCode::List32)
            }
            FieldType::Map | FieldType::SymbolicMap => {
                matches!(code, TypeCode::Map8 | TypeCode::Map32)
            }
            FieldType::MessageId => {
                FieldType::Ulong.accepts(typed)
                    || FieldType::Uuid.accepts(typed)
                    || FieldType::Binary.accepts(typed)
                    || FieldType::String.accepts(typed)
            }
            FieldType::Composite(expected) => {
                typed.is_list()
                    && match typed.descriptor().and_then(Descriptor::from_typed) {
                        Some(Descriptor::Ulong(code)) => code == expected,
                        Some(Descriptor::Symbol(_)) => true,
                        None => false,
                    }
            }
        }
    }

    /// Wraps `value` with the primitive wrapper of this field type.
    pub fn wrap(self, field: &str, value: Value) -> Result<Typed, EncodeError> {
        let mismatch = |value: Value| EncodeError::FieldError {
            field: field.to_string(),
            reason: format!("expected {}, got {:?}", self, value),
        };
        macro_rules! integer {
            ($value:expr, $target:ty, $wrapper:ident) => {
                match $value {
                    Value::Integer(n) => match <$target>::try_from(n) {
                        Ok(v) => Ok($wrapper(v)),
                        Err(_) => Err(mismatch(Value::Integer(n))),
                    },
                    other => Err(mismatch(other)),
                }
            };
        }

        if let Value::Typed(typed) = value {
            return if self.accepts(&typed) {
                Ok(typed)
            } else {
                Err(mismatch(Value::Typed(typed)))
            };
        }
        match self {
            FieldType::Any => wrap(value),
            FieldType::Boolean => match value {
                Value::Boolean(b) => Ok(wrap_boolean(b)),
                other => Err(mismatch(other)),
            },
            FieldType::Ubyte => integer!(value, u8, wrap_ubyte),
            FieldType::Ushort => integer!(value, u16, wrap_ushort),
            FieldType::Uint => integer!(value, u32, wrap_uint),
            FieldType::Ulong => integer!(value, u64, wrap_ulong),
            FieldType::Byte => integer!(value, i8, wrap_byte),
            FieldType::Short => integer!(value, i16, wrap_short),
            FieldType::Int => integer!(value, i32, wrap_int),
            FieldType::Long => integer!(value, i64, wrap_long),
            FieldType::Float => match value {
                Value::Double(d) => Ok(wrap_float(d.0 as f32)),
                Value::Integer(n) => Ok(wrap_float(n as f32)),
                other => Err(mismatch(other)),
            },
            FieldType::Double => match value {
                Value::Double(d) => Ok(wrap_double(d.0)),
                Value::Integer(n) => Ok(wrap_double(n as f64)),
                other => Err(mismatch(other)),
            },
            FieldType::Timestamp => match value {
                Value::Timestamp(ts) => Ok(wrap_timestamp(ts)),
                Value::Integer(n) => match i64::try_from(n) {
                    Ok(millis) => Ok(Typed::new(
                        TypeCode::Timestamp,
                        Primitive::Timestamp(millis),
                    )),
                    Err(_) => Err(mismatch(Value::Integer(n))),
                },
                other => Err(mismatch(other)),
            },
            FieldType::Char => match value {
                Value::Char(c) => Ok(wrap_char(c)),
                other => Err(mismatch(other)),
            },
            FieldType::Uuid => match value {
                Value::Uuid(uuid) => Ok(wrap_uuid(uuid)),
                Value::Binary(bytes) if bytes.len() == 16 => wrap_message_id(bytes),
                other => Err(mismatch(other)),
            },
            FieldType::Binary => match value {
                Value::Binary(bytes) => Ok(wrap_binary(bytes)),
                other => Err(mismatch(other)),
            },
            FieldType::String => match value {
                Value::String(s) => Ok(wrap_string(s)),
                other => Err(mismatch(other)),
            },
            FieldType::Symbol => match value {
                Value::String(s) => Ok(wrap_symbol(s)),
                other => Err(mismatch(other)),
            },
            FieldType::List => match value {
                Value::List(values) => wrap_list(values),
                other => Err(mismatch(other)),
            },
            FieldType::Map => match value {
                Value::Map(map) => wrap_map(map),
                other => Err(mismatch(other)),
            },
            FieldType::SymbolicMap => match value {
                Value::Map(map) => wrap_symbolic_map(map),
                other => Err(mismatch(other)),
            },
            FieldType::MessageId => wrap_message_id(value),
            FieldType::Composite(code) => match value {
                Value::Composite(composite) if composite.definition().code() == code => {
                    Ok(composite.described())
                }
                other => Err(mismatch(other)),
            },
        }
    }
}

impl FromStr for FieldType {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field_type = match s {
            "*" => FieldType::Any,
            "boolean" => FieldType::Boolean,
            "ubyte" => FieldType::Ubyte,
            "ushort" => FieldType::Ushort,
            "uint" => FieldType::Uint,
            "ulong" => FieldType::Ulong,
            "byte" => FieldType::Byte,
            "short" => FieldType::Short,
            "int" => FieldType::Int,
            "long" => FieldType::Long,
            "float" => FieldType::Float,
            "double" => FieldType::Double,
            "timestamp" => FieldType::Timestamp,
            "char" => FieldType::Char,
            "uuid" => FieldType::Uuid,
            "binary" => FieldType::Binary,
            "string" => FieldType::String,
            "symbol" => FieldType::Symbol,
            "list" => FieldType::List,
            "map" => FieldType::Map,
            "symbolic_map" => FieldType::SymbolicMap,
            "message_id" => FieldType::MessageId,
            other => return Err(EncodeError::UnsupportedFieldType(other.to_string())),
        };
        Ok(field_type)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Any => "*",
            FieldType::Boolean => "boolean",
            FieldType::Ubyte => "ubyte",
            FieldType::Ushort => "ushort",
            FieldType::Uint => "uint",
            FieldType::Ulong => "ulong",
            FieldType::Byte => "byte",
            FieldType::Short => "short",
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Timestamp => "timestamp",
            FieldType::Char => "char",
            FieldType::Uuid => "uuid",
            FieldType::Binary => "binary",
            FieldType::String => "string",
            FieldType::Symbol => "symbol",
            FieldType::List => "list",
            FieldType::Map => "map",
            FieldType::SymbolicMap => "symbolic_map",
            FieldType::MessageId => "message_id",
            FieldType::Composite(code) => return write!(f, "composite#{:x}", code),
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    name: String,
    field_type: FieldType,
    mandatory: bool,
    multiple: bool,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldDefinition {
            name: name.into(),
            field_type,
            mandatory: false,
            multiple: false,
        }
    }

    /// Builds a field from a textual type name such as `symbol` or `*`.
    pub fn parse(name: impl Into<String>, type_name: &str) -> Result<Self, EncodeError> {
        Ok(FieldDefinition::new(name, type_name.parse()?))
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Converts a field value to its typed form, substituting `Null` for an
    /// absent optional field.
    pub fn wrap_field(&self, value: Option<Value>) -> Result<Typed, EncodeError> {
        let value = match value {
            Some(Value::Typed(typed)) if typed.code() == TypeCode::Null && self.mandatory => {
                return Err(EncodeError::MandatoryFieldMissing(self.name.clone()))
            }
            None | Some(Value::Null) if self.mandatory => {
                return Err(EncodeError::MandatoryFieldMissing(self.name.clone()))
            }
            None | Some(Value::Null) => return Ok(Typed::null()),
            Some(value) => value,
        };

        match value {
            Value::List(values) if self.multiple => {
                let code = self.field_type.array_code(&values);
                wrap_array(values, code, None)
            }
            Value::Typed(typed) if self.multiple && typed.is_array() => Ok(typed),
            other if self.multiple => Err(EncodeError::FieldError {
                field: self.name.clone(),
                reason: format!("expected a list of values, got {:?}", other),
            }),
            Value::List(values)
                if !matches!(self.field_type, FieldType::List | FieldType::Any) =>
            {
                Err(EncodeError::FieldError {
                    field: self.name.clone(),
                    reason: format!("does not support multiple values, got {:?}", values),
                })
            }
            other => self.field_type.wrap(&self.name, other),
        }
    }
}

/// Metadata of a composite type: a named, fielded record carried as a
/// described list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeDefinition {
    pub(crate) name: String,
    pub(crate) code: u64,
    pub(crate) fields: Vec<FieldDefinition>,
}

impl CompositeDefinition {
    pub fn new(
        name: impl Into<String>,
        code: u64,
        fields: Vec<FieldDefinition>,
    ) -> Result<Self, EncodeError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(EncodeError::FieldError {
                    field: field.name().to_string(),
                    reason: "declared twice".to_string(),
                });
            }
            if field.is_multiple() && !field.field_type().supports_multiple() {
                return Err(EncodeError::UnsupportedFieldType(format!(
                    "array of {} for field {}",
                    field.field_type(),
                    field.name()
                )));
            }
        }
        Ok(CompositeDefinition {
            name: name.into(),
            code,
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> u64 {
        self.code
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    pub fn symbolic_descriptor(&self) -> String {
        format!("amqp:{}:list", self.name)
    }

    pub fn descriptor(&self) -> Descriptor {
        Descriptor::Ulong(self.code)
    }
}

impl fmt::Display for CompositeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:x}", self.name, self.code)
    }
}

/// Validates `fields` and produces a shareable composite definition.
pub fn define_composite(
    name: impl Into<String>,
    code: u64,
    fields: Vec<FieldDefinition>,
) -> Result<Arc<CompositeDefinition>, EncodeError> {
    CompositeDefinition::new(name, code, fields).map(Arc::new)
}

/// Instance of a composite type. Field values are held in their typed form,
/// in definition order, which is also wire order.
///
/// Described field values are unwrapped with the registry the instance was
/// promoted by, or the standard registry for instances built locally.
#[derive(Clone)]
pub struct Composite {
    definition: Arc<CompositeDefinition>,
    fields: Vec<Typed>,
    registry: DescriptorRegistry,
}

impl Composite {
    /// An instance with every field absent.
    pub fn new(definition: Arc<CompositeDefinition>) -> Self {
        Composite {
            definition,
            fields: vec![],
            registry: DescriptorRegistry::standard().clone(),
        }
    }

    /// Builds an instance from named values, checking every declared field.
    pub fn create<K: AsRef<str>>(
        definition: &Arc<CompositeDefinition>,
        values: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<Self, EncodeError> {
        let mut provided: Vec<(K, Option<Value>)> =
            values.into_iter().map(|(k, v)| (k, Some(v))).collect();

        if let Some((unknown, _)) = provided
            .iter()
            .find(|(k, _)| definition.field_index(k.as_ref()).is_none())
        {
            return Err(EncodeError::FieldError {
                field: unknown.as_ref().to_string(),
                reason: format!("not a field of {}", definition),
            });
        }

        let fields = definition
            .fields()
            .iter()
            .map(|field| {
                let value = provided
                    .iter_mut()
                    .find(|(k, _)| k.as_ref() == field.name())
                    .and_then(|(_, v)| v.take());
                field.wrap_field(value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Composite {
            definition: definition.clone(),
            fields,
            registry: DescriptorRegistry::standard().clone(),
        })
    }

    /// Promotes a decoded described list.
    pub fn from_typed(
        definition: Arc<CompositeDefinition>,
        typed: Typed,
    ) -> Result<Self, DecodeError> {
        if !typed.is_list() {
            return Err(DecodeError::MessageParse(format!(
                "{} must be encoded as a list, got {}",
                definition,
                typed.type_descriptor()
            )));
        }
        let fields = match typed.into_value() {
            Primitive::Items(items) => items,
            _ => vec![],
        };
        Ok(Composite {
            definition,
            fields,
            registry: DescriptorRegistry::standard().clone(),
        })
    }

    /// Sets the registry used to unwrap described field values.
    pub fn with_registry(mut self, registry: DescriptorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    pub fn definition(&self) -> &Arc<CompositeDefinition> {
        &self.definition
    }

    /// Raw typed field values. Trailing absent fields may be missing.
    pub fn fields(&self) -> &[Typed] {
        &self.fields
    }

    /// Reads the field at `index`. Wildcard fields are returned typed, the
    /// others are unwrapped.
    pub fn get_index(&self, index: usize) -> Result<Value, DecodeError> {
        let raw = match self.fields.get(index) {
            Some(raw) if raw.code() != TypeCode::Null => raw,
            _ => return Ok(Value::Null),
        };
        match self.definition.fields().get(index).map(FieldDefinition::field_type) {
            Some(FieldType::Any) => Ok(Value::Typed(raw.clone())),
            _ => self.registry.unwrap(raw.clone(), false),
        }
    }

    pub fn get(&self, name: &str) -> Result<Value, DecodeError> {
        let index = self.definition.field_index(name).ok_or_else(|| {
            DecodeError::MessageParse(format!("{} has no field {}", self.definition, name))
        })?;
        self.get_index(index)
    }

    pub fn set_index(&mut self, index: usize, value: Value) -> Result<(), EncodeError> {
        let field = self.definition.fields().get(index).ok_or_else(|| {
            EncodeError::FieldError {
                field: index.to_string(),
                reason: format!("not a field of {}", self.definition),
            }
        })?;
        let typed = field.wrap_field(Some(value))?;
        if self.fields.len() <= index {
            self.fields.resize(index + 1, Typed::null());
        }
        self.fields[index] = typed;
        Ok(())
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), EncodeError> {
        let index = self
            .definition
            .field_index(name)
            .ok_or_else(|| EncodeError::FieldError {
                field: name.to_string(),
                reason: format!("not a field of {}", self.definition),
            })?;
        self.set_index(index, value.into())
    }

    /// The wire form: a list described by the numeric descriptor.
    pub fn described(&self) -> Typed {
        Typed::new(TypeCode::List32, Primitive::Items(self.fields.clone()))
            .described(wrap_ulong(self.definition.code()))
    }
}

impl PartialEq for Composite {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition && self.fields == other.fields
    }
}

impl Eq for Composite {}

impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("definition", &self.definition)
            .field("fields", &self.fields)
            .finish()
    }
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.definition, f)
    }
}

/// Generates positional accessors on a newtype over [`Composite`].
#[macro_export]
macro_rules! composite_accessors {
    ($ty:ident { $($index:expr => $getter:ident, $setter:ident);* $(;)? }) => {
        impl $ty {
            $(
                pub fn $getter(&self) -> Result<$crate::types::Value, $crate::error::DecodeError> {
                    self.0.get_index($index)
                }

                pub fn $setter(
                    &mut self,
                    value: impl Into<$crate::types::Value>,
                ) -> Result<(), $crate::error::EncodeError> {
                    self.0.set_index($index, value.into())
                }
            )*
        }
    };
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::Map;

    fn attach() -> Arc<CompositeDefinition> {
        define_composite(
            "attach",
            0x12,
            vec![
                FieldDefinition::new("name", FieldType::String).mandatory(),
                FieldDefinition::new("handle", FieldType::Uint).mandatory(),
                FieldDefinition::new("offered-capabilities", FieldType::Symbol).multiple(),
                FieldDefinition::new("properties", FieldType::SymbolicMap),
                FieldDefinition::new("unsettled", FieldType::Any),
            ],
        )
        .unwrap()
    }

    #[test]
    fn field_types_parse_by_name() {
        assert_eq!("symbol".parse::<FieldType>().unwrap(), FieldType::Symbol);
        assert_eq!("*".parse::<FieldType>().unwrap(), FieldType::Any);
        assert_eq!(FieldType::SymbolicMap.to_string(), "symbolic_map");
        assert!(matches!(
            "decimal64".parse::<FieldType>(),
            Err(EncodeError::UnsupportedFieldType(name)) if name == "decimal64"
        ));
        assert!(FieldDefinition::parse("x", "bogus").is_err());
    }

    #[test]
    fn unsupported_multiple_is_rejected_at_definition() {
        let result = define_composite(
            "bad",
            0x99,
            vec![FieldDefinition::new("flags", FieldType::Boolean).multiple()],
        );
        assert!(matches!(result, Err(EncodeError::UnsupportedFieldType(_))));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let result = define_composite(
            "dup",
            0x98,
            vec![
                FieldDefinition::new("a", FieldType::Uint),
                FieldDefinition::new("a", FieldType::Uint),
            ],
        );
        assert!(matches!(result, Err(EncodeError::FieldError { .. })));
    }

    #[test]
    fn create_wraps_every_field() {
        let definition = attach();
        let composite = Composite::create(
            &definition,
            vec![
                ("name", Value::from("link-1")),
                ("handle", Value::from(3u32)),
                (
                    "offered-capabilities",
                    Value::List(vec!["a".into(), "b".into()]),
                ),
            ],
        )
        .unwrap();

        let fields = composite.fields();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], wrap_string("link-1"));
        assert_eq!(fields[1], wrap_uint(3));
        assert!(fields[2].is_array());
        assert_eq!(fields[2].array_constructor().unwrap().code, TypeCode::Sym8);
        assert_eq!(fields[3], Typed::null());
        assert_eq!(composite.get("handle").unwrap(), Value::Integer(3));
        assert_eq!(composite.get("properties").unwrap(), Value::Null);
        assert_eq!(composite.to_string(), "attach#12");
    }

    #[test]
    fn mandatory_fields_must_be_present() {
        let definition = attach();
        let err = Composite::create(&definition, vec![("name", Value::from("x"))]).unwrap_err();
        assert!(matches!(err, EncodeError::MandatoryFieldMissing(f) if f == "handle"));
    }

    #[test]
    fn multiple_fields_need_lists() {
        let definition = attach();
        let mut composite = Composite::new(definition);
        let err = composite
            .set("offered-capabilities", "single")
            .unwrap_err();
        assert!(matches!(err, EncodeError::FieldError { .. }));

        let err = composite
            .set("name", Value::List(vec!["a".into()]))
            .unwrap_err();
        assert!(matches!(err, EncodeError::FieldError { .. }));
    }

    #[test]
    fn type_mismatch_and_unknown_fields() {
        let definition = attach();
        let mut composite = Composite::new(definition.clone());
        assert!(matches!(
            composite.set("handle", "three"),
            Err(EncodeError::FieldError { .. })
        ));
        assert!(matches!(
            composite.set("handle", -1i32),
            Err(EncodeError::FieldError { .. })
        ));
        assert!(matches!(
            composite.set("nope", 1u32),
            Err(EncodeError::FieldError { .. })
        ));
        assert!(Composite::create(&definition, vec![("nope", Value::Null)]).is_err());
    }

    #[test]
    fn wildcard_fields_pass_through() {
        let definition = attach();
        let mut composite = Composite::new(definition);
        let raw = wrap_ulong(77).described(wrap_symbol("x"));
        composite.set("unsettled", raw.clone()).unwrap();
        assert_eq!(composite.get("unsettled").unwrap(), Value::Typed(raw));
    }

    #[test]
    fn typed_values_must_match_the_field_type() {
        let mut composite = Composite::new(attach());
        assert!(matches!(
            composite.set("handle", wrap_string("3")),
            Err(EncodeError::FieldError { .. })
        ));
        composite.set("handle", wrap_uint(3)).unwrap();
        assert!(matches!(
            composite.set("name", Typed::null()),
            Err(EncodeError::MandatoryFieldMissing(_))
        ));

        let list = wrap_list(vec![]).unwrap();
        assert!(FieldType::Composite(0x28).accepts(&list.clone().described(wrap_ulong(0x28))));
        assert!(!FieldType::Composite(0x28).accepts(&list.clone().described(wrap_ulong(0x29))));
        assert!(!FieldType::Composite(0x28).accepts(&list));
        assert!(FieldType::MessageId.accepts(&wrap_ulong(9)));
        assert!(!FieldType::MessageId.accepts(&wrap_symbol("x")));
    }

    #[test]
    fn nested_composites_unwrap_with_the_promoting_registry() {
        let source = define_composite(
            "source",
            0x28,
            vec![FieldDefinition::new("address", FieldType::String)],
        )
        .unwrap();
        let link = define_composite(
            "link",
            0x12,
            vec![
                FieldDefinition::new("name", FieldType::String),
                FieldDefinition::new("source", FieldType::Composite(0x28)),
            ],
        )
        .unwrap();
        let registry = DescriptorRegistry::builder()
            .add_type(source.clone())
            .add_type(link.clone())
            .build();

        let inner = Composite::create(&source, vec![("address", Value::from("q1"))]).unwrap();
        let outer = Composite::create(
            &link,
            vec![
                ("name", Value::from("l")),
                ("source", Value::Composite(inner.clone())),
            ],
        )
        .unwrap();

        let mut promoted = match registry.unwrap(outer.described(), false).unwrap() {
            Value::Composite(composite) => composite,
            other => panic!("unexpected {:?}", other),
        };
        let nested = promoted.get("source").unwrap();
        assert_eq!(nested, Value::Composite(inner));
        promoted.set("source", nested).unwrap();
        assert_eq!(promoted, outer);

        // Locally built instances only know the standard types.
        assert!(matches!(outer.get("source").unwrap(), Value::List(_)));
    }

    #[test]
    fn described_form() {
        let definition = attach();
        let mut composite = Composite::new(definition);
        composite.set("name", "n").unwrap();
        let properties: Map = vec![("k", "v")].into_iter().collect();
        composite.set("properties", properties.clone()).unwrap();

        let typed = composite.described();
        assert_eq!(typed.code(), TypeCode::List32);
        assert_eq!(typed.descriptor(), Some(&wrap_ulong(0x12)));
        assert_eq!(typed.items().unwrap().len(), 4);
        assert_eq!(composite.get("properties").unwrap(), Value::Map(properties));
    }
}
