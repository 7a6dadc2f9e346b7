use ordered_float::OrderedFloat;
use uuid::Uuid;

use super::{constants::TypeCode, Category, TypeDescriptor};

/// Payload carried by a [`Typed`] value.
///
/// Compact encodings share the payload of their family: `SmallUint` and
/// `Uint0` both carry [`Primitive::Uint`], `SmallLong` carries
/// [`Primitive::Long`] and so on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Primitive {
    Null,
    Boolean(bool),
    Ubyte(u8),
    Ushort(u16),
    Uint(u32),
    Ulong(u64),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(OrderedFloat<f32>),
    Double(OrderedFloat<f64>),
    Char(char),
    /// Milliseconds since the unix epoch.
    Timestamp(i64),
    Uuid(Uuid),
    /// Fixed width bytes with no conversion (decimals).
    Raw(Vec<u8>),
    Binary(Vec<u8>),
    Text(String),
    /// Elements of a list, map (alternating keys and values) or array.
    Items(Vec<Typed>),
}

/// Element constructor shared by every element of an AMQP array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayConstructor {
    pub code: TypeCode,
    pub descriptors: Vec<Typed>,
}

/// A value bound to the encoding it will be written with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Typed {
    code: TypeCode,
    value: Primitive,
    array_constructor: Option<ArrayConstructor>,
    descriptors: Vec<Typed>,
}

impl Typed {
    pub fn new(code: TypeCode, value: Primitive) -> Self {
        Typed {
            code,
            value,
            array_constructor: None,
            descriptors: vec![],
        }
    }

    /// Creates a zero width value, `Null` when `code` is not a zero width
    /// type.
    pub fn empty(code: TypeCode) -> Self {
        let value = code.descriptor().empty_value().unwrap_or(Primitive::Null);
        Typed::new(code, value)
    }

    pub fn null() -> Self {
        Typed::empty(TypeCode::Null)
    }

    pub fn array(code: TypeCode, items: Vec<Typed>, constructor: ArrayConstructor) -> Self {
        Typed {
            code,
            value: Primitive::Items(items),
            array_constructor: Some(constructor),
            descriptors: vec![],
        }
    }

    /// Marks the value as described by `descriptor`. Descriptors already
    /// present become inner descriptors, matching the order they appear on
    /// the wire.
    pub fn described(mut self, descriptor: Typed) -> Self {
        self.descriptors.insert(0, descriptor);
        self
    }

    pub(crate) fn with_descriptors(mut self, descriptors: Vec<Typed>) -> Self {
        self.descriptors = descriptors;
        self
    }

    pub fn code(&self) -> TypeCode {
        self.code
    }

    pub fn type_descriptor(&self) -> &'static TypeDescriptor {
        self.code.descriptor()
    }

    pub fn value(&self) -> &Primitive {
        &self.value
    }

    pub fn into_value(self) -> Primitive {
        self.value
    }

    pub fn array_constructor(&self) -> Option<&ArrayConstructor> {
        self.array_constructor.as_ref()
    }

    /// The outermost descriptor.
    pub fn descriptor(&self) -> Option<&Typed> {
        self.descriptors.first()
    }

    pub fn descriptors(&self) -> &[Typed] {
        &self.descriptors
    }

    /// Drops every descriptor, returning the bare value.
    pub fn undescribed(mut self) -> Self {
        self.descriptors.clear();
        self
    }

    pub fn items(&self) -> Option<&[Typed]> {
        match self.value {
            Primitive::Items(ref items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.value {
            Primitive::Text(ref text) => Some(text),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.value {
            Primitive::Ulong(v) => Some(v),
            Primitive::Uint(v) => Some(u64::from(v)),
            Primitive::Ushort(v) => Some(u64::from(v)),
            Primitive::Ubyte(v) => Some(u64::from(v)),
            _ => None,
        }
    }

    fn is_one_of(&self, codes: &[TypeCode]) -> bool {
        codes.contains(&self.code)
    }

    pub fn is_described(&self) -> bool {
        !self.descriptors.is_empty()
    }

    pub fn is_ulong(&self) -> bool {
        self.is_one_of(&[TypeCode::Ulong, TypeCode::Ulong0, TypeCode::SmallUlong])
    }

    pub fn is_string(&self) -> bool {
        self.is_one_of(&[TypeCode::Str8, TypeCode::Str32])
    }

    pub fn is_symbol(&self) -> bool {
        self.is_one_of(&[TypeCode::Sym8, TypeCode::Sym32])
    }

    pub fn is_list(&self) -> bool {
        self.is_one_of(&[TypeCode::List0, TypeCode::List8, TypeCode::List32])
    }

    pub fn is_map(&self) -> bool {
        self.is_one_of(&[TypeCode::Map8, TypeCode::Map32])
    }

    pub fn is_array(&self) -> bool {
        self.type_descriptor().category() == Category::Array
    }
}
