use std::fmt;

use super::{constants::TypeCode, ops, ByteOps, Primitive};
use crate::error::DecodeError;

/// Size-prefix convention of an encoded value, derived from the upper nibble
/// of its typecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Fixed,
    Variable,
    Compound,
    Array,
}

/// Charset of a variable width text type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Ascii,
}

/// Static description of one AMQP primitive encoding.
///
/// For fixed types `width` is the size of the whole value, for the other
/// categories it is the size of the size/count fields.
#[derive(Debug, Clone, Copy)]
pub struct TypeDescriptor {
    name: &'static str,
    code: TypeCode,
    category: Category,
    width: u8,
    encoding: Option<Encoding>,
    ops: Option<ByteOps>,
}

impl TypeDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn code(&self) -> TypeCode {
        self.code
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    pub fn ops(&self) -> Option<&ByteOps> {
        self.ops.as_ref()
    }

    /// The implied value of a zero width type.
    pub fn empty_value(&self) -> Option<Primitive> {
        match self.code {
            TypeCode::Null => Some(Primitive::Null),
            TypeCode::True => Some(Primitive::Boolean(true)),
            TypeCode::False => Some(Primitive::Boolean(false)),
            TypeCode::Uint0 => Some(Primitive::Uint(0)),
            TypeCode::Ulong0 => Some(Primitive::Ulong(0)),
            TypeCode::List0 => Some(Primitive::Items(vec![])),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:x}", self.name, self.code.code())
    }
}

const fn layout(code: TypeCode) -> (Category, u8) {
    match (code as u8) >> 4 {
        0x4 => (Category::Fixed, 0),
        0x5 => (Category::Fixed, 1),
        0x6 => (Category::Fixed, 2),
        0x7 => (Category::Fixed, 4),
        0x8 => (Category::Fixed, 8),
        0x9 => (Category::Fixed, 16),
        0xA => (Category::Variable, 1),
        0xB => (Category::Variable, 4),
        0xC => (Category::Compound, 1),
        0xD => (Category::Compound, 4),
        0xE => (Category::Array, 1),
        0xF => (Category::Array, 4),
        _ => panic!("typecode outside of the AMQP primitive ranges"),
    }
}

const fn define(
    name: &'static str,
    code: TypeCode,
    ops: Option<ByteOps>,
    encoding: Option<Encoding>,
) -> TypeDescriptor {
    let (category, width) = layout(code);
    TypeDescriptor {
        name,
        code,
        category,
        width,
        encoding,
        ops,
    }
}

const DEFINITIONS: [TypeDescriptor; 39] = [
    define("Null", TypeCode::Null, None, None),
    define("Boolean", TypeCode::Boolean, Some(ops::BOOLEAN), None),
    define("True", TypeCode::True, None, None),
    define("False", TypeCode::False, None, None),
    define("Ubyte", TypeCode::Ubyte, Some(ops::UBYTE), None),
    define("Ushort", TypeCode::Ushort, Some(ops::USHORT), None),
    define("Uint", TypeCode::Uint, Some(ops::UINT), None),
    define("SmallUint", TypeCode::SmallUint, Some(ops::SMALL_UINT), None),
    define("Uint0", TypeCode::Uint0, None, None),
    define("Ulong", TypeCode::Ulong, Some(ops::ULONG), None),
    define("SmallUlong", TypeCode::SmallUlong, Some(ops::SMALL_ULONG), None),
    define("Ulong0", TypeCode::Ulong0, None, None),
    define("Byte", TypeCode::Byte, Some(ops::BYTE), None),
    define("Short", TypeCode::Short, Some(ops::SHORT), None),
    define("Int", TypeCode::Int, Some(ops::INT), None),
    define("SmallInt", TypeCode::SmallInt, Some(ops::SMALL_INT), None),
    define("Long", TypeCode::Long, Some(ops::LONG), None),
    define("SmallLong", TypeCode::SmallLong, Some(ops::SMALL_LONG), None),
    define("Float", TypeCode::Float, Some(ops::FLOAT), None),
    define("Double", TypeCode::Double, Some(ops::DOUBLE), None),
    define("Decimal32", TypeCode::Decimal32, None, None),
    define("Decimal64", TypeCode::Decimal64, None, None),
    define("Decimal128", TypeCode::Decimal128, None, None),
    define("CharUTF32", TypeCode::CharUTF32, Some(ops::CHAR), None),
    define("Timestamp", TypeCode::Timestamp, Some(ops::TIMESTAMP), None),
    define("Uuid", TypeCode::Uuid, Some(ops::UUID), None),
    define("Vbin8", TypeCode::Vbin8, None, None),
    define("Vbin32", TypeCode::Vbin32, None, None),
    define("Str8", TypeCode::Str8, None, Some(Encoding::Utf8)),
    define("Str32", TypeCode::Str32, None, Some(Encoding::Utf8)),
    define("Sym8", TypeCode::Sym8, None, Some(Encoding::Ascii)),
    define("Sym32", TypeCode::Sym32, None, Some(Encoding::Ascii)),
    define("List0", TypeCode::List0, None, None),
    define("List8", TypeCode::List8, None, None),
    define("List32", TypeCode::List32, None, None),
    define("Map8", TypeCode::Map8, None, None),
    define("Map32", TypeCode::Map32, None, None),
    define("Array8", TypeCode::Array8, None, None),
    define("Array32", TypeCode::Array32, None, None),
];

const fn index(definitions: [TypeDescriptor; 39]) -> [Option<TypeDescriptor>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < definitions.len() {
        let code = definitions[i].code as usize;
        if table[code].is_some() {
            panic!("typecode registered twice");
        }
        table[code] = Some(definitions[i]);
        i += 1;
    }
    table
}

static TYPES: [Option<TypeDescriptor>; 256] = index(DEFINITIONS);

pub fn lookup_by_code(code: u8) -> Result<&'static TypeDescriptor, DecodeError> {
    TYPES[code as usize]
        .as_ref()
        .ok_or(DecodeError::UnrecognizedTypecode(code))
}

pub fn lookup_by_name(name: &str) -> Option<&'static TypeDescriptor> {
    TYPES.iter().flatten().find(|t| t.name == name)
}

impl TypeCode {
    pub fn descriptor(self) -> &'static TypeDescriptor {
        match TYPES[self.code() as usize] {
            Some(ref t) => t,
            // every TypeCode variant has an entry in DEFINITIONS
            None => unreachable!("{:?} has no type descriptor", self),
        }
    }
}
