use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Constructor byte introducing a descriptor ahead of the real typecode.
pub const DESCRIBED: u8 = 0x00;

/// One-byte AMQP 1.0 typecodes. The upper nibble decides the layout of the
/// encoded value, see [`Category`](super::Category).
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeCode {
    Null = 0x40, // fixed width --V
    Boolean = 0x56,
    True = 0x41,
    False = 0x42,
    Ubyte = 0x50,
    Ushort = 0x60,
    Uint = 0x70,
    SmallUint = 0x52,
    Uint0 = 0x43,
    Ulong = 0x80,
    SmallUlong = 0x53,
    Ulong0 = 0x44,
    Byte = 0x51,
    Short = 0x61,
    Int = 0x71,
    SmallInt = 0x54,
    Long = 0x81,
    SmallLong = 0x55,
    Float = 0x72,
    Double = 0x82,
    Decimal32 = 0x74,
    Decimal64 = 0x84,
    Decimal128 = 0x94,
    CharUTF32 = 0x73,
    Timestamp = 0x83,
    Uuid = 0x98,
    Vbin8 = 0xa0, // variable --V
    Vbin32 = 0xb0,
    Str8 = 0xa1,
    Str32 = 0xb1,
    Sym8 = 0xa3,
    Sym32 = 0xb3,
    List0 = 0x45, // compound --V
    List8 = 0xc0,
    List32 = 0xd0,
    Map8 = 0xc1,
    Map32 = 0xd1,
    Array8 = 0xe0, // array --V
    Array32 = 0xf0,
}

impl TypeCode {
    pub fn code(self) -> u8 {
        self.into()
    }
}
