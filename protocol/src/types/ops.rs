//! Byte level accessors for fixed width types.
//!
//! Every accessor works on a slice of exactly the type's width. Writers
//! reject a [`Primitive`] that does not belong to the type's family.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use ordered_float::OrderedFloat;
use uuid::Uuid;

use super::Primitive;
use crate::error::{DecodeError, EncodeError};

pub type ReadOp = fn(&[u8]) -> Result<Primitive, DecodeError>;
pub type WriteOp = fn(&Primitive, &mut [u8]) -> Result<(), EncodeError>;

#[derive(Clone, Copy)]
pub struct ByteOps {
    pub read: ReadOp,
    pub write: WriteOp,
}

impl fmt::Debug for ByteOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ByteOps")
    }
}

const MAX_UINT: u64 = 1 << 32;

fn cannot_write(value: &Primitive, target: &str) -> EncodeError {
    EncodeError::InvalidValue(format!("cannot write {:?} as {}", value, target))
}

macro_rules! byte_ops {
    ($name:ident, $read:ident, $write:ident) => {
        pub const $name: ByteOps = ByteOps {
            read: $read,
            write: $write,
        };
    };
}

fn read_boolean(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Boolean(input[0] != 0))
}

fn write_boolean(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Boolean(b) => {
            out[0] = u8::from(*b);
            Ok(())
        }
        other => Err(cannot_write(other, "boolean")),
    }
}

fn read_ubyte(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Ubyte(input[0]))
}

fn write_ubyte(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Ubyte(v) => {
            out[0] = *v;
            Ok(())
        }
        other => Err(cannot_write(other, "ubyte")),
    }
}

fn read_ushort(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Ushort(BigEndian::read_u16(input)))
}

fn write_ushort(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Ushort(v) => {
            BigEndian::write_u16(out, *v);
            Ok(())
        }
        other => Err(cannot_write(other, "ushort")),
    }
}

fn read_uint(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Uint(BigEndian::read_u32(input)))
}

fn write_uint(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Uint(v) => {
            BigEndian::write_u32(out, *v);
            Ok(())
        }
        other => Err(cannot_write(other, "uint")),
    }
}

fn read_small_uint(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Uint(u32::from(input[0])))
}

fn write_small_uint(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Uint(v) if *v <= u32::from(u8::MAX) => {
            out[0] = *v as u8;
            Ok(())
        }
        other => Err(cannot_write(other, "smalluint")),
    }
}

/// Splits `value` into big-endian high and low 32 bit words.
pub fn write_ulong_words(value: u64, out: &mut [u8]) {
    BigEndian::write_u32(&mut out[..4], (value / MAX_UINT) as u32);
    BigEndian::write_u32(&mut out[4..8], (value % MAX_UINT) as u32);
}

pub fn read_ulong_words(input: &[u8]) -> u64 {
    let hi = u64::from(BigEndian::read_u32(&input[..4]));
    let lo = u64::from(BigEndian::read_u32(&input[4..8]));
    hi * MAX_UINT + lo
}

/// Writes the magnitude as two words then applies two's complement negation
/// across all 8 bytes when `value` is negative.
pub fn write_long_words(value: i64, out: &mut [u8]) {
    write_ulong_words(value.unsigned_abs(), out);
    if value < 0 {
        let mut carry = 1u16;
        for byte in out[..8].iter_mut().rev() {
            let v = u16::from(*byte ^ 0xff) + carry;
            *byte = (v & 0xff) as u8;
            carry = v >> 8;
        }
    }
}

pub fn read_long_words(input: &[u8]) -> i64 {
    let hi = i64::from(BigEndian::read_i32(&input[..4]));
    let lo = i64::from(BigEndian::read_u32(&input[4..8]));
    hi * MAX_UINT as i64 + lo
}

fn read_ulong(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Ulong(read_ulong_words(input)))
}

fn write_ulong(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Ulong(v) => {
            write_ulong_words(*v, out);
            Ok(())
        }
        other => Err(cannot_write(other, "ulong")),
    }
}

fn read_small_ulong(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Ulong(u64::from(input[0])))
}

fn write_small_ulong(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Ulong(v) if *v <= u64::from(u8::MAX) => {
            out[0] = *v as u8;
            Ok(())
        }
        other => Err(cannot_write(other, "smallulong")),
    }
}

fn read_byte(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Byte(input[0] as i8))
}

fn write_byte(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Byte(v) => {
            out[0] = *v as u8;
            Ok(())
        }
        other => Err(cannot_write(other, "byte")),
    }
}

fn read_short(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Short(BigEndian::read_i16(input)))
}

fn write_short(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Short(v) => {
            BigEndian::write_i16(out, *v);
            Ok(())
        }
        other => Err(cannot_write(other, "short")),
    }
}

fn read_int(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Int(BigEndian::read_i32(input)))
}

fn write_int(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Int(v) => {
            BigEndian::write_i32(out, *v);
            Ok(())
        }
        other => Err(cannot_write(other, "int")),
    }
}

fn read_small_int(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Int(i32::from(input[0] as i8)))
}

fn write_small_int(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Int(v) if i8::try_from(*v).is_ok() => {
            out[0] = *v as i8 as u8;
            Ok(())
        }
        other => Err(cannot_write(other, "smallint")),
    }
}

fn read_long(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Long(read_long_words(input)))
}

fn write_long(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Long(v) => {
            write_long_words(*v, out);
            Ok(())
        }
        other => Err(cannot_write(other, "long")),
    }
}

fn read_small_long(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Long(i64::from(input[0] as i8)))
}

fn write_small_long(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Long(v) if i8::try_from(*v).is_ok() => {
            out[0] = *v as i8 as u8;
            Ok(())
        }
        other => Err(cannot_write(other, "smalllong")),
    }
}

fn read_float(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Float(OrderedFloat(BigEndian::read_f32(input))))
}

fn write_float(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Float(v) => {
            BigEndian::write_f32(out, v.0);
            Ok(())
        }
        other => Err(cannot_write(other, "float")),
    }
}

fn read_double(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Double(OrderedFloat(BigEndian::read_f64(input))))
}

fn write_double(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Double(v) => {
            BigEndian::write_f64(out, v.0);
            Ok(())
        }
        other => Err(cannot_write(other, "double")),
    }
}

fn read_char(input: &[u8]) -> Result<Primitive, DecodeError> {
    let code_point = BigEndian::read_u32(input);
    char::from_u32(code_point)
        .map(Primitive::Char)
        .ok_or(DecodeError::InvalidChar(code_point))
}

fn write_char(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Char(c) => {
            BigEndian::write_u32(out, u32::from(*c));
            Ok(())
        }
        other => Err(cannot_write(other, "char")),
    }
}

fn read_timestamp(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Timestamp(read_long_words(input)))
}

fn write_timestamp(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Timestamp(millis) => {
            write_long_words(*millis, out);
            Ok(())
        }
        other => Err(cannot_write(other, "timestamp")),
    }
}

fn read_uuid(input: &[u8]) -> Result<Primitive, DecodeError> {
    Ok(Primitive::Uuid(Uuid::from_slice(input)?))
}

fn write_uuid(value: &Primitive, out: &mut [u8]) -> Result<(), EncodeError> {
    match value {
        Primitive::Uuid(uuid) => {
            out.copy_from_slice(uuid.as_bytes());
            Ok(())
        }
        other => Err(cannot_write(other, "uuid")),
    }
}

byte_ops!(BOOLEAN, read_boolean, write_boolean);
byte_ops!(UBYTE, read_ubyte, write_ubyte);
byte_ops!(USHORT, read_ushort, write_ushort);
byte_ops!(UINT, read_uint, write_uint);
byte_ops!(SMALL_UINT, read_small_uint, write_small_uint);
byte_ops!(ULONG, read_ulong, write_ulong);
byte_ops!(SMALL_ULONG, read_small_ulong, write_small_ulong);
byte_ops!(BYTE, read_byte, write_byte);
byte_ops!(SHORT, read_short, write_short);
byte_ops!(INT, read_int, write_int);
byte_ops!(SMALL_INT, read_small_int, write_small_int);
byte_ops!(LONG, read_long, write_long);
byte_ops!(SMALL_LONG, read_small_long, write_small_long);
byte_ops!(FLOAT, read_float, write_float);
byte_ops!(DOUBLE, read_double, write_double);
byte_ops!(CHAR, read_char, write_char);
byte_ops!(TIMESTAMP, read_timestamp, write_timestamp);
byte_ops!(UUID, read_uuid, write_uuid);
