use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

use crate::{
    error::EncodeError,
    types::{Category, Primitive, TypeCode, TypeDescriptor, Typed, Value, DESCRIBED},
};

pub const DEFAULT_CAPACITY: usize = 1024;

/// Encoder over a growable buffer.
///
/// Compound and array sizes are written as placeholders and backfilled
/// once their content has been written.
pub struct Writer {
    buffer: Vec<u8>,
    position: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Writer::new()
    }
}

impl Writer {
    pub fn new() -> Self {
        Writer::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Writer {
            buffer: vec![0; capacity],
            position: 0,
        }
    }

    /// Writes into `buffer`, overwriting its content from the start.
    pub fn with_buffer(buffer: Vec<u8>) -> Self {
        Writer {
            buffer,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.position]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buffer.truncate(self.position);
        self.buffer
    }

    pub fn clear(&mut self) {
        self.position = 0;
    }

    /// Advances past `size` zeroed bytes.
    pub fn skip(&mut self, size: usize) {
        self.ensure(size);
        self.buffer[self.position..self.position + size].fill(0);
        self.position += size;
    }

    fn ensure(&mut self, size: usize) {
        let required = self.position + size;
        if required > self.buffer.len() {
            let capacity = required.max(self.buffer.len() * 2);
            trace!("growing writer from {} to {}", self.buffer.len(), capacity);
            self.buffer.resize(capacity, 0);
        }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.ensure(bytes.len());
        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
    }

    fn put_uint_at(&mut self, offset: usize, width: u8, value: usize) -> Result<(), EncodeError> {
        let too_large =
            || EncodeError::InvalidValue(format!("{} does not fit {} bytes", value, width));
        let out = &mut self.buffer[offset..offset + usize::from(width)];
        match width {
            1 => out[0] = u8::try_from(value).map_err(|_| too_large())?,
            2 => BigEndian::write_u16(out, u16::try_from(value).map_err(|_| too_large())?),
            4 => BigEndian::write_u32(out, u32::try_from(value).map_err(|_| too_large())?),
            other => return Err(EncodeError::UnsupportedWidth(other)),
        }
        Ok(())
    }

    /// Writes a size or count field.
    pub fn write_uint(&mut self, width: u8, value: usize) -> Result<(), EncodeError> {
        if !matches!(width, 1 | 2 | 4) {
            return Err(EncodeError::UnsupportedWidth(width));
        }
        let offset = self.position;
        self.skip(usize::from(width));
        self.put_uint_at(offset, width, value)
    }

    /// Writes a complete typed value, descriptors included. On failure the
    /// position is restored to where the value started.
    pub fn write(&mut self, typed: &Typed) -> Result<(), EncodeError> {
        let start = self.position;
        let result = self
            .write_constructor(typed.code(), typed.descriptors())
            .and_then(|_| self.write_body(typed));
        if result.is_err() {
            self.position = start;
        }
        result
    }

    /// Writes a native value that is already typed.
    pub fn write_value(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Typed(typed) => self.write(typed),
            Value::Composite(composite) => self.write(&composite.described()),
            other => Err(EncodeError::InvalidValue(format!(
                "cannot write untyped value {:?}",
                other
            ))),
        }
    }

    pub fn write_constructor(
        &mut self,
        code: TypeCode,
        descriptors: &[Typed],
    ) -> Result<(), EncodeError> {
        for descriptor in descriptors {
            self.put(&[DESCRIBED]);
            self.write(descriptor)?;
        }
        self.put(&[code.code()]);
        Ok(())
    }

    fn write_body(&mut self, typed: &Typed) -> Result<(), EncodeError> {
        let descriptor = typed.type_descriptor();
        trace!("writing {} at {}", descriptor, self.position);
        match descriptor.category() {
            Category::Fixed => self.write_fixed(descriptor, typed.value()),
            Category::Variable => self.write_variable(descriptor, typed.value()),
            Category::Compound => self.write_compound(descriptor, typed.value()),
            Category::Array => self.write_array(descriptor, typed),
        }
    }

    fn write_fixed(
        &mut self,
        descriptor: &TypeDescriptor,
        value: &Primitive,
    ) -> Result<(), EncodeError> {
        let width = usize::from(descriptor.width());
        if width == 0 {
            return Ok(());
        }
        match (descriptor.ops(), value) {
            (Some(ops), value) => {
                self.ensure(width);
                let start = self.position;
                (ops.write)(value, &mut self.buffer[start..start + width])?;
                self.position += width;
                Ok(())
            }
            (None, Primitive::Raw(bytes)) if bytes.len() == width => {
                self.put(bytes);
                Ok(())
            }
            (None, other) => Err(EncodeError::InvalidValue(format!(
                "cannot write {:?} as {}",
                other, descriptor
            ))),
        }
    }

    fn write_variable(
        &mut self,
        descriptor: &TypeDescriptor,
        value: &Primitive,
    ) -> Result<(), EncodeError> {
        let bytes = match (descriptor.encoding(), value) {
            (Some(_), Primitive::Text(text)) => text.as_bytes(),
            (None, Primitive::Binary(bytes) | Primitive::Raw(bytes)) => bytes.as_slice(),
            (_, other) => {
                return Err(EncodeError::InvalidValue(format!(
                    "cannot write {:?} as {}",
                    other, descriptor
                )))
            }
        };
        self.write_uint(descriptor.width(), bytes.len())?;
        self.put(bytes);
        Ok(())
    }

    fn write_compound(
        &mut self,
        descriptor: &TypeDescriptor,
        value: &Primitive,
    ) -> Result<(), EncodeError> {
        let items = match value {
            Primitive::Items(items) => items,
            other => {
                return Err(EncodeError::InvalidValue(format!(
                    "cannot write {:?} as {}",
                    other, descriptor
                )))
            }
        };
        let width = descriptor.width();
        let size_at = self.position;
        self.skip(usize::from(width));
        self.write_uint(width, items.len())?;
        for item in items {
            self.write(item)?;
        }
        self.backfill_size(size_at, width)
    }

    fn write_array(
        &mut self,
        descriptor: &TypeDescriptor,
        typed: &Typed,
    ) -> Result<(), EncodeError> {
        let constructor = typed.array_constructor().ok_or_else(|| {
            EncodeError::InvalidValue(format!("{} without an element type", descriptor))
        })?;
        let items = typed.items().unwrap_or_default();

        let width = descriptor.width();
        let size_at = self.position;
        self.skip(usize::from(width));
        self.write_uint(width, items.len())?;
        self.write_constructor(constructor.code, &constructor.descriptors)?;
        for item in items {
            if item.code() != constructor.code {
                return Err(EncodeError::InvalidValue(format!(
                    "{} element in an array of {}",
                    item.type_descriptor(),
                    constructor.code.descriptor()
                )));
            }
            self.write_body(item)?;
        }
        self.backfill_size(size_at, width)
    }

    /// Overwrites the size field at `offset` with the number of bytes
    /// written after it.
    fn backfill_size(&mut self, offset: usize, width: u8) -> Result<(), EncodeError> {
        let size = self.position - offset - usize::from(width);
        trace!("backfilling size {} at {}", size, offset);
        self.put_uint_at(offset, width, size)
    }
}

impl fmt::Display for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Writer({}/{})", self.position, self.buffer.len())?;
        for byte in self.as_bytes() {
            write!(f, " {:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        codec::Reader,
        types::{
            wrap, wrap_array, wrap_boolean, wrap_described, wrap_list, wrap_string, wrap_symbol,
            wrap_uint, ArrayConstructor, Map,
        },
    };

    fn encode(typed: &Typed) -> Vec<u8> {
        let mut writer = Writer::new();
        writer.write(typed).unwrap();
        writer.into_bytes()
    }

    #[test]
    fn writes_compact_encodings() {
        assert_eq!(encode(&wrap(true).unwrap()), vec![0x41]);
        assert_eq!(encode(&wrap(0u32).unwrap()), vec![0x43]);
        assert_eq!(encode(&wrap(7u32).unwrap()), vec![0x52, 0x07]);
        assert_eq!(encode(&wrap(-1i32).unwrap()), vec![0x54, 0xff]);
        assert_eq!(encode(&wrap("foo").unwrap()), vec![0xa1, 0x03, b'f', b'o', b'o']);
    }

    #[test]
    fn backfills_list_sizes() {
        let list = wrap_list(vec![true.into(), 9u32.into()]).unwrap();
        assert_eq!(
            encode(&list),
            vec![0xd0, 0, 0, 0, 7, 0, 0, 0, 2, 0x41, 0x52, 0x09]
        );
    }

    #[test]
    fn backfills_array_sizes() {
        let array = wrap_array(vec!["a".into()], Some(TypeCode::Sym8), None).unwrap();
        assert_eq!(
            encode(&array),
            vec![0xf0, 0, 0, 0, 7, 0, 0, 0, 1, 0xa3, 0x01, b'a']
        );
    }

    #[test]
    fn writes_descriptors_before_the_constructor() {
        let typed = wrap_described("x", 0x10u64).unwrap();
        assert_eq!(encode(&typed), vec![0x00, 0x53, 0x10, 0xa1, 0x01, b'x']);
    }

    #[test]
    fn grows_by_doubling() {
        let mut writer = Writer::with_capacity(4);
        writer.write(&wrap_string("abcdef")).unwrap();
        assert_eq!(writer.capacity(), 8);
        writer.write(&wrap_string("x".repeat(40))).unwrap();
        assert_eq!(writer.capacity(), 50);
        assert_eq!(writer.position(), 50);
    }

    #[test]
    fn small_encodings_reject_long_content() {
        let typed = Typed::new(TypeCode::Str8, Primitive::Text("x".repeat(300)));
        let mut writer = Writer::new();
        assert!(matches!(
            writer.write(&typed),
            Err(EncodeError::InvalidValue(_))
        ));
    }

    #[test]
    fn failed_writes_leave_nothing_behind() {
        let mut writer = Writer::new();
        writer.write(&wrap_uint(1)).unwrap();
        let long = Typed::new(TypeCode::Str8, Primitive::Text("x".repeat(300)));
        assert!(writer.write(&long).is_err());
        assert_eq!(writer.position(), 2);

        let list = Typed::new(TypeCode::List8, Primitive::Items(vec![wrap_uint(7), long]));
        assert!(writer.write(&list).is_err());
        writer.write(&wrap(true).unwrap()).unwrap();
        assert_eq!(writer.as_bytes(), &[0x52, 0x01, 0x41]);
    }

    #[test]
    fn backfills_small_compounds() {
        let list = Typed::new(
            TypeCode::List8,
            Primitive::Items(vec![wrap_uint(9), wrap_boolean(true)]),
        );
        let bytes = encode(&list);
        assert_eq!(bytes, vec![0xc0, 0x04, 0x02, 0x52, 0x09, 0x41]);
        assert_eq!(Reader::new(&bytes).read().unwrap(), list);

        let map = Typed::new(
            TypeCode::Map8,
            Primitive::Items(vec![wrap_symbol("k"), wrap_uint(1)]),
        );
        let bytes = encode(&map);
        assert_eq!(bytes, vec![0xc1, 0x06, 0x02, 0xa3, 0x01, b'k', 0x52, 0x01]);
        assert_eq!(Reader::new(&bytes).read().unwrap(), map);
    }

    #[test]
    fn backfills_small_arrays() {
        let array = Typed::array(
            TypeCode::Array8,
            vec![
                Typed::new(TypeCode::Uint, Primitive::Uint(1)),
                Typed::new(TypeCode::Uint, Primitive::Uint(2)),
            ],
            ArrayConstructor {
                code: TypeCode::Uint,
                descriptors: vec![],
            },
        );
        let bytes = encode(&array);
        assert_eq!(
            bytes,
            vec![0xe0, 0x0a, 0x02, 0x70, 0, 0, 0, 1, 0, 0, 0, 2]
        );
        assert_eq!(Reader::new(&bytes).read().unwrap(), array);
    }

    #[test]
    fn small_compounds_reject_large_content() {
        let list = Typed::new(
            TypeCode::List8,
            Primitive::Items(vec![wrap_string("x".repeat(300))]),
        );
        let mut writer = Writer::new();
        assert!(matches!(
            writer.write(&list),
            Err(EncodeError::InvalidValue(_))
        ));
        assert_eq!(writer.position(), 0);
    }

    #[test]
    fn decimals_pass_through_as_raw_bytes() {
        for (code, width) in [
            (TypeCode::Decimal32, 4),
            (TypeCode::Decimal64, 8),
            (TypeCode::Decimal128, 16),
        ] {
            let raw: Vec<u8> = (1..=width).collect();
            let typed = Typed::new(code, Primitive::Raw(raw.clone()));
            let bytes = encode(&typed);
            assert_eq!(bytes[0], code.code());
            assert_eq!(&bytes[1..], raw.as_slice());
            assert_eq!(Reader::new(&bytes).read().unwrap(), typed);
        }
        let short = Typed::new(TypeCode::Decimal64, Primitive::Raw(vec![1, 2]));
        assert!(Writer::new().write(&short).is_err());
    }

    #[test]
    fn untyped_values_are_rejected() {
        let mut writer = Writer::new();
        assert!(matches!(
            writer.write_value(&Value::Integer(1)),
            Err(EncodeError::InvalidValue(_))
        ));
        writer.write_value(&Value::Typed(wrap_uint(1))).unwrap();
        assert_eq!(writer.as_bytes(), &[0x52, 0x01]);
    }

    #[test]
    fn unsupported_widths_are_rejected() {
        let mut writer = Writer::new();
        assert!(matches!(
            writer.write_uint(8, 1),
            Err(EncodeError::UnsupportedWidth(8))
        ));
    }

    #[test]
    fn clear_and_reuse() {
        let mut writer = Writer::with_buffer(vec![0xff; 2]);
        writer.skip(1);
        assert_eq!(writer.as_bytes(), &[0x00]);
        writer.clear();
        writer.write(&wrap(false).unwrap()).unwrap();
        assert_eq!(writer.to_bytes(), vec![0x42]);
        assert_eq!(writer.remaining(), 1);
        assert_eq!(writer.to_string(), "Writer(1/2) 42");
    }

    #[test]
    fn round_trips_through_the_reader() {
        let map: Map = vec![("k", Value::from(vec![1u8, 2, 3].as_slice()))]
            .into_iter()
            .collect();
        let typed = wrap(Value::List(vec![map.into(), Value::Null, 3.5f64.into()])).unwrap();
        let bytes = encode(&typed);
        assert_eq!(Reader::new(&bytes).read().unwrap(), typed);
    }
}
