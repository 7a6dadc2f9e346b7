use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

use super::check_len;
use crate::{
    error::DecodeError,
    types::{
        lookup_by_code, ArrayConstructor, Category, Primitive, TypeCode, TypeDescriptor, Typed,
        DESCRIBED,
    },
};

/// Deepest nesting of descriptors, lists, maps and arrays a reader accepts.
pub const MAX_DEPTH: usize = 128;

/// Sequential decoder over a borrowed buffer.
pub struct Reader<'a> {
    buffer: &'a [u8],
    position: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Reader {
            buffer,
            position: 0,
            depth: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
        self.depth = 0;
    }

    pub fn skip(&mut self, size: usize) -> Result<(), DecodeError> {
        self.read_bytes(size).map(|_| ())
    }

    pub fn read_bytes(&mut self, size: usize) -> Result<&'a [u8], DecodeError> {
        let buffer: &'a [u8] = self.buffer;
        let input = &buffer[self.position..];
        check_len(input, size)?;
        self.position += size;
        Ok(&input[..size])
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.read_bytes(1).map(|bytes| bytes[0])
    }

    /// Reads a size or count field.
    pub fn read_uint(&mut self, width: u8) -> Result<usize, DecodeError> {
        let value = match width {
            1 => u32::from(self.read_u8()?),
            2 => u32::from(BigEndian::read_u16(self.read_bytes(2)?)),
            4 => BigEndian::read_u32(self.read_bytes(4)?),
            other => return Err(DecodeError::UnsupportedWidth(other)),
        };
        Ok(value as usize)
    }

    /// Reads the next complete value, descriptors included.
    pub fn read(&mut self) -> Result<Typed, DecodeError> {
        let (code, descriptors) = self.read_constructor()?;
        let value = self.read_value(code)?;
        Ok(value.with_descriptors(descriptors))
    }

    /// Reads a typecode and the descriptors preceding it, outermost first.
    pub fn read_constructor(&mut self) -> Result<(TypeCode, Vec<Typed>), DecodeError> {
        let mut descriptors = vec![];
        loop {
            let code = self.read_u8()?;
            if code != DESCRIBED {
                return Ok((lookup_by_code(code)?.code(), descriptors));
            }
            if descriptors.len() >= MAX_DEPTH {
                return Err(DecodeError::TooDeep(MAX_DEPTH));
            }
            descriptors.push(self.nested(Reader::read)?);
        }
    }

    fn nested<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(DecodeError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = read(self);
        self.depth -= 1;
        result
    }

    /// Reads the size field of a compound or array and checks the content
    /// is available. Returns the size and the offset the content starts at.
    fn read_size(&mut self, width: u8) -> Result<(usize, usize), DecodeError> {
        let size = self.read_uint(width)?;
        check_len(&self.buffer[self.position..], size)?;
        Ok((size, self.position))
    }

    /// Rejects counts that cannot fit the bytes left in a sized region,
    /// taking every element as at least one byte.
    fn check_count(&self, count: usize, end: usize) -> Result<(), DecodeError> {
        let available = end.saturating_sub(self.position);
        if count > available {
            return Err(DecodeError::parse_error(format!(
                "{} elements cannot fit in {} bytes",
                count, available
            )));
        }
        Ok(())
    }

    fn check_consumed(&self, start: usize, size: usize) -> Result<(), DecodeError> {
        let consumed = self.position - start;
        if consumed != size {
            return Err(DecodeError::parse_error(format!(
                "declared size {} but content took {} bytes",
                size, consumed
            )));
        }
        Ok(())
    }

    /// Reads the value of an already read constructor.
    pub fn read_value(&mut self, code: TypeCode) -> Result<Typed, DecodeError> {
        let descriptor = code.descriptor();
        trace!("reading {} at {}", descriptor, self.position);
        match descriptor.category() {
            Category::Fixed => self.read_fixed(descriptor),
            Category::Variable => self.read_variable(descriptor),
            Category::Compound => self.read_compound(descriptor),
            Category::Array => self.read_array(descriptor),
        }
    }

    fn read_fixed(&mut self, descriptor: &TypeDescriptor) -> Result<Typed, DecodeError> {
        let code = descriptor.code();
        if descriptor.width() == 0 {
            return Ok(Typed::empty(code));
        }
        let bytes = self.read_bytes(usize::from(descriptor.width()))?;
        let value = match descriptor.ops() {
            Some(ops) => (ops.read)(bytes)?,
            None => Primitive::Raw(bytes.to_vec()),
        };
        Ok(Typed::new(code, value))
    }

    fn read_variable(&mut self, descriptor: &TypeDescriptor) -> Result<Typed, DecodeError> {
        let size = self.read_uint(descriptor.width())?;
        let bytes = self.read_bytes(size)?.to_vec();
        let value = match descriptor.encoding() {
            Some(_) => Primitive::Text(String::from_utf8(bytes)?),
            None => Primitive::Binary(bytes),
        };
        Ok(Typed::new(descriptor.code(), value))
    }

    fn read_compound(&mut self, descriptor: &TypeDescriptor) -> Result<Typed, DecodeError> {
        let (size, start) = self.read_size(descriptor.width())?;
        let count = self.read_uint(descriptor.width())?;
        self.check_count(count, start + size)?;

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.nested(Reader::read)?);
        }
        self.check_consumed(start, size)?;
        Ok(Typed::new(descriptor.code(), Primitive::Items(items)))
    }

    fn read_array(&mut self, descriptor: &TypeDescriptor) -> Result<Typed, DecodeError> {
        let (size, start) = self.read_size(descriptor.width())?;
        let count = self.read_uint(descriptor.width())?;
        let (code, descriptors) = self.nested(Reader::read_constructor)?;
        self.check_count(count, start + size)?;

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.nested(|reader| reader.read_value(code))?);
        }
        self.check_consumed(start, size)?;
        Ok(Typed::array(
            descriptor.code(),
            items,
            ArrayConstructor { code, descriptors },
        ))
    }
}

impl fmt::Display for Reader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reader({}/{})", self.position, self.buffer.len())?;
        for byte in &self.buffer[self.position..] {
            write!(f, " {:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{
        unwrap, wrap_array, wrap_string, wrap_symbol, wrap_uint, wrap_ulong, Descriptor, Value,
    };
    use crate::codec::Writer;

    #[test]
    fn reads_fixed_values() {
        let input = [0x52, 0x07, 0x43, 0x80, 0, 0, 0, 1, 0, 0, 0, 2];
        let mut reader = Reader::new(&input);
        assert_eq!(reader.read().unwrap(), wrap_uint(7));
        assert_eq!(reader.read().unwrap(), wrap_uint(0));
        assert_eq!(reader.read().unwrap(), wrap_ulong((1 << 32) + 2));
        assert_eq!(reader.remaining(), 0);
        reader.reset();
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn reads_strings() {
        let input = [0xa1, 0x03, b'f', b'o', b'o', 0xa3, 0x01, b'x'];
        let mut reader = Reader::new(&input);
        assert_eq!(reader.read().unwrap(), wrap_string("foo"));
        assert_eq!(reader.read().unwrap(), wrap_symbol("x"));
    }

    #[test]
    fn reads_nested_descriptors() {
        let input = [0x00, 0x53, 0x10, 0x00, 0xa3, 0x01, b'd', 0x41];
        let mut reader = Reader::new(&input);
        let typed = reader.read().unwrap();
        assert_eq!(typed.code(), TypeCode::True);
        assert_eq!(typed.descriptors(), &[wrap_ulong(0x10), wrap_symbol("d")]);
        assert_eq!(typed.descriptor(), Some(&wrap_ulong(0x10)));
    }

    #[test]
    fn reads_lists() {
        let input = [0xc0, 0x04, 0x02, 0x41, 0x52, 0x09];
        let typed = Reader::new(&input).read().unwrap();
        assert_eq!(typed.code(), TypeCode::List8);
        assert_eq!(
            typed.items().unwrap(),
            &[Typed::empty(TypeCode::True), wrap_uint(9)]
        );
    }

    #[test]
    fn reads_arrays() {
        let input = [0xe0, 0x05, 0x02, 0xa3, 0x01, b'a', 0x00];
        let typed = Reader::new(&input).read().unwrap();
        assert!(typed.is_array());
        assert_eq!(typed.array_constructor().unwrap().code, TypeCode::Sym8);
        assert_eq!(
            typed.items().unwrap(),
            &[wrap_symbol("a"), Typed::new(TypeCode::Sym8, Primitive::Text(String::new()))]
        );
    }

    #[test]
    fn unknown_typecodes_fail() {
        assert!(matches!(
            Reader::new(&[0x01]).read(),
            Err(DecodeError::UnrecognizedTypecode(0x01))
        ));
    }

    #[test]
    fn unsupported_widths_fail() {
        assert!(matches!(
            Reader::new(&[0; 8]).read_uint(8),
            Err(DecodeError::UnsupportedWidth(8))
        ));
    }

    #[test]
    fn truncated_input_is_incomplete() {
        assert!(matches!(
            Reader::new(&[0x70, 0x00]).read(),
            Err(DecodeError::Incomplete(4))
        ));
        assert!(matches!(
            Reader::new(&[0xd0, 0, 0, 0, 9, 0, 0, 0, 1]).read(),
            Err(DecodeError::Incomplete(9))
        ));
    }

    #[test]
    fn counts_larger_than_the_declared_size_fail() {
        let input = [0xf0, 0, 0, 0, 4, 0x00, 0xff, 0xff, 0xff, 0x40];
        assert!(matches!(
            Reader::new(&input).read(),
            Err(DecodeError::MessageParse(_))
        ));
        let input = [0xd0, 0, 0, 0, 4, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(
            Reader::new(&input).read(),
            Err(DecodeError::MessageParse(_))
        ));
    }

    #[test]
    fn content_must_match_the_declared_size() {
        let input = [0xc0, 0x01, 0x02, 0x41, 0x52, 0x09];
        assert!(matches!(
            Reader::new(&input).read(),
            Err(DecodeError::MessageParse(_))
        ));
        let input = [0xc0, 0x05, 0x01, 0x41, 0x41, 0x41, 0x41];
        assert!(matches!(
            Reader::new(&input).read(),
            Err(DecodeError::MessageParse(_))
        ));
    }

    #[test]
    fn deep_descriptor_chains_fail() {
        let input = vec![0x00; 200_000];
        assert!(matches!(
            Reader::new(&input).read(),
            Err(DecodeError::TooDeep(MAX_DEPTH))
        ));
    }

    #[test]
    fn deep_nesting_fails() {
        let input = [0xc0, 0xff, 0x01].repeat(1000);
        assert!(matches!(
            Reader::new(&input).read(),
            Err(DecodeError::TooDeep(MAX_DEPTH))
        ));
    }

    #[test]
    fn nesting_below_the_limit_is_read() {
        let mut typed = wrap_uint(1);
        for _ in 0..MAX_DEPTH - 1 {
            typed = Typed::new(TypeCode::List32, Primitive::Items(vec![typed]));
        }
        let mut writer = Writer::new();
        writer.write(&typed).unwrap();
        assert_eq!(Reader::new(writer.as_bytes()).read().unwrap(), typed);
    }

    #[test]
    fn reads_arrays_with_described_elements() {
        let array = wrap_array(
            vec!["a".into(), "b".into()],
            Some(TypeCode::Sym8),
            Some(Descriptor::Ulong(0x77)),
        )
        .unwrap();
        let mut writer = Writer::new();
        writer.write(&array).unwrap();

        let typed = Reader::new(writer.as_bytes()).read().unwrap();
        let constructor = typed.array_constructor().unwrap();
        assert_eq!(constructor.code, TypeCode::Sym8);
        assert_eq!(constructor.descriptors, vec![Descriptor::Ulong(0x77).to_typed()]);
        assert_eq!(
            unwrap(typed, false).unwrap(),
            Value::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn display_shows_the_unread_bytes() {
        let input = [0x41, 0x42];
        let mut reader = Reader::new(&input);
        reader.skip(1).unwrap();
        assert_eq!(reader.to_string(), "Reader(1/2) 42");
    }
}
