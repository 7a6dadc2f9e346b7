use std::io::Write;

use crate::{
    error::{DecodeError, EncodeError},
    types::{unwrap, wrap, Category, DescriptorRegistry, Primitive, Typed, Value},
};

mod reader;
mod writer;

pub use reader::{Reader, MAX_DEPTH};
pub use writer::{Writer, DEFAULT_CAPACITY};

pub trait AmqpEncoder {
    fn encoded_size(&self) -> u32;
    fn encode(&self, writer: &mut impl Write) -> Result<(), EncodeError>;
}

pub trait AmqpDecoder
where
    Self: Sized,
{
    fn decode(input: &[u8]) -> Result<(&[u8], Self), DecodeError>;
}

pub fn check_len(input: &[u8], size: usize) -> Result<(), DecodeError> {
    if input.len() < size {
        return Err(DecodeError::Incomplete(size));
    }
    Ok(())
}

fn constructor_size(descriptors: &[Typed]) -> u32 {
    descriptors
        .iter()
        .fold(1, |acc, d| acc + 1 + d.encoded_size())
}

fn body_size(typed: &Typed) -> u32 {
    let descriptor = typed.type_descriptor();
    let width = u32::from(descriptor.width());
    match (descriptor.category(), typed.value()) {
        (Category::Fixed, _) => width,
        (Category::Variable, Primitive::Text(text)) => width + text.len() as u32,
        (Category::Variable, Primitive::Binary(bytes) | Primitive::Raw(bytes)) => {
            width + bytes.len() as u32
        }
        (Category::Variable, _) => width,
        (Category::Compound, value) => {
            let content = match value {
                Primitive::Items(items) => items.iter().fold(0, |acc, i| acc + i.encoded_size()),
                _ => 0,
            };
            2 * width + content
        }
        (Category::Array, value) => {
            let constructor = typed
                .array_constructor()
                .map_or(1, |c| constructor_size(&c.descriptors));
            let content = match value {
                Primitive::Items(items) => items.iter().fold(0, |acc, i| acc + body_size(i)),
                _ => 0,
            };
            2 * width + constructor + content
        }
    }
}

impl AmqpEncoder for Typed {
    fn encoded_size(&self) -> u32 {
        constructor_size(self.descriptors()) + body_size(self)
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), EncodeError> {
        let mut buffer = Writer::with_capacity(self.encoded_size() as usize);
        buffer.write(self)?;
        writer.write_all(buffer.as_bytes())?;
        Ok(())
    }
}

impl AmqpDecoder for Typed {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), DecodeError> {
        let mut reader = Reader::new(input);
        let typed = reader.read()?;
        Ok((&input[reader.position()..], typed))
    }
}

impl AmqpEncoder for Value {
    fn encoded_size(&self) -> u32 {
        wrap(self.clone()).map_or(0, |typed| typed.encoded_size())
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), EncodeError> {
        wrap(self.clone())?.encode(writer)
    }
}

impl AmqpDecoder for Value {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), DecodeError> {
        let (input, typed) = Typed::decode(input)?;
        Ok((input, unwrap(typed, true)?))
    }
}

/// Decodes one value from `input` and unwraps it against `registry`.
pub fn decode_value<'a>(
    input: &'a [u8],
    registry: &DescriptorRegistry,
) -> Result<(&'a [u8], Value), DecodeError> {
    let (input, typed) = Typed::decode(input)?;
    Ok((input, registry.unwrap(typed, true)?))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{
        wrap_array, wrap_described, wrap_string, wrap_symbol, wrap_ulong, Map, TypeCode,
    };

    fn assert_size(typed: Typed) {
        let mut out = vec![];
        typed.encode(&mut out).unwrap();
        assert_eq!(typed.encoded_size() as usize, out.len());
        let (rest, decoded) = Typed::decode(&out).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, typed);
    }

    #[test]
    fn encoded_size_matches_output() {
        assert_size(wrap(Value::Null).unwrap());
        assert_size(wrap(42u64).unwrap());
        assert_size(wrap(-5_000_000_000i64).unwrap());
        assert_size(wrap_string("hello"));
        assert_size(wrap_string("x".repeat(300)));
        let map: Map = vec![("a", 1u8), ("b", 2u8)].into_iter().collect();
        assert_size(wrap(map).unwrap());
        assert_size(
            wrap_array(
                vec!["a".into(), "bb".into()],
                Some(TypeCode::Sym8),
                Some(0x10u64.into()),
            )
            .unwrap(),
        );
        assert_size(wrap_described("body", "amqp:data:binary").unwrap());
    }

    #[test]
    fn decode_leaves_trailing_bytes() {
        let mut out = vec![];
        wrap_ulong(7).encode(&mut out).unwrap();
        wrap_symbol("next").encode(&mut out).unwrap();

        let (rest, first) = Value::decode(&out).unwrap();
        assert_eq!(first, Value::Integer(7));
        let (rest, second) = Value::decode(rest).unwrap();
        assert_eq!(second, Value::from("next"));
        assert!(rest.is_empty());
    }

    #[test]
    fn decode_value_promotes_registered_composites() {
        let registry = DescriptorRegistry::standard();
        let typed = registry
            .wrap_composite("error", vec![("condition", Value::from("amqp:decode-error"))])
            .unwrap();
        let mut out = vec![];
        typed.encode(&mut out).unwrap();

        let (_, value) = decode_value(&out, registry).unwrap();
        assert!(matches!(value, Value::Composite(ref c) if c.definition().code() == 0x1d));
    }

    #[test]
    fn incomplete_input() {
        assert!(matches!(check_len(&[1, 2], 4), Err(DecodeError::Incomplete(4))));
        assert!(matches!(
            Typed::decode(&[0xa1, 0x05, b'a']),
            Err(DecodeError::Incomplete(_))
        ));
    }
}
