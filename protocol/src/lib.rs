//! AMQP 1.0 type system and binary codec.
//!
//! Native values are converted to [`types::Typed`] values with
//! [`types::wrap`], serialized with [`codec::Writer`], read back with
//! [`codec::Reader`] and converted to native form with [`types::unwrap`].

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{AmqpDecoder, AmqpEncoder, Reader, Writer};
pub use error::{DecodeError, EncodeError};
pub use types::{unwrap, wrap, Composite, DescriptorRegistry, TypeCode, Typed, Value};
