//! The AMQP 1.0 type system: type metadata, typed values, conversions
//! between native and typed values, and composite types.

pub mod constants;
mod composite;
mod definitions;
mod descriptor;
mod descriptor_registry;
mod map;
pub mod ops;
mod type_registry;
mod typed;
mod unwrap;
mod value;
mod wrap;

pub use composite::{define_composite, Composite, CompositeDefinition, FieldDefinition, FieldType};
pub use constants::{TypeCode, DESCRIBED};
pub use definitions::{error_definition, AmqpError, ERROR_CODE};
pub use descriptor::Descriptor;
pub use descriptor_registry::{DescriptorRegistry, DescriptorRegistryBuilder};
pub use map::Map;
pub use ops::ByteOps;
pub use type_registry::{lookup_by_code, lookup_by_name, Category, Encoding, TypeDescriptor};
pub use typed::{ArrayConstructor, Primitive, Typed};
pub use unwrap::{mapify, unwrap};
pub use value::Value;
pub use wrap::*;
