//! AMQP 1.0 protocol engine core: the endpoint state machine and the
//! framing of AMQP typed values, on top of [`amqp_engine_protocol`].

mod codec;
mod endpoint;
pub mod error;
mod options;

pub type AmqpEngineResult<T> = Result<T, error::EngineError>;

pub use crate::codec::AmqpValueCodec;
pub use crate::endpoint::EndpointState;
pub use crate::options::{CodecOptions, CodecOptionsBuilder};

pub mod types {
    pub use amqp_engine_protocol::codec::{AmqpDecoder, AmqpEncoder, Reader, Writer};
    pub use amqp_engine_protocol::types::*;
}
