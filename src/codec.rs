use amqp_engine_protocol::{
    codec::{AmqpDecoder, Writer},
    error::DecodeError,
    types::{wrap, Typed, Value},
};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder as TokioDecoder, Encoder as TokioEncoder};
use tracing::trace;

use crate::{error::EngineError, options::CodecOptions};

/// Frames AMQP typed values over a byte stream.
#[derive(Debug, Default)]
pub struct AmqpValueCodec {
    options: CodecOptions,
}

impl AmqpValueCodec {
    pub fn new(options: CodecOptions) -> Self {
        AmqpValueCodec { options }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Decodes the next value and unwraps it against the configured
    /// registry. Returns `None` until a complete value is buffered.
    pub fn decode_value(&mut self, buf: &mut BytesMut) -> Result<Option<Value>, EngineError> {
        match self.decode(buf)? {
            Some(typed) => {
                let value = self
                    .options
                    .registry
                    .unwrap(typed, self.options.leave_described)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

impl TokioDecoder for AmqpValueCodec {
    type Item = Typed;
    type Error = EngineError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Typed>, EngineError> {
        match Typed::decode(buf) {
            Ok((remaining, typed)) => {
                let len = remaining.len();
                buf.advance(buf.len() - len);
                Ok(Some(typed))
            }
            Err(DecodeError::Incomplete(needed)) => {
                trace!("waiting for more bytes, {} needed", needed);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl TokioEncoder<Typed> for AmqpValueCodec {
    type Error = EngineError;

    fn encode(&mut self, item: Typed, buf: &mut BytesMut) -> Result<(), EngineError> {
        let mut writer = Writer::with_capacity(self.options.initial_capacity);
        writer.write(&item)?;
        buf.reserve(writer.position());
        buf.put_slice(writer.as_bytes());
        Ok(())
    }
}

impl TokioEncoder<Value> for AmqpValueCodec {
    type Error = EngineError;

    fn encode(&mut self, item: Value, buf: &mut BytesMut) -> Result<(), EngineError> {
        let typed = wrap(item)?;
        TokioEncoder::<Typed>::encode(self, typed, buf)
    }
}
