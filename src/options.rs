use std::sync::Arc;

use amqp_engine_protocol::{codec::DEFAULT_CAPACITY, DescriptorRegistry};

/// Settings shared by [`crate::AmqpValueCodec`] instances.
#[derive(Clone, Debug)]
pub struct CodecOptions {
    pub(crate) initial_capacity: usize,
    pub(crate) leave_described: bool,
    pub(crate) registry: Arc<DescriptorRegistry>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            initial_capacity: DEFAULT_CAPACITY,
            leave_described: true,
            registry: Arc::new(DescriptorRegistry::standard().clone()),
        }
    }
}

impl CodecOptions {
    pub fn builder() -> CodecOptionsBuilder {
        CodecOptionsBuilder(CodecOptions::default())
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn leave_described(&self) -> bool {
        self.leave_described
    }

    pub fn registry(&self) -> &Arc<DescriptorRegistry> {
        &self.registry
    }
}

pub struct CodecOptionsBuilder(CodecOptions);

impl CodecOptionsBuilder {
    /// Size of the buffer each encode starts with.
    pub fn initial_capacity(mut self, initial_capacity: usize) -> CodecOptionsBuilder {
        self.0.initial_capacity = initial_capacity;
        self
    }

    /// Keep described values with an unknown descriptor typed when
    /// unwrapping.
    pub fn leave_described(mut self, leave_described: bool) -> CodecOptionsBuilder {
        self.0.leave_described = leave_described;
        self
    }

    pub fn registry(mut self, registry: impl Into<Arc<DescriptorRegistry>>) -> CodecOptionsBuilder {
        self.0.registry = registry.into();
        self
    }

    pub fn build(self) -> CodecOptions {
        self.0
    }
}
