use std::{collections::HashMap, sync::Arc, sync::OnceLock};

use tracing::{debug, warn};

use super::{
    definitions::error_definition, Composite, CompositeDefinition, Descriptor, FieldType,
    Typed, Value,
};
use crate::error::EncodeError;

/// Composite types known to a codec, by numeric and symbolic descriptor.
///
/// A registry is immutable once built. Clones share the same tables, so
/// composites promoted by a registry keep a handle to it.
#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    types: Arc<RegisteredTypes>,
}

#[derive(Debug, Default)]
struct RegisteredTypes {
    by_code: HashMap<u64, Arc<CompositeDefinition>>,
    by_symbol: HashMap<String, Arc<CompositeDefinition>>,
}

#[derive(Debug, Default)]
pub struct DescriptorRegistryBuilder {
    types: RegisteredTypes,
}

impl DescriptorRegistryBuilder {
    pub fn add_type(mut self, definition: impl Into<Arc<CompositeDefinition>>) -> Self {
        let definition = definition.into();
        debug!("registering composite type {}", definition);

        let symbol = definition.symbolic_descriptor();
        if let Some(previous) = self
            .types
            .by_code
            .insert(definition.code(), definition.clone())
        {
            warn!("composite type {} replaced by {}", previous, definition);
            self.types.by_symbol.remove(&previous.symbolic_descriptor());
        }
        self.types.by_symbol.insert(symbol, definition);
        self
    }

    pub fn with_standard_types(self) -> Self {
        self.add_type(error_definition().clone())
    }

    pub fn build(self) -> DescriptorRegistry {
        DescriptorRegistry {
            types: Arc::new(self.types),
        }
    }
}

impl DescriptorRegistry {
    pub fn builder() -> DescriptorRegistryBuilder {
        DescriptorRegistryBuilder::default()
    }

    /// Registry holding the built-in composite types.
    pub fn standard() -> &'static DescriptorRegistry {
        static STANDARD: OnceLock<DescriptorRegistry> = OnceLock::new();
        STANDARD.get_or_init(|| DescriptorRegistry::builder().with_standard_types().build())
    }

    pub fn by_code(&self, code: u64) -> Option<&Arc<CompositeDefinition>> {
        self.types.by_code.get(&code)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Arc<CompositeDefinition>> {
        self.types.by_symbol.get(symbol)
    }

    pub fn by_name(&self, name: &str) -> Option<&Arc<CompositeDefinition>> {
        self.types.by_code.values().find(|d| d.name() == name)
    }

    pub fn lookup(&self, descriptor: &Descriptor) -> Option<&Arc<CompositeDefinition>> {
        match descriptor {
            Descriptor::Ulong(code) => self.by_code(*code),
            Descriptor::Symbol(symbol) => self.by_symbol(symbol),
        }
    }

    /// Finds the definition matching the outermost descriptor of `typed`.
    pub fn lookup_typed(&self, typed: &Typed) -> Option<&Arc<CompositeDefinition>> {
        typed
            .descriptor()
            .and_then(Descriptor::from_typed)
            .and_then(|d| self.lookup(&d))
    }

    pub fn len(&self) -> usize {
        self.types.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.by_code.is_empty()
    }

    /// Resolves a field type name, including the names of registered
    /// composite types.
    pub fn parse_field_type(&self, type_name: &str) -> Result<FieldType, EncodeError> {
        match type_name.parse() {
            Ok(field_type) => Ok(field_type),
            Err(err) => self
                .by_name(type_name)
                .map(|d| FieldType::Composite(d.code()))
                .ok_or(err),
        }
    }

    /// Builds the described form of the registered composite `name`.
    pub fn wrap_composite<K: AsRef<str>>(
        &self,
        name: &str,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<Typed, EncodeError> {
        let definition = self.by_name(name).ok_or_else(|| {
            EncodeError::InvalidValue(format!("no composite type named {}", name))
        })?;
        Composite::create(definition, fields).map(|c| c.described())
    }
}
