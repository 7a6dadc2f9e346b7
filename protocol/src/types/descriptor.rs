use super::{wrap_symbol, wrap_ulong, Typed};

/// Identifies the meaning of a described value, either by numeric code or by
/// symbolic name.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Descriptor {
    Ulong(u64),
    Symbol(String),
}

impl Descriptor {
    pub fn to_typed(&self) -> Typed {
        match self {
            Descriptor::Ulong(code) => wrap_ulong(*code),
            Descriptor::Symbol(name) => wrap_symbol(name.as_str()),
        }
    }

    /// Reads a descriptor back from its typed form. Strings are accepted
    /// alongside symbols.
    pub fn from_typed(typed: &Typed) -> Option<Descriptor> {
        if typed.is_ulong() {
            typed.as_u64().map(Descriptor::Ulong)
        } else if typed.is_symbol() || typed.is_string() {
            typed.as_str().map(|s| Descriptor::Symbol(s.to_owned()))
        } else {
            None
        }
    }
}

impl From<u64> for Descriptor {
    fn from(code: u64) -> Self {
        Descriptor::Ulong(code)
    }
}

impl From<&str> for Descriptor {
    fn from(name: &str) -> Self {
        Descriptor::Symbol(name.to_owned())
    }
}

impl From<String> for Descriptor {
    fn from(name: String) -> Self {
        Descriptor::Symbol(name)
    }
}
