use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    /// Not enough bytes; carries the number of bytes needed from the current
    /// position.
    #[error("Incomplete data, {0} bytes needed")]
    Incomplete(usize),
    #[error("Unrecognized type code {0:#04x}")]
    UnrecognizedTypecode(u8),
    #[error("Unsupported width {0}")]
    UnsupportedWidth(u8),
    #[error("Malformed map with {0} items")]
    MalformedMap(usize),
    #[error("Invalid char {0:#x}")]
    InvalidChar(u32),
    #[error(transparent)]
    Utf8Error(#[from] FromUtf8Error),
    #[error(transparent)]
    UuidError(#[from] uuid::Error),
    #[error("Message parse error: {0}")]
    MessageParse(String),
    #[error("Nesting deeper than {0} levels")]
    TooDeep(usize),
}

impl DecodeError {
    pub fn parse_error(msg: impl Into<String>) -> DecodeError {
        DecodeError::MessageParse(msg.into())
    }
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Unsupported width {0}")]
    UnsupportedWidth(u8),
    #[error("Mandatory field {0} missing")]
    MandatoryFieldMissing(String),
    #[error("Field {field}: {reason}")]
    FieldError { field: String, reason: String },
    #[error("Unsupported field type {0}")]
    UnsupportedFieldType(String),
}
