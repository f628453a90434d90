//! Contains the error-related types for the `bson_query` crate.

use thiserror::Error;

use crate::types::BsonType;

/// The result type for all methods that can return an error in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in this crate.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{kind}{}{}", key.as_ref().map(|k| format!(" at key \"{k}\"")).unwrap_or_default(), message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// The field name associated with the error, if any.
    pub key: Option<String>,

    /// An optional message with additional context.
    pub message: Option<String>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            key: None,
            message: None,
        }
    }

    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn with_message(mut self, message: impl ToString) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// The kinds of errors that can occur when decoding or encoding BSON, or when
/// building expression trees.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The reader ran out of bytes before the requested amount could be read.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A cstring was not terminated by a 0x00 byte before the input ended.
    #[error("cstring was not terminated by a null byte")]
    UnterminatedCString,

    /// A string payload did not contain valid UTF-8.
    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,

    /// A declared length contradicted the terminator or boundary actually found.
    #[error("declared length did not match the encountered boundary")]
    LengthMismatch,

    /// A type byte did not correspond to any known BSON type.
    #[error("unknown BSON type code {0:#04x}")]
    UnknownType(u8),

    /// A `ValueReader` accessor was invoked for the wrong type.
    #[error("wrong type: expected {expected:?}, found {actual:?}")]
    #[non_exhaustive]
    WrongType {
        /// The type the accessor required.
        expected: BsonType,
        /// The type actually stored.
        actual: BsonType,
    },

    /// A document or array exceeded the maximum permitted size.
    #[error("document too large: {0} bytes")]
    DocumentTooLarge(usize),

    /// `write_object_safe` was given a value it could not route to a typed write.
    #[error("unsupported type for reflective write")]
    UnsupportedType,

    /// An attempt was made to add a child to an already-frozen expression node.
    #[error("cannot mutate a frozen node")]
    FrozenMutation,

    /// A compound node was asked to accept itself as a child.
    #[error("a node cannot accept itself as its own child")]
    CycleRejected,
}
