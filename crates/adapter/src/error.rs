//! Errors reported back to the administrative query layer.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The document had the wrong type tag.
    TypeMismatch,
    /// Bad charset, unparsable UUID, out-of-range number.
    Validation,
    NotFound,
    /// A name matched more than one id.
    Ambiguous,
    MissingField,
    UnexpectedFields,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Ambiguous => "ambiguous",
            ErrorKind::MissingField => "missing_field",
            ErrorKind::UnexpectedFields => "unexpected_fields",
        }
    }
}

/// A single user-facing message plus its classification. Displays as the
/// bare message so callers can pass it through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AdminError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AdminError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self { Self::new(ErrorKind::TypeMismatch, message) }
    pub fn validation(message: impl Into<String>) -> Self { Self::new(ErrorKind::Validation, message) }
    pub fn not_found(message: impl Into<String>) -> Self { Self::new(ErrorKind::NotFound, message) }
    pub fn ambiguous(message: impl Into<String>) -> Self { Self::new(ErrorKind::Ambiguous, message) }
}

pub type AdminResult<T> = Result<T, AdminError>;
