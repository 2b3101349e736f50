//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// One rejected input field.
///
/// `loc` is the path to the offending value, starting with where it came from
/// (`"body"`, `"query"`, `"path"`), e.g. `["body", "quantity"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new<L, S>(loc: L, msg: impl Into<String>, kind: impl Into<String>) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loc: loc.into_iter().map(Into::into).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// A required field was absent.
    pub fn missing<L, S>(loc: L) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(loc, "Field required", "missing")
    }

    /// Prepend a source segment, turning `["item"]` into `["body", "item"]`.
    pub fn within(mut self, source: &str) -> Self {
        self.loc.insert(0, source.to_string());
        self
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.loc.join("."), self.msg)
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic input failures. Missing rows and store
/// connectivity belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more input fields were missing or malformed.
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),
}

impl DomainError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }

    /// Single-field shorthand for [`DomainError::Validation`].
    pub fn invalid_field(error: FieldError) -> Self {
        Self::Validation(vec![error])
    }

    /// Field-level details when this is a validation failure.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            DomainError::Validation(errors) => errors,
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
