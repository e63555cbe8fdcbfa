//! Request validation: pure functions from untyped JSON to typed payloads
//! or an ordered list of field-level errors.

pub mod pagination;
pub mod student;

use std::fmt;

/// A single validation failure: the offending field path plus a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

pub use pagination::{validate_pagination, PageParams, PageWindow, PaginationQuery};
pub use student::{
    validate_register, validate_update, MarkPayload, RegisterStudentPayload, UpdateStudentPayload,
};
