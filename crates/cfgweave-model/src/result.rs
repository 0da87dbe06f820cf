//! Result-with-errors carrier.

use crate::error::{Level, ValidationError};

/// An optional value paired with every validation error collected while producing it.
///
/// A `GResult` with a value and errors means "usable, but with problems"; one
/// without a value means nothing usable could be produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GResult<T> {
    value: Option<T>,
    errors: Vec<ValidationError>,
}

impl<T> GResult<T> {
    /// A value with no errors.
    pub fn ok(value: T) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
        }
    }

    /// A value with accompanying errors.
    pub fn with_errors(value: T, errors: Vec<ValidationError>) -> Self {
        Self {
            value: Some(value),
            errors,
        }
    }

    /// No value, only errors.
    pub fn fail(errors: Vec<ValidationError>) -> Self {
        Self {
            value: None,
            errors,
        }
    }

    /// No value, a single error.
    pub fn fail_one(error: ValidationError) -> Self {
        Self::fail(vec![error])
    }

    /// Build from raw parts.
    pub fn from_parts(value: Option<T>, errors: Vec<ValidationError>) -> Self {
        Self { value, errors }
    }

    pub fn has_results(&self) -> bool {
        self.value.is_some()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True if any error is at exactly the given level.
    pub fn has_errors_at(&self, level: Level) -> bool {
        self.errors.iter().any(|e| e.level() == level)
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn into_parts(self) -> (Option<T>, Vec<ValidationError>) {
        (self.value, self.errors)
    }

    /// Move the errors into `sink` and return the value.
    ///
    /// Used by composite operations that aggregate errors from many children.
    pub fn drain_into(self, sink: &mut Vec<ValidationError>) -> Option<T> {
        sink.extend(self.errors);
        self.value
    }

    pub fn push_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend_errors(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GResult<U> {
        GResult {
            value: self.value.map(f),
            errors: self.errors,
        }
    }

    /// Chain a fallible step, keeping the errors of both.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> GResult<U>) -> GResult<U> {
        match self.value {
            Some(value) => {
                let mut next = f(value);
                let mut errors = self.errors;
                errors.append(&mut next.errors);
                GResult {
                    value: next.value,
                    errors,
                }
            }
            None => GResult {
                value: None,
                errors: self.errors,
            },
        }
    }
}

impl<T> From<ValidationError> for GResult<T> {
    fn from(error: ValidationError) -> Self {
        GResult::fail_one(error)
    }
}
