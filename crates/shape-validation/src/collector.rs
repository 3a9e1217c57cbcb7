//! Non-short-circuiting error accumulation.
//!
//! Field and element checks report every defect they find, so instead of
//! returning on the first `Err` they feed each sub-result into an
//! [`ErrorCollector`] and only decide the overall outcome at the end.

use crate::error::{ValidationError, ValidationErrors};

/// Result of validating one value: the sanitized value or every error found.
pub type ValidationOutput<T> = Result<T, ValidationErrors>;

#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<ValidationError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Keep the value of a successful sub-result, or merge its errors.
    pub fn absorb<T>(&mut self, output: ValidationOutput<T>) -> Option<T> {
        match output {
            Ok(value) => Some(value),
            Err(errors) => {
                self.errors.extend(errors);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `Ok(value)` if nothing was collected, otherwise every collected error.
    pub fn finish<T>(self, value: T) -> ValidationOutput<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(ValidationErrors::from_vec(self.errors))
        }
    }
}
