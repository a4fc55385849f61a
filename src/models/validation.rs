//! Form validation helpers shared by every entity form

use validator::Validate;

use crate::error::{AppError, AppResult, FieldError};

pub const REQUIRED: &str = "This field is required.";

/// Accumulates field errors for one submitted form
#[derive(Debug, Default)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    /// Start from the declarative rules attached to the form type
    pub fn from_rules<T: Validate>(form: &T) -> Self {
        let mut errors = Self::default();
        if let Err(failures) = form.validate() {
            for (field, list) in failures.field_errors() {
                for failure in list.iter() {
                    let message = failure
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", failure.code));
                    errors.push(field.to_string(), message);
                }
            }
        }
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Record a "required" error when the trimmed value is blank
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, REQUIRED);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(mut self) -> Vec<FieldError> {
        self.0.sort_by(|a, b| a.field.cmp(&b.field));
        self.0
    }

    /// `Ok(())` when nothing was recorded, otherwise a form error
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Form(self.into_vec()))
        }
    }
}

impl From<Vec<FieldError>> for FormErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

/// Message for a reference to a row that does not exist
pub fn invalid_choice(id: i64) -> String {
    format!("Select a valid choice. {} is not one of the available choices.", id)
}

/// Trim a free-text input in place
pub fn clean(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trim an optional input, collapsing blanks to `None`
pub fn clean_opt(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        clean(v);
        if v.is_empty() {
            *value = None;
        }
    }
}
