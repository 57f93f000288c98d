//! Form validation errors
//!
//! A validation failure is a typed `(field, code, args)` triple. Messages are
//! resolved later against a catalogue, so the error itself stays language-free.

use serde::{Deserialize, Serialize};

/// Validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Field absent or blank
    Required,
    /// Shorter than `{0}` characters
    MinLength,
    /// Longer than `{0}` characters
    MaxLength,
    /// Does not match pattern `{0}`
    Pattern,
    /// Not an email address
    Email,
    /// Catch-all
    Invalid,
}

impl ErrorCode {
    /// Message key (for catalogue lookup)
    pub fn key(&self) -> &'static str {
        match self {
            Self::Required => "error.required",
            Self::MinLength => "error.minLength",
            Self::MaxLength => "error.maxLength",
            Self::Pattern => "error.pattern",
            Self::Email => "error.email",
            Self::Invalid => "error.invalid",
        }
    }

    /// Default English template
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Required => "This field is required",
            Self::MinLength => "Minimum length is {0}",
            Self::MaxLength => "Maximum length is {0}",
            Self::Pattern => "Must satisfy {0}",
            Self::Email => "Valid email required",
            Self::Invalid => "Invalid value",
        }
    }

    pub fn all() -> [ErrorCode; 6] {
        [
            Self::Required,
            Self::MinLength,
            Self::MaxLength,
            Self::Pattern,
            Self::Email,
            Self::Invalid,
        ]
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub code: ErrorCode,
    /// Positional arguments for the message template
    pub args: Vec<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            field: field.into(),
            code,
            args: Vec::new(),
        }
    }

    pub fn with_args(field: impl Into<String>, code: ErrorCode, args: Vec<String>) -> Self {
        Self {
            field: field.into(),
            code,
            args,
        }
    }
}

/// Ordered collection of validation errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors {
    errors: Vec<ValidationError>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Errors for one field, in insertion order
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Distinct field names in first-seen order
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.field.as_str()) {
                fields.push(&error.field);
            }
        }
        fields
    }
}

impl FromIterator<ValidationError> for FormErrors {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_first_seen_order() {
        let errors: FormErrors = vec![
            ValidationError::new("name", ErrorCode::Required),
            ValidationError::new("email", ErrorCode::Email),
            ValidationError::with_args("name", ErrorCode::MaxLength, vec!["64".into()]),
        ]
        .into_iter()
        .collect();

        assert_eq!(errors.fields(), vec!["name", "email"]);
        assert_eq!(errors.for_field("name").count(), 2);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_codes_have_distinct_keys() {
        let mut keys: Vec<&str> = ErrorCode::all().iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ErrorCode::all().len());
    }
}
