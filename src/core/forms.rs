//! Dynamic forms: string field data plus validation errors
//!
//! `bind` applies a list of constraints to submitted data. `errors_as_json`
//! renders the errors as `{ field: [message, ...] }` in field order.

use serde_json::{Map, Value};

use crate::core::json::Document;
use crate::core::messages::{Lang, Messages};
use crate::types::{ErrorCode, FormErrors, ValidationError};

/// Field constraint checked by [`DynamicForm::bind`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Present and not blank
    Required(String),
    MinLength(String, usize),
    MaxLength(String, usize),
}

impl Constraint {
    pub fn required(field: impl Into<String>) -> Self {
        Self::Required(field.into())
    }

    pub fn min_length(field: impl Into<String>, min: usize) -> Self {
        Self::MinLength(field.into(), min)
    }

    pub fn max_length(field: impl Into<String>, max: usize) -> Self {
        Self::MaxLength(field.into(), max)
    }

    fn check(&self, data: &[(String, String)]) -> Option<ValidationError> {
        let value = |field: &str| {
            data.iter()
                .rev()
                .find(|(k, _)| k == field)
                .map(|(_, v)| v.as_str())
        };

        match self {
            Self::Required(field) => match value(field) {
                Some(v) if !v.trim().is_empty() => None,
                _ => Some(ValidationError::new(field.as_str(), ErrorCode::Required)),
            },
            // Length checks only apply to submitted values; pair with Required.
            Self::MinLength(field, min) => value(field)
                .filter(|v| v.chars().count() < *min)
                .map(|_| {
                    ValidationError::with_args(field.as_str(), ErrorCode::MinLength, vec![min.to_string()])
                }),
            Self::MaxLength(field, max) => value(field)
                .filter(|v| v.chars().count() > *max)
                .map(|_| {
                    ValidationError::with_args(field.as_str(), ErrorCode::MaxLength, vec![max.to_string()])
                }),
        }
    }
}

/// Submitted form data with its validation errors
#[derive(Debug, Clone, Default)]
pub struct DynamicForm {
    data: Vec<(String, String)>,
    errors: FormErrors,
}

impl DynamicForm {
    pub fn new(data: Vec<(String, String)>, errors: FormErrors) -> Self {
        Self { data, errors }
    }

    /// Bind data and collect every constraint failure
    pub fn bind<I, K, V>(data: I, constraints: &[Constraint]) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data: Vec<(String, String)> = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let errors = constraints.iter().filter_map(|c| c.check(&data)).collect();
        Self { data, errors }
    }

    /// Submitted value; the last one wins for repeated fields
    pub fn get(&self, field: &str) -> Option<&str> {
        self.data
            .iter()
            .rev()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Errors as `{ field: [message, ...] }` resolved for `lang`
    pub fn errors_as_json(&self, messages: &Messages, lang: &Lang) -> Document {
        let mut map = Map::new();
        for field in self.errors.fields() {
            let texts = self
                .errors
                .for_field(field)
                .map(|e| Value::String(messages.get(lang, e.code.key(), &e.args)))
                .collect();
            map.insert(field.to_string(), Value::Array(texts));
        }
        Document::from(Value::Object(map))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_errors_as_json_required() {
        let mut errors = FormErrors::new();
        errors.push(ValidationError::new("foo", ErrorCode::Required));
        let form = DynamicForm::new(Vec::new(), errors);

        let lang = Lang::new("en");
        let messages = Messages::new();
        let json = form.errors_as_json(&messages, &lang);

        let first = json.find_path("foo").elements().next().unwrap();
        assert_eq!(
            first.as_text().unwrap(),
            messages.get(&lang, ErrorCode::Required.key(), &[])
        );
    }

    #[test]
    fn test_bind_collects_all_failures() {
        let constraints = [
            Constraint::required("name"),
            Constraint::max_length("name", 3),
            Constraint::required("email"),
            Constraint::min_length("nick", 2),
        ];
        let form = DynamicForm::bind([("name", "Kikiki"), ("nick", "k")], &constraints);

        assert!(form.has_errors());
        assert_eq!(form.errors().fields(), vec!["name", "email", "nick"]);

        let json = form.errors_as_json(&Messages::new(), &Lang::default());
        assert_eq!(
            json.to_text(),
            r#"{"name":["Maximum length is 3"],"email":["This field is required"],"nick":["Minimum length is 2"]}"#
        );
    }

    #[test]
    fn test_bind_valid() {
        let form = DynamicForm::bind(
            [("name", "Coco")],
            &[Constraint::required("name"), Constraint::max_length("name", 64)],
        );

        assert!(!form.has_errors());
        assert_eq!(form.get("name"), Some("Coco"));
        assert_eq!(form.errors_as_json(&Messages::new(), &Lang::default()).to_text(), "{}");
    }

    #[test]
    fn test_blank_is_missing() {
        let form = DynamicForm::bind([("name", "   ")], &[Constraint::required("name")]);
        assert_eq!(form.errors().iter().next().unwrap().code, ErrorCode::Required);
    }

    #[test]
    fn test_localised_errors() {
        let fr = Lang::new("fr");
        let messages = Messages::new().with_message(&fr, "error.required", "Ce champ est requis");
        let form = DynamicForm::bind(Vec::<(String, String)>::new(), &[Constraint::required("foo")]);

        let json = form.errors_as_json(&messages, &fr);
        assert_eq!(json.get("foo").at(0).as_text().unwrap(), "Ce champ est requis");
    }
}
