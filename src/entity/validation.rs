//! Request payload validation for note create and update.
//!
//! Both operations share one rule set: `title` and `content` are required
//! strings, and `title` is capped at [`MAX_TITLE_CHARS`] characters. Values are
//! trimmed before they are checked and stored.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_TITLE_CHARS: usize = 255;

/// Per-field failure reasons, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, reason: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<&str> = self
            .0
            .values()
            .flat_map(|r| r.iter().map(String::as_str))
            .collect();
        write!(f, "{}", reasons.join(" "))
    }
}

/// Raw create/update body as received.
///
/// Fields stay untyped so that a wrong type is reported per field instead of
/// rejecting the whole body. Unknown fields (`color`, `order`) are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotePayload {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub content: Option<Value>,
}

/// A payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
}

impl NotePayload {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(Value::String(title.into())),
            content: Some(Value::String(content.into())),
        }
    }

    pub fn validate(&self) -> Result<NoteInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required_string("title", self.title.as_ref(), &mut errors);
        if let Some(ref t) = title {
            if t.chars().count() > MAX_TITLE_CHARS {
                errors.add(
                    "title",
                    format!(
                        "The title field must not be greater than {} characters.",
                        MAX_TITLE_CHARS
                    ),
                );
            }
        }
        let content = required_string("content", self.content.as_ref(), &mut errors);

        match (title, content) {
            (Some(title), Some(content)) if errors.is_empty() => Ok(NoteInput { title, content }),
            _ => Err(errors),
        }
    }
}

fn required_string(field: &str, value: Option<&Value>, errors: &mut FieldErrors) -> Option<String> {
    match value {
        None | Some(Value::Null) => {
            errors.add(field, format!("The {} field is required.", field));
            None
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                errors.add(field, format!("The {} field is required.", field));
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(_) => {
            errors.add(field, format!("The {} field must be a string.", field));
            None
        }
    }
}
