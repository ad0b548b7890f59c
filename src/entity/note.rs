// src/entity/note.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::NoteInput;

/// Color the client attaches to newly created notes.
pub const DEFAULT_NOTE_COLOR: &str = "#3B82F6";

/// A stored note, as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(input: NoteInput) -> Self {
        let now = super::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full replace of title and content.
    pub fn replace(&mut self, input: NoteInput) {
        self.title = input.title;
        self.content = input.content;
        self.updated_at = super::next_timestamp(self.updated_at);
    }
}

/// Request body the client sends for create and update.
///
/// `color` and `order` are display hints; the store ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            color: None,
            order: None,
        }
    }

    /// True when either field is blank after trimming.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() || self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, content: &str) -> NoteInput {
        NoteInput {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_new_note_has_equal_timestamps() {
        let note = Note::new(input("A", "B"));
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(note.title, "A");
        assert_eq!(note.content, "B");
    }

    #[test]
    fn test_replace_bumps_updated_at_only() {
        let mut note = Note::new(input("A", "B"));
        let created = note.created_at;
        let updated = note.updated_at;

        note.replace(input("C", "D"));

        assert_eq!(note.title, "C");
        assert_eq!(note.content, "D");
        assert_eq!(note.created_at, created);
        assert!(note.updated_at > updated);
    }

    #[test]
    fn test_note_json_shape() {
        let note = Note::new(input("A", "B"));
        let value = serde_json::to_value(&note).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["content", "created_at", "id", "title", "updated_at"]);
    }

    #[test]
    fn test_draft_skips_absent_hints() {
        let draft = NoteDraft::new("A", "B");
        let json = serde_json::to_string(&draft).unwrap();
        assert!(!json.contains("color"));
        assert!(!json.contains("order"));
    }

    #[test]
    fn test_draft_blank() {
        assert!(NoteDraft::new("  ", "B").is_blank());
        assert!(NoteDraft::new("A", "\n").is_blank());
        assert!(!NoteDraft::new("A", "B").is_blank());
    }
}
