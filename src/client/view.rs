//! The list pipeline: filter, sort, reorder.
//!
//! Everything here is a pure function over slices so the pipeline can be
//! tested without a server or a terminal.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::prefs::{Preferences, SortField, SortOrder};
use crate::entity::Note;

/// A fetched note plus the client-only display hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientNote {
    #[serde(flatten)]
    pub note: Note,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

impl From<Note> for ClientNote {
    fn from(note: Note) -> Self {
        Self {
            note,
            color: None,
            order: None,
        }
    }
}

impl ClientNote {
    pub fn id(&self) -> Uuid {
        self.note.id
    }
}

/// A drop emitted by the drag layer. A drop outside the list has no
/// destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderGesture {
    pub source: usize,
    pub destination: Option<usize>,
}

impl ReorderGesture {
    pub fn new(source: usize, destination: usize) -> Self {
        Self {
            source,
            destination: Some(destination),
        }
    }
}

impl std::str::FromStr for ReorderGesture {
    type Err = String;

    /// Parses `SRC:DST`. An empty `DST` is a drop outside the list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (src, dst) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid move '{}'. Expected 'SRC:DST'", s))?;
        let source = src
            .trim()
            .parse()
            .map_err(|_| format!("Invalid source index '{}'", src))?;
        let destination = match dst.trim() {
            "" => None,
            dst => Some(
                dst.parse()
                    .map_err(|_| format!("Invalid destination index '{}'", dst))?,
            ),
        };
        Ok(Self {
            source,
            destination,
        })
    }
}

/// Case-insensitive substring match on title or content.
pub fn matches_search(note: &Note, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    note.title.to_lowercase().contains(&term) || note.content.to_lowercase().contains(&term)
}

pub fn filter_notes(notes: &[ClientNote], term: &str) -> Vec<ClientNote> {
    notes
        .iter()
        .filter(|n| matches_search(&n.note, term))
        .cloned()
        .collect()
}

pub fn compare_notes(a: &Note, b: &Note, field: SortField, order: SortOrder) -> Ordering {
    let ordering = match field {
        SortField::Title => a
            .title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title)),
        SortField::Updated => a.updated_at.cmp(&b.updated_at),
        SortField::Date => a.created_at.cmp(&b.created_at),
    };
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

pub fn sort_notes(notes: &mut [ClientNote], field: SortField, order: SortOrder) {
    notes.sort_by(|a, b| compare_notes(&a.note, &b.note, field, order));
}

/// Arrange notes that carry an `order` hint by that hint; notes without one
/// keep their sorted position after them.
pub fn apply_order_hints(notes: &mut [ClientNote]) {
    if notes.iter().any(|n| n.order.is_some()) {
        notes.sort_by_key(|n| n.order.unwrap_or(usize::MAX));
    }
}

/// The sequence the user sees for the given preferences.
pub fn visible_notes(notes: &[ClientNote], prefs: &Preferences) -> Vec<ClientNote> {
    let mut view = filter_notes(notes, &prefs.search_term);
    sort_notes(&mut view, prefs.sort_by, prefs.sort_order);
    apply_order_hints(&mut view);
    view
}

/// Apply a drop to `view` and merge the result back into `notes`.
///
/// Returns `None` when the gesture is a no-op (no destination, or a source
/// outside the view). Notes outside the view are kept, in their existing
/// relative order, ahead of the reordered subset.
pub fn reorder(
    notes: &[ClientNote],
    view: &[ClientNote],
    gesture: ReorderGesture,
) -> Option<Vec<ClientNote>> {
    let destination = gesture.destination?;
    if gesture.source >= view.len() {
        return None;
    }

    let mut items = view.to_vec();
    let moved = items.remove(gesture.source);
    items.insert(destination.min(items.len()), moved);
    for (index, item) in items.iter_mut().enumerate() {
        item.order = Some(index);
    }

    let reordered: HashSet<Uuid> = items.iter().map(ClientNote::id).collect();
    let mut merged: Vec<ClientNote> = notes
        .iter()
        .filter(|n| !reordered.contains(&n.id()))
        .cloned()
        .collect();
    merged.extend(items);
    Some(merged)
}

/// Drop every order hint.
pub fn clear_order_hints(notes: &mut [ClientNote]) {
    for note in notes {
        note.order = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn note(title: &str, content: &str, created_offset: i64, updated_offset: i64) -> ClientNote {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: base + Duration::minutes(created_offset),
            updated_at: base + Duration::minutes(updated_offset),
        }
        .into()
    }

    fn titles(notes: &[ClientNote]) -> Vec<&str> {
        notes.iter().map(|n| n.note.title.as_str()).collect()
    }

    #[test]
    fn test_empty_search_keeps_everything() {
        let notes = vec![note("a", "1", 0, 0), note("b", "2", 1, 1)];
        let filtered = filter_notes(&notes, "");
        assert_eq!(filtered, notes);
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_or_content() {
        let notes = vec![
            note("Groceries", "milk, eggs", 0, 0),
            note("Work", "Email the MILKman", 1, 1),
            note("Ideas", "none", 2, 2),
        ];
        assert_eq!(titles(&filter_notes(&notes, "milk")), vec!["Groceries", "Work"]);
        assert_eq!(titles(&filter_notes(&notes, "IDEAS")), vec!["Ideas"]);
        assert!(filter_notes(&notes, "zzz").is_empty());
    }

    #[test]
    fn test_sort_by_title() {
        let mut notes = vec![note("Banana", "x", 0, 0), note("Apple", "x", 1, 1)];
        sort_notes(&mut notes, SortField::Title, SortOrder::Asc);
        assert_eq!(titles(&notes), vec!["Apple", "Banana"]);

        sort_notes(&mut notes, SortField::Title, SortOrder::Desc);
        assert_eq!(titles(&notes), vec!["Banana", "Apple"]);
    }

    #[test]
    fn test_sort_by_title_ignores_case() {
        let mut notes = vec![
            note("Banana", "x", 0, 0),
            note("apple", "x", 1, 1),
            note("Apple", "x", 2, 2),
        ];
        sort_notes(&mut notes, SortField::Title, SortOrder::Asc);
        assert_eq!(titles(&notes), vec!["Apple", "apple", "Banana"]);

        sort_notes(&mut notes, SortField::Title, SortOrder::Desc);
        assert_eq!(titles(&notes), vec!["Banana", "apple", "Apple"]);
    }

    #[test]
    fn test_sort_by_created_and_updated() {
        let mut notes = vec![
            note("old-but-fresh", "x", 0, 10),
            note("new-but-stale", "x", 5, 5),
        ];

        sort_notes(&mut notes, SortField::Date, SortOrder::Desc);
        assert_eq!(titles(&notes), vec!["new-but-stale", "old-but-fresh"]);

        sort_notes(&mut notes, SortField::Updated, SortOrder::Desc);
        assert_eq!(titles(&notes), vec!["old-but-fresh", "new-but-stale"]);

        sort_notes(&mut notes, SortField::Updated, SortOrder::Asc);
        assert_eq!(titles(&notes), vec!["new-but-stale", "old-but-fresh"]);
    }

    #[test]
    fn test_visible_notes_default_prefs_newest_first() {
        let notes = vec![note("first", "x", 0, 0), note("second", "x", 1, 1)];
        let view = visible_notes(&notes, &Preferences::default());
        assert_eq!(titles(&view), vec!["second", "first"]);
    }

    #[test]
    fn test_reorder_moves_last_to_front_and_assigns_order() {
        let notes = vec![note("a", "x", 0, 0), note("b", "x", 1, 1), note("c", "x", 2, 2)];
        let prefs = Preferences {
            sort_order: SortOrder::Asc,
            ..Preferences::default()
        };
        let view = visible_notes(&notes, &prefs);

        let merged = reorder(&notes, &view, ReorderGesture::new(2, 0)).unwrap();
        assert_eq!(titles(&merged), vec!["c", "a", "b"]);
        let orders: Vec<_> = merged.iter().map(|n| n.order).collect();
        assert_eq!(orders, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_reorder_leaves_notes_outside_view_untouched() {
        let notes = vec![
            note("apple pie", "x", 0, 0),
            note("hidden", "x", 1, 1),
            note("apple tart", "x", 2, 2),
            note("apple jam", "x", 3, 3),
        ];
        let prefs = Preferences {
            search_term: "apple".to_string(),
            sort_order: SortOrder::Asc,
            ..Preferences::default()
        };
        let view = visible_notes(&notes, &prefs);
        assert_eq!(titles(&view), vec!["apple pie", "apple tart", "apple jam"]);

        let merged = reorder(&notes, &view, ReorderGesture::new(2, 0)).unwrap();
        assert_eq!(merged.len(), 4);
        assert_eq!(merged[0], notes[1]);
        assert_eq!(titles(&merged[1..]), vec!["apple jam", "apple pie", "apple tart"]);
        assert_eq!(merged[0].order, None);
    }

    #[test]
    fn test_reorder_without_destination_is_noop() {
        let notes = vec![note("a", "x", 0, 0), note("b", "x", 1, 1)];
        let gesture = ReorderGesture {
            source: 0,
            destination: None,
        };
        assert!(reorder(&notes, &notes, gesture).is_none());
    }

    #[test]
    fn test_reorder_source_out_of_range_is_noop() {
        let notes = vec![note("a", "x", 0, 0)];
        assert!(reorder(&notes, &notes, ReorderGesture::new(3, 0)).is_none());
    }

    #[test]
    fn test_reorder_destination_past_end_appends() {
        let notes = vec![note("a", "x", 0, 0), note("b", "x", 1, 1), note("c", "x", 2, 2)];
        let merged = reorder(&notes, &notes, ReorderGesture::new(0, 10)).unwrap();
        assert_eq!(titles(&merged), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_order_hints_survive_resort() {
        let notes = vec![note("a", "x", 0, 0), note("b", "x", 1, 1), note("c", "x", 2, 2)];
        let prefs = Preferences::default();
        let view = visible_notes(&notes, &prefs);
        assert_eq!(titles(&view), vec!["c", "b", "a"]);

        let merged = reorder(&notes, &view, ReorderGesture::new(2, 0)).unwrap();
        assert_eq!(titles(&visible_notes(&merged, &prefs)), vec!["a", "c", "b"]);

        let mut cleared = merged.clone();
        clear_order_hints(&mut cleared);
        assert_eq!(titles(&visible_notes(&cleared, &prefs)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_parse_gesture() {
        let gesture: ReorderGesture = "2:0".parse().unwrap();
        assert_eq!(gesture, ReorderGesture::new(2, 0));
        assert!("2".parse::<ReorderGesture>().is_err());
        assert!("a:1".parse::<ReorderGesture>().is_err());

        let outside: ReorderGesture = "1:".parse().unwrap();
        assert_eq!(outside.destination, None);
    }

    #[test]
    fn test_client_note_flattens_note() {
        let mut n = note("a", "x", 0, 0);
        n.order = Some(1);
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["title"], "a");
        assert_eq!(value["order"], 1);
        assert!(value.get("color").is_none());
    }
}
