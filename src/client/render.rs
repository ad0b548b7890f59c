//! Plain-text rendering of the client state.

use uuid::Uuid;

use super::prefs::ViewMode;
use super::state::ClientState;
use super::view::ClientNote;
use crate::entity::{FieldErrors, Note};

pub const PREVIEW_CHARS: usize = 150;
pub const GRID_COLUMNS: usize = 3;
pub const CARD_WIDTH: usize = 30;
const CARD_PREVIEW_LINES: usize = 3;

/// Content shortened for cards and rows.
pub fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        let head: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let head: String = s.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", head)
}

/// Hard-wrap `s` into lines of at most `width` characters.
fn wrap(s: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

pub fn render_list_row(note: &ClientNote, selected: bool) -> String {
    let marker = if selected { ">" } else { " " };
    format!(
        "{} {} {}\n    {}\n    updated {}",
        marker,
        short_id(&note.id()),
        note.note.title,
        single_line(&preview(&note.note.content)),
        note.note.updated_at.format("%Y-%m-%d %H:%M"),
    )
}

fn render_card(note: &ClientNote, selected: bool) -> Vec<String> {
    let inner = CARD_WIDTH - 4;
    let edge = if selected { '=' } else { '-' };
    let border = format!("+{}+", edge.to_string().repeat(CARD_WIDTH - 2));

    let mut lines = vec![border.clone()];
    lines.push(format!("| {:<inner$} |", truncate(&note.note.title, inner)));
    lines.push(format!("| {:<inner$} |", ""));

    let mut body = wrap(&single_line(&preview(&note.note.content)), inner);
    if body.len() > CARD_PREVIEW_LINES {
        body.truncate(CARD_PREVIEW_LINES);
        if let Some(last) = body.last_mut() {
            *last = truncate(&format!("{}…", last), inner);
        }
    }
    for i in 0..CARD_PREVIEW_LINES {
        let line = body.get(i).map(String::as_str).unwrap_or("");
        lines.push(format!("| {:<inner$} |", line));
    }

    let footer = format!(
        "{} {}",
        short_id(&note.id()),
        note.note.created_at.format("%Y-%m-%d")
    );
    lines.push(format!("| {:<inner$} |", footer));
    lines.push(border);
    lines
}

pub fn render_grid(notes: &[ClientNote], selected: Option<Uuid>) -> String {
    let mut rows = Vec::new();
    for chunk in notes.chunks(GRID_COLUMNS) {
        let cards: Vec<Vec<String>> = chunk
            .iter()
            .map(|n| render_card(n, selected == Some(n.id())))
            .collect();
        let height = cards.iter().map(Vec::len).max().unwrap_or(0);
        let lines: Vec<String> = (0..height)
            .map(|i| {
                cards
                    .iter()
                    .map(|card| card.get(i).map(String::as_str).unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        rows.push(lines.join("\n"));
    }
    rows.join("\n")
}

pub fn render_list(notes: &[ClientNote], selected: Option<Uuid>) -> String {
    notes
        .iter()
        .map(|n| render_list_row(n, selected == Some(n.id())))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_banner(message: &str) -> String {
    format!(
        "Connection Error\n  {}\n  Run the command again to retry.",
        message
    )
}

/// The whole list screen: header, banner or empty message, then notes.
pub fn render_view(state: &ClientState) -> String {
    let visible = state.visible();
    let mut out = vec![format!("Your Notes ({})", visible.len())];

    if let Some(error) = state.fetch_error() {
        out.push(render_banner(error));
        return out.join("\n\n");
    }
    if state.is_initial_loading() {
        out.push("Loading notes...".to_string());
        return out.join("\n\n");
    }
    if visible.is_empty() {
        let empty = if state.prefs().search_term.is_empty() {
            "No notes yet. Create your first note!"
        } else {
            "No notes match your search."
        };
        out.push(empty.to_string());
        return out.join("\n\n");
    }

    out.push(match state.prefs().view_mode {
        ViewMode::Grid => render_grid(&visible, state.selected()),
        ViewMode::List => render_list(&visible, state.selected()),
    });
    out.join("\n\n")
}

pub fn render_note_detail(note: &Note) -> String {
    format!(
        "Note {}\nTitle: {}\nCreated: {}\nUpdated: {}\n\n{}",
        note.id,
        note.title,
        note.created_at.format("%Y-%m-%d %H:%M"),
        note.updated_at.format("%Y-%m-%d %H:%M"),
        note.content
    )
}

pub fn render_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .flat_map(|(field, reasons)| reasons.iter().map(move |r| format!("  {}: {}", field, r)))
        .collect::<Vec<_>>()
        .join("\n")
}
