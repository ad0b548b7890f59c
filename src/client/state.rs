//! Client state: the note list, selection, edit form and connection banner.
//!
//! The state object is owned by one controller and changed only through the
//! methods below; rendering reads it but never mutates it.

use thiserror::Error;
use uuid::Uuid;

use super::prefs::{Preferences, SortField, SortOrder, ViewMode};
use super::view::{self, ClientNote, ReorderGesture};
use crate::entity::{Note, NoteDraft, DEFAULT_NOTE_COLOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Composing { mode: FormMode, draft: NoteDraft },
    Saving { mode: FormMode, draft: NoteDraft },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("No note is being composed")]
    NotComposing,
    #[error("Title and content are both required")]
    Blank,
}

/// A submit the controller should send to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub mode: FormMode,
    pub draft: NoteDraft,
}

/// Identifies one list fetch so late responses can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone)]
pub struct ClientState {
    notes: Vec<ClientNote>,
    prefs: Preferences,
    selected: Option<Uuid>,
    form: FormState,
    fetch_error: Option<String>,
    initial_loading: bool,
    next_ticket: u64,
    applied_ticket: Option<FetchTicket>,
}

impl ClientState {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            notes: Vec::new(),
            prefs,
            selected: None,
            form: FormState::Idle,
            fetch_error: None,
            initial_loading: true,
            next_ticket: 0,
            applied_ticket: None,
        }
    }

    pub fn notes(&self) -> &[ClientNote] {
        &self.notes
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    pub fn is_initial_loading(&self) -> bool {
        self.initial_loading
    }

    /// Notes after filter, sort and any order hints.
    pub fn visible(&self) -> Vec<ClientNote> {
        view::visible_notes(&self.notes, &self.prefs)
    }

    pub fn find(&self, id: &Uuid) -> Option<&ClientNote> {
        self.notes.iter().find(|n| n.id() == *id)
    }

    // --- fetch sequencing -------------------------------------------------

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.next_ticket += 1;
        FetchTicket(self.next_ticket)
    }

    fn is_stale(&self, ticket: FetchTicket) -> bool {
        self.applied_ticket.is_some_and(|applied| ticket < applied)
    }

    /// Replace the list with a fetched one. Returns `false` when a newer
    /// fetch has already been applied and this response is dropped.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, notes: Vec<Note>) -> bool {
        if self.is_stale(ticket) {
            tracing::debug!(?ticket, "dropping stale note list");
            return false;
        }
        self.applied_ticket = Some(ticket);
        self.notes = notes.into_iter().map(ClientNote::from).collect();
        self.fetch_error = None;
        self.initial_loading = false;
        if let Some(id) = self.selected {
            if self.find(&id).is_none() {
                self.selected = None;
            }
        }
        true
    }

    /// Record a failed fetch. The current list is left as it was.
    pub fn fail_fetch(&mut self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        if self.is_stale(ticket) {
            return false;
        }
        self.applied_ticket = Some(ticket);
        self.fetch_error = Some(message.into());
        self.initial_loading = false;
        true
    }

    pub fn set_fetch_error(&mut self, message: impl Into<String>) {
        self.fetch_error = Some(message.into());
    }

    // --- preferences ------------------------------------------------------

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.prefs.search_term = term.into();
    }

    /// Changing the sort discards manual order hints.
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        if self.prefs.sort_by != field || self.prefs.sort_order != order {
            view::clear_order_hints(&mut self.notes);
        }
        self.prefs.sort_by = field;
        self.prefs.sort_order = order;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.prefs.view_mode = mode;
    }

    // --- selection and reorder -------------------------------------------

    pub fn select(&mut self, id: Option<Uuid>) {
        self.selected = id;
    }

    pub fn note_deleted(&mut self, id: &Uuid) {
        if self.selected == Some(*id) {
            self.selected = None;
        }
    }

    /// Apply a reorder gesture to the current view. Returns `false` for a
    /// no-op gesture.
    pub fn reorder(&mut self, gesture: ReorderGesture) -> bool {
        let visible = self.visible();
        match view::reorder(&self.notes, &visible, gesture) {
            Some(merged) => {
                self.notes = merged;
                true
            }
            None => {
                tracing::debug!(?gesture, "ignoring reorder gesture");
                false
            }
        }
    }

    // --- edit form ----------------------------------------------------------

    /// Open an empty form. Replaces any form already open.
    pub fn start_add(&mut self) {
        self.selected = None;
        self.form = FormState::Composing {
            mode: FormMode::Add,
            draft: NoteDraft::default(),
        };
    }

    /// Open a form pre-filled from `note`. Replaces any form already open.
    pub fn start_edit(&mut self, note: &Note) {
        self.selected = None;
        self.form = FormState::Composing {
            mode: FormMode::Edit(note.id),
            draft: NoteDraft::new(note.title.clone(), note.content.clone()),
        };
    }

    pub fn draft_mut(&mut self) -> Option<&mut NoteDraft> {
        match &mut self.form {
            FormState::Composing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        if matches!(self.form, FormState::Composing { .. }) {
            self.form = FormState::Idle;
        }
    }

    /// Move `composing → saving` and hand back what to send.
    ///
    /// A blank draft stays in `composing` and nothing is sent.
    pub fn begin_save(&mut self) -> Result<SaveRequest, FormError> {
        let FormState::Composing { mode, draft } = &self.form else {
            return Err(FormError::NotComposing);
        };
        if draft.is_blank() {
            return Err(FormError::Blank);
        }

        let mode = *mode;
        let mut draft = draft.clone();
        draft.color = Some(DEFAULT_NOTE_COLOR.to_string());
        if mode == FormMode::Add {
            draft.order = Some(self.notes.len());
        }
        self.form = FormState::Saving {
            mode,
            draft: draft.clone(),
        };
        Ok(SaveRequest { mode, draft })
    }

    /// Finish a save: back to `idle` on success, back to `composing` with the
    /// input intact on failure.
    pub fn finish_save(&mut self, success: bool) {
        if !matches!(self.form, FormState::Saving { .. }) {
            return;
        }
        let FormState::Saving { mode, draft } = std::mem::take(&mut self.form) else {
            return;
        };
        if success {
            self.selected = None;
        } else {
            self.form = FormState::Composing {
                mode,
                draft: NoteDraft {
                    color: None,
                    order: None,
                    ..draft
                },
            };
        }
    }
}
