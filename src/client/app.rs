//! Controller tying the REST client, the client state and preference
//! persistence together.
//!
//! Every successful mutation is followed by a full re-fetch; nothing is
//! patched into the local list optimistically.

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::http::{ApiOutcome, ClientError, NotesClient};
use super::prefs::{PreferenceSaver, Preferences, SortField, SortOrder, ViewMode};
use super::state::{ClientState, FormError, FormMode};
use super::view::ReorderGesture;
use crate::entity::Note;

pub const BACKEND_UNREACHABLE: &str =
    "Cannot connect to the backend server. Make sure the API server is running.";
pub const API_ERROR_RESPONSE: &str = "API returned an error response";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

pub struct NoteApp {
    api: NotesClient,
    state: ClientState,
    saver: Option<PreferenceSaver>,
}

impl NoteApp {
    pub fn new(api: NotesClient, prefs: Preferences) -> Self {
        Self {
            api,
            state: ClientState::new(prefs),
            saver: None,
        }
    }

    /// Persist preference changes through `saver`.
    pub fn with_saver(mut self, saver: PreferenceSaver) -> Self {
        self.saver = Some(saver);
        self
    }

    pub fn api(&self) -> &NotesClient {
        &self.api
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ClientState {
        &mut self.state
    }

    /// Fetch the full list. Returns `true` when the list was replaced.
    pub async fn refresh(&mut self) -> bool {
        let ticket = self.state.begin_fetch();
        match self.api.list().await {
            Ok(ApiOutcome::Success { data, .. }) => {
                debug!(count = data.len(), "fetched notes");
                self.state.apply_fetch(ticket, data)
            }
            Ok(other) => {
                warn!(message = ?other.message(), "list request was rejected");
                self.state.fail_fetch(ticket, API_ERROR_RESPONSE);
                false
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch notes");
                let banner = if e.is_transport() {
                    BACKEND_UNREACHABLE
                } else {
                    API_ERROR_RESPONSE
                };
                self.state.fail_fetch(ticket, banner);
                false
            }
        }
    }

    pub async fn fetch_note(&self, id: &Uuid) -> Result<ApiOutcome<Note>, ClientError> {
        self.api.get(id).await
    }

    /// Send the open form. Expected failures come back as an
    /// [`ApiOutcome`]; only local refusals and transport problems are errors.
    pub async fn submit(&mut self) -> Result<ApiOutcome<Note>, SubmitError> {
        let request = self.state.begin_save()?;

        let result = match request.mode {
            FormMode::Add => self.api.create(&request.draft).await,
            FormMode::Edit(id) => self.api.update(&id, &request.draft).await,
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "failed to save note");
                self.state.finish_save(false);
                if e.is_transport() {
                    self.state.set_fetch_error(BACKEND_UNREACHABLE);
                }
                return Err(e.into());
            }
        };

        let saved = outcome.is_success();
        self.state.finish_save(saved);
        if saved {
            self.refresh().await;
        }
        Ok(outcome)
    }

    pub async fn delete(&mut self, id: &Uuid) -> Result<ApiOutcome<()>, ClientError> {
        let outcome = match self.api.delete(id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "failed to delete note");
                if e.is_transport() {
                    self.state.set_fetch_error(BACKEND_UNREACHABLE);
                }
                return Err(e);
            }
        };

        if outcome.is_success() {
            self.state.note_deleted(id);
            self.refresh().await;
        }
        Ok(outcome)
    }

    pub fn reorder(&mut self, gesture: ReorderGesture) -> bool {
        self.state.reorder(gesture)
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.set_search_term(term);
        self.persist_prefs();
    }

    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        self.state.set_sort(field, order);
        self.persist_prefs();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.state.set_view_mode(mode);
        self.persist_prefs();
    }

    fn persist_prefs(&self) {
        if let Some(saver) = &self.saver {
            saver.schedule(self.state.prefs().clone());
        }
    }

    /// Flush pending preference writes.
    pub async fn shutdown(self) {
        if let Some(saver) = self.saver {
            saver.shutdown().await;
        }
    }
}
