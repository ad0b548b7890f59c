//! The note client.
//!
//! Fetches the full list once, then searches, sorts and reorders locally.
//! Only UI preferences are persisted on the client side.

pub mod app;
pub mod http;
pub mod prefs;
pub mod render;
pub mod state;
pub mod view;

pub use app::{NoteApp, SubmitError, API_ERROR_RESPONSE, BACKEND_UNREACHABLE};
pub use http::{ApiOutcome, ClientError, NotesClient};
pub use prefs::{
    load_preferences, save_preferences, LocalStorage, PreferenceSaver, Preferences, SortField,
    SortOrder, ViewMode, PREFERENCES_KEY, PREFS_FILE, SAVE_DEBOUNCE,
};
pub use state::{ClientState, FetchTicket, FormError, FormMode, FormState, SaveRequest};
pub use view::{ClientNote, ReorderGesture};
