pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod storage;
pub mod telemetry;

pub use client::NoteApp;
pub use error::{QuickNotesError, Result};
pub use storage::NoteStore;
