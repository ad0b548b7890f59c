//! HTTP surface of the note store service.
//!
//! Routes live under `/api`: the note CRUD endpoints and a health probe.
//! All bodies use the [`ApiResponse`] envelope.

pub mod envelope;
pub mod error;
pub mod health;
pub mod notes;

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use envelope::ApiResponse;
pub use error::{ApiError, ApiResult};

use crate::config::ServerConfig;
use crate::error::{QuickNotesError, Result};
use crate::storage::NoteStore;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<NoteStore>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: NoteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            started_at: Instant::now(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/api/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/api/health", get(health::health))
        // Note content has no length cap.
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` is cancelled.
pub async fn serve_on(listener: TcpListener, store: NoteStore, shutdown: CancellationToken) -> Result<()> {
    let app = create_router(AppState::new(store));
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

/// Open the store named in `config`, bind, and serve until `shutdown`.
pub async fn serve(config: &ServerConfig, shutdown: CancellationToken) -> Result<()> {
    let store = NoteStore::open(&config.db_path)?;
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| QuickNotesError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(%addr, db = %config.db_path.display(), "Starting QuickNotes API server");
    serve_on(listener, store, shutdown).await?;
    tracing::info!("Server stopped");
    Ok(())
}
