//! Note CRUD route handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::envelope::ApiResponse;
use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::entity::{Note, NotePayload};

/// Ids that do not parse cannot name a stored note.
fn parse_note_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        debug!(id = raw, "unparseable note id");
        ApiError::not_found()
    })
}

fn body(payload: std::result::Result<Json<NotePayload>, JsonRejection>) -> ApiResult<NotePayload> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "rejected request body");
            Err(ApiError::malformed_body())
        }
    }
}

/// GET /api/notes
pub async fn list_notes(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Note>>>> {
    let store = state.store.lock().await;
    let notes = store.list()?;
    debug!(count = notes.len(), "listed notes");
    Ok(Json(ApiResponse::data(notes)))
}

/// POST /api/notes
pub async fn create_note(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NotePayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Note>>)> {
    let payload = body(payload)?;
    let store = state.store.lock().await;
    let note = store.create(&payload)?;
    info!(id = %note.id, "note created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Note created successfully", note)),
    ))
}

/// GET /api/notes/{id}
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Note>>> {
    let id = parse_note_id(&id)?;
    let store = state.store.lock().await;
    let note = store.get(&id)?;
    Ok(Json(ApiResponse::data(note)))
}

/// PUT /api/notes/{id}
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<NotePayload>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Note>>> {
    let id = parse_note_id(&id)?;
    let store = state.store.lock().await;
    // Not-found wins over a bad body.
    if store.find(&id)?.is_none() {
        return Err(ApiError::not_found());
    }
    let payload = body(payload)?;
    let note = store.update(&id, &payload)?;
    info!(id = %note.id, "note updated");
    Ok(Json(ApiResponse::with_message("Note updated successfully", note)))
}

/// DELETE /api/notes/{id}
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let id = parse_note_id(&id)?;
    let store = state.store.lock().await;
    store.delete(&id)?;
    info!(%id, "note deleted");
    Ok(Json(ApiResponse::message("Note deleted successfully")))
}
