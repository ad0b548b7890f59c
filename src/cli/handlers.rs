use std::io::{self, Read};
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api;
use crate::client::render::{render_field_errors, render_note_detail, render_view, short_id};
use crate::client::{
    load_preferences, save_preferences, ApiOutcome, ClientError, LocalStorage, NoteApp,
    NotesClient, PreferenceSaver, Preferences, ReorderGesture, SortField, SortOrder, SubmitError,
    ViewMode, BACKEND_UNREACHABLE, PREFERENCES_KEY, SAVE_DEBOUNCE,
};
use crate::config::{ClientConfig, ServerConfig};
use crate::entity::Note;
use crate::error::{QuickNotesError, Result};

/// Shortest accepted ID prefix.
const MIN_ID_PREFIX: usize = 4;

/// Build the client settings from the global flags.
pub fn client_config(api_url: &str, prefs: &Path) -> ClientConfig {
    ClientConfig {
        api_url: api_url.to_string(),
        prefs_path: prefs.to_path_buf(),
        ..ClientConfig::default()
    }
}

fn open_app(config: &ClientConfig) -> Result<NoteApp> {
    let storage = LocalStorage::new(config.prefs_path.clone());
    let prefs = load_preferences(&storage);
    Ok(NoteApp::new(NotesClient::new(config)?, prefs))
}

fn client_error(e: ClientError) -> QuickNotesError {
    if e.is_transport() {
        QuickNotesError::Rejected(BACKEND_UNREACHABLE.to_string())
    } else {
        QuickNotesError::Client(e)
    }
}

fn submit_error(e: SubmitError) -> QuickNotesError {
    match e {
        SubmitError::Form(e) => QuickNotesError::Rejected(e.to_string()),
        SubmitError::Client(e) => client_error(e),
    }
}

/// Turn anything but a success into an error carrying the server's message.
fn expect_success<T>(outcome: ApiOutcome<T>, id: &str) -> Result<(T, Option<String>)> {
    match outcome {
        ApiOutcome::Success { data, message } => Ok((data, message)),
        ApiOutcome::NotFound { .. } => Err(QuickNotesError::NotFound(id.to_string())),
        ApiOutcome::Invalid { message, errors } => Err(QuickNotesError::Rejected(format!(
            "{}\n{}",
            message,
            render_field_errors(&errors)
        ))),
        ApiOutcome::Rejected { status, message } => Err(QuickNotesError::Rejected(format!(
            "{} (HTTP {})",
            message, status
        ))),
    }
}

fn ensure_loaded(app: &NoteApp) -> Result<()> {
    match app.state().fetch_error() {
        Some(message) => Err(QuickNotesError::Rejected(message.to_string())),
        None => Ok(()),
    }
}

/// Resolve a full UUID or a unique UUID prefix.
async fn resolve_id(app: &mut NoteApp, raw: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(raw) {
        return Ok(id);
    }
    if raw.len() < MIN_ID_PREFIX {
        return Err(QuickNotesError::Rejected(format!(
            "ID prefix '{}' is too short (need at least {} characters)",
            raw, MIN_ID_PREFIX
        )));
    }

    app.refresh().await;
    ensure_loaded(app)?;

    let prefix = raw.to_lowercase();
    let matches: Vec<Uuid> = app
        .state()
        .notes()
        .iter()
        .map(|n| n.id())
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(QuickNotesError::NotFound(raw.to_string())),
        _ => Err(QuickNotesError::Rejected(format!(
            "ID prefix '{}' matches {} notes",
            raw,
            matches.len()
        ))),
    }
}

fn read_content(content: Option<String>, stdin: bool) -> Result<Option<String>> {
    if stdin {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(Some(buf))
    } else {
        Ok(content)
    }
}

fn print_note(verb: &str, note: &Note, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
    } else {
        println!("{} note {} - {}", verb, short_id(&note.id), note.title);
    }
    Ok(())
}

pub async fn handle_serve(config: ServerConfig) -> Result<()> {
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => warn!(error = %e, "failed to listen for shutdown signal"),
        }
        signal.cancel();
    });

    api::serve(&config, shutdown).await
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_list(
    config: &ClientConfig,
    search: Option<String>,
    sort: Option<SortField>,
    order: Option<SortOrder>,
    view: Option<ViewMode>,
    moves: Vec<ReorderGesture>,
    json: bool,
) -> Result<()> {
    let storage = LocalStorage::new(config.prefs_path.clone());
    let mut app = open_app(config)?.with_saver(PreferenceSaver::spawn(storage, SAVE_DEBOUNCE));

    if let Some(term) = search {
        app.set_search_term(term);
    }
    if sort.is_some() || order.is_some() {
        let current = app.state().prefs();
        let field = sort.unwrap_or(current.sort_by);
        let order = order.unwrap_or(current.sort_order);
        app.set_sort(field, order);
    }
    if let Some(mode) = view {
        app.set_view_mode(mode);
    }

    let result = list_loaded(&mut app, moves, json).await;
    app.shutdown().await;
    result
}

async fn list_loaded(app: &mut NoteApp, moves: Vec<ReorderGesture>, json: bool) -> Result<()> {
    app.refresh().await;
    ensure_loaded(app)?;

    for gesture in moves {
        if !app.reorder(gesture) {
            eprintln!(
                "Ignoring move {}:{} (position out of range)",
                gesture.source,
                gesture
                    .destination
                    .map(|d| d.to_string())
                    .unwrap_or_default()
            );
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&app.state().visible())?);
    } else {
        println!("{}", render_view(app.state()));
    }
    Ok(())
}

pub async fn handle_add(
    config: &ClientConfig,
    title: String,
    content: Option<String>,
    stdin: bool,
    json: bool,
) -> Result<()> {
    let content = read_content(content, stdin)?.unwrap_or_default();
    let mut app = open_app(config)?;

    // The new note is placed after the ones already loaded.
    app.refresh().await;
    ensure_loaded(&app)?;

    app.state_mut().start_add();
    if let Some(draft) = app.state_mut().draft_mut() {
        draft.title = title;
        draft.content = content;
    }

    let outcome = app.submit().await.map_err(submit_error)?;
    let (note, _) = expect_success(outcome, "new note")?;
    print_note("Created", &note, json)
}

pub async fn handle_get(config: &ClientConfig, id: String, json: bool) -> Result<()> {
    let mut app = open_app(config)?;
    let note_id = resolve_id(&mut app, &id).await?;

    let outcome = app.fetch_note(&note_id).await.map_err(client_error)?;
    let (note, _) = expect_success(outcome, &id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("{}", render_note_detail(&note));
    }
    Ok(())
}

pub async fn handle_edit(
    config: &ClientConfig,
    id: String,
    title: Option<String>,
    content: Option<String>,
    stdin: bool,
    json: bool,
) -> Result<()> {
    let content = read_content(content, stdin)?;
    if title.is_none() && content.is_none() {
        return Err(QuickNotesError::Rejected(
            "Nothing to change. Pass --title, --content or --stdin".to_string(),
        ));
    }

    let mut app = open_app(config)?;
    let note_id = resolve_id(&mut app, &id).await?;

    let outcome = app.fetch_note(&note_id).await.map_err(client_error)?;
    let (current, _) = expect_success(outcome, &id)?;

    app.state_mut().start_edit(&current);
    if let Some(draft) = app.state_mut().draft_mut() {
        if let Some(title) = title {
            draft.title = title;
        }
        if let Some(content) = content {
            draft.content = content;
        }
    }

    let outcome = app.submit().await.map_err(submit_error)?;
    let (note, _) = expect_success(outcome, &id)?;
    print_note("Updated", &note, json)
}

pub async fn handle_delete(config: &ClientConfig, id: String, force: bool) -> Result<()> {
    let mut app = open_app(config)?;
    let note_id = resolve_id(&mut app, &id).await?;

    let outcome = app.fetch_note(&note_id).await.map_err(client_error)?;
    let (note, _) = expect_success(outcome, &id)?;

    // Confirm deletion unless --force is used
    if !force {
        eprintln!("Delete note {} - {}? [y/N] ", short_id(&note.id), note.title);

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(QuickNotesError::Rejected(
                "Use --force to delete in non-interactive mode".to_string(),
            ));
        }
    }

    let outcome = app.delete(&note_id).await.map_err(client_error)?;
    expect_success(outcome, &id)?;
    println!("Deleted note {} - {}", short_id(&note.id), note.title);
    Ok(())
}

fn print_prefs(prefs: &Preferences, storage: &LocalStorage, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(prefs)?);
        return Ok(());
    }
    let search = if prefs.search_term.is_empty() {
        "(none)"
    } else {
        prefs.search_term.as_str()
    };
    println!("Search: {}", search);
    println!("Sort:   {} ({})", prefs.sort_by, prefs.sort_order);
    println!("View:   {}", prefs.view_mode);
    println!("File:   {}", storage.path().display());
    Ok(())
}

pub fn handle_prefs_show(config: &ClientConfig, json: bool) -> Result<()> {
    let storage = LocalStorage::new(config.prefs_path.clone());
    print_prefs(&load_preferences(&storage), &storage, json)
}

pub fn handle_prefs_set(
    config: &ClientConfig,
    search: Option<String>,
    sort: Option<SortField>,
    order: Option<SortOrder>,
    view: Option<ViewMode>,
) -> Result<()> {
    let storage = LocalStorage::new(config.prefs_path.clone());
    let mut prefs = load_preferences(&storage);

    if let Some(term) = search {
        prefs.search_term = term;
    }
    if let Some(field) = sort {
        prefs.sort_by = field;
    }
    if let Some(order) = order {
        prefs.sort_order = order;
    }
    if let Some(mode) = view {
        prefs.view_mode = mode;
    }

    save_preferences(&storage, &prefs)?;
    print_prefs(&prefs, &storage, false)
}

pub fn handle_prefs_reset(config: &ClientConfig) -> Result<()> {
    let storage = LocalStorage::new(config.prefs_path.clone());
    storage.remove_item(PREFERENCES_KEY)?;
    println!("Preferences reset to defaults.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldErrors;

    #[test]
    fn test_expect_success_maps_failures() {
        let ok: ApiOutcome<u8> = ApiOutcome::Success {
            data: 1,
            message: None,
        };
        assert_eq!(expect_success(ok, "x").unwrap().0, 1);

        let missing: ApiOutcome<u8> = ApiOutcome::NotFound {
            message: "Note not found".to_string(),
        };
        assert!(matches!(
            expect_success(missing, "abcd"),
            Err(QuickNotesError::NotFound(id)) if id == "abcd"
        ));

        let mut errors = FieldErrors::new();
        errors.add("title", "The title field is required.");
        let invalid: ApiOutcome<u8> = ApiOutcome::Invalid {
            message: "Validation failed".to_string(),
            errors,
        };
        let err = expect_success(invalid, "x").unwrap_err().to_string();
        assert!(err.contains("Validation failed"));
        assert!(err.contains("title: The title field is required."));
    }

    #[test]
    fn test_client_config_from_flags() {
        let config = client_config("http://example.test/api/", Path::new("p.json"));
        assert_eq!(config.api_base(), "http://example.test/api");
        assert_eq!(config.prefs_path, Path::new("p.json"));
    }

    #[tokio::test]
    async fn test_short_prefix_is_rejected_before_any_request() {
        let config = client_config("http://127.0.0.1:9/api", Path::new("unused.json"));
        let mut app = open_app(&config).unwrap();
        let err = resolve_id(&mut app, "ab").await.unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_prefs_set_and_reset() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = client_config("http://127.0.0.1:9/api", &tmp.path().join("prefs.json"));

        handle_prefs_set(&config, Some("milk".to_string()), Some(SortField::Title), None, None)
            .unwrap();
        let storage = LocalStorage::new(config.prefs_path.clone());
        let prefs = load_preferences(&storage);
        assert_eq!(prefs.search_term, "milk");
        assert_eq!(prefs.sort_by, SortField::Title);
        assert_eq!(prefs.sort_order, SortOrder::Desc);

        handle_prefs_reset(&config).unwrap();
        assert_eq!(load_preferences(&storage), Preferences::default());
    }
}
