//! Client UI preferences and their local persistence.
//!
//! Preferences live under a single key of a small string key/value file, the
//! terminal counterpart of browser local storage. Writes go through
//! [`PreferenceSaver`], which waits for a quiet period before touching disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Result;

pub const PREFS_FILE: &str = "preferences.json";
pub const PREFERENCES_KEY: &str = "quicknotes-preferences";
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// Creation time.
    #[default]
    Date,
    Title,
    /// Last update time.
    Updated,
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortField::Date => write!(f, "date"),
            SortField::Title => write!(f, "title"),
            SortField::Updated => write!(f, "updated"),
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" | "created" => Ok(SortField::Date),
            "title" => Ok(SortField::Title),
            "updated" => Ok(SortField::Updated),
            _ => Err(format!("Invalid sort field: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Grid => write!(f, "grid"),
            ViewMode::List => write!(f, "list"),
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            _ => Err(format!("Invalid view mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub search_term: String,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub view_mode: ViewMode,
}

impl Preferences {
    /// Parse a stored preference blob.
    ///
    /// Never fails: malformed JSON yields the defaults, and each field that is
    /// missing or unrecognised falls back to its own default.
    pub fn from_json(raw: &str) -> Self {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "ignoring malformed preferences");
                return Self::default();
            }
        };
        let Some(obj) = value.as_object() else {
            warn!("ignoring preferences that are not a JSON object");
            return Self::default();
        };

        let text = |key: &str| obj.get(key).and_then(Value::as_str);
        let defaults = Self::default();

        Self {
            search_term: text("searchTerm").unwrap_or_default().to_string(),
            sort_by: text("sortBy")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sort_by),
            sort_order: text("sortOrder")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sort_order),
            view_mode: text("viewMode")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.view_mode),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// File-backed string key/value store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "local storage file unreadable, starting empty");
            BTreeMap::new()
        })
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(items)?)?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.read_all();
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

/// Load preferences at startup, falling back to defaults.
pub fn load_preferences(storage: &LocalStorage) -> Preferences {
    match storage.get_item(PREFERENCES_KEY) {
        Some(raw) => Preferences::from_json(&raw),
        None => Preferences::default(),
    }
}

pub fn save_preferences(storage: &LocalStorage, prefs: &Preferences) -> Result<()> {
    storage.set_item(PREFERENCES_KEY, &prefs.to_json()?)
}

/// Debounced preference writer.
///
/// Each [`schedule`](Self::schedule) restarts the quiet period; only the last
/// value is written. [`shutdown`](Self::shutdown) flushes a pending value.
pub struct PreferenceSaver {
    tx: mpsc::UnboundedSender<Preferences>,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl PreferenceSaver {
    pub fn spawn(storage: LocalStorage, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_saver(storage, delay, rx, shutdown.clone()));
        Self {
            tx,
            shutdown,
            handle,
        }
    }

    pub fn schedule(&self, prefs: Preferences) {
        if self.tx.send(prefs).is_err() {
            warn!("preference saver stopped, change not persisted");
        }
    }

    /// Stop the saver after writing any pending change.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "preference saver task failed");
        }
    }
}

fn flush(storage: &LocalStorage, pending: &mut Option<Preferences>) {
    if let Some(prefs) = pending.take() {
        match save_preferences(storage, &prefs) {
            Ok(()) => debug!(path = %storage.path().display(), "preferences saved"),
            Err(e) => warn!(error = %e, "failed to save preferences"),
        }
    }
}

async fn run_saver(
    storage: LocalStorage,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<Preferences>,
    shutdown: CancellationToken,
) {
    let mut pending: Option<Preferences> = None;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                while let Ok(prefs) = rx.try_recv() {
                    pending = Some(prefs);
                }
                flush(&storage, &mut pending);
                break;
            }
            msg = rx.recv() => match msg {
                Some(prefs) => pending = Some(prefs),
                None => {
                    flush(&storage, &mut pending);
                    break;
                }
            },
            _ = tokio::time::sleep(delay), if pending.is_some() => {
                flush(&storage, &mut pending);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(tmp: &TempDir) -> LocalStorage {
        LocalStorage::new(tmp.path().join(".quicknotes").join(PREFS_FILE))
    }

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.search_term, "");
        assert_eq!(prefs.sort_by, SortField::Date);
        assert_eq!(prefs.sort_order, SortOrder::Desc);
        assert_eq!(prefs.view_mode, ViewMode::Grid);
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let prefs = Preferences {
            search_term: "milk".to_string(),
            sort_by: SortField::Title,
            sort_order: SortOrder::Asc,
            view_mode: ViewMode::List,
        };
        let value: Value = serde_json::from_str(&prefs.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "searchTerm": "milk",
                "sortBy": "title",
                "sortOrder": "asc",
                "viewMode": "list"
            })
        );
        assert_eq!(Preferences::from_json(&prefs.to_json().unwrap()), prefs);
    }

    #[test]
    fn test_malformed_json_yields_defaults() {
        assert_eq!(Preferences::from_json("{not json"), Preferences::default());
        assert_eq!(Preferences::from_json("[1, 2]"), Preferences::default());
        assert_eq!(Preferences::from_json(""), Preferences::default());
    }

    #[test]
    fn test_bad_field_falls_back_individually() {
        let prefs = Preferences::from_json(r#"{"searchTerm":"x","sortBy":"color","sortOrder":"asc"}"#);
        assert_eq!(prefs.search_term, "x");
        assert_eq!(prefs.sort_by, SortField::Date);
        assert_eq!(prefs.sort_order, SortOrder::Asc);
        assert_eq!(prefs.view_mode, ViewMode::Grid);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Title".parse::<SortField>().unwrap(), SortField::Title);
        assert_eq!("updated".parse::<SortField>().unwrap(), SortField::Updated);
        assert!("size".parse::<SortField>().is_err());
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("list".parse::<ViewMode>().unwrap(), ViewMode::List);
        assert_eq!(SortOrder::Asc.toggled(), SortOrder::Desc);
    }

    #[test]
    fn test_load_missing_storage_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_preferences(&storage(&tmp)), Preferences::default());
    }

    #[test]
    fn test_load_malformed_stored_value_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        storage.set_item(PREFERENCES_KEY, "{{{").unwrap();
        assert_eq!(load_preferences(&storage), Preferences::default());
    }

    #[test]
    fn test_load_corrupt_storage_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "garbage").unwrap();
        assert_eq!(load_preferences(&storage), Preferences::default());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        let prefs = Preferences {
            view_mode: ViewMode::List,
            ..Preferences::default()
        };
        save_preferences(&storage, &prefs).unwrap();
        assert_eq!(load_preferences(&storage), prefs);
    }

    #[test]
    fn test_storage_keeps_other_keys() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        storage.set_item("other", "1").unwrap();
        save_preferences(&storage, &Preferences::default()).unwrap();
        assert_eq!(storage.get_item("other").as_deref(), Some("1"));

        storage.remove_item(PREFERENCES_KEY).unwrap();
        assert!(storage.get_item(PREFERENCES_KEY).is_none());
        assert_eq!(storage.get_item("other").as_deref(), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_saver_debounces_bursts() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        let saver = PreferenceSaver::spawn(storage.clone(), SAVE_DEBOUNCE);

        for term in ["m", "mi", "milk"] {
            saver.schedule(Preferences {
                search_term: term.to_string(),
                ..Preferences::default()
            });
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(storage.get_item(PREFERENCES_KEY).is_none());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(load_preferences(&storage).search_term, "milk");

        saver.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_saver_restarts_quiet_period_on_change() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        let saver = PreferenceSaver::spawn(storage.clone(), SAVE_DEBOUNCE);

        saver.schedule(Preferences::default());
        tokio::time::sleep(Duration::from_millis(400)).await;
        saver.schedule(Preferences {
            view_mode: ViewMode::List,
            ..Preferences::default()
        });
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(storage.get_item(PREFERENCES_KEY).is_none());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(load_preferences(&storage).view_mode, ViewMode::List);

        saver.shutdown().await;
    }

    #[tokio::test]
    async fn test_saver_flushes_on_shutdown() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        let saver = PreferenceSaver::spawn(storage.clone(), Duration::from_secs(60));

        saver.schedule(Preferences {
            sort_by: SortField::Updated,
            ..Preferences::default()
        });
        saver.shutdown().await;

        assert_eq!(load_preferences(&storage).sort_by, SortField::Updated);
    }
}
