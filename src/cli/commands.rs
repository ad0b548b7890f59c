use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::client::{ReorderGesture, SortField, SortOrder, ViewMode};
use crate::config::{DEFAULT_API_URL, DEFAULT_HOST, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(name = "quicknotes")]
#[command(version, about = "A small note store with a terminal client")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the notes API
    #[arg(long, global = true, env = "QUICKNOTES_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Preferences file
    #[arg(
        long,
        global = true,
        env = "QUICKNOTES_PREFS",
        default_value = ".quicknotes/preferences.json"
    )]
    pub prefs: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the notes API server
    Serve {
        /// Interface to bind
        #[arg(long, env = "QUICKNOTES_HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// Port to bind
        #[arg(long, env = "QUICKNOTES_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// SQLite database file
        #[arg(long, env = "QUICKNOTES_DB", default_value = ".quicknotes/notes.db")]
        db: PathBuf,
    },

    /// List notes using the saved search, sort and view preferences
    List {
        /// Filter by title or content (saved for next time)
        #[arg(long)]
        search: Option<String>,

        /// Sort field: date, title or updated (saved for next time)
        #[arg(long)]
        sort: Option<SortField>,

        /// Sort order: asc or desc (saved for next time)
        #[arg(long)]
        order: Option<SortOrder>,

        /// Layout: grid or list (saved for next time)
        #[arg(long)]
        view: Option<ViewMode>,

        /// Move the note at position SRC to position DST before printing
        /// (can be specified multiple times; DST may be omitted)
        #[arg(long = "move", value_name = "SRC:DST")]
        moves: Vec<ReorderGesture>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a note
    Add {
        /// Note title
        title: String,

        /// Note content
        #[arg(long, short = 'c', conflicts_with = "stdin")]
        content: Option<String>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Get {
        /// Note ID (full UUID or a prefix of at least 4 characters)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a note; fields not given keep their current value
    Edit {
        /// Note ID (full UUID or a prefix of at least 4 characters)
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New content
        #[arg(long, short = 'c', conflicts_with = "stdin")]
        content: Option<String>,

        /// Read new content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    Delete {
        /// Note ID (full UUID or a prefix of at least 4 characters)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Show or change saved preferences
    Prefs(PrefsCommand),
}

#[derive(Args, Debug)]
pub struct PrefsCommand {
    #[command(subcommand)]
    pub action: PrefsAction,
}

#[derive(Subcommand, Debug)]
pub enum PrefsAction {
    /// Print the saved preferences
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change one or more preferences
    Set {
        /// Search term (empty string clears it)
        #[arg(long)]
        search: Option<String>,

        /// Sort field: date, title or updated
        #[arg(long)]
        sort: Option<SortField>,

        /// Sort order: asc or desc
        #[arg(long)]
        order: Option<SortOrder>,

        /// Layout: grid or list
        #[arg(long)]
        view: Option<ViewMode>,
    },

    /// Forget saved preferences
    Reset,
}
