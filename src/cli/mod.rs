mod commands;
mod handlers;

pub use commands::{Cli, Commands, PrefsAction, PrefsCommand};
pub use handlers::{
    client_config, handle_add, handle_delete, handle_edit, handle_get, handle_list,
    handle_prefs_reset, handle_prefs_set, handle_prefs_show, handle_serve,
};
