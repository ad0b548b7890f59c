use clap::Parser;
use quicknotes::cli::{
    client_config, handle_add, handle_delete, handle_edit, handle_get, handle_list,
    handle_prefs_reset, handle_prefs_set, handle_prefs_show, handle_serve, Cli, Commands,
    PrefsAction,
};
use quicknotes::config::ServerConfig;
use quicknotes::telemetry::{init_tracing, CLIENT_LOG_FILTER, SERVER_LOG_FILTER};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Commands::Serve { .. } => SERVER_LOG_FILTER,
        _ => CLIENT_LOG_FILTER,
    };
    init_tracing(default_filter);

    let config = client_config(&cli.api_url, &cli.prefs);

    let result = match cli.command {
        Commands::Serve { host, port, db } => {
            handle_serve(ServerConfig {
                host,
                port,
                db_path: db,
            })
            .await
        }
        Commands::List {
            search,
            sort,
            order,
            view,
            moves,
            json,
        } => handle_list(&config, search, sort, order, view, moves, json).await,
        Commands::Add {
            title,
            content,
            stdin,
            json,
        } => handle_add(&config, title, content, stdin, json).await,
        Commands::Get { id, json } => handle_get(&config, id, json).await,
        Commands::Edit {
            id,
            title,
            content,
            stdin,
            json,
        } => handle_edit(&config, id, title, content, stdin, json).await,
        Commands::Delete { id, force } => handle_delete(&config, id, force).await,
        Commands::Prefs(prefs_cmd) => match prefs_cmd.action {
            PrefsAction::Show { json } => handle_prefs_show(&config, json),
            PrefsAction::Set {
                search,
                sort,
                order,
                view,
            } => handle_prefs_set(&config, search, sort, order, view),
            PrefsAction::Reset => handle_prefs_reset(&config),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
