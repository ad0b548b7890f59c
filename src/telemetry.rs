//! Log setup shared by the server and the client commands.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used by `serve` when `RUST_LOG` is unset.
pub const SERVER_LOG_FILTER: &str = "quicknotes=info,tower_http=info";
/// Filter used by the client commands when `RUST_LOG` is unset.
pub const CLIENT_LOG_FILTER: &str = "quicknotes=warn";

/// Install a stderr fmt subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
