use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wanderlust::config::{Config, DEFAULT_LOG_FILTER, LISTEN_ADDR, LogFormat};
use wanderlust::{AppState, MemoryStore, Server, SqliteStore, app};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_tracing(config.log_format);

    let state = match &config.database_url {
        Some(url) => match SqliteStore::connect(url).await {
            Ok(store) => AppState::new(store),
            Err(e) => {
                error!("failed to open listing store: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            info!("no database configured, listings are kept in memory only");
            AppState::new(MemoryStore::new())
        }
    };

    match Server::bind(LISTEN_ADDR).serve(app(state)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing init failed: {e}");
    }
}
