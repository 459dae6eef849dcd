//! Wizard-of-Oz prototyping backend.
//!
//! Serves the frequent-response and task-classification collections, the
//! session transcript log, and the phone-to-wizard frame relay.

mod config;
mod error;
mod extract;
mod routes;
mod state;

use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Load configuration
    let config = Config::from_env()?;

    // Log to stdout and, unless disabled, to a plain-text file
    let (file_writer, _log_guard) = match &config.log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_writer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
        }))
        .init();

    info!(addr = %config.addr, data_dir = %config.data_dir.display(), "Starting WOZ server");

    // Load collections
    let state = AppState::open(&config).await;

    // Build router
    let app = routes::app(state, &config.static_dir);

    // Start server
    info!(addr = %config.addr, "WOZ server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the log file for appending, creating it if needed.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| std::io::Error::new(err.kind(), format!("{}: {}", path.display(), err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("woz.log");
        std::fs::write(&path, "first\n").unwrap();

        {
            use std::io::Write;
            let mut file = open_log_file(&path).unwrap();
            file.write_all(b"second\n").unwrap();
        }

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_open_log_file_unwritable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("woz.log");

        let err = open_log_file(&path).unwrap_err();

        assert!(err.to_string().contains("woz.log"));
    }
}
