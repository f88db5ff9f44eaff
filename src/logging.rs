//! Logging setup
//!
//! The viewer owns the terminal while it runs, so interactive sessions log
//! to a file under the system temp directory. Dump mode logs to stderr.
//! Both honor `RUST_LOG` and default to `info`.

use std::{
    env, fs,
    io::{self, IsTerminal},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directory under the temp dir that holds log files
pub const LOG_DIR_NAME: &str = "memscope-logs";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to create log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Send all log output to `<tmp>/memscope-logs/<component>.log`, returning
/// the file path
pub fn init_file_logging(component: &str) -> Result<PathBuf, LoggingError> {
    let dir = env::temp_dir().join(LOG_DIR_NAME);
    let path = dir.join(format!("{}.log", component));

    let file = fs::create_dir_all(&dir)
        .and_then(|_| {
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
        })
        .map_err(|source| LoggingError::Io {
            path: path.clone(),
            source,
        })?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    tracing::info!(component, path = %path.display(), "file logging initialized");
    Ok(path)
}

/// Log compactly to stderr
pub fn init_stderr_logging() -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr)
                .compact(),
        )
        .try_init()?;
    Ok(())
}
