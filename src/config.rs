//! Runtime configuration and logging setup.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use reqwest::Url;
use tracing_subscriber::EnvFilter;

use crate::gateway::{ConversionGateway, ReqwestTransport, with_trailing_slash};
use crate::storage::FileStorage;

pub const SERVER_ENV: &str = "CONVERT_DESK_SERVER";
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

/// Log file written while the TUI owns the terminal
pub const LOG_FILE_NAME: &str = "convert-desk.log";

/// Resolved client settings shared by the CLI and the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: Url,
    pub data_dir: PathBuf,
}

impl ClientConfig {
    pub fn new(server: &str, data_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self { server_url: parse_server_url(server)?, data_dir: data_dir.into() })
    }

    pub fn open_storage(&self) -> Result<FileStorage> {
        FileStorage::open(&self.data_dir)
    }

    pub fn gateway(&self) -> Result<ConversionGateway<ReqwestTransport>> {
        let transport = ReqwestTransport::new(self.server_url.clone())?;
        Ok(ConversionGateway::new(transport))
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

fn parse_server_url(server: &str) -> Result<Url> {
    let url = Url::parse(server.trim())
        .with_context(|| format!("Invalid server URL: {}", server))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Server URL must use http or https: {}", server);
    }
    Ok(with_trailing_slash(url))
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to the log file in the data directory
    File,
}

/// Install the global subscriber. `RUST_LOG` wins over the default level,
/// which is `warn`, or `debug` with `verbose`.
pub fn init_logging(verbose: bool, target: LogTarget, data_dir: &Path) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init()
        }
        LogTarget::File => {
            std::fs::create_dir_all(data_dir).with_context(|| {
                format!("Failed to create data directory: {}", data_dir.display())
            })?;
            let path = data_dir.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    // A subscriber installed earlier (tests, embedding) keeps precedence
    if let Err(e) = result {
        tracing::debug!(error = %e, "logging already initialized");
    }
    Ok(())
}
