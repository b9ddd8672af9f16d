//! Persistent configuration for minechat-tui.
//!
//! Config file lives at `~/.config/minechat/tui.toml`; the credentials
//! file written by minechat-register defaults to the same directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use minechat_sdk::config::{DEFAULT_READ_PORT, DEFAULT_WRITE_PORT};

/// User configuration (persisted in tui.toml).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat server host.
    pub host: Option<String>,
    /// Room feed port. Default: 5000
    pub read_port: Option<u16>,
    /// Auth/messaging port. Default: 5050
    pub write_port: Option<u16>,
    /// Credentials file path.
    pub credentials: Option<PathBuf>,
    /// Chat history file path.
    pub history: Option<PathBuf>,
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("minechat")
}

fn config_path() -> PathBuf {
    config_dir().join("tui.toml")
}

/// Default location of the credentials file minechat-register writes.
pub fn default_credentials_path() -> PathBuf {
    config_dir().join("credentials.json")
}

fn default_history_path() -> PathBuf {
    config_dir().join("history.txt")
}

impl Config {
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(s) => match toml::from_str(&s) {
                    Ok(c) => return c,
                    Err(e) => eprintln!("Warning: bad config file {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: can't read {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    pub fn save(&self) {
        let path = config_path();
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        match toml::to_string_pretty(self) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    eprintln!("Warning: can't save config: {e}");
                }
            }
            Err(e) => eprintln!("Warning: can't serialize config: {e}"),
        }
    }
}

/// Effective settings after merging CLI args > config file > defaults.
pub struct Resolved {
    pub host: String,
    pub read_port: u16,
    pub write_port: u16,
    pub credentials: PathBuf,
    pub history: PathBuf,
}

impl Resolved {
    pub fn merge(cli: &super::Cli, config: &Config) -> anyhow::Result<Self> {
        let host = cli
            .host
            .clone()
            .or_else(|| config.host.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("no chat host configured; pass --host or set MINECHAT_HOST")
            })?;

        let read_port = cli
            .read_port
            .or(config.read_port)
            .unwrap_or(DEFAULT_READ_PORT);
        let write_port = cli
            .write_port
            .or(config.write_port)
            .unwrap_or(DEFAULT_WRITE_PORT);

        let credentials = cli
            .credentials
            .clone()
            .or_else(|| config.credentials.clone())
            .unwrap_or_else(default_credentials_path);
        let history = cli
            .history
            .clone()
            .or_else(|| config.history.clone())
            .unwrap_or_else(default_history_path);

        Ok(Self {
            host,
            read_port,
            write_port,
            credentials,
            history,
        })
    }
}
