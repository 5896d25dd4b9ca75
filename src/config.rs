//! Server configuration.
//!
//! Values come from three layers, later ones winning:
//!
//! 1. built-in defaults (port 8000, sandbox root `root`, backlog 1),
//! 2. an optional YAML file named by `WARDEN_CONFIG`,
//! 3. individual environment variables (`LISTEN_PORT`, `SANDBOX_ROOT`, ...).

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::Semaphore;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_FILE_ENV: &str = "WARDEN_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TCP port bound on all IPv4 addresses
    pub listen_port: u16,
    /// Directory all served paths must resolve under
    pub sandbox_root: PathBuf,
    /// Pending-connection queue length handed to `listen(2)`
    pub accept_backlog: u32,
    /// Maximum number of connections handled at once
    pub max_connections: usize,
    /// Upper bound on the buffered request head, in bytes
    pub max_request_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: 8000,
            sandbox_root: PathBuf::from("root"),
            accept_backlog: 1,
            max_connections: 64,
            max_request_bytes: 64 * 1024,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` in place of the process environment.
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_FILE_ENV) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(v) = lookup("LISTEN_PORT") {
            cfg.listen_port = parse_var("LISTEN_PORT", &v)?;
        }
        if let Some(v) = lookup("SANDBOX_ROOT") {
            cfg.sandbox_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("ACCEPT_BACKLOG") {
            cfg.accept_backlog = parse_var("ACCEPT_BACKLOG", &v)?;
        }
        if let Some(v) = lookup("MAX_CONNECTIONS") {
            cfg.max_connections = parse_var("MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("MAX_REQUEST_BYTES") {
            cfg.max_request_bytes = parse_var("MAX_REQUEST_BYTES", &v)?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads a YAML config file. Keys that are absent keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            bail!("max_connections must be at least 1");
        }
        if self.max_connections > Semaphore::MAX_PERMITS {
            bail!(
                "max_connections must be at most {}",
                Semaphore::MAX_PERMITS
            );
        }
        if self.accept_backlog == 0 {
            bail!("accept_backlog must be at least 1");
        }
        // must at least hold the header terminator
        if self.max_request_bytes < 4 {
            bail!("max_request_bytes must be at least 4");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.listen_port))
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid value for {}: {:?}", key, value))
}
