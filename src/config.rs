//! Runtime configuration for ollama-relay.
//!
//! Configuration can be loaded from a JSON file or constructed programmatically.
//! The defaults reproduce the fixed deployment: listen on port 8081, serve
//! `./static`, and talk to the daemon at `http://localhost:11434`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "ollama-relay", about = "Chat UI relay for a local Ollama daemon")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address, overrides the configuration file.
    #[arg(long)]
    pub listen: Option<String>,

    /// Base URL of the upstream daemon, overrides the configuration file.
    #[arg(long)]
    pub upstream: Option<String>,

    /// Directory of static UI assets, overrides the configuration file.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP front configuration.
    pub server: ServerConfig,

    /// Upstream daemon configuration.
    pub upstream: UpstreamConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g. "0.0.0.0:8081").
    pub listen: String,

    /// Directory served at `/`.
    pub static_dir: PathBuf,

    /// Frames that may sit between the relay and the client socket.
    pub stream_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8081".to_string(),
            static_dir: PathBuf::from("./static"),
            stream_buffer: 1,
        }
    }
}

/// Upstream daemon settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the inference daemon, without a trailing path.
    pub base_url: String,

    /// Longest upstream record accepted, excluding the newline.
    pub max_line_bytes: usize,

    /// Bound on establishing the TCP connection. `None` waits as long as the OS does.
    pub connect_timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            max_line_bytes: 64 * 1024,
            connect_timeout_secs: None,
        }
    }
}

impl UpstreamConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(listen) = &cli.listen {
            self.server.listen = listen.clone();
        }
        if let Some(upstream) = &cli.upstream {
            self.upstream.base_url = upstream.clone();
        }
        if let Some(dir) = &cli.static_dir {
            self.server.static_dir = dir.clone();
        }
    }
}
