//! Server configuration.
//!
//! Loaded from a JSON file (path given as the first CLI argument, default
//! `subburn.json`). Every field has a serde default so a partial or missing
//! file degrades gracefully instead of failing startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory for per-request temp files (subtitle track, output video)
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Explicit ffmpeg binary path; `None` falls back to PATH discovery
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Wall-clock limit for one engine invocation, in seconds
    #[serde(default = "default_engine_timeout_secs")]
    pub engine_timeout_secs: u64,

    /// Chunk size for streaming the rendered video back to the caller
    #[serde(default = "default_stream_chunk_bytes")]
    pub stream_chunk_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_engine_timeout_secs() -> u64 {
    900
}

fn default_stream_chunk_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            temp_dir: default_temp_dir(),
            ffmpeg_path: None,
            engine_timeout_secs: default_engine_timeout_secs(),
            stream_chunk_bytes: default_stream_chunk_bytes(),
        }
    }
}

impl ServerConfig {
    /// Reads the config file, falling back to defaults when it is absent or
    /// unparseable. A broken config is worth a warning, not a dead server.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
