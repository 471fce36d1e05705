use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Client synchronization configuration (used by display clients)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Base URL of the ticket store, e.g. `http://10.0.0.5:8080`.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Directory holding the local ticket snapshot.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    /// Writes that may wait for the forwarder before new ones are dropped.
    #[serde(default = "default_forward_buffer")]
    pub forward_buffer: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            snapshot_dir: default_snapshot_dir(),
            forward_buffer: default_forward_buffer(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("./.queueline")
}

fn default_forward_buffer() -> usize {
    256
}

/// Public display board configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoardConfig {
    /// Most recent serving tickets shown.
    #[serde(default = "default_serving_limit")]
    pub serving_limit: usize,
    /// Oldest waiting tickets shown.
    #[serde(default = "default_waiting_limit")]
    pub waiting_limit: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            serving_limit: default_serving_limit(),
            waiting_limit: default_waiting_limit(),
        }
    }
}

fn default_serving_limit() -> usize {
    4
}

fn default_waiting_limit() -> usize {
    8
}

/// Sanitized config for API responses (credentials in URLs redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub sync: SanitizedSyncConfig,
    pub board: BoardConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSyncConfig {
    pub server_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            sync: SanitizedSyncConfig {
                server_url: redact_userinfo(&config.sync.server_url),
                poll_interval_ms: config.sync.poll_interval_ms,
                request_timeout_ms: config.sync.request_timeout_ms,
            },
            board: config.board.clone(),
        }
    }
}

/// Replace `user:pass@` in a URL with `***@`.
fn redact_userinfo(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}://***{}", scheme, &rest[at..]),
        None => url.to_string(),
    }
}
