// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub proxy: ProxyConfig,
    #[serde(rename = "static")]
    pub static_files: StaticConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

impl ServerConfig {
    /// Worker thread count for the runtime; `0` means use the runtime default
    pub fn worker_threads(&self) -> Option<usize> {
        self.workers.filter(|&n| n > 0)
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            access_log: true,
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Forwarding proxy configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    /// Endpoint path handled by the forwarder
    pub path: String,
    /// Upper bound for connect + response headers, in seconds
    pub timeout_secs: u64,
    /// `User-Agent` sent upstream
    pub user_agent: String,
    /// Hosts the forwarder may fetch from; empty allows any host
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
}

impl ProxyConfig {
    /// Check a target host against the allow list (case-insensitive)
    pub fn is_host_allowed(&self, host: &str) -> bool {
        self.allowed_hosts.is_empty()
            || self
                .allowed_hosts
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(host))
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            path: "/proxy".to_string(),
            timeout_secs: 20,
            user_agent: "Mozilla/5.0".to_string(),
            allowed_hosts: Vec::new(),
        }
    }
}

/// Static file fallback configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticConfig {
    /// Directory served for every non-proxy path
    pub root: String,
    pub index_files: Vec<String>,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
        }
    }
}
