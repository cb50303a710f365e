// Configuration module entry point
// Loads file/environment configuration and holds per-process runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, ProxyConfig, StaticConfig};

/// Environment variable that selects the listening port
pub const PORT_ENV: &str = "PORT";

/// Outcome of applying the `PORT` environment variable
#[derive(Debug, PartialEq, Eq)]
pub enum PortSource {
    /// `PORT` unset, configured port kept
    Configured(u16),
    /// `PORT` parsed and used
    Environment(u16),
    /// `PORT` set but not a valid port number; configured port kept
    Invalid { raw: String, fallback: u16 },
}

impl PortSource {
    pub const fn port(&self) -> u16 {
        match self {
            Self::Configured(port) | Self::Environment(port) => *port,
            Self::Invalid { fallback, .. } => *fallback,
        }
    }
}

/// Resolve the listening port from an optional raw `PORT` value
pub fn resolve_port(raw: Option<&str>, configured: u16) -> PortSource {
    match raw {
        None => PortSource::Configured(configured),
        Some(value) => value.trim().parse::<u16>().map_or_else(
            |_| PortSource::Invalid {
                raw: value.to_string(),
                fallback: configured,
            },
            PortSource::Environment,
        ),
    }
}

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("DRIVEPROXY")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("proxy.allowed_hosts")
                    .with_list_parse_key("static.index_files")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("proxy.path", "/proxy")?
            .set_default("proxy.timeout_secs", 20)?
            .set_default("proxy.user_agent", "Mozilla/5.0")?
            .set_default("proxy.allowed_hosts", Vec::<String>::new())?
            .set_default("static.root", ".")?
            .set_default("static.index_files", vec!["index.html", "index.htm"])?
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration and apply the `PORT` environment override
    pub fn load(config_path: &str) -> Result<(Self, PortSource), config::ConfigError> {
        let mut cfg = Self::load_from(config_path)?;
        let raw_port = std::env::var(PORT_ENV).ok();
        let source = resolve_port(raw_port.as_deref(), cfg.server.port);
        cfg.server.port = source.port();
        Ok((cfg, source))
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_unset_keeps_configured() {
        assert_eq!(resolve_port(None, 8080), PortSource::Configured(8080));
    }

    #[test]
    fn test_port_from_environment() {
        let source = resolve_port(Some(" 9090 "), 8080);
        assert_eq!(source, PortSource::Environment(9090));
        assert_eq!(source.port(), 9090);
    }

    #[test]
    fn test_unparseable_port_falls_back() {
        for raw in ["abc", "", "70000", "-1"] {
            let source = resolve_port(Some(raw), 8080);
            assert_eq!(source.port(), 8080, "raw value {raw:?}");
            assert!(matches!(source, PortSource::Invalid { .. }));
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist-driveproxy").unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.proxy.path, "/proxy");
        assert_eq!(cfg.proxy.timeout_secs, 20);
        assert_eq!(cfg.proxy.user_agent, "Mozilla/5.0");
        assert!(cfg.proxy.allowed_hosts.is_empty());
        assert_eq!(cfg.static_files.root, ".");
        assert_eq!(cfg.static_files.index_files, vec!["index.html", "index.htm"]);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("does-not-exist-driveproxy").unwrap();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 3000;
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }
}
