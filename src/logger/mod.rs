//! Logger module
//!
//! Provides logging utilities for the proxy server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Upstream failure, error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{Config, PortSource};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info(&format!("Serving on http://{addr}"));
    write_info(&format!(
        "Proxy endpoint: {}?url=<target>",
        config.proxy.path
    ));
    write_info(&format!("Static root: {}", config.static_files.root));
    write_info(&format!(
        "Upstream timeout: {}s",
        config.proxy.timeout_secs
    ));
    if !config.proxy.allowed_hosts.is_empty() {
        write_info(&format!(
            "Allowed hosts: {}",
            config.proxy.allowed_hosts.join(", ")
        ));
    }
    if let Some(workers) = config.server.worker_threads() {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_port_source(source: &PortSource) {
    match source {
        PortSource::Configured(_) => {}
        PortSource::Environment(port) => {
            write_info(&format!("[CONFIG] Using port {port} from PORT"));
        }
        PortSource::Invalid { raw, fallback } => log_warning(&format!(
            "PORT value '{raw}' is not a valid port, using {fallback}"
        )),
    }
}

pub fn log_shutdown() {
    write_info("\nShutting down.");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log a Drive/Docs link rewrite
pub fn log_rewrite(original: &str, rewritten: &str) {
    write_info(&format!("[PROXY] Rewrote {original} -> {rewritten}"));
}

pub fn log_upstream_failure(target: &str, cause: &str) {
    write_error(&format!("[UPSTREAM] {target}: {cause}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
