use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod proxy;
mod server;

/// Default configuration file (extension optional)
const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let (cfg, port_source) = config::Config::load(&config_path)?;

    logger::init(&cfg)?;
    logger::log_port_source(&port_source);

    // Create Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.worker_threads() {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Bind failure ends the process before anything is served
    let listener = server::create_listener(addr).map_err(|e| {
        logger::log_error(&format!("Failed to bind {addr}: {e}"));
        e
    })?;

    let state = Arc::new(config::AppState::new(&cfg)?);
    logger::log_server_start(&addr, &cfg);

    server::start_server_loop(listener, state, server::signal::shutdown_signal()).await;
    Ok(())
}
