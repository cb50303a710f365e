// Connection handling module
// Serves a single accepted TCP connection on its own task

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppState;
use crate::handler::{self, RequestContext};
use crate::logger;

/// Time allowed for a client to send complete request headers
const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Serve a connection in a spawned task.
///
/// The accept loop never waits on this task, so a slow upstream fetch only
/// holds its own connection. When the client goes away hyper drops the
/// in-flight response body, which drops the upstream stream with it.
pub fn spawn_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
) {
    if let Err(e) = stream.set_nodelay(true) {
        logger::log_warning(&format!("Failed to set TCP_NODELAY for {peer_addr}: {e}"));
    }

    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(true)
            .timer(TokioTimer::new())
            .header_read_timeout(HEADER_READ_TIMEOUT);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req: Request<Incoming>| {
                let ctx = RequestContext::from_request(&req, peer_addr);
                handler::handle_request(ctx, Arc::clone(&state))
            }),
        );

        if let Err(err) = conn.await {
            // Client hang-ups and aborted relays surface here
            if !err.is_incomplete_message() {
                logger::log_connection_error(&err);
            }
        }
    });
}
