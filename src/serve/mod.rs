//! Static file server with live reload support.

mod path;
mod response;

use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::actor::Coordinator;
use crate::config::ServeConfig;
use crate::{debug, log};

/// Bound listeners, ready to accept requests.
///
/// Both sockets are claimed before any loop starts so that a port already
/// in use is a startup failure, not a half-running server.
pub struct BoundServer {
    config: Arc<ServeConfig>,
    server: Arc<Server>,
    ws_listener: TcpListener,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP and WebSocket listeners without starting any loop.
pub fn bind_server(config: Arc<ServeConfig>) -> Result<BoundServer> {
    let http_addr = config.http_addr();
    let server = Server::http(http_addr)
        .map_err(|e| anyhow::anyhow!("failed to bind http listener on {}: {}", http_addr, e))?;
    let server = Arc::new(server);

    let ws_addr = config.ws_addr();
    let ws_listener = TcpListener::bind(ws_addr)
        .with_context(|| format!("failed to bind websocket listener on {ws_addr}"))?;

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", http_addr);
    debug!("ws"; "ws://{}", ws_addr);

    Ok(BoundServer {
        config,
        server,
        ws_listener,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the watch/reload actors and the request loop (blocking).
    ///
    /// Returns after Ctrl+C has unblocked the request loop and the actor
    /// system has wound down.
    pub fn run(self) -> Result<()> {
        let actor_handle = spawn_actors(
            Arc::clone(&self.config),
            self.ws_listener,
            self.shutdown_rx,
        );
        run_request_loop(&self.server, &self.config);
        wait_for_shutdown(actor_handle);
        Ok(())
    }
}

fn run_request_loop(server: &Server, config: &Arc<ServeConfig>) {
    // Small pool so a slow client (a model blob over a debugger proxy)
    // doesn't serialize every other request
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let config = Arc::clone(config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &ServeConfig) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    debug!("serve"; "{} {}", request.method(), request.url());

    match path::resolve_path(request.url(), &config.root) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request),
    }
}

/// Spawn the actor system (websocket + watch loop) on its own thread.
fn spawn_actors(
    config: Arc<ServeConfig>,
    ws_listener: TcpListener,
    shutdown_rx: channel::Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("failed to create tokio runtime");

        rt.block_on(async {
            let coordinator = Coordinator::new(config, ws_listener, shutdown_rx);
            if let Err(e) = coordinator.run().await {
                log!("actor"; "error: {}", e);
            }
        });
    })
}

/// Wait for the actor system to shut down gracefully (max 2 seconds).
fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(std::time::Duration::from_millis(50));
    }
}
