//! Actor coordinator - wires up the reload system.
//!
//! Three long-running units:
//! - acceptor thread: hands incoming websocket connections to the ws actor
//! - ws actor: owns the client set, broadcasts reloads
//! - watch actor: polls the tree, requests reloads
//!
//! The coordinator creates the channel between them, runs both actors, and
//! relays the Ctrl+C signal into an orderly websocket shutdown.

mod messages;
mod watch;
mod ws;

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::config::ServeConfig;
use messages::WsMsg;
use watch::WatchActor;
use ws::WsActor;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<ServeConfig>,
    ws_listener: TcpListener,
    shutdown_rx: Receiver<()>,
}

impl Coordinator {
    pub fn new(
        config: Arc<ServeConfig>,
        ws_listener: TcpListener,
        shutdown_rx: Receiver<()>,
    ) -> Self {
        Self {
            config,
            ws_listener,
            shutdown_rx,
        }
    }

    /// Run the actor system until the shutdown signal arrives.
    pub async fn run(self) -> Result<()> {
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        ws::spawn_acceptor(self.ws_listener, ws_tx.clone())?;

        let ws_actor = WsActor::new(ws_rx);
        let watch_actor = WatchActor::new(
            self.config.root.clone(),
            self.config.poll_interval,
            ws_tx.clone(),
        );

        let ws_handle = tokio::spawn(ws_actor.run());
        tokio::spawn(watch_actor.run());

        // Wait for Ctrl+C relayed over the crossbeam channel
        loop {
            if self.shutdown_rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        // Close client connections before the process exits
        let _ = ws_tx.send(WsMsg::Shutdown).await;
        let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;

        Ok(())
    }
}
