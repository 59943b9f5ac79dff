//! WebSocket actor - the reload channel.
//!
//! Owns the set of connected browsers and pushes the `"reload"` token to all
//! of them when the watch loop reports a change. An acceptor thread hands raw
//! TCP streams to the actor over a channel; the actor performs the handshake
//! and registers the client. A background reader thread drains client frames
//! (nothing a client sends is interpreted) and reaps closed connections.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::{debug, log};

/// The only message the browser side understands
pub const RELOAD_TOKEN: &str = "reload";

/// Accept loop poll interval while the listener has nothing pending
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Reader thread poll interval
const READER_POLL: Duration = Duration::from_millis(100);

/// A connected browser
struct RegisteredClient {
    ws: WebSocket<TcpStream>,
    peer: SocketAddr,
}

/// Set of live client connections, shared between the actor, the reader
/// thread, and (during broadcast) nobody else - the mutex serializes
/// membership changes against iteration.
#[derive(Clone)]
pub struct ClientRegistry {
    clients: Arc<Mutex<Vec<RegisteredClient>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of currently registered clients.
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// Perform the websocket handshake on a fresh stream and register it.
    ///
    /// No greeting is sent; the browser only ever hears `"reload"`.
    pub fn add(&self, stream: TcpStream) {
        let peer = match stream.peer_addr() {
            Ok(peer) => peer,
            Err(e) => {
                log!("ws"; "peer address unavailable: {}", e);
                return;
            }
        };

        // Keep blocking mode during the handshake, switch to non-blocking
        // after so the reader thread can poll without stalling
        match tungstenite::accept(stream) {
            Ok(ws) => {
                let _ = ws.get_ref().set_nonblocking(true);
                let mut clients = self.clients.lock();
                log!("ws"; "client connected: {} (total: {})", peer, clients.len() + 1);
                clients.push(RegisteredClient { ws, peer });
            }
            Err(e) => {
                log!("ws"; "handshake failed: {}", e);
            }
        }
    }

    /// Send `msg` to every registered client.
    ///
    /// A failed send drops only that client; delivery to the rest continues.
    /// Returns the number of clients that received the message.
    pub fn broadcast(&self, msg: &Message) -> usize {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            debug!("ws"; "no clients connected");
            return 0;
        }

        clients.retain_mut(|client| match client.ws.send(msg.clone()) {
            Ok(()) => true,
            Err(e) => {
                debug!("ws"; "client dropped: {}: {}", client.peer, e);
                false
            }
        });
        clients.len()
    }

    /// Close every connection and empty the set.
    pub fn close_all(&self) {
        let mut clients = self.clients.lock();
        for mut client in clients.drain(..) {
            let _ = client.ws.close(None);
        }
    }

    /// Reader thread: drain client frames and reap closed connections.
    ///
    /// Client messages carry no meaning on this protocol; they are read only
    /// so that close frames and dead sockets are noticed between broadcasts.
    fn reader_loop(self) {
        loop {
            std::thread::sleep(READER_POLL);
            if crate::core::is_shutdown() {
                break;
            }

            let mut clients = self.clients.lock();
            let mut disconnected = Vec::new();

            for (i, client) in clients.iter_mut().enumerate() {
                match client.ws.read() {
                    Ok(Message::Close(_)) => disconnected.push(i),
                    Ok(_) => {}
                    Err(tungstenite::Error::Io(ref e))
                        if e.kind() == std::io::ErrorKind::WouldBlock => {}
                    Err(_) => disconnected.push(i),
                }
            }

            for i in disconnected.into_iter().rev() {
                debug!("ws"; "client disconnected: {}", clients[i].peer);
                clients.remove(i);
            }
        }
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// WebSocket actor - handles registration, broadcast and shutdown requests.
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    registry: ClientRegistry,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            registry: ClientRegistry::new(),
        }
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        let reader = self.registry.clone();
        std::thread::spawn(move || reader.reader_loop());

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::AddClient(stream) => self.registry.add(stream),

                WsMsg::Reload => {
                    let delivered = self.registry.broadcast(&Message::text(RELOAD_TOKEN));
                    debug!("ws"; "reload delivered to {} clients", delivered);
                }

                WsMsg::Shutdown => {
                    debug!("ws"; "shutting down");
                    self.registry.close_all();
                    break;
                }
            }
        }
    }
}

/// Spawn the acceptor thread feeding accepted streams to the actor.
///
/// The listener must already be bound; binding happens at startup so a port
/// in use is fatal before any loop starts.
pub fn spawn_acceptor(listener: TcpListener, ws_tx: mpsc::Sender<WsMsg>) -> Result<()> {
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            if crate::core::is_shutdown() {
                break;
            }
            match listener.accept() {
                Ok((stream, addr)) => {
                    debug!("ws"; "incoming connection: {}", addr);

                    // Blocking mode for the handshake in the actor
                    let _ = stream.set_nonblocking(false);

                    if ws_tx.blocking_send(WsMsg::AddClient(stream)).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    log!("ws"; "accept error: {}", e);
                    std::thread::sleep(ACCEPT_POLL);
                }
            }
        }
    });

    Ok(())
}
