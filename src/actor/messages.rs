//! Messages exchanged between actors.

use std::net::TcpStream;

/// Messages handled by the WebSocket actor
pub enum WsMsg {
    /// Raw TCP stream from the acceptor thread, pre-handshake
    AddClient(TcpStream),
    /// Tell every connected browser to reload
    Reload,
    /// Close all client connections and stop
    Shutdown,
}
