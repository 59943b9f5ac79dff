//! Server configuration.
//!
//! One explicit structure passed to every component at construction; no
//! ambient globals. Defaults match the historical constants of the demo
//! setup (loopback, HTTP 8080, WS 13258, 100 ms poll).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;

/// Default network interface (loopback only - this is a dev tool)
pub const DEFAULT_INTERFACE: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Default WebSocket port for the reload channel
pub const DEFAULT_WS_PORT: u16 = 13258;

/// Default filesystem poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration error (startup-fatal)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("root directory {0:?} does not exist")]
    RootMissing(PathBuf),

    #[error("root path {0:?} is not a directory")]
    RootNotADirectory(PathBuf),

    #[error("HTTP port and WebSocket port are both {0}")]
    PortClash(u16),
}

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Interface both listeners bind to
    pub interface: IpAddr,
    /// HTTP port
    pub port: u16,
    /// WebSocket port
    pub ws_port: u16,
    /// Delay between successive filesystem scans
    pub poll_interval: Duration,
    /// Directory served over HTTP and watched for changes (canonicalized)
    pub root: PathBuf,
}

impl ServeConfig {
    /// Build a config from CLI arguments, validating the root directory.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));

        if !root.exists() {
            return Err(ConfigError::RootMissing(root));
        }
        if !root.is_dir() {
            return Err(ConfigError::RootNotADirectory(root));
        }
        // Canonicalize once here so the traversal guard in the request path
        // compares against a stable prefix
        let root = root.canonicalize().map_err(|_| ConfigError::RootMissing(root))?;

        let port = cli.port.unwrap_or(DEFAULT_PORT);
        let ws_port = cli.ws_port.unwrap_or(DEFAULT_WS_PORT);
        if port == ws_port {
            return Err(ConfigError::PortClash(port));
        }

        Ok(Self {
            interface: cli.interface.unwrap_or(DEFAULT_INTERFACE),
            port,
            ws_port,
            poll_interval: cli
                .interval
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            root,
        })
    }

    /// Address of the HTTP listener.
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.interface, self.port)
    }

    /// Address of the WebSocket listener.
    pub fn ws_addr(&self) -> SocketAddr {
        SocketAddr::new(self.interface, self.ws_port)
    }
}
