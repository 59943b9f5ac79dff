//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::net::IpAddr;
use std::path::PathBuf;

/// hotserve - static file server with live reload
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory to serve and watch (default: current directory)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// HTTP port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// WebSocket port for the reload channel
    #[arg(short = 'w', long)]
    pub ws_port: Option<u16>,

    /// Filesystem poll interval in milliseconds
    #[arg(short = 'n', long)]
    pub interval: Option<u64>,

    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Show debug diagnostics (scans, broadcasts, client churn)
    #[arg(short, long)]
    pub verbose: bool,
}
