//! hotserve - static file server with live reload.
//!
//! Serves a directory over HTTP, watches it for changes, and tells every
//! connected browser to refresh when anything under the tree is written.

mod actor;
mod cli;
mod config;
mod core;
mod logger;
mod scan;
mod serve;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};

use cli::Cli;
use config::ServeConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    logger::set_verbose(cli.verbose);
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = Arc::new(ServeConfig::from_cli(&cli)?);
    log!("serve"; "serving {}", config.root.display());

    // Bind failure (port in use, etc.) is fatal: error out of main with a
    // non-zero exit instead of running a partial server
    let bound = serve::bind_server(config)?;
    bound.run()?;

    log!("serve"; "stopped");
    Ok(())
}
