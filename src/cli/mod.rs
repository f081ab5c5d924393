//! CLI module for the NMS Sentinel console
//!
//! Provides subcommands for working against the backend:
//! - `console`: interactive operator console (default)
//! - `health`: one-shot health check
//! - `keys`: log in and list API keys
//! - `proxy`: log in and run the proxy test

pub mod console;
pub mod oneshot;

use clap::{Parser, Subcommand};

/// NMS Sentinel Console - operator console for the NMSSentinel backend
#[derive(Parser)]
#[command(name = "nms-console")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides configuration)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interactive console (default)
    Console,

    /// Check backend health
    Health,

    /// Log in and list API keys
    Keys(oneshot::AuthArgs),

    /// Log in and run the NMS proxy test
    Proxy(oneshot::AuthArgs),
}
