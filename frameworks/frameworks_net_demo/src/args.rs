//! Command-Line Argument Parsing Module
//!
//! Uses clap for type-safe argument parsing. Provider selection and resolver
//! tuning are global flags; the subcommand picks the role.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use entities_net::{NetConfig, Protocol};

use crate::app::{ConnectOptions, ServeOptions};

/// Socket provider behind the adapter
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// IoT-socket provider
    Iot,
    /// BSD-style provider with the asynchronous DNS client
    Bsd,
}

/// netshim command-line arguments
#[derive(Parser, Debug)]
#[command(name = "netshim")]
#[command(about = "Echo server and client over the network adapter")]
pub struct NetshimArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Socket provider
    #[arg(long, value_enum, default_value_t = BackendKind::Bsd, global = true)]
    pub backend: BackendKind,

    /// Do not fall back to IPv6 when IPv4 resolution fails
    #[arg(long, global = true)]
    pub no_ipv6: bool,

    /// Give up on a busy resolver after this many milliseconds
    #[arg(long, global = true)]
    pub resolve_timeout_ms: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Accept one peer and echo everything it sends
    Serve(ServeArgs),
    /// Send a message and print the echo
    Connect(ConnectArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long)]
    pub port: String,

    /// Local address to bind (default: any)
    #[arg(long)]
    pub bind: Option<String>,

    /// Use UDP instead of TCP
    #[arg(long)]
    pub udp: bool,

    /// Poll the peer in non-blocking mode
    #[arg(long)]
    pub nonblocking: bool,

    /// End the session after this long without data
    #[arg(long, default_value_t = 30_000)]
    pub idle_timeout_ms: u32,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ConnectArgs {
    /// Server host name or address
    #[arg(long)]
    pub host: String,

    /// Server port
    #[arg(long)]
    pub port: String,

    /// Message to send
    #[arg(long)]
    pub message: String,

    /// Use UDP instead of TCP
    #[arg(long)]
    pub udp: bool,

    /// Wait at most this long for each part of the echo
    #[arg(long, default_value_t = 5_000)]
    pub timeout_ms: u32,
}

fn protocol(udp: bool) -> Protocol {
    if udp {
        Protocol::Udp
    } else {
        Protocol::Tcp
    }
}

impl Command {
    pub fn protocol(&self) -> Protocol {
        match self {
            Command::Serve(serve) => protocol(serve.udp),
            Command::Connect(connect) => protocol(connect.udp),
        }
    }
}

impl From<&ServeArgs> for ServeOptions {
    fn from(args: &ServeArgs) -> Self {
        ServeOptions {
            bind: args.bind.clone(),
            port: args.port.clone(),
            protocol: protocol(args.udp),
            nonblocking: args.nonblocking,
            idle_timeout_ms: args.idle_timeout_ms,
        }
    }
}

impl From<&ConnectArgs> for ConnectOptions {
    fn from(args: &ConnectArgs) -> Self {
        ConnectOptions {
            host: args.host.clone(),
            port: args.port.clone(),
            protocol: protocol(args.udp),
            message: args.message.as_bytes().to_vec(),
            timeout_ms: args.timeout_ms,
        }
    }
}

impl NetshimArgs {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Connect(connect) if connect.message.is_empty() => {
                Err("--message must not be empty".to_string())
            }
            Command::Serve(serve) if serve.idle_timeout_ms == 0 => {
                Err("--idle-timeout-ms must be positive".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Adapter configuration for these arguments
    pub fn config(&self) -> NetConfig {
        NetConfig::default()
            .with_ipv6(!self.no_ipv6)
            .with_resolve_timeout(self.resolve_timeout_ms.map(Duration::from_millis))
    }
}
