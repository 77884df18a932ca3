//! Frameworks Layer: netshim
//!
//! Command-line echo server and client over the network adapter, wired to the
//! host implementation of either socket provider.
//!
//! ## Overview
//!
//! - **[`args`](args/index.html)**: clap argument parsing
//! - **[`app`](app/index.html)**: echo server and client sessions
//! - **[`error`](error/index.html)**: session errors
//!
//! The session runs on an application thread started through the [`Kernel`],
//! the way firmware starts its main task with a fixed stack.

pub mod app;
pub mod args;
pub mod error;

use std::sync::mpsc;

use adapters_bsd_socket::BsdSocketBackend;
use adapters_iot_socket::IotSocketBackend;
use frameworks_host_stack::{HostBsdSockets, HostDnsClient, HostIotSockets};
use infrastructure_rtos::{Kernel, StdKernel, ThreadSpec};
use usecases_net_sockets::{NetworkAdapter, SocketBackend};

pub use app::{ConnectOptions, EchoSummary, ServeOptions};
pub use args::{BackendKind, Command, ConnectArgs, NetshimArgs, ServeArgs};
pub use error::DemoError;

/// Stack size of the application thread
pub const APP_STACK_SIZE: usize = 256 * 1024;

/// Result of a completed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Served(EchoSummary),
    Echoed(Vec<u8>),
}

/// Run `command` over an already built adapter.
pub fn execute<B: SocketBackend, K: Kernel>(
    adapter: &NetworkAdapter<B>,
    kernel: &K,
    command: &Command,
) -> Result<Outcome, DemoError> {
    match command {
        Command::Serve(serve) => {
            app::serve(adapter, kernel, &ServeOptions::from(serve)).map(Outcome::Served)
        }
        Command::Connect(connect) => {
            app::connect(adapter, kernel, &ConnectOptions::from(connect)).map(Outcome::Echoed)
        }
    }
}

/// Build the adapter selected by `args` and run its command.
pub fn run(args: &NetshimArgs) -> Result<Outcome, DemoError> {
    let config = args.config();
    match args.backend {
        BackendKind::Iot => {
            let adapter = NetworkAdapter::new(IotSocketBackend::new(HostIotSockets::new()), config);
            execute(&adapter, &StdKernel, &args.command)
        }
        BackendKind::Bsd => {
            let backend = BsdSocketBackend::new(
                HostBsdSockets::new(),
                HostDnsClient::new(),
                StdKernel,
                &config,
            );
            let adapter = NetworkAdapter::new(backend, config);
            execute(&adapter, &StdKernel, &args.command)
        }
    }
}

/// Run `args` on a kernel-spawned application thread and wait for it.
pub fn run_on_app_thread<K: Kernel>(kernel: &K, args: NetshimArgs) -> Result<Outcome, DemoError> {
    let (tx, rx) = mpsc::channel();
    let handle = kernel.spawn(
        ThreadSpec::new("app_main", APP_STACK_SIZE),
        Box::new(move || {
            let _ = tx.send(run(&args));
        }),
    )?;
    handle.join().map_err(|_| DemoError::Panicked)?;
    rx.recv().map_err(|_| DemoError::Panicked)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use entities_net::{NetError, Protocol};

    #[test]
    fn test_serve_options_from_command() {
        let args = NetshimArgs::try_parse_from([
            "netshim", "serve", "--port", "7", "--bind", "127.0.0.1", "--udp", "--nonblocking",
        ])
        .unwrap();
        let Command::Serve(serve) = &args.command else {
            panic!("expected serve");
        };
        let opts = ServeOptions::from(serve);
        assert_eq!(opts.bind.as_deref(), Some("127.0.0.1"));
        assert_eq!(opts.protocol, Protocol::Udp);
        assert!(opts.nonblocking);
    }

    #[test]
    fn test_app_thread_reports_session_error() {
        let args = NetshimArgs::try_parse_from([
            "netshim", "--backend", "iot", "connect", "--host", "127.0.0.1", "--port", "0",
            "--message", "hi",
        ])
        .unwrap();
        match run_on_app_thread(&StdKernel, args) {
            Err(DemoError::Net(err)) => assert_eq!(err, NetError::UnknownHost),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
