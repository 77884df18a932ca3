//! Echo Sessions
//!
//! The server side binds, accepts a single peer and writes back everything it
//! reads. The client side sends one message and collects the echo. Both run over
//! any [`SocketBackend`], so the same code drives either provider.

use std::net::SocketAddr;

use entities_net::{NetContext, NetError, Protocol};
use infrastructure_rtos::{usleep, Kernel};
use tracing::{debug, info};
use usecases_net_sockets::{NetworkAdapter, SocketBackend};

use crate::error::DemoError;

/// Poll period for non-blocking contexts
pub const POLL_INTERVAL_MS: u32 = 10;

/// Largest UDP payload; one datagram always fits in a receive buffer
pub const MAX_DATAGRAM: usize = 65_535;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeOptions {
    pub bind: Option<String>,
    pub port: String,
    pub protocol: Protocol,
    pub nonblocking: bool,
    pub idle_timeout_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: String,
    pub protocol: Protocol,
    pub message: Vec<u8>,
    pub timeout_ms: u32,
}

/// What a finished server session saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoSummary {
    pub peer: Option<SocketAddr>,
    pub bytes: u64,
}

/// Write all of `data`, sleeping through `WantWrite` on non-blocking contexts.
pub fn send_all<B: SocketBackend, K: Kernel>(
    adapter: &NetworkAdapter<B>,
    kernel: &K,
    ctx: &NetContext<B::Descriptor>,
    mut data: &[u8],
) -> Result<(), NetError> {
    while !data.is_empty() {
        match adapter.send(ctx, data) {
            Ok(n) => data = &data[n..],
            Err(err) if err.is_retryable() => usleep(kernel, u64::from(POLL_INTERVAL_MS) * 1000),
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Open the listening context for a server session.
pub fn listen<B: SocketBackend>(
    adapter: &NetworkAdapter<B>,
    opts: &ServeOptions,
) -> Result<NetContext<B::Descriptor>, DemoError> {
    let mut listener = adapter.init();
    adapter.bind(&mut listener, opts.bind.as_deref(), &opts.port, opts.protocol)?;
    info!(port = %opts.port, protocol = ?opts.protocol, "listening");
    Ok(listener)
}

/// Accept one peer on `listener` and echo until it goes away.
///
/// The listener is released before the echo starts. A UDP listener has
/// already handed its descriptor to the peer context by then.
pub fn serve_one<B: SocketBackend, K: Kernel>(
    adapter: &NetworkAdapter<B>,
    kernel: &K,
    mut listener: NetContext<B::Descriptor>,
    opts: &ServeOptions,
) -> Result<EchoSummary, DemoError> {
    let accepted = adapter.accept(&mut listener);
    adapter.free(&mut listener);
    let mut accepted = accepted?;
    info!(peer = ?accepted.peer, "peer accepted");

    let echoed = if opts.nonblocking {
        adapter
            .set_nonblock(&accepted.client)
            .and_then(|_| echo(adapter, kernel, &accepted.client, opts))
    } else {
        echo(adapter, kernel, &accepted.client, opts)
    };
    adapter.free(&mut accepted.client);

    let bytes = echoed?;
    info!(bytes, "session finished");
    Ok(EchoSummary {
        peer: accepted.peer,
        bytes,
    })
}

/// Bind, accept a single peer and echo its traffic.
pub fn serve<B: SocketBackend, K: Kernel>(
    adapter: &NetworkAdapter<B>,
    kernel: &K,
    opts: &ServeOptions,
) -> Result<EchoSummary, DemoError> {
    let listener = listen(adapter, opts)?;
    serve_one(adapter, kernel, listener, opts)
}

fn echo<B: SocketBackend, K: Kernel>(
    adapter: &NetworkAdapter<B>,
    kernel: &K,
    ctx: &NetContext<B::Descriptor>,
    opts: &ServeOptions,
) -> Result<u64, NetError> {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    let mut total = 0u64;
    let mut idle_ms = 0u32;

    loop {
        let received = if opts.nonblocking {
            adapter.recv(ctx, &mut buf)
        } else {
            adapter.recv_timeout(ctx, &mut buf, opts.idle_timeout_ms)
        };

        let n = match received {
            Ok(0) if opts.protocol == Protocol::Udp => {
                adapter.send(ctx, &[])?;
                idle_ms = 0;
                continue;
            }
            Ok(0) | Err(NetError::ConnectionReset) => {
                debug!("peer closed");
                break;
            }
            Ok(n) => n,
            Err(NetError::Timeout) => {
                debug!("peer idle");
                break;
            }
            Err(err) if err.is_retryable() => {
                if idle_ms >= opts.idle_timeout_ms {
                    debug!("peer idle");
                    break;
                }
                usleep(kernel, u64::from(POLL_INTERVAL_MS) * 1000);
                idle_ms = idle_ms.saturating_add(POLL_INTERVAL_MS);
                continue;
            }
            Err(err) => return Err(err),
        };

        idle_ms = 0;
        send_all(adapter, kernel, ctx, &buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}

/// Connect, send the message and read back as many bytes as were sent.
pub fn connect<B: SocketBackend, K: Kernel>(
    adapter: &NetworkAdapter<B>,
    kernel: &K,
    opts: &ConnectOptions,
) -> Result<Vec<u8>, DemoError> {
    let mut ctx = adapter.init();
    adapter.connect(&mut ctx, &opts.host, &opts.port, opts.protocol)?;
    debug!(host = %opts.host, port = %opts.port, "connected");

    let result = exchange(adapter, kernel, &ctx, opts);
    adapter.free(&mut ctx);
    result
}

fn exchange<B: SocketBackend, K: Kernel>(
    adapter: &NetworkAdapter<B>,
    kernel: &K,
    ctx: &NetContext<B::Descriptor>,
    opts: &ConnectOptions,
) -> Result<Vec<u8>, DemoError> {
    send_all(adapter, kernel, ctx, &opts.message)?;

    let expected = opts.message.len();
    let mut echoed = Vec::with_capacity(expected);
    let mut buf = vec![0u8; MAX_DATAGRAM];
    while echoed.len() < expected {
        // A datagram must be read whole; a stream read stops at the echo length.
        let want = match opts.protocol {
            Protocol::Udp => buf.len(),
            Protocol::Tcp => expected - echoed.len(),
        };
        let n = match adapter.recv_timeout(ctx, &mut buf[..want], opts.timeout_ms) {
            Ok(0) if opts.protocol == Protocol::Udp => continue,
            Ok(n) => n,
            Err(NetError::ConnectionReset) => 0,
            Err(err) => return Err(err.into()),
        };
        if n == 0 {
            return Err(DemoError::ShortEcho {
                received: echoed.len(),
                expected,
            });
        }
        echoed.extend_from_slice(&buf[..n]);
    }
    Ok(echoed)
}
