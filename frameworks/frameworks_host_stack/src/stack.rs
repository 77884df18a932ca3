//! Host Stack Module
//!
//! A table of integer descriptors over `socket2` sockets, shared by the IoT
//! and BSD host providers. Table lookups hand out an `Arc` to the socket and
//! release the lock before any call that can block, so one descriptor waiting
//! in `recv` or `accept` never stalls another.
//!
//! Receive timeouts use the OS read timeout. The OS reports an expired timeout
//! the same way it reports an empty non-blocking queue, so each entry tracks
//! its own blocking mode to tell the two apart.

use std::collections::HashMap;
use std::io;
use std::mem::MaybeUninit;
use std::net::{IpAddr, Shutdown, SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use entities_net::{AddressFamily, Protocol};
use parking_lot::Mutex;
use socket2::{Domain, Protocol as Socket2Protocol, SockAddr, Socket, Type};
use tracing::{debug, trace};

/// Failure of a host socket call, before translation into provider codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFault {
    /// Unknown descriptor
    InvalidSocket,
    InvalidArgument,
    /// Nothing to do yet on a non-blocking socket
    WouldBlock,
    /// Receive timeout expired on a blocking socket
    TimedOut,
    /// Peer reset, aborted or never connected
    Closed,
    Refused,
    AddrInUse,
    NotSupported,
    Other,
}

impl HostFault {
    fn from_io(err: &io::Error, nonblocking: bool) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                if nonblocking {
                    HostFault::WouldBlock
                } else {
                    HostFault::TimedOut
                }
            }
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected => HostFault::Closed,
            io::ErrorKind::ConnectionRefused => HostFault::Refused,
            io::ErrorKind::AddrInUse => HostFault::AddrInUse,
            io::ErrorKind::InvalidInput => HostFault::InvalidArgument,
            io::ErrorKind::Unsupported => HostFault::NotSupported,
            _ => HostFault::Other,
        }
    }
}

struct HostSocket {
    inner: Socket,
    nonblocking: AtomicBool,
}

impl HostSocket {
    fn new(inner: Socket) -> Self {
        Self {
            inner,
            nonblocking: AtomicBool::new(false),
        }
    }

    fn fault(&self, err: io::Error) -> HostFault {
        let fault = HostFault::from_io(&err, self.nonblocking.load(Ordering::Relaxed));
        trace!(%err, ?fault, "host socket call failed");
        fault
    }
}

fn as_uninit(buf: &mut [u8]) -> &mut [MaybeUninit<u8>] {
    // SAFETY: MaybeUninit<u8> has the layout of u8, and the kernel only ever
    // writes initialised bytes into the slice.
    unsafe { std::slice::from_raw_parts_mut(buf.as_mut_ptr() as *mut MaybeUninit<u8>, buf.len()) }
}

/// Descriptor table over host sockets
pub struct HostStack {
    sockets: Mutex<HashMap<i32, Arc<HostSocket>>>,
    next_fd: AtomicI32,
}

impl Default for HostStack {
    fn default() -> Self {
        Self::new()
    }
}

impl HostStack {
    pub fn new() -> Self {
        Self {
            sockets: Mutex::new(HashMap::new()),
            next_fd: AtomicI32::new(1),
        }
    }

    fn get(&self, fd: i32) -> Result<Arc<HostSocket>, HostFault> {
        self.sockets
            .lock()
            .get(&fd)
            .cloned()
            .ok_or(HostFault::InvalidSocket)
    }

    fn register(&self, socket: Socket) -> i32 {
        let fd = self.next_fd.fetch_add(1, Ordering::Relaxed);
        self.sockets.lock().insert(fd, Arc::new(HostSocket::new(socket)));
        fd
    }

    /// Number of open descriptors.
    pub fn open_count(&self) -> usize {
        self.sockets.lock().len()
    }

    pub fn open(&self, family: AddressFamily, protocol: Protocol) -> Result<i32, HostFault> {
        let domain = match family {
            AddressFamily::Ipv4 => Domain::IPV4,
            AddressFamily::Ipv6 => Domain::IPV6,
        };
        let (ty, proto) = match protocol {
            Protocol::Tcp => (Type::STREAM, Socket2Protocol::TCP),
            Protocol::Udp => (Type::DGRAM, Socket2Protocol::UDP),
        };

        let socket =
            Socket::new(domain, ty, Some(proto)).map_err(|e| HostFault::from_io(&e, false))?;
        let fd = self.register(socket);
        debug!(fd, ?family, ?protocol, "host socket opened");
        Ok(fd)
    }

    pub fn bind(&self, fd: i32, addr: SocketAddr) -> Result<(), HostFault> {
        let socket = self.get(fd)?;
        socket
            .inner
            .set_reuse_address(true)
            .map_err(|e| socket.fault(e))?;
        socket
            .inner
            .bind(&SockAddr::from(addr))
            .map_err(|e| socket.fault(e))
    }

    pub fn listen(&self, fd: i32, backlog: i32) -> Result<(), HostFault> {
        let socket = self.get(fd)?;
        socket.inner.listen(backlog).map_err(|e| socket.fault(e))
    }

    /// Accept a stream connection; the new descriptor starts in blocking mode.
    pub fn accept(&self, fd: i32) -> Result<(i32, Option<SocketAddr>), HostFault> {
        let socket = self.get(fd)?;
        let (client, addr) = socket.inner.accept().map_err(|e| socket.fault(e))?;
        let client_fd = self.register(client);
        Ok((client_fd, addr.as_socket()))
    }

    pub fn connect(&self, fd: i32, addr: SocketAddr) -> Result<(), HostFault> {
        let socket = self.get(fd)?;
        socket
            .inner
            .connect(&SockAddr::from(addr))
            .map_err(|e| socket.fault(e))
    }

    pub fn recv(&self, fd: i32, buf: &mut [u8]) -> Result<usize, HostFault> {
        let socket = self.get(fd)?;
        socket.inner.recv(as_uninit(buf)).map_err(|e| socket.fault(e))
    }

    /// Receive with the sender address, optionally leaving the data queued.
    pub fn recv_from(
        &self,
        fd: i32,
        buf: &mut [u8],
        peek: bool,
    ) -> Result<(usize, Option<SocketAddr>), HostFault> {
        let socket = self.get(fd)?;
        let result = if peek {
            socket.inner.peek_from(as_uninit(buf))
        } else {
            socket.inner.recv_from(as_uninit(buf))
        };
        let (n, addr) = result.map_err(|e| socket.fault(e))?;
        Ok((n, addr.as_socket()))
    }

    pub fn send(&self, fd: i32, buf: &[u8]) -> Result<usize, HostFault> {
        let socket = self.get(fd)?;
        socket.inner.send(buf).map_err(|e| socket.fault(e))
    }

    pub fn set_nonblocking(&self, fd: i32, nonblocking: bool) -> Result<(), HostFault> {
        let socket = self.get(fd)?;
        socket
            .inner
            .set_nonblocking(nonblocking)
            .map_err(|e| socket.fault(e))?;
        socket.nonblocking.store(nonblocking, Ordering::Relaxed);
        Ok(())
    }

    /// Set the receive timeout. Zero selects the shortest wait the OS accepts.
    pub fn set_recv_timeout(&self, fd: i32, timeout_ms: u32) -> Result<(), HostFault> {
        let socket = self.get(fd)?;
        let timeout = Duration::from_millis(u64::from(timeout_ms.max(1)));
        socket
            .inner
            .set_read_timeout(Some(timeout))
            .map_err(|e| socket.fault(e))
    }

    /// Remove the descriptor and shut the connection down.
    pub fn close(&self, fd: i32) -> Result<(), HostFault> {
        let socket = self
            .sockets
            .lock()
            .remove(&fd)
            .ok_or(HostFault::InvalidSocket)?;
        // Not-connected sockets refuse shutdown; the descriptor is released either way.
        let _ = socket.inner.shutdown(Shutdown::Both);
        debug!(fd, "host socket closed");
        Ok(())
    }
}

/// Resolve `host` through the OS resolver, keeping the first address of `family`.
pub fn resolve_host(host: &str, family: AddressFamily) -> Option<IpAddr> {
    let addrs = match (host, 0u16).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(err) => {
            trace!(host, %err, "OS resolver failed");
            return None;
        }
    };
    addrs
        .map(|addr| addr.ip())
        .find(|ip| AddressFamily::of(ip) == family)
}
