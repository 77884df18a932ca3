//! Host BSD Socket Provider
//!
//! [`BsdSocketApi`] over the [`HostStack`]. The "network stack" must be
//! initialised before sockets can be created, mirroring the embedded stack the
//! backend brings up lazily.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use adapters_bsd_socket::api;
use adapters_bsd_socket::BsdSocketApi;
use entities_net::{AddressFamily, Protocol};
use tracing::debug;

use crate::stack::{HostFault, HostStack};

fn native_code(fault: HostFault) -> i32 {
    match fault {
        HostFault::InvalidSocket => api::ERROR_SOCKET,
        HostFault::InvalidArgument => api::ERROR_PARAMETER,
        HostFault::WouldBlock => api::ERROR_WOULDBLOCK,
        HostFault::TimedOut => api::ERROR_TIMEOUT,
        HostFault::Closed => api::ERROR_CLOSED,
        HostFault::Refused | HostFault::AddrInUse | HostFault::NotSupported | HostFault::Other => {
            api::ERROR
        }
    }
}

fn status(result: Result<(), HostFault>) -> i32 {
    result.map_or_else(native_code, |_| api::SUCCESS)
}

fn count(result: Result<usize, HostFault>) -> i32 {
    result.map_or_else(native_code, |n| i32::try_from(n).unwrap_or(i32::MAX))
}

/// BSD-style provider backed by host sockets
#[derive(Clone, Default)]
pub struct HostBsdSockets {
    stack: Arc<HostStack>,
    running: Arc<AtomicBool>,
}

impl HostBsdSockets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stack(&self) -> &HostStack {
        &self.stack
    }
}

impl BsdSocketApi for HostBsdSockets {
    fn is_initialized(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn initialize(&self) -> i32 {
        if !self.running.swap(true, Ordering::SeqCst) {
            debug!("host network stack started");
        }
        api::SUCCESS
    }

    fn socket(&self, af: i32, sock_type: i32, _protocol: i32) -> i32 {
        if !self.is_initialized() {
            return api::ERROR;
        }
        let family = match af {
            api::AF_INET => AddressFamily::Ipv4,
            api::AF_INET6 => AddressFamily::Ipv6,
            _ => return api::ERROR_PARAMETER,
        };
        let protocol = match sock_type {
            api::SOCK_STREAM => Protocol::Tcp,
            api::SOCK_DGRAM => Protocol::Udp,
            _ => return api::ERROR_PARAMETER,
        };
        self.stack.open(family, protocol).unwrap_or_else(native_code)
    }

    fn bind(&self, sock: i32, addr: &SocketAddr) -> i32 {
        status(self.stack.bind(sock, *addr))
    }

    fn listen(&self, sock: i32, backlog: i32) -> i32 {
        status(self.stack.listen(sock, backlog))
    }

    fn accept(&self, sock: i32, addr: &mut Option<SocketAddr>) -> i32 {
        match self.stack.accept(sock) {
            Ok((client, peer)) => {
                *addr = peer;
                client
            }
            Err(fault) => native_code(fault),
        }
    }

    fn connect(&self, sock: i32, addr: &SocketAddr) -> i32 {
        status(self.stack.connect(sock, *addr))
    }

    fn recvfrom(
        &self,
        sock: i32,
        buf: &mut [u8],
        flags: i32,
        from: &mut Option<SocketAddr>,
    ) -> i32 {
        let peek = flags & api::MSG_PEEK != 0;
        let received = self.stack.recv_from(sock, buf, peek).map(|(n, sender)| {
            *from = sender;
            n
        });
        count(received)
    }

    fn recv(&self, sock: i32, buf: &mut [u8], _flags: i32) -> i32 {
        count(self.stack.recv(sock, buf))
    }

    fn send(&self, sock: i32, buf: &[u8], _flags: i32) -> i32 {
        count(self.stack.send(sock, buf))
    }

    fn ioctl_fionbio(&self, sock: i32, value: u32) -> i32 {
        status(self.stack.set_nonblocking(sock, value != 0))
    }

    fn setsockopt_rcvtimeo(&self, sock: i32, timeout_ms: u32) -> i32 {
        status(self.stack.set_recv_timeout(sock, timeout_ms))
    }

    fn closesocket(&self, sock: i32) -> i32 {
        status(self.stack.close(sock))
    }
}
