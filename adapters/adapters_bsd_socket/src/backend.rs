//! BSD Socket Backend Module
//!
//! [`SocketBackend`] over a [`BsdSocketApi`] provider and its asynchronous
//! resolver. Host lookups go through the [`DnsBridge`]; UDP pseudo-accept uses
//! a one-byte `MSG_PEEK` receive so the first datagram stays queued for the
//! record layer.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use entities_net::{AddressFamily, NetConfig, Protocol, ResolvedAddress};
use infrastructure_rtos::Kernel;
use tracing::{debug, trace};
use usecases_net_sockets::{ProviderFault, SocketBackend};

use crate::api::{self, BsdSocketApi};
use crate::bridge::DnsBridge;
use crate::dns::DnsClient;

/// Classify a native BSD error code.
pub fn classify(code: i32) -> ProviderFault {
    match code {
        api::ERROR_SOCKET => ProviderFault::InvalidSocket,
        api::ERROR_WOULDBLOCK => ProviderFault::WouldBlock,
        api::ERROR_CLOSED => ProviderFault::Closed,
        api::ERROR_TIMEOUT => ProviderFault::Timeout,
        other => ProviderFault::Other(other),
    }
}

fn check(ret: i32) -> Result<i32, ProviderFault> {
    if ret < 0 {
        Err(classify(ret))
    } else {
        Ok(ret)
    }
}

/// BSD socket backend
pub struct BsdSocketBackend<A, D, K>
where
    A: BsdSocketApi,
    D: DnsClient,
    K: Kernel,
{
    api: A,
    dns: DnsBridge<D, K>,
    settle_delay: Duration,
}

impl<A, D, K> BsdSocketBackend<A, D, K>
where
    A: BsdSocketApi,
    D: DnsClient,
    K: Kernel,
{
    pub fn new(api: A, dns: D, kernel: K, config: &NetConfig) -> Self {
        Self {
            api,
            dns: DnsBridge::new(dns, kernel, config),
            settle_delay: config.settle_delay,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn dns(&self) -> &DnsBridge<D, K> {
        &self.dns
    }
}

impl<A, D, K> SocketBackend for BsdSocketBackend<A, D, K>
where
    A: BsdSocketApi,
    D: DnsClient,
    K: Kernel,
{
    type Descriptor = i32;

    fn prepare(&self) -> Result<(), ProviderFault> {
        if self.api.is_initialized() {
            return Ok(());
        }

        let ret = self.api.initialize();
        if ret != api::SUCCESS {
            return Err(ProviderFault::Other(ret));
        }
        debug!(settle = ?self.settle_delay, "network stack initialised");
        self.dns.kernel().delay(self.settle_delay);
        Ok(())
    }

    fn lookup_host(&self, host: &str, family: AddressFamily) -> Option<IpAddr> {
        self.dns.resolve(host, family)
    }

    fn create(&self, family: AddressFamily, protocol: Protocol) -> Result<i32, ProviderFault> {
        let af = match family {
            AddressFamily::Ipv4 => api::AF_INET,
            AddressFamily::Ipv6 => api::AF_INET6,
        };
        let sock_type = match protocol {
            Protocol::Tcp => api::SOCK_STREAM,
            Protocol::Udp => api::SOCK_DGRAM,
        };
        check(self.api.socket(af, sock_type, 0))
    }

    fn connect(&self, fd: i32, addr: &ResolvedAddress) -> Result<(), ProviderFault> {
        check(self.api.connect(fd, &addr.socket_addr())).map(|_| ())
    }

    fn bind(&self, fd: i32, addr: &ResolvedAddress) -> Result<(), ProviderFault> {
        check(self.api.bind(fd, &addr.socket_addr())).map(|_| ())
    }

    fn listen(&self, fd: i32, backlog: u32) -> Result<(), ProviderFault> {
        let backlog = i32::try_from(backlog).unwrap_or(i32::MAX);
        check(self.api.listen(fd, backlog)).map(|_| ())
    }

    fn accept(&self, fd: i32) -> Result<(i32, Option<SocketAddr>), ProviderFault> {
        let mut peer = None;
        let client = check(self.api.accept(fd, &mut peer))?;
        Ok((client, peer))
    }

    fn peek_sender(&self, fd: i32) -> Result<SocketAddr, ProviderFault> {
        let mut peek_buf = [0u8; 1];
        let mut from = None;
        check(self.api.recvfrom(fd, &mut peek_buf, api::MSG_PEEK, &mut from))?;
        from.ok_or(ProviderFault::Other(api::ERROR))
    }

    fn set_nonblocking(&self, fd: i32, nonblocking: bool) -> Result<(), ProviderFault> {
        check(self.api.ioctl_fionbio(fd, u32::from(nonblocking))).map(|_| ())
    }

    fn set_recv_timeout(&self, fd: i32, timeout_ms: u32) -> Result<(), ProviderFault> {
        check(self.api.setsockopt_rcvtimeo(fd, timeout_ms)).map(|_| ())
    }

    fn recv(&self, fd: i32, buf: &mut [u8]) -> Result<usize, ProviderFault> {
        let len = buf.len().min(i32::MAX as usize);
        check(self.api.recv(fd, &mut buf[..len], 0)).map(|n| n as usize)
    }

    fn send(&self, fd: i32, buf: &[u8]) -> Result<usize, ProviderFault> {
        let len = buf.len().min(i32::MAX as usize);
        check(self.api.send(fd, &buf[..len], 0)).map(|n| n as usize)
    }

    fn close(&self, fd: i32) {
        let ret = self.api.closesocket(fd);
        if ret < 0 {
            trace!(fd, ret, "closesocket reported an error");
        }
    }
}
