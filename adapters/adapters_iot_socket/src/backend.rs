//! IoT Socket Backend Module

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use entities_net::{AddressFamily, Protocol, ResolvedAddress};
use tracing::trace;
use usecases_net_sockets::{ProviderFault, SocketBackend};

use crate::api::{self, IotSocketApi};

/// Classify a native IoT-socket return code.
pub fn classify(code: i32) -> ProviderFault {
    match code {
        api::ESOCK => ProviderFault::InvalidSocket,
        api::EAGAIN => ProviderFault::WouldBlock,
        api::ECONNRESET | api::ECONNABORTED | api::ENOTCONN => ProviderFault::Closed,
        api::ETIMEDOUT => ProviderFault::Timeout,
        api::ENOTSUP => ProviderFault::Unsupported,
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

fn native_family(family: AddressFamily) -> i32 {
    match family {
        AddressFamily::Ipv4 => api::AF_INET,
        AddressFamily::Ipv6 => api::AF_INET6,
    }
}

fn ip_from_octets(octets: &[u8]) -> Option<IpAddr> {
    match octets.len() {
        4 => <[u8; 4]>::try_from(octets).ok().map(|o| IpAddr::V4(Ipv4Addr::from(o))),
        16 => <[u8; 16]>::try_from(octets).ok().map(|o| IpAddr::V6(Ipv6Addr::from(o))),
        _ => None,
    }
}

/// [`SocketBackend`] over an [`IotSocketApi`] provider
pub struct IotSocketBackend<A: IotSocketApi> {
    api: A,
}

impl<A: IotSocketApi> IotSocketBackend<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

impl<A: IotSocketApi> SocketBackend for IotSocketBackend<A> {
    type Descriptor = i32;

    /// The IoT provider needs no bring-up.
    fn prepare(&self) -> Result<(), ProviderFault> {
        Ok(())
    }

    fn lookup_host(&self, host: &str, family: AddressFamily) -> Option<IpAddr> {
        let mut ip = [0u8; 16];
        let mut ip_len = family.addr_len() as u32;
        let ret = self
            .api
            .get_host_by_name(host, native_family(family), &mut ip, &mut ip_len);
        if ret < 0 {
            trace!(host, ?family, ret, "host lookup failed");
            return None;
        }
        ip.get(..ip_len as usize).and_then(ip_from_octets)
    }

    fn create(&self, family: AddressFamily, protocol: Protocol) -> Result<i32, ProviderFault> {
        let (sock_type, proto) = match protocol {
            Protocol::Tcp => (api::SOCK_STREAM, api::PROTOCOL_TCP),
            Protocol::Udp => (api::SOCK_DGRAM, api::PROTOCOL_UDP),
        };
        check(self.api.create(native_family(family), sock_type, proto))
    }

    fn connect(&self, fd: i32, addr: &ResolvedAddress) -> Result<(), ProviderFault> {
        check(self.api.connect(fd, &addr.octets(), addr.port())).map(|_| ())
    }

    fn bind(&self, fd: i32, addr: &ResolvedAddress) -> Result<(), ProviderFault> {
        check(self.api.bind(fd, &addr.octets(), addr.port())).map(|_| ())
    }

    fn listen(&self, fd: i32, backlog: u32) -> Result<(), ProviderFault> {
        let backlog = i32::try_from(backlog).unwrap_or(i32::MAX);
        check(self.api.listen(fd, backlog)).map(|_| ())
    }

    fn accept(&self, fd: i32) -> Result<(i32, Option<SocketAddr>), ProviderFault> {
        let mut ip = [0u8; 16];
        let mut ip_len = ip.len() as u32;
        let mut port = 0u16;
        let client = check(self.api.accept(fd, &mut ip, &mut ip_len, &mut port))?;

        let peer = ip
            .get(..ip_len as usize)
            .and_then(ip_from_octets)
            .map(|ip| SocketAddr::new(ip, port));
        Ok((client, peer))
    }

    /// The provider cannot look at a queued datagram without consuming it.
    fn peek_sender(&self, _fd: i32) -> Result<SocketAddr, ProviderFault> {
        Err(ProviderFault::Unsupported)
    }

    fn set_nonblocking(&self, fd: i32, nonblocking: bool) -> Result<(), ProviderFault> {
        check(self.api.set_opt(fd, api::IO_FIONBIO, u32::from(nonblocking))).map(|_| ())
    }

    fn set_recv_timeout(&self, fd: i32, timeout_ms: u32) -> Result<(), ProviderFault> {
        check(self.api.set_opt(fd, api::SO_RCVTIMEO, timeout_ms)).map(|_| ())
    }

    fn recv(&self, fd: i32, buf: &mut [u8]) -> Result<usize, ProviderFault> {
        let len = buf.len().min(i32::MAX as usize);
        check(self.api.recv(fd, &mut buf[..len])).map(|n| n as usize)
    }

    fn send(&self, fd: i32, buf: &[u8]) -> Result<usize, ProviderFault> {
        let len = buf.len().min(i32::MAX as usize);
        check(self.api.send(fd, &buf[..len])).map(|n| n as usize)
    }

    fn close(&self, fd: i32) {
        let ret = self.api.close(fd);
        if ret < 0 {
            trace!(fd, ret, "close reported an error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockIotSocketApi;
    use entities_net::{NetConfig, NetError};
    use mockall::predicate::*;
    use mockall::Sequence;
    use usecases_net_sockets::NetworkAdapter;

    #[test]
    fn test_classify_native_codes() {
        assert_eq!(classify(api::ESOCK), ProviderFault::InvalidSocket);
        assert_eq!(classify(api::EAGAIN), ProviderFault::WouldBlock);
        assert_eq!(classify(api::ECONNRESET), ProviderFault::Closed);
        assert_eq!(classify(api::ECONNABORTED), ProviderFault::Closed);
        assert_eq!(classify(api::ENOTCONN), ProviderFault::Closed);
        assert_eq!(classify(api::ETIMEDOUT), ProviderFault::Timeout);
        assert_eq!(classify(api::ENOTSUP), ProviderFault::Unsupported);
        assert_eq!(classify(api::EADDRINUSE), ProviderFault::Other(api::EADDRINUSE));
    }

    #[test]
    fn test_create_uses_native_type_and_protocol() {
        let mut mock = MockIotSocketApi::new();
        mock.expect_create()
            .with(eq(api::AF_INET6), eq(api::SOCK_DGRAM), eq(api::PROTOCOL_UDP))
            .times(1)
            .returning(|_, _, _| 7);
        mock.expect_create()
            .with(eq(api::AF_INET), eq(api::SOCK_STREAM), eq(api::PROTOCOL_TCP))
            .times(1)
            .returning(|_, _, _| api::ENOMEM);

        let backend = IotSocketBackend::new(mock);
        assert_eq!(backend.create(AddressFamily::Ipv6, Protocol::Udp), Ok(7));
        assert_eq!(
            backend.create(AddressFamily::Ipv4, Protocol::Tcp),
            Err(ProviderFault::Other(api::ENOMEM))
        );
    }

    #[test]
    fn test_lookup_host_uses_returned_length() {
        let mut mock = MockIotSocketApi::new();
        mock.expect_get_host_by_name()
            .with(eq("device.local"), eq(api::AF_INET), always(), always())
            .times(1)
            .returning(|_, _, ip: &mut [u8], ip_len: &mut u32| {
                ip[..4].copy_from_slice(&[10, 0, 0, 9]);
                *ip_len = 4;
                0
            });

        let backend = IotSocketBackend::new(mock);
        assert_eq!(
            backend.lookup_host("device.local", AddressFamily::Ipv4),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)))
        );
    }

    #[test]
    fn test_lookup_host_failure() {
        let mut mock = MockIotSocketApi::new();
        mock.expect_get_host_by_name()
            .returning(|_, _, _, _| api::EHOSTNOTFOUND);

        let backend = IotSocketBackend::new(mock);
        assert_eq!(backend.lookup_host("nowhere", AddressFamily::Ipv6), None);
    }

    #[test]
    fn test_accept_reports_peer() {
        let mut mock = MockIotSocketApi::new();
        mock.expect_accept()
            .with(eq(3), always(), always(), always())
            .returning(|_, ip: &mut [u8], ip_len: &mut u32, port: &mut u16| {
                ip[..4].copy_from_slice(&[192, 168, 1, 5]);
                *ip_len = 4;
                *port = 50123;
                12
            });

        let backend = IotSocketBackend::new(mock);
        let (client, peer) = backend.accept(3).unwrap();
        assert_eq!(client, 12);
        assert_eq!(peer, Some("192.168.1.5:50123".parse::<SocketAddr>().unwrap()));
    }

    #[test]
    fn test_accept_without_address() {
        let mut mock = MockIotSocketApi::new();
        mock.expect_accept()
            .returning(|_, _, ip_len: &mut u32, _| {
                *ip_len = 0;
                12
            });

        let backend = IotSocketBackend::new(mock);
        assert_eq!(backend.accept(3), Ok((12, None)));
    }

    #[test]
    fn test_blocking_options() {
        let mut mock = MockIotSocketApi::new();
        let mut seq = Sequence::new();
        mock.expect_set_opt()
            .with(eq(4), eq(api::IO_FIONBIO), eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| 0);
        mock.expect_set_opt()
            .with(eq(4), eq(api::IO_FIONBIO), eq(0))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| 0);
        mock.expect_set_opt()
            .with(eq(4), eq(api::SO_RCVTIMEO), eq(1500))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| api::ESOCK);

        let backend = IotSocketBackend::new(mock);
        assert_eq!(backend.set_nonblocking(4, true), Ok(()));
        assert_eq!(backend.set_nonblocking(4, false), Ok(()));
        assert_eq!(
            backend.set_recv_timeout(4, 1500),
            Err(ProviderFault::InvalidSocket)
        );
    }

    #[test]
    fn test_adapter_recv_maps_native_codes() {
        let mut mock = MockIotSocketApi::new();
        let mut seq = Sequence::new();
        for code in [api::EAGAIN, api::ECONNRESET, api::ETIMEDOUT, api::ESOCK, api::EINVAL] {
            mock.expect_recv()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _| code);
        }

        let adapter = NetworkAdapter::new(IotSocketBackend::new(mock), NetConfig::default());
        let ctx = entities_net::NetContext::with_descriptor(
            1,
            Protocol::Tcp,
            entities_net::BoundState::Connected,
        );
        let mut buf = [0u8; 8];
        assert_eq!(adapter.recv(&ctx, &mut buf), Err(NetError::WantRead));
        assert_eq!(adapter.recv(&ctx, &mut buf), Err(NetError::ConnectionReset));
        assert_eq!(adapter.recv(&ctx, &mut buf), Err(NetError::Timeout));
        assert_eq!(adapter.recv(&ctx, &mut buf), Err(NetError::InvalidContext));
        assert_eq!(adapter.recv(&ctx, &mut buf), Err(NetError::RecvFailed));
    }

    #[test]
    fn test_adapter_udp_accept_is_unsupported() {
        let mut mock = MockIotSocketApi::new();
        mock.expect_connect().never();
        mock.expect_close().never();

        let adapter = NetworkAdapter::new(IotSocketBackend::new(mock), NetConfig::default());
        let mut listener = entities_net::NetContext::with_descriptor(
            2,
            Protocol::Udp,
            entities_net::BoundState::Listening,
        );
        assert_eq!(adapter.accept(&mut listener).unwrap_err(), NetError::AcceptFailed);
        assert_eq!(listener.descriptor(), Some(2));
    }

    #[test]
    fn test_adapter_connect_failure_closes_once() {
        let mut mock = MockIotSocketApi::new();
        mock.expect_get_host_by_name()
            .returning(|_, _, ip: &mut [u8], ip_len: &mut u32| {
                ip[..4].copy_from_slice(&[127, 0, 0, 1]);
                *ip_len = 4;
                0
            });
        mock.expect_create().returning(|_, _, _| 5);
        mock.expect_connect()
            .withf(|fd, ip, port| *fd == 5 && ip == [127, 0, 0, 1] && *port == 4433)
            .returning(|_, _, _| api::ECONNREFUSED);
        mock.expect_close().with(eq(5)).times(1).returning(|_| 0);

        let adapter = NetworkAdapter::new(IotSocketBackend::new(mock), NetConfig::default());
        let mut ctx = adapter.init();
        assert_eq!(
            adapter.connect(&mut ctx, "localhost", "4433", Protocol::Tcp),
            Err(NetError::ConnectFailed)
        );
        assert!(!ctx.is_set());
    }
}
