//! Host IoT-Socket Provider
//!
//! [`IotSocketApi`] over the [`HostStack`], with addresses passed as raw octets
//! and failures reported as IoT-socket codes.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use adapters_iot_socket::api;
use adapters_iot_socket::IotSocketApi;
use entities_net::{AddressFamily, Protocol};

use crate::stack::{resolve_host, HostFault, HostStack};

fn native_code(fault: HostFault) -> i32 {
    match fault {
        HostFault::InvalidSocket => api::ESOCK,
        HostFault::InvalidArgument => api::EINVAL,
        HostFault::WouldBlock => api::EAGAIN,
        HostFault::TimedOut => api::ETIMEDOUT,
        HostFault::Closed => api::ECONNRESET,
        HostFault::Refused => api::ECONNREFUSED,
        HostFault::AddrInUse => api::EADDRINUSE,
        HostFault::NotSupported => api::ENOTSUP,
        HostFault::Other => api::ERROR,
    }
}

fn to_code<T>(result: Result<T, HostFault>, value: impl FnOnce(T) -> i32) -> i32 {
    match result {
        Ok(ok) => value(ok),
        Err(fault) => native_code(fault),
    }
}

fn family_of(af: i32) -> Option<AddressFamily> {
    match af {
        api::AF_INET => Some(AddressFamily::Ipv4),
        api::AF_INET6 => Some(AddressFamily::Ipv6),
        _ => None,
    }
}

fn socket_addr(ip: &[u8], port: u16) -> Option<SocketAddr> {
    let ip = match ip.len() {
        4 => IpAddr::V4(Ipv4Addr::from(<[u8; 4]>::try_from(ip).ok()?)),
        16 => IpAddr::V6(Ipv6Addr::from(<[u8; 16]>::try_from(ip).ok()?)),
        _ => return None,
    };
    Some(SocketAddr::new(ip, port))
}

/// Write `ip` into an address buffer with an in/out length.
fn write_ip(ip: IpAddr, buf: &mut [u8], len: &mut u32) -> bool {
    let octets: Vec<u8> = match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    let capacity = (*len as usize).min(buf.len());
    if capacity < octets.len() {
        return false;
    }
    buf[..octets.len()].copy_from_slice(&octets);
    *len = octets.len() as u32;
    true
}

fn clamp(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// IoT-socket provider backed by host sockets
#[derive(Clone, Default)]
pub struct HostIotSockets {
    stack: Arc<HostStack>,
}

impl HostIotSockets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stack(&self) -> &HostStack {
        &self.stack
    }
}

impl IotSocketApi for HostIotSockets {
    fn create(&self, af: i32, sock_type: i32, protocol: i32) -> i32 {
        let Some(family) = family_of(af) else {
            return api::EINVAL;
        };
        let protocol = match (sock_type, protocol) {
            (api::SOCK_STREAM, api::PROTOCOL_TCP) => Protocol::Tcp,
            (api::SOCK_DGRAM, api::PROTOCOL_UDP) => Protocol::Udp,
            _ => return api::ENOTSUP,
        };
        to_code(self.stack.open(family, protocol), |fd| fd)
    }

    fn bind(&self, socket: i32, ip: &[u8], port: u16) -> i32 {
        match socket_addr(ip, port) {
            Some(addr) => to_code(self.stack.bind(socket, addr), |_| 0),
            None => api::EINVAL,
        }
    }

    fn listen(&self, socket: i32, backlog: i32) -> i32 {
        to_code(self.stack.listen(socket, backlog), |_| 0)
    }

    fn accept(&self, socket: i32, ip: &mut [u8], ip_len: &mut u32, port: &mut u16) -> i32 {
        let (client, peer) = match self.stack.accept(socket) {
            Ok(accepted) => accepted,
            Err(fault) => return native_code(fault),
        };
        match peer {
            Some(peer) if write_ip(peer.ip(), ip, ip_len) => *port = peer.port(),
            _ => *ip_len = 0,
        }
        client
    }

    fn connect(&self, socket: i32, ip: &[u8], port: u16) -> i32 {
        match socket_addr(ip, port) {
            Some(addr) => to_code(self.stack.connect(socket, addr), |_| 0),
            None => api::EINVAL,
        }
    }

    fn recv(&self, socket: i32, buf: &mut [u8]) -> i32 {
        to_code(self.stack.recv(socket, buf), clamp)
    }

    fn send(&self, socket: i32, buf: &[u8]) -> i32 {
        to_code(self.stack.send(socket, buf), clamp)
    }

    fn set_opt(&self, socket: i32, opt_id: i32, value: u32) -> i32 {
        let result = match opt_id {
            api::IO_FIONBIO => self.stack.set_nonblocking(socket, value != 0),
            api::SO_RCVTIMEO => self.stack.set_recv_timeout(socket, value),
            _ => return api::ENOTSUP,
        };
        to_code(result, |_| 0)
    }

    fn close(&self, socket: i32) -> i32 {
        to_code(self.stack.close(socket), |_| 0)
    }

    fn get_host_by_name(&self, name: &str, af: i32, ip: &mut [u8], ip_len: &mut u32) -> i32 {
        let Some(family) = family_of(af) else {
            return api::EINVAL;
        };
        match resolve_host(name, family) {
            Some(addr) if write_ip(addr, ip, ip_len) => 0,
            Some(_) => api::EINVAL,
            None => api::EHOSTNOTFOUND,
        }
    }
}
