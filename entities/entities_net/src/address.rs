//! Address Module
//!
//! Resolved transport addresses. A [`ResolvedAddress`] is produced by the address
//! resolver and consumed immediately by connect or bind; it is never stored in a
//! connection context.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4
    Ipv4,
    /// IPv6
    Ipv6,
}

impl AddressFamily {
    /// Length in octets of an address of this family.
    pub fn addr_len(self) -> usize {
        match self {
            AddressFamily::Ipv4 => 4,
            AddressFamily::Ipv6 => 16,
        }
    }

    /// Unspecified ("any") address of this family.
    pub fn wildcard(self) -> IpAddr {
        match self {
            AddressFamily::Ipv4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            AddressFamily::Ipv6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }

    /// Family of an IP address.
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }
}

/// A validated IP address and port, ready for connect or bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedAddress {
    ip: IpAddr,
    port: u16,
}

impl ResolvedAddress {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.ip)
    }

    /// Raw address octets: 4 for IPv4, 16 for IPv6.
    pub fn octets(&self) -> Vec<u8> {
        match self.ip {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl From<SocketAddr> for ResolvedAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_lengths() {
        assert_eq!(AddressFamily::Ipv4.addr_len(), 4);
        assert_eq!(AddressFamily::Ipv6.addr_len(), 16);
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(AddressFamily::Ipv4.wildcard(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(AddressFamily::Ipv6.wildcard(), IpAddr::V6(Ipv6Addr::UNSPECIFIED));
    }

    #[test]
    fn test_resolved_address_octets() {
        let v4 = ResolvedAddress::new(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 100)), 4433);
        assert_eq!(v4.family(), AddressFamily::Ipv4);
        assert_eq!(v4.octets(), vec![192, 168, 0, 100]);
        assert_eq!(v4.to_string(), "192.168.0.100:4433");

        let v6 = ResolvedAddress::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 443);
        assert_eq!(v6.family(), AddressFamily::Ipv6);
        assert_eq!(v6.octets().len(), 16);
        assert_eq!(v6.octets()[15], 1);
        assert_eq!(v6.socket_addr(), "[::1]:443".parse::<SocketAddr>().unwrap());
    }
}
