//! Address Resolver Module
//!
//! Turns a host / port text pair into a [`ResolvedAddress`].
//!
//! - Port text is read as a leading run of decimal digits, after optional
//!   whitespace and one optional `+`. Zero, an empty run or a value above 65535
//!   is a resolution failure.
//! - Bind side: no address means the wildcard of the configured family; a literal
//!   is parsed as dotted-decimal, then (with IPv6 enabled) as colon-hex.
//! - Connect side: the provider is asked for IPv4 first and, with IPv6 enabled,
//!   once more for IPv6.
//!
//! Nothing is cached.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use entities_net::{AddressFamily, NetConfig, NetError, ResolvedAddress};
use tracing::debug;

use crate::backend::SocketBackend;

/// Parse decimal port text. Anything that does not yield a port in `1..=65535` is `UnknownHost`.
pub fn parse_port(text: &str) -> Result<u16, NetError> {
    let trimmed = text.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let digits = &trimmed[..digits_end];

    match digits.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(NetError::UnknownHost),
    }
}

/// Resolve the local address for a bind.
pub fn resolve_bind_address(
    bind_ip: Option<&str>,
    port: &str,
    config: &NetConfig,
) -> Result<ResolvedAddress, NetError> {
    let port = parse_port(port)?;

    let ip = match bind_ip {
        None => config.wildcard_family.wildcard(),
        Some(literal) => parse_literal(literal, config.ipv6).ok_or(NetError::UnknownHost)?,
    };

    Ok(ResolvedAddress::new(ip, port))
}

/// Resolve a remote host through the backend, falling back from IPv4 to IPv6.
pub fn resolve_connect_address<B>(
    backend: &B,
    host: &str,
    port: &str,
    config: &NetConfig,
) -> Result<ResolvedAddress, NetError>
where
    B: SocketBackend + ?Sized,
{
    let port = parse_port(port)?;

    if let Some(ip) = backend.lookup_host(host, AddressFamily::Ipv4) {
        return Ok(ResolvedAddress::new(ip, port));
    }

    if config.ipv6 {
        debug!(host, "IPv4 resolution failed, retrying with IPv6");
        if let Some(ip) = backend.lookup_host(host, AddressFamily::Ipv6) {
            return Ok(ResolvedAddress::new(ip, port));
        }
    }

    Err(NetError::UnknownHost)
}

fn parse_literal(literal: &str, ipv6: bool) -> Option<IpAddr> {
    if let Ok(v4) = literal.parse::<Ipv4Addr>() {
        return Some(IpAddr::V4(v4));
    }
    if ipv6 {
        if let Ok(v6) = literal.parse::<Ipv6Addr>() {
            return Some(IpAddr::V6(v6));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockSocketBackend;
    use mockall::predicate::*;
    use mockall::Sequence;

    #[test]
    fn test_parse_port_valid() {
        assert_eq!(parse_port("443"), Ok(443));
        assert_eq!(parse_port("65535"), Ok(65535));
        assert_eq!(parse_port(" 4433"), Ok(4433));
        assert_eq!(parse_port("80abc"), Ok(80));
    }

    #[test]
    fn test_parse_port_accepts_one_plus_sign() {
        assert_eq!(parse_port("+443"), Ok(443));
        assert_eq!(parse_port(" +8080"), Ok(8080));
        for text in ["+", "++1", "+ 1", "+0"] {
            assert_eq!(parse_port(text), Err(NetError::UnknownHost), "port {:?}", text);
        }
    }

    #[test]
    fn test_parse_port_rejects_zero_empty_and_garbage() {
        for text in ["0", "", "abc", "00", "-1", "65536", "99999999999"] {
            assert_eq!(parse_port(text), Err(NetError::UnknownHost), "port {:?}", text);
        }
    }

    #[test]
    fn test_bind_wildcard_follows_config() {
        let config = NetConfig::default();
        let addr = resolve_bind_address(None, "4433", &config).unwrap();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(addr.port(), 4433);

        let config = NetConfig::default().with_wildcard_family(AddressFamily::Ipv6);
        let addr = resolve_bind_address(None, "4433", &config).unwrap();
        assert_eq!(addr.ip(), IpAddr::V6(Ipv6Addr::UNSPECIFIED));
    }

    #[test]
    fn test_bind_literals() {
        let config = NetConfig::default().with_ipv6(true);
        let addr = resolve_bind_address(Some("192.168.0.100"), "80", &config).unwrap();
        assert_eq!(addr.octets(), vec![192, 168, 0, 100]);

        let addr = resolve_bind_address(Some("fe80::1"), "80", &config).unwrap();
        assert_eq!(addr.family(), AddressFamily::Ipv6);
    }

    #[test]
    fn test_bind_rejects_ipv6_literal_without_ipv6() {
        let config = NetConfig::default().with_ipv6(false);
        assert_eq!(
            resolve_bind_address(Some("::1"), "80", &config),
            Err(NetError::UnknownHost)
        );
    }

    #[test]
    fn test_bind_rejects_malformed_literal_and_bad_port() {
        let config = NetConfig::default();
        assert_eq!(
            resolve_bind_address(Some("192.168.0"), "80", &config),
            Err(NetError::UnknownHost)
        );
        assert_eq!(
            resolve_bind_address(Some("not-an-ip"), "80", &config),
            Err(NetError::UnknownHost)
        );
        assert_eq!(resolve_bind_address(None, "0", &config), Err(NetError::UnknownHost));
    }

    #[test]
    fn test_connect_prefers_ipv4() {
        let mut backend = MockSocketBackend::new();
        backend
            .expect_lookup_host()
            .with(eq("example.org"), eq(AddressFamily::Ipv4))
            .times(1)
            .returning(|_, _| Some(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))));

        let addr =
            resolve_connect_address(&backend, "example.org", "443", &NetConfig::default()).unwrap();
        assert_eq!(addr.socket_addr(), "93.184.216.34:443".parse::<std::net::SocketAddr>().unwrap());
    }

    #[test]
    fn test_connect_falls_back_to_ipv6_once() {
        let mut backend = MockSocketBackend::new();
        let mut seq = Sequence::new();
        backend
            .expect_lookup_host()
            .with(eq("v6only"), eq(AddressFamily::Ipv4))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| None);
        backend
            .expect_lookup_host()
            .with(eq("v6only"), eq(AddressFamily::Ipv6))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));

        let config = NetConfig::default().with_ipv6(true);
        let addr = resolve_connect_address(&backend, "v6only", "8443", &config).unwrap();
        assert_eq!(addr.family(), AddressFamily::Ipv6);
        assert_eq!(addr.port(), 8443);
    }

    #[test]
    fn test_connect_without_ipv6_does_not_retry() {
        let mut backend = MockSocketBackend::new();
        backend
            .expect_lookup_host()
            .with(always(), eq(AddressFamily::Ipv4))
            .times(1)
            .returning(|_, _| None);

        let config = NetConfig::default().with_ipv6(false);
        assert_eq!(
            resolve_connect_address(&backend, "nowhere", "443", &config),
            Err(NetError::UnknownHost)
        );
    }

    #[test]
    fn test_connect_both_families_fail() {
        let mut backend = MockSocketBackend::new();
        backend.expect_lookup_host().times(2).returning(|_, _| None);

        let config = NetConfig::default().with_ipv6(true);
        assert_eq!(
            resolve_connect_address(&backend, "nowhere", "443", &config),
            Err(NetError::UnknownHost)
        );
    }

    #[test]
    fn test_connect_bad_port_skips_lookup() {
        let mut backend = MockSocketBackend::new();
        backend.expect_lookup_host().never();

        for port in ["0", "", "abc"] {
            assert_eq!(
                resolve_connect_address(&backend, "localhost", port, &NetConfig::default()),
                Err(NetError::UnknownHost)
            );
        }
    }
}
