//! Adapter Configuration
//!
//! Tunables for the network adapter. Defaults reproduce the behavior of the
//! embedded target: IPv6 fallback when the `ipv6` feature is compiled in, a
//! 100 ms resolver poll interval, a 500 ms settle delay after bringing the
//! network stack up, and no overall resolution timeout.

use std::time::Duration;

use crate::address::AddressFamily;

/// Network adapter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetConfig {
    /// Retry name resolution over IPv6 and accept IPv6 literals
    pub ipv6: bool,
    /// Family of the wildcard address used when bind is given no address
    pub wildcard_family: AddressFamily,
    /// Back-off between retries while the resolver reports busy
    pub dns_poll_interval: Duration,
    /// Delay after initializing the network stack for the first time
    pub settle_delay: Duration,
    /// Upper bound on the busy-retry loop; `None` retries forever
    pub resolve_timeout: Option<Duration>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            ipv6: cfg!(feature = "ipv6"),
            wildcard_family: AddressFamily::Ipv4,
            dns_poll_interval: Duration::from_millis(100),
            settle_delay: Duration::from_millis(500),
            resolve_timeout: None,
        }
    }
}

impl NetConfig {
    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }

    pub fn with_wildcard_family(mut self, family: AddressFamily) -> Self {
        self.wildcard_family = family;
        self
    }

    pub fn with_dns_poll_interval(mut self, interval: Duration) -> Self {
        self.dns_poll_interval = interval;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_resolve_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.resolve_timeout = timeout;
        self
    }
}
