//! DNS Client Module
//!
//! Contract of the network stack's asynchronous resolver. A request is either
//! accepted, refused because another lookup is in progress, or rejected. An
//! accepted request always ends with exactly one callback, success or not.

use std::net::IpAddr;

use entities_net::AddressFamily;

/// Immediate answer to a resolution request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsStatus {
    /// Accepted; the callback will fire
    Ok,
    /// Resolver busy with another request; try again later
    Busy,
    /// Rejected; no callback will fire
    Error,
}

/// Outcome delivered to the callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsEvent {
    Success(IpAddr),
    /// The name server did not answer in time
    Timeout,
    /// The name does not exist for the requested family
    NotResolved,
    Error,
}

/// Completion callback, run once in provider context
pub type DnsCallback = Box<dyn FnOnce(DnsEvent) + Send + 'static>;

/// Asynchronous resolver
#[cfg_attr(test, mockall::automock)]
pub trait DnsClient: Send + Sync {
    /// Start resolving `host` for `family`.
    fn get_host_by_name(&self, host: &str, family: AddressFamily, callback: DnsCallback)
        -> DnsStatus;
}
