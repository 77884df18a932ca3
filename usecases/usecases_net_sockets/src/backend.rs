//! Socket Backend Module
//!
//! The seam between the shared adapter logic and a concrete socket provider.
//! Each provider variant implements [`SocketBackend`] once; the adapter never
//! sees provider-native codes, only the [`ProviderFault`] classification.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use entities_net::{AddressFamily, Protocol, ResolvedAddress};

/// Provider-independent classification of a failed provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFault {
    /// The descriptor is not valid
    InvalidSocket,
    /// A non-blocking operation cannot make progress now
    WouldBlock,
    /// The peer closed or reset the connection
    Closed,
    /// A receive timeout expired
    Timeout,
    /// The provider does not support the operation
    Unsupported,
    /// Any other provider failure, with its native code
    Other(i32),
}

impl fmt::Display for ProviderFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderFault::InvalidSocket => write!(f, "invalid socket"),
            ProviderFault::WouldBlock => write!(f, "would block"),
            ProviderFault::Closed => write!(f, "closed by peer"),
            ProviderFault::Timeout => write!(f, "timed out"),
            ProviderFault::Unsupported => write!(f, "not supported"),
            ProviderFault::Other(code) => write!(f, "provider error {}", code),
        }
    }
}

/// Socket provider strategy
///
/// Every method wraps exactly one provider call (or, for `lookup_host`, one
/// complete resolution including any provider-specific waiting) and reports
/// failure as a [`ProviderFault`].
#[cfg_attr(test, mockall::automock(type Descriptor = i32;))]
pub trait SocketBackend {
    /// Provider descriptor handle
    type Descriptor: Copy + Eq + fmt::Debug;

    /// Bring the provider up if it is not running yet. Idempotent.
    fn prepare(&self) -> Result<(), ProviderFault>;

    /// Resolve `host` for one address family; `None` if the provider reports failure.
    fn lookup_host(&self, host: &str, family: AddressFamily) -> Option<IpAddr>;

    fn create(
        &self,
        family: AddressFamily,
        protocol: Protocol,
    ) -> Result<Self::Descriptor, ProviderFault>;

    fn connect(&self, fd: Self::Descriptor, addr: &ResolvedAddress) -> Result<(), ProviderFault>;

    fn bind(&self, fd: Self::Descriptor, addr: &ResolvedAddress) -> Result<(), ProviderFault>;

    fn listen(&self, fd: Self::Descriptor, backlog: u32) -> Result<(), ProviderFault>;

    /// Accept one stream connection, returning the new descriptor and the peer address.
    fn accept(
        &self,
        fd: Self::Descriptor,
    ) -> Result<(Self::Descriptor, Option<SocketAddr>), ProviderFault>;

    /// Sender of the next queued datagram, leaving the datagram queued.
    fn peek_sender(&self, fd: Self::Descriptor) -> Result<SocketAddr, ProviderFault>;

    fn set_nonblocking(&self, fd: Self::Descriptor, nonblocking: bool)
        -> Result<(), ProviderFault>;

    fn set_recv_timeout(&self, fd: Self::Descriptor, timeout_ms: u32)
        -> Result<(), ProviderFault>;

    fn recv(&self, fd: Self::Descriptor, buf: &mut [u8]) -> Result<usize, ProviderFault>;

    fn send(&self, fd: Self::Descriptor, buf: &[u8]) -> Result<usize, ProviderFault>;

    /// Release the descriptor. Errors are not reported.
    fn close(&self, fd: Self::Descriptor);
}
