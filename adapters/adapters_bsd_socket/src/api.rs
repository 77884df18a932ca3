//! BSD Socket API Module
//!
//! The BSD-style socket contract of the RTOS network stack. Calls return zero
//! or a non-negative count on success and a `*` error code below on failure.
//! Socket addresses travel as [`SocketAddr`].

use std::net::SocketAddr;

/// Success
pub const SUCCESS: i32 = 0;
/// Unspecified error
pub const ERROR: i32 = -1;
/// Invalid socket descriptor
pub const ERROR_SOCKET: i32 = -2;
/// Invalid parameter
pub const ERROR_PARAMETER: i32 = -3;
/// Operation would block in non-blocking mode
pub const ERROR_WOULDBLOCK: i32 = -4;
/// Out of memory
pub const ERROR_NOMEMORY: i32 = -5;
/// Connection closed or reset by the peer
pub const ERROR_CLOSED: i32 = -6;
/// Socket locked by another thread
pub const ERROR_LOCKED: i32 = -7;
/// Receive timeout expired
pub const ERROR_TIMEOUT: i32 = -8;
/// Host resolution or connect in progress
pub const ERROR_INPROGRESS: i32 = -9;
/// Host name not found
pub const ERROR_NONAME: i32 = -10;

pub const AF_INET: i32 = 2;
pub const AF_INET6: i32 = 3;

pub const SOCK_STREAM: i32 = 1;
pub const SOCK_DGRAM: i32 = 2;

/// Peek at incoming data without removing it from the queue
pub const MSG_PEEK: i32 = 0x02;

/// BSD-style socket provider
#[cfg_attr(test, mockall::automock)]
pub trait BsdSocketApi: Send + Sync {
    /// Whether the network stack is already running.
    fn is_initialized(&self) -> bool;

    /// Start the network stack; [`SUCCESS`] or an error code.
    fn initialize(&self) -> i32;

    /// Create a socket; protocol 0 selects the default for the type.
    fn socket(&self, af: i32, sock_type: i32, protocol: i32) -> i32;

    fn bind(&self, sock: i32, addr: &SocketAddr) -> i32;

    fn listen(&self, sock: i32, backlog: i32) -> i32;

    /// Accept a connection; returns the new descriptor and fills in the peer.
    fn accept(&self, sock: i32, addr: &mut Option<SocketAddr>) -> i32;

    fn connect(&self, sock: i32, addr: &SocketAddr) -> i32;

    /// Receive with the sender address; `flags` may carry [`MSG_PEEK`].
    fn recvfrom(
        &self,
        sock: i32,
        buf: &mut [u8],
        flags: i32,
        from: &mut Option<SocketAddr>,
    ) -> i32;

    fn recv(&self, sock: i32, buf: &mut [u8], flags: i32) -> i32;

    fn send(&self, sock: i32, buf: &[u8], flags: i32) -> i32;

    /// `FIONBIO`: non-zero enables non-blocking mode.
    fn ioctl_fionbio(&self, sock: i32, value: u32) -> i32;

    /// `SO_RCVTIMEO`, in milliseconds.
    fn setsockopt_rcvtimeo(&self, sock: i32, timeout_ms: u32) -> i32;

    fn closesocket(&self, sock: i32) -> i32;
}
