//! IoT-Socket API Module
//!
//! The provider contract as the adapter consumes it. Every call returns a
//! non-negative value on success and one of the `E*` codes below on failure.

/// Unspecified error
pub const ERROR: i32 = -1;
/// Invalid socket
pub const ESOCK: i32 = -2;
/// Invalid argument
pub const EINVAL: i32 = -3;
/// Operation not supported
pub const ENOTSUP: i32 = -4;
/// Not enough memory
pub const ENOMEM: i32 = -5;
/// Operation would block or timed out in non-blocking mode
pub const EAGAIN: i32 = -6;
/// Operation in progress
pub const EINPROGRESS: i32 = -7;
/// Operation timed out
pub const ETIMEDOUT: i32 = -8;
/// Socket is connected
pub const EISCONN: i32 = -9;
/// Socket is not connected
pub const ENOTCONN: i32 = -10;
/// Connection rejected by the peer
pub const ECONNREFUSED: i32 = -11;
/// Connection reset by the peer
pub const ECONNRESET: i32 = -12;
/// Connection aborted locally
pub const ECONNABORTED: i32 = -13;
/// Connection already in progress
pub const EALREADY: i32 = -14;
/// Address in use
pub const EADDRINUSE: i32 = -15;
/// Host not found
pub const EHOSTNOTFOUND: i32 = -16;

pub const AF_INET: i32 = 1;
pub const AF_INET6: i32 = 2;

pub const SOCK_STREAM: i32 = 1;
pub const SOCK_DGRAM: i32 = 2;

pub const PROTOCOL_TCP: i32 = 1;
pub const PROTOCOL_UDP: i32 = 2;

/// Non-blocking mode option; value 1 enables, 0 disables
pub const IO_FIONBIO: i32 = 1;
/// Receive timeout option, in milliseconds
pub const SO_RCVTIMEO: i32 = 2;

/// IoT-socket provider
///
/// Addresses travel as raw octets: 4 bytes for IPv4, 16 for IPv6. Calls that
/// write an address take the buffer plus an in/out length.
#[cfg_attr(test, mockall::automock)]
pub trait IotSocketApi: Send + Sync {
    /// Create a socket; returns the descriptor.
    fn create(&self, af: i32, sock_type: i32, protocol: i32) -> i32;

    fn bind(&self, socket: i32, ip: &[u8], port: u16) -> i32;

    fn listen(&self, socket: i32, backlog: i32) -> i32;

    /// Accept a connection; returns the new descriptor and writes the peer address.
    fn accept(&self, socket: i32, ip: &mut [u8], ip_len: &mut u32, port: &mut u16) -> i32;

    fn connect(&self, socket: i32, ip: &[u8], port: u16) -> i32;

    /// Returns the number of bytes received.
    fn recv(&self, socket: i32, buf: &mut [u8]) -> i32;

    /// Returns the number of bytes sent.
    fn send(&self, socket: i32, buf: &[u8]) -> i32;

    fn set_opt(&self, socket: i32, opt_id: i32, value: u32) -> i32;

    fn close(&self, socket: i32) -> i32;

    /// Resolve `name` for family `af`, writing the address octets.
    fn get_host_by_name(&self, name: &str, af: i32, ip: &mut [u8], ip_len: &mut u32) -> i32;
}
