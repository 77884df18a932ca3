//! Frameworks Layer: Host Socket Stack
//!
//! Implements both socket provider contracts on the host operating system so
//! the adapter can run end to end off target: in integration tests and in the
//! `netshim` demo.
//!
//! ## Overview
//!
//! - **[`stack`](stack/index.html)**: [`HostStack`], a descriptor table over `socket2` sockets
//! - **[`iot`](iot/index.html)**: [`HostIotSockets`], the IoT-socket contract over the host stack
//! - **[`bsd`](bsd/index.html)**: [`HostBsdSockets`], the BSD-style contract over the host stack
//! - **[`dns`](dns/index.html)**: [`HostDnsClient`], an asynchronous resolver answering from a worker thread
//!
//! Both providers report failures with their own native codes, so the
//! adapter's classification runs exactly as it would against the embedded
//! stacks.

pub mod bsd;
pub mod dns;
pub mod iot;
pub mod stack;

pub use bsd::HostBsdSockets;
pub use dns::HostDnsClient;
pub use iot::HostIotSockets;
pub use stack::{resolve_host, HostFault, HostStack};
