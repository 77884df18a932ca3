//! Adapters Layer: BSD-Style Socket Provider
//!
//! Binds the shared network adapter to a BSD-style sockets API running on an
//! RTOS network stack. Unlike the IoT provider, name resolution here is
//! asynchronous: the stack's DNS client reports the result through a callback,
//! which the [`DnsBridge`] turns back into a blocking call.
//!
//! ## Overview
//!
//! - **[`api`](api/index.html)**: the socket contract ([`BsdSocketApi`]) and its native constants
//! - **[`dns`](dns/index.html)**: the asynchronous resolver contract ([`DnsClient`])
//! - **[`bridge`](bridge/index.html)**: [`DnsBridge`], callback-to-blocking resolution with busy retry
//! - **[`backend`](backend/index.html)**: [`BsdSocketBackend`], the strategy implementation
//!
//! ## Provider bring-up
//!
//! The stack is started lazily on the first connect or bind. If it is not yet
//! running it is initialised and given a settle delay once.

pub mod api;
pub mod backend;
pub mod bridge;
pub mod dns;

pub use api::BsdSocketApi;
pub use backend::{classify, BsdSocketBackend};
pub use bridge::DnsBridge;
pub use dns::{DnsCallback, DnsClient, DnsEvent, DnsStatus};
