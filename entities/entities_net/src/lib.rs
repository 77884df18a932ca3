//! Entities Layer: Network Adapter Core Types
//!
//! Provides the data model shared by every layer of the network adapter that sits
//! between a TLS/record layer and an embedded socket provider.
//!
//! ## Overview
//!
//! The `entities_net` crate provides:
//! - **Connection contexts**: [`NetContext`], one owned provider descriptor plus its protocol and state
//! - **Addresses**: [`ResolvedAddress`] and [`AddressFamily`]
//! - **Errors**: [`NetError`], the unified taxonomy every provider code is mapped onto
//! - **Configuration**: [`NetConfig`]
//!
//! ## Architecture
//!
//! This crate is the innermost layer and depends on nothing else in the workspace.
//! Use cases, adapters and frameworks all build on these types.
//!
//! ## See Also
//!
//! - [`usecases_net_sockets`](../usecases_net_sockets/index.html): the shared adapter state machine

pub mod address;
pub mod config;
pub mod context;
pub mod error;

pub use address::{AddressFamily, ResolvedAddress};
pub use config::NetConfig;
pub use context::{BoundState, NetContext, Protocol, LISTEN_BACKLOG};
pub use error::NetError;
