//! Adapters Layer: IoT-Socket Provider
//!
//! Binds the shared network adapter to the minimal IoT-socket API. The provider
//! exposes a synchronous resolver and a small socket surface with native
//! negative return codes; this crate classifies those codes and offers the
//! [`SocketBackend`](usecases_net_sockets::SocketBackend) strategy over them.
//!
//! ## Overview
//!
//! - **[`api`](api/index.html)**: the provider contract ([`IotSocketApi`]) and its native constants
//! - **[`backend`](backend/index.html)**: [`IotSocketBackend`], the strategy implementation
//!
//! ## Limitations
//!
//! The provider has no peek primitive, so a UDP pseudo-accept always fails with
//! `AcceptFailed` on this backend.

pub mod api;
pub mod backend;

pub use api::IotSocketApi;
pub use backend::{classify, IotSocketBackend};
