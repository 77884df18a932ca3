//! Use Cases Layer: Network Adapter
//!
//! Implements the transport contract a TLS/record layer drives: connect, bind,
//! accept, blocking-mode toggles, send, receive (optionally with a timeout) and
//! graceful close. The logic here is written once and runs over any socket
//! provider that implements [`SocketBackend`].
//!
//! ## Overview
//!
//! - **[`backend`](backend/index.html)**: the provider strategy trait and its fault classification
//! - **[`mapper`](mapper/index.html)**: the single table mapping provider faults onto [`NetError`]
//! - **[`resolver`](resolver/index.html)**: port parsing, bind literals, connect-side family fallback
//! - **[`adapter`](adapter/index.html)**: [`NetworkAdapter`] connect / bind / free
//! - **[`accept`](accept/index.html)**: TCP accept and the UDP single-peer pseudo-accept
//! - **[`io`](io/index.html)**: blocking mode, send, recv, recv with timeout
//!
//! ## Control Flow
//!
//! ```text
//! connect/bind -> resolver -> backend.create -> [listen] -> [accept] -> send/recv* -> free
//! ```
//!
//! [`NetError`]: entities_net::NetError

pub mod accept;
pub mod adapter;
pub mod backend;
pub mod io;
pub mod mapper;
pub mod resolver;

pub use accept::Accepted;
pub use adapter::NetworkAdapter;
pub use backend::{ProviderFault, SocketBackend};
pub use mapper::{map_fault, Operation};
pub use resolver::{parse_port, resolve_bind_address, resolve_connect_address};
