//! Infrastructure Layer: RTOS Contract
//!
//! Provides the small slice of an RTOS the network adapter consumes: millisecond
//! delays, thread creation with a fixed stack, and a binary wait/signal
//! rendezvous between a waiting thread and a callback running in provider
//! context.
//!
//! ## Modules
//!
//! - **[`kernel`](kernel/index.html)**: [`Kernel`] trait, [`StdKernel`] host implementation, [`usleep`]
//! - **[`signal`](signal/index.html)**: [`Rendezvous`], a one-shot wait/signal cell

pub mod kernel;
pub mod signal;

pub use kernel::{usleep, Kernel, StdKernel, ThreadSpec};
pub use signal::Rendezvous;
