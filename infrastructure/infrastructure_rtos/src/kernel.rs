//! Kernel Module
//!
//! The scheduler services the adapter relies on. On target these map onto the
//! RTOS delay and thread-creation calls; [`StdKernel`] maps them onto
//! `std::thread` for hosted builds and tests.

use std::io;
use std::thread;
use std::time::Duration;

/// Attributes for a new thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSpec {
    /// Thread name
    pub name: String,
    /// Fixed stack size in bytes
    pub stack_size: usize,
}

impl ThreadSpec {
    pub fn new(name: impl Into<String>, stack_size: usize) -> Self {
        Self {
            name: name.into(),
            stack_size,
        }
    }
}

/// RTOS services used by the network adapter
pub trait Kernel: Send + Sync {
    /// Suspend the calling thread for at least `duration`.
    fn delay(&self, duration: Duration);

    /// Start a thread with the given attributes.
    fn spawn(
        &self,
        spec: ThreadSpec,
        body: Box<dyn FnOnce() + Send + 'static>,
    ) -> io::Result<thread::JoinHandle<()>>;
}

/// Host kernel backed by `std::thread`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdKernel;

impl Kernel for StdKernel {
    fn delay(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }

    fn spawn(
        &self,
        spec: ThreadSpec,
        body: Box<dyn FnOnce() + Send + 'static>,
    ) -> io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name(spec.name)
            .stack_size(spec.stack_size)
            .spawn(body)
    }
}

/// Sleep for `usec` microseconds, rounded up to whole milliseconds.
pub fn usleep<K: Kernel + ?Sized>(kernel: &K, usec: u64) {
    let ms = usec.div_ceil(1000);
    kernel.delay(Duration::from_millis(ms));
}
