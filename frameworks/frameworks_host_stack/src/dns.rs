//! Host DNS Client
//!
//! An asynchronous resolver in the shape of the RTOS DNS client: one lookup
//! at a time, answered by callback from a worker thread. A request made while
//! another is in flight is answered with `Busy`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use adapters_bsd_socket::{DnsCallback, DnsClient, DnsEvent, DnsStatus};
use entities_net::AddressFamily;
use infrastructure_rtos::{Kernel, StdKernel, ThreadSpec};
use tracing::{trace, warn};

use crate::stack::resolve_host;

const WORKER_STACK_SIZE: usize = 64 * 1024;

/// Threaded resolver over the OS name service
pub struct HostDnsClient<K: Kernel = StdKernel> {
    kernel: K,
    in_flight: Arc<AtomicBool>,
}

impl HostDnsClient<StdKernel> {
    pub fn new() -> Self {
        Self::with_kernel(StdKernel)
    }
}

impl Default for HostDnsClient<StdKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> HostDnsClient<K> {
    /// Resolver whose worker threads are started through `kernel`.
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a lookup is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl<K: Kernel> DnsClient for HostDnsClient<K> {
    fn get_host_by_name(&self, host: &str, family: AddressFamily, callback: DnsCallback) -> DnsStatus {
        if host.is_empty() {
            return DnsStatus::Error;
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return DnsStatus::Busy;
        }

        let name = host.to_owned();
        let in_flight = Arc::clone(&self.in_flight);
        let worker = Box::new(move || {
            let event = match resolve_host(&name, family) {
                Some(ip) => DnsEvent::Success(ip),
                None => DnsEvent::NotResolved,
            };
            trace!(host = %name, ?event, "lookup finished");
            in_flight.store(false, Ordering::SeqCst);
            callback(event);
        });

        match self.kernel.spawn(ThreadSpec::new("dns-client", WORKER_STACK_SIZE), worker) {
            Ok(_) => DnsStatus::Ok,
            Err(err) => {
                warn!(%err, "could not start resolver thread");
                self.in_flight.store(false, Ordering::SeqCst);
                DnsStatus::Error
            }
        }
    }
}
