//! DNS Synchronization Bridge
//!
//! Turns the callback-driven resolver into a blocking lookup for the calling
//! thread. Each request gets its own [`Rendezvous`]; the callback captures a
//! handle to it, so a late or stray callback can only ever reach the call that
//! issued it. Issue and wait are serialised by a single-flight lock, which
//! keeps at most one request outstanding per bridge even when several threads
//! connect at once.
//!
//! A `Busy` answer is retried after `dns_poll_interval`. Without a
//! `resolve_timeout` the retries never stop; with one, they stop once the
//! accumulated backoff reaches it. The wait for the callback itself has no
//! timeout: an accepted request always completes.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use entities_net::{AddressFamily, NetConfig};
use infrastructure_rtos::{Kernel, Rendezvous};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::dns::{DnsCallback, DnsClient, DnsEvent, DnsStatus};

/// Blocking front end over an asynchronous [`DnsClient`]
pub struct DnsBridge<D: DnsClient, K: Kernel> {
    client: D,
    kernel: K,
    poll_interval: Duration,
    busy_timeout: Option<Duration>,
    in_flight: Mutex<()>,
}

impl<D: DnsClient, K: Kernel> DnsBridge<D, K> {
    pub fn new(client: D, kernel: K, config: &NetConfig) -> Self {
        Self {
            client,
            kernel,
            poll_interval: config.dns_poll_interval,
            busy_timeout: config.resolve_timeout,
            in_flight: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &D {
        &self.client
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Resolve `host` for one family, blocking until the resolver answers.
    ///
    /// Returns `None` when the request is rejected, the callback reports
    /// anything other than success, or the busy backoff runs out.
    pub fn resolve(&self, host: &str, family: AddressFamily) -> Option<IpAddr> {
        let _single_flight = self.in_flight.lock();
        let mut waited = Duration::ZERO;

        loop {
            let rendezvous = Arc::new(Rendezvous::new());
            let callback: DnsCallback = {
                let rendezvous = Arc::clone(&rendezvous);
                Box::new(move |event| rendezvous.signal(event))
            };

            match self.client.get_host_by_name(host, family, callback) {
                DnsStatus::Ok => {
                    return match rendezvous.wait() {
                        DnsEvent::Success(ip) => {
                            debug!(host, %ip, "resolved");
                            Some(ip)
                        }
                        event => {
                            debug!(host, ?family, ?event, "resolution failed");
                            None
                        }
                    };
                }
                DnsStatus::Busy => {
                    if let Some(limit) = self.busy_timeout {
                        if waited >= limit {
                            warn!(host, ?waited, "resolver stayed busy, giving up");
                            return None;
                        }
                    }
                    trace!(host, ?waited, "resolver busy, retrying");
                    self.kernel.delay(self.poll_interval);
                    waited += self.poll_interval;
                }
                DnsStatus::Error => {
                    debug!(host, ?family, "resolver rejected request");
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::MockDnsClient;
    use infrastructure_rtos::{StdKernel, ThreadSpec};
    use mockall::predicate::*;
    use mockall::Sequence;
    use std::io;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[derive(Default)]
    struct RecordingKernel {
        delays: Mutex<Vec<Duration>>,
    }

    impl Kernel for RecordingKernel {
        fn delay(&self, duration: Duration) {
            self.delays.lock().push(duration);
        }

        fn spawn(
            &self,
            spec: ThreadSpec,
            body: Box<dyn FnOnce() + Send + 'static>,
        ) -> io::Result<thread::JoinHandle<()>> {
            StdKernel.spawn(spec, body)
        }
    }

    const ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));

    #[test]
    fn test_callback_on_another_thread_wakes_caller() {
        let mut client = MockDnsClient::new();
        client
            .expect_get_host_by_name()
            .with(eq("broker.example"), eq(AddressFamily::Ipv4), always())
            .times(1)
            .returning(|_, _, callback| {
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(20));
                    callback(DnsEvent::Success(ADDR));
                });
                DnsStatus::Ok
            });

        let bridge = DnsBridge::new(client, RecordingKernel::default(), &NetConfig::default());
        assert_eq!(bridge.resolve("broker.example", AddressFamily::Ipv4), Some(ADDR));
        assert!(bridge.kernel().delays.lock().is_empty());
    }

    #[test]
    fn test_callback_before_wait_is_not_lost() {
        let mut client = MockDnsClient::new();
        client.expect_get_host_by_name().returning(|_, _, callback| {
            callback(DnsEvent::Success(ADDR));
            DnsStatus::Ok
        });

        let bridge = DnsBridge::new(client, RecordingKernel::default(), &NetConfig::default());
        assert_eq!(bridge.resolve("fast", AddressFamily::Ipv4), Some(ADDR));
    }

    #[test]
    fn test_failure_events_yield_none() {
        for event in [DnsEvent::Timeout, DnsEvent::NotResolved, DnsEvent::Error] {
            let mut client = MockDnsClient::new();
            client.expect_get_host_by_name().times(1).returning(move |_, _, callback| {
                callback(event);
                DnsStatus::Ok
            });

            let bridge = DnsBridge::new(client, RecordingKernel::default(), &NetConfig::default());
            assert_eq!(bridge.resolve("missing", AddressFamily::Ipv4), None);
        }
    }

    #[test]
    fn test_rejected_request_does_not_wait() {
        let mut client = MockDnsClient::new();
        client
            .expect_get_host_by_name()
            .times(1)
            .returning(|_, _, _| DnsStatus::Error);

        let bridge = DnsBridge::new(client, RecordingKernel::default(), &NetConfig::default());
        assert_eq!(bridge.resolve("bad name", AddressFamily::Ipv6), None);
        assert!(bridge.kernel().delays.lock().is_empty());
    }

    #[test]
    fn test_busy_is_retried_after_poll_interval() {
        let mut client = MockDnsClient::new();
        let mut seq = Sequence::new();
        client
            .expect_get_host_by_name()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _, _| DnsStatus::Busy);
        client
            .expect_get_host_by_name()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, callback| {
                callback(DnsEvent::Success(ADDR));
                DnsStatus::Ok
            });

        let bridge = DnsBridge::new(client, RecordingKernel::default(), &NetConfig::default());
        assert_eq!(bridge.resolve("busy", AddressFamily::Ipv4), Some(ADDR));
        assert_eq!(
            *bridge.kernel().delays.lock(),
            vec![Duration::from_millis(100); 2]
        );
    }

    #[test]
    fn test_busy_backoff_is_bounded_by_resolve_timeout() {
        let mut client = MockDnsClient::new();
        client
            .expect_get_host_by_name()
            .times(4)
            .returning(|_, _, _| DnsStatus::Busy);

        let config = NetConfig::default().with_resolve_timeout(Some(Duration::from_millis(250)));
        let bridge = DnsBridge::new(client, RecordingKernel::default(), &config);
        assert_eq!(bridge.resolve("stuck", AddressFamily::Ipv4), None);
        assert_eq!(bridge.kernel().delays.lock().len(), 3);
    }

    struct OverlapDetector {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl DnsClient for OverlapDetector {
        fn get_host_by_name(
            &self,
            _host: &str,
            _family: AddressFamily,
            callback: DnsCallback,
        ) -> DnsStatus {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            self.active.fetch_sub(1, Ordering::SeqCst);
            callback(DnsEvent::Success(ADDR));
            DnsStatus::Ok
        }
    }

    #[test]
    fn test_concurrent_resolutions_are_serialised() {
        let client = OverlapDetector {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        let bridge = Arc::new(DnsBridge::new(client, StdKernel, &NetConfig::default()));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let bridge = Arc::clone(&bridge);
                thread::spawn(move || bridge.resolve("shared", AddressFamily::Ipv4))
            })
            .collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), Some(ADDR));
        }
        assert_eq!(bridge.client().peak.load(Ordering::SeqCst), 1);
    }
}
