//! I/O Operations
//!
//! Each operation wraps exactly one provider call plus error mapping. A context
//! without a descriptor is reported as `InvalidContext` without reaching the
//! provider.

use entities_net::{NetContext, NetError};

use crate::adapter::NetworkAdapter;
use crate::backend::SocketBackend;
use crate::mapper::{map_fault, Operation};

impl<B: SocketBackend> NetworkAdapter<B> {
    /// Put the descriptor in blocking mode.
    pub fn set_block(&self, ctx: &NetContext<B::Descriptor>) -> Result<(), NetError> {
        self.set_blocking_mode(ctx, false)
    }

    /// Put the descriptor in non-blocking mode.
    pub fn set_nonblock(&self, ctx: &NetContext<B::Descriptor>) -> Result<(), NetError> {
        self.set_blocking_mode(ctx, true)
    }

    fn set_blocking_mode(
        &self,
        ctx: &NetContext<B::Descriptor>,
        nonblocking: bool,
    ) -> Result<(), NetError> {
        let fd = ctx.descriptor().ok_or(NetError::InvalidContext)?;
        self.backend
            .set_nonblocking(fd, nonblocking)
            .map_err(|fault| map_fault(Operation::BlockingOption, fault))
    }

    /// Read at most `buf.len()` bytes.
    pub fn recv(&self, ctx: &NetContext<B::Descriptor>, buf: &mut [u8]) -> Result<usize, NetError> {
        let fd = ctx.descriptor().ok_or(NetError::InvalidContext)?;
        self.backend
            .recv(fd, buf)
            .map_err(|fault| map_fault(Operation::Recv, fault))
    }

    /// Read at most `buf.len()` bytes, blocking for at most `timeout_ms` milliseconds.
    pub fn recv_timeout(
        &self,
        ctx: &NetContext<B::Descriptor>,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<usize, NetError> {
        let fd = ctx.descriptor().ok_or(NetError::InvalidContext)?;
        self.backend
            .set_recv_timeout(fd, timeout_ms)
            .map_err(|fault| map_fault(Operation::RecvTimeoutOption, fault))?;
        self.recv(ctx, buf)
    }

    /// Write at most `buf.len()` bytes. A short count is not an error; the caller loops.
    pub fn send(&self, ctx: &NetContext<B::Descriptor>, buf: &[u8]) -> Result<usize, NetError> {
        let fd = ctx.descriptor().ok_or(NetError::InvalidContext)?;
        self.backend
            .send(fd, buf)
            .map_err(|fault| map_fault(Operation::Send, fault))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockSocketBackend, ProviderFault};
    use entities_net::{BoundState, NetConfig, Protocol};
    use mockall::predicate::*;
    use mockall::Sequence;

    fn connected(fd: i32) -> NetContext<i32> {
        NetContext::with_descriptor(fd, Protocol::Tcp, BoundState::Connected)
    }

    #[test]
    fn test_blocking_toggles() {
        let mut backend = MockSocketBackend::new();
        backend
            .expect_set_nonblocking()
            .with(eq(3), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));
        backend
            .expect_set_nonblocking()
            .with(eq(3), eq(false))
            .times(1)
            .returning(|_, _| Err(ProviderFault::Other(-1)));

        let adapter = NetworkAdapter::new(backend, NetConfig::default());
        let ctx = connected(3);
        assert_eq!(adapter.set_nonblock(&ctx), Ok(()));
        assert_eq!(adapter.set_block(&ctx), Err(NetError::SetOptionFailed));
    }

    #[test]
    fn test_operations_on_unset_context() {
        let mut backend = MockSocketBackend::new();
        backend.expect_recv().never();
        backend.expect_send().never();
        backend.expect_set_recv_timeout().never();
        backend.expect_set_nonblocking().never();

        let adapter = NetworkAdapter::new(backend, NetConfig::default());
        let ctx: NetContext<i32> = NetContext::new();
        let mut buf = [0u8; 8];
        assert_eq!(adapter.recv(&ctx, &mut buf), Err(NetError::InvalidContext));
        assert_eq!(adapter.recv_timeout(&ctx, &mut buf, 10), Err(NetError::InvalidContext));
        assert_eq!(adapter.send(&ctx, b"x"), Err(NetError::InvalidContext));
        assert_eq!(adapter.set_block(&ctx), Err(NetError::InvalidContext));
        assert_eq!(adapter.set_nonblock(&ctx), Err(NetError::InvalidContext));
    }

    #[test]
    fn test_recv_copies_data() {
        let mut backend = MockSocketBackend::new();
        backend.expect_recv().returning(|_, buf: &mut [u8]| {
            buf[..4].copy_from_slice(b"PING");
            Ok(4)
        });

        let adapter = NetworkAdapter::new(backend, NetConfig::default());
        let mut buf = [0u8; 16];
        assert_eq!(adapter.recv(&connected(1), &mut buf), Ok(4));
        assert_eq!(&buf[..4], b"PING");
    }

    #[test]
    fn test_recv_error_mapping() {
        let mut backend = MockSocketBackend::new();
        let mut seq = Sequence::new();
        for fault in [
            ProviderFault::WouldBlock,
            ProviderFault::Closed,
            ProviderFault::Timeout,
            ProviderFault::InvalidSocket,
        ] {
            backend
                .expect_recv()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _| Err(fault));
        }

        let adapter = NetworkAdapter::new(backend, NetConfig::default());
        let ctx = connected(1);
        let mut buf = [0u8; 4];
        assert_eq!(adapter.recv(&ctx, &mut buf), Err(NetError::WantRead));
        assert_eq!(adapter.recv(&ctx, &mut buf), Err(NetError::ConnectionReset));
        assert_eq!(adapter.recv(&ctx, &mut buf), Err(NetError::Timeout));
        assert_eq!(adapter.recv(&ctx, &mut buf), Err(NetError::InvalidContext));
    }

    #[test]
    fn test_recv_timeout_sets_option_then_reads() {
        let mut backend = MockSocketBackend::new();
        let mut seq = Sequence::new();
        backend
            .expect_set_recv_timeout()
            .with(eq(1), eq(250))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        backend
            .expect_recv()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(ProviderFault::Timeout));

        let adapter = NetworkAdapter::new(backend, NetConfig::default());
        let mut buf = [0u8; 4];
        assert_eq!(
            adapter.recv_timeout(&connected(1), &mut buf, 250),
            Err(NetError::Timeout)
        );
    }

    #[test]
    fn test_recv_timeout_option_failure_skips_read() {
        let mut backend = MockSocketBackend::new();
        backend
            .expect_set_recv_timeout()
            .returning(|_, _| Err(ProviderFault::Other(-3)));
        backend.expect_recv().never();

        let adapter = NetworkAdapter::new(backend, NetConfig::default());
        let mut buf = [0u8; 4];
        assert_eq!(
            adapter.recv_timeout(&connected(1), &mut buf, 0),
            Err(NetError::RecvFailed)
        );
    }

    #[test]
    fn test_send_partial_and_errors() {
        let mut backend = MockSocketBackend::new();
        let mut seq = Sequence::new();
        backend
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, buf: &[u8]| Ok(buf.len() / 2));
        backend
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(ProviderFault::WouldBlock));
        backend
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(ProviderFault::Closed));
        backend
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(ProviderFault::Other(-9)));

        let adapter = NetworkAdapter::new(backend, NetConfig::default());
        let ctx = connected(1);
        assert_eq!(adapter.send(&ctx, b"abcdef"), Ok(3));
        assert_eq!(adapter.send(&ctx, b"abcdef"), Err(NetError::WantWrite));
        assert_eq!(adapter.send(&ctx, b"abcdef"), Err(NetError::ConnectionReset));
        assert_eq!(adapter.send(&ctx, b"abcdef"), Err(NetError::SendFailed));
    }
}
