//! Network Adapter Module
//!
//! Connection setup and teardown. Every setup path releases the descriptor it
//! created before returning an error, so a failed connect or bind never leaves a
//! live descriptor behind.

use entities_net::{BoundState, NetConfig, NetContext, NetError, Protocol, LISTEN_BACKLOG};
use tracing::{debug, warn};

use crate::backend::SocketBackend;
use crate::mapper::{map_fault, Operation};
use crate::resolver::{resolve_bind_address, resolve_connect_address};

/// Network adapter over one socket provider
pub struct NetworkAdapter<B: SocketBackend> {
    pub(crate) backend: B,
    pub(crate) config: NetConfig,
}

impl<B: SocketBackend> NetworkAdapter<B> {
    pub fn new(backend: B, config: NetConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// A fresh, unset context.
    pub fn init(&self) -> NetContext<B::Descriptor> {
        NetContext::new()
    }

    /// Initiate a connection with `host:port` over `protocol`.
    ///
    /// For UDP this only fixes the default peer; no packet is exchanged.
    pub fn connect(
        &self,
        ctx: &mut NetContext<B::Descriptor>,
        host: &str,
        port: &str,
        protocol: Protocol,
    ) -> Result<(), NetError> {
        if ctx.is_set() {
            return Err(NetError::InvalidContext);
        }

        self.backend
            .prepare()
            .map_err(|fault| map_fault(Operation::Create, fault))?;

        let addr = resolve_connect_address(&self.backend, host, port, &self.config)?;

        let fd = self
            .backend
            .create(addr.family(), protocol)
            .map_err(|fault| map_fault(Operation::Create, fault))?;
        ctx.attach(fd, protocol);

        if let Err(fault) = self.backend.connect(fd, &addr) {
            warn!(%addr, %fault, "connect failed, releasing descriptor");
            self.free(ctx);
            return Err(map_fault(Operation::Connect, fault));
        }

        ctx.set_state(BoundState::Connected);
        debug!(%addr, ?protocol, ?fd, "connected");
        Ok(())
    }

    /// Create a socket bound to `bind_ip:port`; TCP sockets also start listening.
    ///
    /// `bind_ip` of `None` binds the wildcard address of the configured family.
    pub fn bind(
        &self,
        ctx: &mut NetContext<B::Descriptor>,
        bind_ip: Option<&str>,
        port: &str,
        protocol: Protocol,
    ) -> Result<(), NetError> {
        if ctx.is_set() {
            return Err(NetError::InvalidContext);
        }

        self.backend
            .prepare()
            .map_err(|fault| map_fault(Operation::Create, fault))?;

        let addr = resolve_bind_address(bind_ip, port, &self.config)?;

        let fd = self
            .backend
            .create(addr.family(), protocol)
            .map_err(|fault| map_fault(Operation::Create, fault))?;
        ctx.attach(fd, protocol);

        if let Err(fault) = self.backend.bind(fd, &addr) {
            warn!(%addr, %fault, "bind failed, releasing descriptor");
            self.free(ctx);
            return Err(map_fault(Operation::Bind, fault));
        }

        if protocol == Protocol::Tcp {
            if let Err(fault) = self.backend.listen(fd, LISTEN_BACKLOG) {
                warn!(%addr, %fault, "listen failed, releasing descriptor");
                self.free(ctx);
                return Err(map_fault(Operation::Listen, fault));
            }
        }

        ctx.set_state(BoundState::Listening);
        debug!(%addr, ?protocol, ?fd, "bound");
        Ok(())
    }

    /// Gracefully close the context. Closing an unset context is a no-op.
    pub fn free(&self, ctx: &mut NetContext<B::Descriptor>) {
        if let Some(fd) = ctx.take() {
            self.backend.close(fd);
            debug!(?fd, "descriptor released");
        }
    }
}
