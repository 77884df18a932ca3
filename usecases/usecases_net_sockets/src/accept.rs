//! Listener / Accept Engine
//!
//! TCP listening contexts hand out one new descriptor per accepted connection.
//! UDP has no accept: [`NetworkAdapter::receive_first_datagram_and_bind_peer`]
//! peeks at the first queued datagram, connects the bound descriptor to its
//! sender so that all later I/O is filtered to that single peer, and moves the
//! descriptor into the client context. The listening context is left unset and
//! must be bound again before another peer can be accepted. Concurrent UDP peers
//! on one bound port are not supported.

use std::net::{IpAddr, SocketAddr};

use entities_net::{BoundState, NetContext, NetError, Protocol, ResolvedAddress};
use tracing::debug;

use crate::adapter::NetworkAdapter;
use crate::backend::SocketBackend;
use crate::mapper::{map_fault, Operation};

/// Result of a successful accept
#[derive(Debug)]
pub struct Accepted<D> {
    /// Context for the accepted peer, in state [`BoundState::Accepted`]
    pub client: NetContext<D>,
    /// Peer address, when the provider reported one
    pub peer: Option<SocketAddr>,
}

impl<D: Copy> Accepted<D> {
    /// Copy the raw peer IP octets into `buf`, returning the number written.
    ///
    /// The capacity is checked first; on `BufferTooSmall` nothing is written.
    /// Returns 0 when no peer address is known.
    pub fn peer_ip_into(&self, buf: &mut [u8]) -> Result<usize, NetError> {
        let Some(peer) = self.peer else {
            return Ok(0);
        };

        let octets: Vec<u8> = match peer.ip() {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        };
        if buf.len() < octets.len() {
            return Err(NetError::BufferTooSmall);
        }

        buf[..octets.len()].copy_from_slice(&octets);
        Ok(octets.len())
    }
}

impl<B: SocketBackend> NetworkAdapter<B> {
    /// Accept a peer on a listening context, dispatching on its protocol.
    pub fn accept(
        &self,
        listener: &mut NetContext<B::Descriptor>,
    ) -> Result<Accepted<B::Descriptor>, NetError> {
        if !listener.is_set() || listener.state() != BoundState::Listening {
            return Err(NetError::AcceptFailed);
        }

        match listener.protocol() {
            Protocol::Tcp => self.accept_stream(listener),
            Protocol::Udp => self.receive_first_datagram_and_bind_peer(listener),
        }
    }

    /// TCP accept. Would-block maps to `WantRead`.
    pub fn accept_stream(
        &self,
        listener: &NetContext<B::Descriptor>,
    ) -> Result<Accepted<B::Descriptor>, NetError> {
        let fd = listener.descriptor().ok_or(NetError::AcceptFailed)?;

        let (client_fd, peer) = self
            .backend
            .accept(fd)
            .map_err(|fault| map_fault(Operation::Accept, fault))?;

        debug!(?client_fd, ?peer, "accepted stream connection");
        Ok(Accepted {
            client: NetContext::with_descriptor(client_fd, Protocol::Tcp, BoundState::Accepted),
            peer,
        })
    }

    /// UDP pseudo-accept: peek the first datagram's sender and bind the socket to it.
    ///
    /// On success the listener is invalidated and its descriptor now belongs to
    /// the returned client context. On failure the listener keeps its descriptor.
    pub fn receive_first_datagram_and_bind_peer(
        &self,
        listener: &mut NetContext<B::Descriptor>,
    ) -> Result<Accepted<B::Descriptor>, NetError> {
        let fd = listener.descriptor().ok_or(NetError::AcceptFailed)?;

        let peer = self
            .backend
            .peek_sender(fd)
            .map_err(|fault| map_fault(Operation::Accept, fault))?;

        self.backend
            .connect(fd, &ResolvedAddress::from(peer))
            .map_err(|_| NetError::AcceptFailed)?;

        listener.take();
        debug!(?fd, %peer, "datagram peer bound, listener handed over");
        Ok(Accepted {
            client: NetContext::with_descriptor(fd, Protocol::Udp, BoundState::Accepted),
            peer: Some(peer),
        })
    }
}
