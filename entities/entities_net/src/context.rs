//! Connection Context Module
//!
//! A [`NetContext`] owns at most one provider descriptor together with the
//! transport protocol it was created for and where it is in its lifecycle:
//!
//! ```text
//! init -> connect | bind -> [listen] -> [accept] -> send/recv* -> free
//! ```
//!
//! The descriptor and the protocol are two separate fields. A context whose
//! descriptor is `None` holds no live resource.

/// Listen backlog used for every TCP listening context.
pub const LISTEN_BACKLOG: u32 = 3;

/// Transport protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    /// Stream (TCP)
    #[default]
    Tcp,
    /// Datagram (UDP)
    Udp,
}

impl Protocol {
    /// Numeric protocol selector used by the TLS layer (TCP = 0, UDP = 1).
    pub fn code(self) -> i32 {
        match self {
            Protocol::Tcp => 0,
            Protocol::Udp => 1,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Protocol::Tcp),
            1 => Some(Protocol::Udp),
            _ => None,
        }
    }
}

/// Lifecycle state of a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundState {
    /// No descriptor, or a descriptor not yet connected/bound
    #[default]
    Unbound,
    /// Connected to a remote peer
    Connected,
    /// Bound and ready to accept (TCP listen state, or an unconnected UDP socket)
    Listening,
    /// Produced by an accept
    Accepted,
}

/// Connection context owning one provider descriptor.
///
/// A context is driven by one flow of control at a time and is never shared
/// across threads without external synchronization.
#[derive(Debug, PartialEq, Eq)]
pub struct NetContext<D> {
    descriptor: Option<D>,
    protocol: Protocol,
    state: BoundState,
}

impl<D: Copy> NetContext<D> {
    /// Create an unset context (equivalent of `init`).
    pub fn new() -> Self {
        Self {
            descriptor: None,
            protocol: Protocol::Tcp,
            state: BoundState::Unbound,
        }
    }

    /// Wrap a live descriptor.
    pub fn with_descriptor(descriptor: D, protocol: Protocol, state: BoundState) -> Self {
        Self {
            descriptor: Some(descriptor),
            protocol,
            state,
        }
    }

    pub fn descriptor(&self) -> Option<D> {
        self.descriptor
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn state(&self) -> BoundState {
        self.state
    }

    pub fn is_set(&self) -> bool {
        self.descriptor.is_some()
    }

    /// Install a freshly created descriptor; the context must be unset.
    pub fn attach(&mut self, descriptor: D, protocol: Protocol) {
        debug_assert!(self.descriptor.is_none(), "context already owns a descriptor");
        self.descriptor = Some(descriptor);
        self.protocol = protocol;
        self.state = BoundState::Unbound;
    }

    pub fn set_state(&mut self, state: BoundState) {
        self.state = state;
    }

    /// Give up ownership of the descriptor, leaving the context unset.
    pub fn take(&mut self) -> Option<D> {
        self.state = BoundState::Unbound;
        self.descriptor.take()
    }
}

impl<D: Copy> Default for NetContext<D> {
    fn default() -> Self {
        Self::new()
    }
}
