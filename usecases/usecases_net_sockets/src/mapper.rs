//! Error Mapper Module
//!
//! One table translating a classified provider fault into the unified error for
//! the operation that produced it. Both provider variants go through here, so
//! the TLS layer sees identical errors whichever provider is linked.

use entities_net::NetError;

use crate::backend::ProviderFault;

/// Adapter operation that produced a provider fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Provider bring-up or descriptor creation
    Create,
    Connect,
    Bind,
    Listen,
    /// TCP accept or the datagram peek of a UDP pseudo-accept
    Accept,
    Recv,
    Send,
    /// Setting the receive timeout option
    RecvTimeoutOption,
    /// Setting the blocking / non-blocking option
    BlockingOption,
}

/// Map a provider fault raised by `op` onto the unified taxonomy.
pub fn map_fault(op: Operation, fault: ProviderFault) -> NetError {
    use ProviderFault as F;

    match (op, fault) {
        (Operation::Create, _) => NetError::SocketCreateFailed,
        (Operation::Connect, _) => NetError::ConnectFailed,
        (Operation::Bind, _) => NetError::BindFailed,
        (Operation::Listen, _) => NetError::ListenFailed,

        (Operation::Accept, F::WouldBlock) => NetError::WantRead,
        (Operation::Accept, _) => NetError::AcceptFailed,

        (Operation::Recv, F::InvalidSocket) => NetError::InvalidContext,
        (Operation::Recv, F::WouldBlock) => NetError::WantRead,
        (Operation::Recv, F::Closed) => NetError::ConnectionReset,
        (Operation::Recv, F::Timeout) => NetError::Timeout,
        (Operation::Recv, _) => NetError::RecvFailed,

        (Operation::Send, F::InvalidSocket) => NetError::InvalidContext,
        (Operation::Send, F::WouldBlock) => NetError::WantWrite,
        (Operation::Send, F::Closed) => NetError::ConnectionReset,
        (Operation::Send, _) => NetError::SendFailed,

        (Operation::RecvTimeoutOption, F::InvalidSocket) => NetError::InvalidContext,
        (Operation::RecvTimeoutOption, _) => NetError::RecvFailed,

        (Operation::BlockingOption, F::InvalidSocket) => NetError::InvalidContext,
        (Operation::BlockingOption, _) => NetError::SetOptionFailed,
    }
}
