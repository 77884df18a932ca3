//! Unified Error Taxonomy
//!
//! Every provider-native failure is mapped onto [`NetError`] before it reaches the
//! TLS layer. The numeric codes returned by [`NetError::code`] are the ones the
//! record layer already understands.

use thiserror::Error;

/// Errors surfaced by the network adapter.
///
/// `WantRead` and `WantWrite` are not failures: they tell a caller driving a
/// non-blocking context to retry later. Everything else is terminal for the
/// operation that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum NetError {
    /// Host name or port could not be turned into an address.
    #[error("unknown host")]
    UnknownHost,
    /// The provider refused to create a descriptor.
    #[error("failed to open a socket")]
    SocketCreateFailed,
    /// The connection could not be established.
    #[error("connection failed")]
    ConnectFailed,
    /// Binding to the local address failed.
    #[error("binding of the socket failed")]
    BindFailed,
    /// Entering the listen state failed.
    #[error("could not listen on the socket")]
    ListenFailed,
    /// Accepting a peer failed.
    #[error("could not accept the incoming connection")]
    AcceptFailed,
    /// The caller buffer cannot hold the peer address.
    #[error("buffer is too small to hold the data")]
    BufferTooSmall,
    /// The context does not hold a usable descriptor.
    #[error("the context is invalid")]
    InvalidContext,
    /// The peer closed or reset the connection.
    #[error("connection was reset by peer")]
    ConnectionReset,
    /// The receive timeout expired.
    #[error("the operation timed out")]
    Timeout,
    /// Non-blocking receive has no data yet.
    #[error("operation would block on read")]
    WantRead,
    /// Non-blocking send cannot accept data yet.
    #[error("operation would block on write")]
    WantWrite,
    /// Reading from the descriptor failed.
    #[error("reading information from the socket failed")]
    RecvFailed,
    /// Writing to the descriptor failed.
    #[error("sending information through the socket failed")]
    SendFailed,
    /// Changing the blocking mode of the descriptor failed.
    #[error("could not change the socket blocking mode")]
    SetOptionFailed,
}

impl NetError {
    const ALL: [NetError; 15] = [
        NetError::UnknownHost,
        NetError::SocketCreateFailed,
        NetError::ConnectFailed,
        NetError::BindFailed,
        NetError::ListenFailed,
        NetError::AcceptFailed,
        NetError::BufferTooSmall,
        NetError::InvalidContext,
        NetError::ConnectionReset,
        NetError::Timeout,
        NetError::WantRead,
        NetError::WantWrite,
        NetError::RecvFailed,
        NetError::SendFailed,
        NetError::SetOptionFailed,
    ];

    /// Numeric code understood by the TLS/record layer.
    pub fn code(self) -> i32 {
        match self {
            NetError::SocketCreateFailed => -0x0042,
            NetError::BufferTooSmall => -0x0043,
            NetError::ConnectFailed => -0x0044,
            NetError::InvalidContext => -0x0045,
            NetError::BindFailed => -0x0046,
            NetError::ListenFailed => -0x0048,
            NetError::AcceptFailed => -0x004A,
            NetError::RecvFailed => -0x004C,
            NetError::SendFailed => -0x004E,
            NetError::ConnectionReset => -0x0050,
            NetError::UnknownHost => -0x0052,
            NetError::Timeout => -0x6800,
            NetError::WantWrite => -0x6880,
            NetError::WantRead => -0x6900,
            NetError::SetOptionFailed => -1,
        }
    }

    /// Inverse of [`NetError::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|err| err.code() == code)
    }

    /// True for the "retry later" signals of non-blocking use.
    pub fn is_retryable(self) -> bool {
        matches!(self, NetError::WantRead | NetError::WantWrite)
    }
}
