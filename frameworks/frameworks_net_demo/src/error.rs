use entities_net::NetError;
use thiserror::Error;

/// Failures of a netshim session
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("network error: {0}")]
    Net(#[from] NetError),

    #[error("peer closed after {received} of {expected} echoed bytes")]
    ShortEcho { received: usize, expected: usize },

    #[error("could not start the application thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("application thread exited without a result")]
    Panicked,
}
