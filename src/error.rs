//! Unified error type.

use std::net::SocketAddr;

use crate::life::ServiceError;
use crate::routes::BuildError;

/// The error type returned by lifeserve's fallible operations.
///
/// Application-level failures (404 and friends) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// startup failures, listener failures and shutdown failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The simulation service rejected its configuration.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The route table could not be built.
    #[error("handler initialization error: {0}")]
    HandlerInit(#[source] BuildError),

    #[error("bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop hit an error it cannot recover from.
    #[error("accept: {0}")]
    Accept(#[source] std::io::Error),

    /// The shutdown deadline passed before every connection drained.
    #[error("shutdown deadline exceeded before connections drained")]
    DeadlineExceeded,

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
