//! Listener lifecycle and graceful shutdown.
//!
//! [`Server::spawn`] moves the accept loop onto a background task and hands
//! back a [`ServerHandle`]. Calling [`ServerHandle::shutdown`]:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Asks every open connection to finish its in-flight request and close.
//! 3. Waits for the drain, up to the caller's deadline.
//!
//! Connections still open when the deadline passes are abandoned: they keep
//! running detached until they finish on their own or the process exits.

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, debug, error, info, warn};

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::Response;

/// A bound listener paired with the handler that will serve it.
pub struct Server {
    listener: TcpListener,
    handler: BoxedHandler,
    local_addr: SocketAddr,
}

impl Server {
    /// Binds `addr`. Once this returns, the OS queues incoming connections
    /// even before [`spawn`](Server::spawn) starts accepting them.
    pub async fn bind(addr: SocketAddr, handler: BoxedHandler) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| Error::Bind { addr, source })?;
        Ok(Self { listener, handler, local_addr })
    }

    /// The bound address; differs from the requested one when port 0 was used.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Starts accepting on a background task and returns without waiting
    /// for it.
    ///
    /// Every event the server emits, including the failure of the accept
    /// loop, goes to `logger`. A failure after this point is logged only;
    /// it is not reported through the returned handle.
    pub fn spawn(self, logger: Dispatch) -> ServerHandle {
        spawn_loop(self.listener, self.handler, self.local_addr, logger)
    }
}

/// Source of inbound connections for the accept loop.
pub(crate) trait Accept: Send + 'static {
    fn accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send;
}

impl Accept for TcpListener {
    fn accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        TcpListener::accept(self)
    }
}

pub(crate) fn spawn_loop<L: Accept>(
    listener: L,
    handler: BoxedHandler,
    local_addr: SocketAddr,
    logger: Dispatch,
) -> ServerHandle {
    let stop = CancellationToken::new();
    let serve = serve(listener, handler, local_addr, stop.clone());
    let task = tokio::spawn(supervise(serve).with_subscriber(logger));
    ServerHandle { local_addr, stop, task }
}

const BACKOFF_START: Duration = Duration::from_millis(5);
const BACKOFF_MAX: Duration = Duration::from_secs(1);

async fn serve<L: Accept>(
    mut listener: L,
    handler: BoxedHandler,
    local_addr: SocketAddr,
    stop: CancellationToken,
) -> Result<(), Error> {
    info!(addr = %local_addr, "listening");

    // Every connection task lives here so shutdown can wait for all of them.
    let mut tasks = JoinSet::new();
    let mut backoff = Duration::ZERO;

    loop {
        tokio::select! {
            // Shutdown wins over queued connections.
            biased;

            () = stop.cancelled() => {
                info!(in_flight = tasks.len(), "draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => match classify(&e) {
                        AcceptFailure::Connection => {
                            debug!(error = %e, "accept error");
                            continue;
                        }
                        AcceptFailure::Exhausted => {
                            backoff = (backoff * 2).clamp(BACKOFF_START, BACKOFF_MAX);
                            warn!(error = %e, retry_in = ?backoff, "accept failed, backing off");
                            tokio::select! {
                                () = stop.cancelled() => {}
                                () = tokio::time::sleep(backoff) => {}
                            }
                            continue;
                        }
                        AcceptFailure::Fatal => {
                            // Open connections outlive the listener.
                            tasks.detach_all();
                            return Err(Error::Accept(e));
                        }
                    },
                };
                backoff = Duration::ZERO;

                let conn = connection(stream, peer, Arc::clone(&handler), stop.clone());
                tasks.spawn(conn.with_current_subscriber());
            }

            // Reap finished connection tasks so the set stays bounded.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);
    while tasks.join_next().await.is_some() {}

    info!("server stopped");
    Ok(())
}

/// Runs the accept loop to completion and logs how it ended, if badly.
pub(crate) async fn supervise(serve: impl Future<Output = Result<(), Error>>) {
    if let Err(e) = serve.await {
        error!(error = %e, "listener terminated");
    }
}

#[derive(Debug, PartialEq, Eq)]
enum AcceptFailure {
    /// One half-open connection went away; accept again at once.
    Connection,
    /// Out of descriptors, buffers or memory (EMFILE, ENFILE, ENOBUFS,
    /// ENOMEM and anything else unrecognised); retry after a pause.
    Exhausted,
    /// The listening socket itself is unusable.
    Fatal,
}

fn classify(e: &io::Error) -> AcceptFailure {
    match e.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::Interrupted
        | io::ErrorKind::TimedOut
        | io::ErrorKind::WouldBlock => AcceptFailure::Connection,
        io::ErrorKind::InvalidInput | io::ErrorKind::Unsupported => AcceptFailure::Fatal,
        _ => AcceptFailure::Exhausted,
    }
}

// ── Connections ───────────────────────────────────────────────────────────────

async fn connection(stream: TcpStream, peer: SocketAddr, handler: BoxedHandler, stop: CancellationToken) {
    let io = TokioIo::new(stream);

    // Called once per request on the connection, not once per connection.
    let svc = service_fn(move |req| dispatch(Arc::clone(&handler), req));

    // `auto::Builder` serves HTTP/1.1 or HTTP/2, whichever the client speaks.
    let builder = ConnBuilder::new(TokioExecutor::new());
    let conn = builder.serve_connection(io, svc);
    tokio::pin!(conn);

    let result = tokio::select! {
        res = conn.as_mut() => res,
        () = stop.cancelled() => {
            // Finish the request in flight, then close. Idle keep-alive
            // connections close right away.
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };

    if let Err(e) = result {
        debug!(peer = %peer, "connection error: {e}");
    }
}

/// Buffers the body, runs the handler chain, converts the response.
///
/// All failures become HTTP responses, so hyper never sees an error.
async fn dispatch(
    handler: BoxedHandler,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!(error = %e, "failed to read request body");
            return Ok(Response::status(StatusCode::BAD_REQUEST).into_inner());
        }
    };

    let response = handler.call(Request::from_parts(parts, body)).await;
    Ok(response.into_inner())
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Owner's side of a running server.
///
/// [`shutdown`](ServerHandle::shutdown) consumes the handle, so it can be
/// called at most once. Dropping the handle without calling it leaves the
/// server running until the process exits.
#[must_use = "dropping the handle leaves the server running with no way to stop it"]
pub struct ServerHandle {
    local_addr: SocketAddr,
    stop: CancellationToken,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting and drains open connections until `deadline`.
    ///
    /// Returns [`Error::DeadlineExceeded`] if `deadline` has already passed
    /// or passes before the drain completes. The stop signal is sent either
    /// way.
    pub async fn shutdown(self, deadline: Instant) -> Result<(), Error> {
        self.stop.cancel();
        if Instant::now() >= deadline {
            return Err(Error::DeadlineExceeded);
        }

        match tokio::time::timeout_at(deadline, self.task).await {
            Ok(joined) => Ok(joined?),
            Err(_) => Err(Error::DeadlineExceeded),
        }
    }

    /// [`shutdown`](ServerHandle::shutdown) with a deadline `grace` from now.
    pub async fn shutdown_timeout(self, grace: Duration) -> Result<(), Error> {
        self.shutdown(Instant::now() + grace).await
    }
}
