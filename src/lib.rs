//! # lifeserve
//!
//! HTTP front-end for a Game of Life simulation service.
//!
//! Startup goes through four pieces, in order:
//!
//! - [`LifeService::new`] builds the simulation from a height and a width.
//! - [`routes::new`] turns the service into a base request handler.
//! - [`middleware::decorate`] wraps it with [`middleware::Logging`], one
//!   structured log line per completed request.
//! - [`Server`] binds the listener and serves on a background task,
//!   returning a [`ServerHandle`] for graceful shutdown.
//!
//! [`run`] does all four.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lifeserve::Error> {
//!     let logger = tracing_subscriber::fmt().finish().into();
//!     let server = lifeserve::run(&CancellationToken::new(), logger, 10, 10).await?;
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     server.shutdown_timeout(Duration::from_secs(5)).await
//! }
//! ```
//!
//! ## Logging
//!
//! Nothing here writes to the global `tracing` subscriber. The [`Dispatch`]
//! passed to [`run`] receives every event: the per-request line, listener
//! start and stop, and the error line if the listener dies after startup.
//!
//! [`Dispatch`]: tracing::Dispatch

mod app;
mod config;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod life;
pub mod middleware;
pub mod routes;

pub use app::{run, start};
pub use config::{DEFAULT_ADDR, ServerConfig};
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, boxed};
pub use life::LifeService;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{Server, ServerHandle};
