//! Startup: service, handler chain, listener.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Dispatch;

use crate::config::ServerConfig;
use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::life::LifeService;
use crate::middleware::{self, Logging};
use crate::routes;
use crate::server::{Server, ServerHandle};

/// Starts the simulation server on `0.0.0.0:8081`.
///
/// Shorthand for [`start`] with [`ServerConfig::new`].
pub async fn run(
    ctx: &CancellationToken,
    logger: Dispatch,
    height: usize,
    width: usize,
) -> Result<ServerHandle, Error> {
    start(ctx, logger, ServerConfig::new(height, width)).await
}

/// Builds the service and handler chain, binds the listener and starts
/// serving in the background.
///
/// Errors returned here are startup errors only; nothing is left bound when
/// one occurs. Once the handle is returned the listener is accepting, and a
/// later listener failure is reported to `logger`, not to the caller.
pub async fn start(
    ctx: &CancellationToken,
    logger: Dispatch,
    config: ServerConfig,
) -> Result<ServerHandle, Error> {
    let service = LifeService::new(config.height, config.width)?;
    let handler = build_handler(ctx, &logger, Arc::new(service))?;

    let server = Server::bind(config.addr, handler).await?;
    Ok(server.spawn(logger))
}

fn build_handler(
    ctx: &CancellationToken,
    logger: &Dispatch,
    service: Arc<LifeService>,
) -> Result<BoxedHandler, Error> {
    let base = routes::new(ctx, service).map_err(Error::HandlerInit)?;
    Ok(middleware::decorate(base, vec![Box::new(Logging::new(logger.clone()))]))
}
