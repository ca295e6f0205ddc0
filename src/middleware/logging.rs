//! Per-request access logging.

use std::sync::Arc;
use std::time::Instant;

use tracing::{Dispatch, info};

use super::Middleware;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;

/// Emits one `INFO` event per completed request with `method`, `path` and
/// `duration` fields.
///
/// Events go to the [`Dispatch`] given at construction, not to the
/// thread's default subscriber.
///
/// The event is recorded after the wrapped handler returns. If the handler
/// panics, the unwind skips the recording step and the request leaves no
/// log line.
#[derive(Clone)]
pub struct Logging {
    logger: Dispatch,
}

impl Logging {
    pub fn new(logger: Dispatch) -> Self {
        Self { logger }
    }
}

impl Middleware for Logging {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(LoggingHandler { next, logger: self.logger.clone() })
    }
}

struct LoggingHandler {
    next: BoxedHandler,
    logger: Dispatch,
}

impl ErasedHandler for LoggingHandler {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Arc::clone(&self.next);
        let logger = self.logger.clone();
        let method = req.method().clone();
        let path = req.path().to_owned();

        Box::pin(async move {
            let start = Instant::now();
            let response = next.call(req).await;
            let duration = start.elapsed();

            tracing::dispatcher::with_default(&logger, || {
                info!(method = %method, path = %path, duration = ?duration, "HTTP request");
            });
            response
        })
    }
}
