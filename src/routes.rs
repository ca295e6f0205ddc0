//! HTTP routes for the simulation service.
//!
//! | Method | Path         | Response |
//! |--------|--------------|----------|
//! | GET    | `/`          | current world |
//! | GET    | `/nextstate` | world after one more generation |
//!
//! Worlds are rendered as text (`#` live, `.` dead) with the generation
//! number in the `x-generation` header.

use std::sync::Arc;

use http::Method;
use tokio_util::sync::CancellationToken;

use crate::handler::BoxedHandler;
use crate::life::{LifeService, Snapshot};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("cancelled before routes were built")]
    Cancelled,

    #[error("route registration: {0}")]
    Route(#[from] matchit::InsertError),
}

/// Builds the base request handler around `service`.
pub fn new(ctx: &CancellationToken, service: Arc<LifeService>) -> Result<BoxedHandler, BuildError> {
    if ctx.is_cancelled() {
        return Err(BuildError::Cancelled);
    }

    let current = Arc::clone(&service);
    let advance = service;

    let router = Router::new()
        .on(Method::GET, "/", move |_req: Request| {
            let svc = Arc::clone(&current);
            async move { render(svc.current()) }
        })?
        .on(Method::GET, "/nextstate", move |_req: Request| {
            let svc = Arc::clone(&advance);
            async move { render(svc.advance()) }
        })?;

    Ok(router.into_handler())
}

fn render(snapshot: Snapshot) -> Response {
    Response::builder()
        .header("x-generation", &snapshot.generation.to_string())
        .text(snapshot.to_string())
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::life::World;

    fn glider_service() -> Arc<LifeService> {
        let mut world = World::new(6, 6).unwrap();
        for (r, c) in [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)] {
            world.set(r, c, true);
        }
        Arc::new(LifeService::from_world(world))
    }

    #[tokio::test]
    async fn root_shows_current_generation() {
        let svc = glider_service();
        let handler = new(&CancellationToken::new(), Arc::clone(&svc)).unwrap();

        let res = handler.call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.header("x-generation"), Some("0"));
        assert_eq!(res.body(), svc.current().to_string().as_bytes());
    }

    #[tokio::test]
    async fn nextstate_advances() {
        let svc = glider_service();
        let expected = svc.current().world.next_state();
        let handler = new(&CancellationToken::new(), Arc::clone(&svc)).unwrap();

        let res = handler.call(Request::new(Method::GET, "/nextstate")).await;
        assert_eq!(res.header("x-generation"), Some("1"));
        assert_eq!(res.body(), expected.to_string().as_bytes());
        assert_eq!(svc.current().generation, 1);
    }

    #[test]
    fn cancelled_context_fails() {
        let ctx = CancellationToken::new();
        ctx.cancel();
        assert!(matches!(new(&ctx, glider_service()), Err(BuildError::Cancelled)));
    }
}
