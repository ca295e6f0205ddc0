//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. A router is itself a
//! handler, so the finished table can be decorated and served like any other.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::{InsertError, Router as MatchitRouter};

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup, then turn it into a [`BoxedHandler`] with
/// [`Router::into_handler`]. Each [`Router::on`] call returns `self` so
/// registrations chain with `?`.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Fails if the path is malformed or conflicts with an existing route.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Result<Self, InsertError> {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())?;
        Ok(self)
    }

    pub fn into_handler(self) -> BoxedHandler {
        Arc::new(self)
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<BoxedHandler> {
        let matched = self.routes.get(method)?.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl ErasedHandler for Router {
    fn call(&self, req: Request) -> BoxFuture {
        match self.lookup(&req.method, &req.path) {
            Some(handler) => handler.call(req),
            None => Box::pin(async { Response::status(StatusCode::NOT_FOUND) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_path(req: Request) -> String {
        req.path().to_owned()
    }

    #[tokio::test]
    async fn routes_by_method_and_path() {
        let router = Router::new()
            .on(Method::GET, "/nextstate", echo_path)
            .unwrap();

        let res = router.call(Request::new(Method::GET, "/nextstate")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"/nextstate");

        let res = router.call(Request::new(Method::POST, "/nextstate")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let res = router.call(Request::new(Method::GET, "/nowhere")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflicting_route_is_an_error() {
        let result = Router::new()
            .on(Method::GET, "/", echo_path)
            .and_then(|r| r.on(Method::GET, "/", echo_path));
        assert!(result.is_err());
    }
}
