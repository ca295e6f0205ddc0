//! Middleware layer.
//!
//! A middleware turns one [`BoxedHandler`] into another that wraps it, and is
//! the place for cross-cutting concerns that run before and after the wrapped
//! handler. The one shipped here is [`Logging`].
//!
//! Order is significant: in `decorate(h, vec![a, b])`, `a` sees the request
//! first and the response last.
//!
//! ```text
//! request → a → b → h
//! response ← a ← b ← h
//! ```

mod logging;

pub use logging::Logging;

use crate::handler::BoxedHandler;

/// Wraps a handler in another handler.
///
/// Implemented for any `Fn(BoxedHandler) -> BoxedHandler` closure, so small
/// middleware can be written inline.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        self(next)
    }
}

/// Wraps `handler` with every middleware in `middleware`.
///
/// The first entry becomes the outermost wrapper. Decoration itself cannot
/// fail; an empty list returns `handler` unchanged.
pub fn decorate(handler: BoxedHandler, middleware: Vec<Box<dyn Middleware>>) -> BoxedHandler {
    middleware
        .iter()
        .rev()
        .fold(handler, |next, layer| layer.wrap(next))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use http::Method;

    use super::*;
    use crate::handler::{BoxFuture, ErasedHandler, boxed};
    use crate::request::Request;

    type Trail = Arc<Mutex<Vec<String>>>;

    struct Tag {
        name: &'static str,
        trail: Trail,
        next: BoxedHandler,
    }

    impl ErasedHandler for Tag {
        fn call(&self, req: Request) -> BoxFuture {
            let (name, trail, next) = (self.name, Arc::clone(&self.trail), Arc::clone(&self.next));
            Box::pin(async move {
                trail.lock().unwrap().push(format!("{name}:before"));
                let res = next.call(req).await;
                trail.lock().unwrap().push(format!("{name}:after"));
                res
            })
        }
    }

    fn tag(name: &'static str, trail: &Trail) -> Box<dyn Middleware> {
        let trail = Arc::clone(trail);
        Box::new(move |next: BoxedHandler| -> BoxedHandler {
            Arc::new(Tag { name, trail: Arc::clone(&trail), next })
        })
    }

    #[tokio::test]
    async fn first_middleware_is_outermost() {
        let trail: Trail = Arc::default();
        let inner = Arc::clone(&trail);
        let handler = boxed(move |_req: Request| {
            let inner = Arc::clone(&inner);
            async move {
                inner.lock().unwrap().push("handler".to_owned());
                "ok"
            }
        });

        let decorated = decorate(handler, vec![tag("a", &trail), tag("b", &trail)]);
        let res = decorated.call(Request::new(Method::GET, "/")).await;

        assert_eq!(res.body(), b"ok");
        assert_eq!(
            *trail.lock().unwrap(),
            ["a:before", "b:before", "handler", "b:after", "a:after"]
        );
    }

    #[tokio::test]
    async fn empty_chain_is_identity() {
        let handler = boxed(|_req: Request| async { "plain" });
        let decorated = decorate(Arc::clone(&handler), Vec::new());

        assert!(Arc::ptr_eq(&handler, &decorated));
        let res = decorated.call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.body(), b"plain");
    }
}
