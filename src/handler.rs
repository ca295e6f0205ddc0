//! Handler trait and type erasure.
//!
//! # How handlers are stored and composed
//!
//! Route handlers, the router itself and every middleware wrapper share one
//! shape: something that takes a [`Request`] and eventually yields a
//! [`Response`]. That shape is [`ErasedHandler`], and the shared, type-erased
//! form is [`BoxedHandler`].
//!
//! ```text
//! async fn world(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", world)
//! world.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(world))                       ← BoxedHandler
//!        ↓ decorate(router, [logging])
//! Arc<LoggingHandler { next: router }>             ← still a BoxedHandler
//!        ↓
//! handler.call(req) at request time                ← one vtable dispatch per layer
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// The request-handling capability.
///
/// Implement this directly when writing a wrapper that needs to hold another
/// handler (see [`middleware`](crate::middleware)). For plain route handlers,
/// write an `async fn` and let [`Handler`] do the boxing.
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any `async fn`, or closure returning a future,
/// with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler function to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Boxes any handler function into the shared form.
///
/// Convenient when a single function is the whole application, or when
/// wrapping a function with [`decorate`](crate::middleware::decorate).
pub fn boxed(handler: impl Handler) -> BoxedHandler {
    handler.into_boxed_handler()
}
