//! Handler trait, type erasure and error forwarding.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in one
//! `HashMap<Method, Tree>`, so each handler is hidden behind a trait object
//! (`dyn ErasedHandler<S>`):
//!
//! ```text
//! async fn show(req, state) -> Result<Response>   ← written by the app
//!        ↓ router.on(Method::GET, "/listings/{id}", show)
//! show.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(show))                       ← stored as BoxedHandler<S>
//!        ↓
//! handler.call(req, state) at request time        ← one vtable dispatch
//!        ↓
//! Ok(response)  |  Err(error)                     ← Err is forwarded
//! ```
//!
//! # Forwarding
//!
//! Every handler returns `Result<impl IntoResponse, Error>`. The erased
//! future resolves to `Ok(response)` when the handler succeeds and to
//! `Err(error)` when it fails; the router hands that error to
//! [`respond`](crate::responder::respond). The error is moved out, so it is
//! forwarded at most once, and a successful handler has nothing to forward.
//!
//! A handler that panics is caught here and forwarded as
//! [`Error::Panic`], so the client still gets a `500` instead of a reset
//! connection.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future resolving to the handler outcome.
pub(crate) type BoxFuture =
    Pin<Box<dyn Future<Output = Result<Response, Error>> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler<S> {
    fn call(&self, req: Request, state: S) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler<S> = Arc<dyn ErasedHandler<S> + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request, state: S) -> Result<impl IntoResponse, Error>
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler<S>: private::Sealed<S> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler<S>;
}

mod private {
    pub trait Sealed<S> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R, S> private::Sealed<S> for F
where
    F: Fn(Request, S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    S: Send + 'static,
{
}

impl<F, Fut, R, S> Handler<S> for F
where
    F: Fn(Request, S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    S: Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<S> {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Holds a concrete handler `F` and implements [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R, S> ErasedHandler<S> for FnHandler<F>
where
    F: Fn(Request, S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, state: S) -> BoxFuture {
        let fut = (self.0)(req, state);
        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(res)) => Ok(res.into_response()),
                Ok(Err(err)) => Err(err),
                Err(payload) => Err(Error::Panic(panic_message(payload.as_ref()))),
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
