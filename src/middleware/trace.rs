//! Per-request tracing.
//!
//! Each request runs inside an `http` span carrying its method and path; the
//! response status and latency are logged when the handler chain returns.

use std::time::Instant;

use tracing::{Instrument, Span, info, info_span};

use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// The span a request runs in.
pub fn request_span(req: &Request) -> Span {
    info_span!("http", method = %req.method(), path = %req.path())
}

/// Runs `req` through `router` inside its span and logs the outcome.
pub async fn handle<S>(router: &Router<S>, req: Request) -> Response
where
    S: Clone + Send + Sync + 'static,
{
    let span = request_span(&req);
    async move {
        let started = Instant::now();
        let res = router.handle(req).await;
        info!(
            status = res.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        res
    }
    .instrument(span)
    .await
}
