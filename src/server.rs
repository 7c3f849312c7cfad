//! TCP front end.
//!
//! [`Server`] owns the listening socket. Every accepted connection is served
//! on its own task by hyper's auto builder (HTTP/1.1 or HTTP/2, as the client
//! negotiates). A request body is read into memory, up to
//! [`MAX_BODY_BYTES`], before the router sees it.
//!
//! When the shutdown future resolves (SIGTERM or Ctrl-C for
//! [`Server::serve`]) the socket stops accepting, open connections run to
//! completion, and only then does the serve call return.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, Error};
use crate::middleware::trace;
use crate::request::Request;
use crate::responder;
use crate::router::Router;

/// Largest request body accepted, in bytes. Anything longer is answered
/// `413 Payload Too Large` without reaching a handler.
pub const MAX_BODY_BYTES: usize = 100 * 1024;

/// The HTTP server.
#[derive(Debug)]
pub struct Server {
    socket: Socket,
}

#[derive(Debug)]
enum Socket {
    Unbound(SocketAddr),
    Bound(TcpListener),
}

impl Server {
    /// A server that binds `addr` once [`serve`](Server::serve) runs.
    pub fn bind(addr: impl Into<SocketAddr>) -> Self {
        Self { socket: Socket::Unbound(addr.into()) }
    }

    /// A server on a listener the caller already bound, e.g. port `0` in
    /// tests.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { socket: Socket::Bound(listener) }
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains.
    pub async fn serve<S>(self, router: Router<S>) -> Result<(), Error>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `shutdown` resolves, then waits for every open
    /// connection to finish.
    pub async fn serve_with_shutdown<S, F>(self, router: Router<S>, shutdown: F) -> Result<(), Error>
    where
        S: Clone + Send + Sync + 'static,
        F: Future<Output = ()>,
    {
        let listener = match self.socket {
            Socket::Unbound(addr) => TcpListener::bind(addr).await?,
            Socket::Bound(listener) => listener,
        };
        info!(addr = %listener.local_addr()?, "wanderlust listening");

        let router = Arc::new(router);
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            let accepted = tokio::select! {
                biased;

                () = &mut shutdown => break,
                Some(_) = connections.join_next(), if !connections.is_empty() => continue,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    connections.spawn(serve_connection(Arc::clone(&router), stream, peer));
                }
                Err(e) => warn!("accept failed: {e}"),
            }
        }

        info!(in_flight = connections.len(), "stopped accepting, draining connections");
        while connections.join_next().await.is_some() {}
        info!("wanderlust stopped");
        Ok(())
    }
}

// ── Connections ───────────────────────────────────────────────────────────────

async fn serve_connection<S>(router: Arc<Router<S>>, stream: TcpStream, peer: SocketAddr)
where
    S: Clone + Send + Sync + 'static,
{
    let svc = service_fn(move |req| {
        let router = Arc::clone(&router);
        async move { Ok::<_, Infallible>(dispatch(&router, req).await) }
    });

    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
        .serve_connection(TokioIo::new(stream), svc)
        .await
    {
        error!(%peer, "connection error: {e}");
    }
}

/// Reads the body, then hands the request to the router. Never fails
/// towards hyper: a body that cannot be read is answered here.
async fn dispatch<S>(router: &Router<S>, req: hyper::Request<Incoming>) -> http::Response<Full<Bytes>>
where
    S: Clone + Send + Sync + 'static,
{
    let (parts, body) = req.into_parts();
    match read_body(body).await {
        Ok(body) => {
            let req = Request::from(http::Request::from_parts(parts, body));
            trace::handle(router, req).await.into_inner()
        }
        Err(err) => {
            debug!(method = %parts.method, path = %parts.uri.path(), "rejected body: {err}");
            responder::respond(err.into()).into_inner()
        }
    }
}

// ── Body ──────────────────────────────────────────────────────────────────────

/// Collects `body`, failing with `413` past [`MAX_BODY_BYTES`] and `400`
/// when the stream itself breaks.
pub(crate) async fn read_body<B>(body: B) -> Result<Bytes, AppError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(AppError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body is too large",
        )),
        Err(e) => {
            warn!("failed to read request body: {e}");
            Err(AppError::bad_request("Could not read request body"))
        }
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or Ctrl-C.
///
/// A handler that cannot be installed is logged and its arm never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C"),
        () = sigterm => info!("received SIGTERM"),
    }
}
