//! The terminal error stage and the not-found fallback.
//!
//! Every error a handler forwards ends up in [`respond`], which writes the
//! one response the client gets. [`not_found`] is the router's default
//! fallback: it never writes a body itself, it forwards an
//! [`AppError`](crate::AppError) like any other handler would.

use http::StatusCode;
use tracing::{debug, error};

use crate::error::{AppError, Error};
use crate::request::Request;
use crate::response::Response;

/// Status used for errors that carry no status of their own.
pub const DEFAULT_STATUS: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

/// Message used for errors that carry no client-facing message.
pub const DEFAULT_MESSAGE: &str = "Something went wrong";

/// Turns a forwarded error into an HTTP response. Never fails.
///
/// An [`AppError`] answers with its own status and message as plain text.
/// Anything else is unclassified and answers `500 Something went wrong`;
/// the detail only goes to the log.
pub fn respond(err: Error) -> Response {
    let (status, message) = match err.as_app_error() {
        Some(app) => (app.status(), app.message().to_owned()),
        None => (DEFAULT_STATUS, DEFAULT_MESSAGE.to_owned()),
    };

    if status.is_server_error() {
        error!(status = status.as_u16(), error = %err, "request failed");
    } else {
        debug!(status = status.as_u16(), error = %err, "request rejected");
    }

    Response::builder().status(status).text(message)
}

/// Fallback for any method and path no route matched.
pub async fn not_found<S>(_req: Request, _state: S) -> Result<Response, Error> {
    Err(AppError::not_found().into())
}
