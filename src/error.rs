//! Error types.
//!
//! Two layers:
//!
//! - [`AppError`]: an error that already knows its HTTP status and the
//!   message the client should see. Handlers build these for conditions they
//!   understand (bad body, unknown page).
//! - [`Error`]: everything a handler can fail with. Anything that is not an
//!   `AppError` is "unclassified" and the error responder answers it with a
//!   `500`.

use std::fmt;

use http::StatusCode;

use crate::store::StoreError;

/// Convenience alias used by handlers and the server.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ── AppError ──────────────────────────────────────────────────────────────────

/// An error carrying the HTTP status code and message to send to the client.
///
/// Immutable once built; consumed exactly once by
/// [`respond`](crate::responder::respond).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// Builds an `AppError` from a raw code, rejecting anything outside
    /// `100..=599`.
    pub fn from_u16(code: u16, message: impl Into<String>) -> Result<Self, InvalidStatus> {
        if !(100..=599).contains(&code) {
            return Err(InvalidStatus(code));
        }
        let status = StatusCode::from_u16(code).map_err(|_| InvalidStatus(code))?;
        Ok(Self::new(status, message))
    }

    /// `404 Page not found`, what the fallback route forwards.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Page not found")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn message(&self) -> &str { &self.message }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for AppError {}

/// Returned by [`AppError::from_u16`] for codes outside `100..=599`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid HTTP status code {0}")]
pub struct InvalidStatus(pub u16);

// ── Error ─────────────────────────────────────────────────────────────────────

/// Every way a request or the server itself can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("render: {0}")]
    Render(#[from] askama::Error),

    /// A handler panicked; the payload is kept for the log line.
    #[error("handler panicked: {0}")]
    Panic(String),

    /// Binding the listener or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The [`AppError`] inside, if this error is one.
    pub fn as_app_error(&self) -> Option<&AppError> {
        match self {
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}
