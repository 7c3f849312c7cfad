//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers build a [`Response`] (or anything implementing [`IntoResponse`])
//! and return it inside `Ok`. Failures go the other way, as an
//! [`Error`](crate::Error), and are turned into a response by the error
//! responder.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content types this service sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    Html,  // text/html; charset=utf-8
    Text,  // text/plain; charset=utf-8
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use wanderlust::Response;
/// use http::StatusCode;
///
/// Response::html("<h1>All listings</h1>");
/// Response::text("Your connection is successfully done");
/// Response::redirect("/listings");
/// Response::builder()
///     .status(StatusCode::NOT_FOUND)
///     .text("Page not found");
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
}

impl Response {
    /// `200 OK`, `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::builder().bytes(ContentType::Html, body.into())
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// `302 Found` to `location`, no body.
    ///
    /// A location that is not a valid header value degrades to `/`.
    pub fn redirect(location: &str) -> Self {
        let value = HeaderValue::from_str(location).unwrap_or(HeaderValue::from_static("/"));
        Self {
            status: StatusCode::FOUND,
            headers: vec![(LOCATION, value)],
            body: Bytes::new(),
        }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Body as UTF-8, lossily.
    pub fn text_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// First header with this name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.as_str().eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.to_str().ok())
    }

    /// Same status and headers, empty body. Answers `HEAD`.
    pub(crate) fn without_body(self) -> Self {
        Self { body: Bytes::new(), ..self }
    }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        let headers = res.headers_mut();
        for (name, value) in self.headers {
            headers.append(name, value);
        }
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`]. Defaults to `200 OK`.
///
/// Terminated by a typed body method, so every response declares what it
/// sends.
#[derive(Debug)]
pub struct ResponseBuilder {
    headers: Vec<(HeaderName, HeaderValue)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Adds a header. Invalid names or values are dropped.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::from_str(value)) {
            self.headers.push((name, value));
        }
        self
    }

    /// Terminate with a plain-text body.
    pub fn text(self, body: impl Into<String>) -> Response {
        self.bytes(ContentType::Text, body.into())
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        let mut headers = vec![(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()))];
        headers.extend(self.headers);
        Response { status: self.status, headers, body: body.into() }
    }

    /// Terminate with no body.
    pub fn no_body(self) -> Response {
        Response { status: self.status, headers: self.headers, body: Bytes::new() }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Handlers may return `Ok(x)` for any `x: IntoResponse`.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// A bare status, no body.
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::builder().status(self).no_body() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_sets_found_and_location() {
        let res = Response::redirect("/listings/abc");
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.header("location"), Some("/listings/abc"));
        assert!(res.body().is_empty());
    }

    #[test]
    fn builder_puts_content_type_first() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .header("x-request-id", "7")
            .text("made");
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.header("Content-Type"), Some("text/plain; charset=utf-8"));
        assert_eq!(res.header("x-request-id"), Some("7"));
        assert_eq!(res.text_body(), "made");
    }

    #[test]
    fn into_inner_keeps_status_and_headers() {
        let res = Response::html("<p>hi</p>").into_inner();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    }
}
