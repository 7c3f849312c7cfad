//! `POST` → `PUT` / `PATCH` / `DELETE` rewriting.
//!
//! HTML forms can only send `GET` and `POST`. A form that wants to update or
//! delete a listing posts to the resource and names the real method in a
//! reserved `_method` field, either in the query string
//! (`/listings/42?_method=DELETE`) or in the url-encoded body. The effective
//! method is replaced before routing.

use http::Method;
use tracing::debug;

use crate::request::Request;

/// Name of the reserved field.
pub const FIELD: &str = "_method";

/// Rewrites the request method if it is a `POST` carrying a valid override.
///
/// The query string is consulted before the body. Values are
/// case-insensitive; anything other than `PUT`, `PATCH` or `DELETE` is
/// ignored.
pub fn apply(req: &mut Request) {
    if req.method() != Method::POST {
        return;
    }

    let Some(method) = req.query(FIELD)
        .or_else(|| req.form_field(FIELD))
        .as_deref()
        .and_then(parse)
    else {
        return;
    };

    debug!(from = %req.method(), to = %method, "method override");
    req.set_method(method);
}

fn parse(value: &str) -> Option<Method> {
    match value.trim().to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}
