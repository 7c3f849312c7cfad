//! Middleware layer.
//!
//! Cross-cutting steps that run around every request, outside the handlers:
//!
//! - [`method_override`]: lets HTML forms reach `PUT` / `DELETE` routes.
//! - [`trace`]: per-request span with method, path, status, latency.

pub mod method_override;
pub mod trace;
