//! # wanderlust
//!
//! A listings CRUD service: create, browse, edit and delete listings through
//! server-rendered HTML pages.
//!
//! ## The request pipeline
//!
//! ```text
//! request ─► method override ─► router ─► handler ──Ok──► response
//!                                 │          │
//!                        no match ▼          │ Err / panic
//!                          404 fallback ─────┴────► responder ─► response
//! ```
//!
//! - Handlers are `async fn(Request, AppState) -> Result<impl IntoResponse>`.
//!   They never write error responses themselves; they return the error.
//! - [`AppError`] carries a status and a client-facing message. Any other
//!   error is answered with `500 Something went wrong`.
//! - Unmatched requests forward `AppError(404, "Page not found")`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use wanderlust::{AppState, MemoryStore, Server, app, config::LISTEN_ADDR};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = AppState::new(MemoryStore::new());
//!     Server::bind(LISTEN_ADDR).serve(app(state)).await.unwrap();
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod listing;
pub mod middleware;
pub mod responder;
pub mod routes;
pub mod store;
pub mod views;

pub use error::{AppError, Error, InvalidStatus, Result};
pub use handler::Handler;
pub use listing::{Listing, ListingFields, ListingId};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use routes::{AppState, app};
pub use server::{MAX_BODY_BYTES, Server};
pub use store::{ListingStore, MemoryStore, SqliteStore, StoreError};
