//! The listing routes.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | `GET` | `/` | [`home`] |
//! | `GET` | `/listings` | [`index`] |
//! | `GET` | `/listings/new` | [`new_form`] |
//! | `POST` | `/listings` | [`create`] |
//! | `GET` | `/listings/{id}` | [`show`] |
//! | `GET` | `/listings/{id}/edit` | [`edit_form`] |
//! | `PUT` | `/listings/{id}` | [`update`] |
//! | `DELETE` | `/listings/{id}` | [`delete`] |
//!
//! Anything else falls through to the 404 fallback.

use std::sync::Arc;

use http::Method;
use tracing::info;

use crate::error::{AppError, Result};
use crate::listing::ListingFields;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::store::ListingStore;
use crate::views::{self, EditView, IndexView, NewView, ShowView};

/// What every handler gets besides the request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ListingStore>,
}

impl AppState {
    pub fn new(store: impl ListingStore + 'static) -> Self {
        Self { store: Arc::new(store) }
    }
}

/// Builds the full route table around `state`.
pub fn app(state: AppState) -> Router<AppState> {
    Router::new(state)
        .on(Method::GET,    "/",                   home)
        .on(Method::GET,    "/listings",           index)
        .on(Method::GET,    "/listings/new",       new_form)
        .on(Method::POST,   "/listings",           create)
        .on(Method::GET,    "/listings/{id}",      show)
        .on(Method::GET,    "/listings/{id}/edit", edit_form)
        .on(Method::PUT,    "/listings/{id}",      update)
        .on(Method::DELETE, "/listings/{id}",      delete)
}

pub async fn home(_req: Request, _state: AppState) -> Result<&'static str> {
    Ok("Your connection is successfully done")
}

pub async fn index(_req: Request, state: AppState) -> Result<Response> {
    let listings = state.store.find_all().await?;
    views::render(&IndexView { listings })
}

pub async fn new_form(_req: Request, _state: AppState) -> Result<Response> {
    views::render(&NewView)
}

pub async fn create(req: Request, state: AppState) -> Result<Response> {
    let fields = ListingFields::from_request(&req)?;
    let listing = state.store.create(fields).await?;
    info!(id = %listing.id, title = %listing.title, "listing created");
    Ok(Response::redirect("/listings"))
}

/// An unknown id renders the "does not exist" view rather than a 404.
pub async fn show(req: Request, state: AppState) -> Result<Response> {
    let listing = state.store.find_by_id(listing_id(&req)?).await?;
    views::render(&ShowView { listing })
}

pub async fn edit_form(req: Request, state: AppState) -> Result<Response> {
    let listing = state.store.find_by_id(listing_id(&req)?).await?;
    views::render(&EditView { listing })
}

pub async fn update(req: Request, state: AppState) -> Result<Response> {
    let id = listing_id(&req)?;
    let fields = ListingFields::from_request(&req)?;
    if state.store.update_by_id(id, fields).await?.is_none() {
        info!(%id, "update of unknown listing ignored");
    }
    Ok(Response::redirect(&format!("/listings/{id}")))
}

pub async fn delete(req: Request, state: AppState) -> Result<Response> {
    match state.store.delete_by_id(listing_id(&req)?).await? {
        Some(listing) => info!(id = %listing.id, title = %listing.title, "listing deleted"),
        None => info!(id = ?req.param("id"), "delete of unknown listing ignored"),
    }
    Ok(Response::redirect("/listings"))
}

/// The `{id}` path segment. Only missing if a route was registered without it.
fn listing_id(req: &Request) -> Result<&str, AppError> {
    req.param("id").ok_or_else(AppError::not_found)
}
