//! Listing persistence.
//!
//! Handlers only see the [`ListingStore`] trait; the concrete store is picked
//! in `main` and injected through [`AppState`](crate::AppState).
//!
//! Ids arrive as raw path segments. Turning them into a
//! [`ListingId`](crate::listing::ListingId) is the store's job, so a
//! malformed id surfaces as [`StoreError::InvalidId`] like any other store
//! failure.
//!
//! Two stores ship: [`SqliteStore`] for the running service and
//! [`MemoryStore`], which keeps nothing across restarts and backs the tests.

mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::listing::{Listing, ListingFields, ListingId};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Failures reported by a [`ListingStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("`{0}` is not a valid listing id")]
    InvalidId(String),

    /// The listing would violate the store's schema.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

/// CRUD over the listing collection.
///
/// Lookups by id return `Ok(None)` for ids that are well-formed but unknown;
/// `update_by_id` and `delete_by_id` return the listing as it was after the
/// update / before the delete.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Every listing, oldest first.
    async fn find_all(&self) -> Result<Vec<Listing>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, StoreError>;

    /// Persists a new listing. `title` is required and must not be blank.
    async fn create(&self, fields: ListingFields) -> Result<Listing, StoreError>;

    async fn update_by_id(
        &self,
        id: &str,
        fields: ListingFields,
    ) -> Result<Option<Listing>, StoreError>;

    async fn delete_by_id(&self, id: &str) -> Result<Option<Listing>, StoreError>;
}

fn parse_id(id: &str) -> Result<ListingId, StoreError> {
    id.parse().map_err(|_| StoreError::InvalidId(id.to_owned()))
}

/// A fresh listing built from submitted fields. `title` must be present and
/// not blank; everything else defaults to empty.
fn new_listing(fields: ListingFields) -> Result<Listing, StoreError> {
    let title = match fields.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_owned(),
        _ => return Err(StoreError::Validation("`title` is required".to_owned())),
    };

    let mut listing = Listing {
        id: ListingId::new(),
        title,
        description: String::new(),
        image: String::new(),
        price: None,
        location: String::new(),
        country: String::new(),
    };
    listing.apply(ListingFields { title: None, ..fields });
    Ok(listing)
}
