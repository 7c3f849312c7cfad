//! In-process listing store.
//!
//! All listings live in a `Vec` behind a tokio `RwLock` and are gone when the
//! process exits. Writers hold the write lock for the whole
//! read-modify-write, so concurrent updates to one listing serialise: the
//! last writer wins, whole.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ListingStore, StoreError, new_listing, parse_id};
use crate::listing::{Listing, ListingFields};

#[derive(Debug, Default)]
pub struct MemoryStore {
    listings: RwLock<Vec<Listing>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Listing>, StoreError> {
        Ok(self.listings.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, StoreError> {
        let id = parse_id(id)?;
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|l| l.id == id).cloned())
    }

    async fn create(&self, fields: ListingFields) -> Result<Listing, StoreError> {
        let listing = new_listing(fields)?;
        self.listings.write().await.push(listing.clone());
        Ok(listing)
    }

    async fn update_by_id(
        &self,
        id: &str,
        fields: ListingFields,
    ) -> Result<Option<Listing>, StoreError> {
        let id = parse_id(id)?;
        let mut listings = self.listings.write().await;
        let Some(listing) = listings.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        listing.apply(fields);
        Ok(Some(listing.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Listing>, StoreError> {
        let id = parse_id(id)?;
        let mut listings = self.listings.write().await;
        let Some(pos) = listings.iter().position(|l| l.id == id) else {
            return Ok(None);
        };
        Ok(Some(listings.remove(pos)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::listing::ListingId;

    fn fields(title: &str, price: f64) -> ListingFields {
        ListingFields {
            title: Some(title.to_owned()),
            price: Some(price),
            location: Some("Goa".to_owned()),
            ..ListingFields::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_ids() {
        let store = MemoryStore::new();
        let a = store.create(fields("A", 1.0)).await.unwrap();
        let b = store.create(fields("B", 2.0)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.find_all().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn create_requires_a_title() {
        let store = MemoryStore::new();
        let err = store.create(ListingFields::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let blank = ListingFields { title: Some("  ".to_owned()), ..ListingFields::default() };
        assert!(store.create(blank).await.is_err());
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_id_is_a_store_error() {
        let store = MemoryStore::new();
        let err = store.find_by_id("123").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(id) if id == "123"));
    }

    #[tokio::test]
    async fn unknown_id_is_absent_not_an_error() {
        let store = MemoryStore::new();
        let id = ListingId::new().to_string();
        assert_eq!(store.find_by_id(&id).await.unwrap(), None);
        assert_eq!(store.update_by_id(&id, fields("x", 1.0)).await.unwrap(), None);
        assert_eq!(store.delete_by_id(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_is_partial() {
        let store = MemoryStore::new();
        let created = store.create(fields("Villa", 100.0)).await.unwrap();
        let id = created.id.to_string();

        let patch = ListingFields { price: Some(42.0), ..ListingFields::default() };
        store.update_by_id(&id, patch).await.unwrap();

        let found = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.price, Some(42.0));
        assert_eq!(found.title, "Villa");
        assert_eq!(found.location, "Goa");
    }

    #[tokio::test]
    async fn delete_then_find_is_absent() {
        let store = MemoryStore::new();
        let created = store.create(fields("Hut", 5.0)).await.unwrap();
        let id = created.id.to_string();

        assert_eq!(store.delete_by_id(&id).await.unwrap(), Some(created));
        assert_eq!(store.find_by_id(&id).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_are_last_write_wins() {
        let store = Arc::new(MemoryStore::new());
        let created = store.create(fields("Base", 0.0)).await.unwrap();
        let id = created.id.to_string();

        let a = ListingFields {
            title: Some("A".to_owned()),
            price: Some(1.0),
            location: Some("Here".to_owned()),
            ..ListingFields::default()
        };
        let b = ListingFields {
            title: Some("B".to_owned()),
            price: Some(2.0),
            location: Some("There".to_owned()),
            ..ListingFields::default()
        };

        let (ra, rb) = tokio::join!(
            tokio::spawn({
                let (store, id) = (Arc::clone(&store), id.clone());
                async move { store.update_by_id(&id, a).await }
            }),
            tokio::spawn({
                let (store, id) = (Arc::clone(&store), id.clone());
                async move { store.update_by_id(&id, b).await }
            }),
        );
        ra.unwrap().unwrap();
        rb.unwrap().unwrap();

        let found = store.find_by_id(&id).await.unwrap().unwrap();
        let state = (found.title.as_str(), found.price, found.location.as_str());
        assert!(
            state == ("A", Some(1.0), "Here") || state == ("B", Some(2.0), "There"),
            "partial merge: {state:?}"
        );
    }
}
