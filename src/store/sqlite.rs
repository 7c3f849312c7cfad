//! SQLite-backed listing store.
//!
//! One `listings` table, created on connect if missing. Every operation is a
//! single statement, so a concurrent update never mixes fields from two
//! writers: SQLite serialises the statements and the last one wins.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use super::{ListingStore, StoreError, new_listing, parse_id};
use crate::listing::{Listing, ListingFields};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS listings (
    id          TEXT PRIMARY KEY NOT NULL,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    image       TEXT NOT NULL DEFAULT '',
    price       REAL,
    location    TEXT NOT NULL DEFAULT '',
    country     TEXT NOT NULL DEFAULT ''
)
"#;

const COLUMNS: &str = "id, title, description, image, price, location, country";

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to `url` (`sqlite://listings.db`, `sqlite::memory:`) and
    /// makes sure the table exists. A database file is created if missing.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to an in-memory database gets its own empty
        // database, so the pool must hold on to exactly one.
        let pool = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool.connect_with(options).await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        info!(url, "listing store connected");
        Ok(Self { pool })
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: String,
    title: String,
    description: String,
    image: String,
    price: Option<f64>,
    location: String,
    country: String,
}

impl TryFrom<ListingRow> for Listing {
    type Error = StoreError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(Listing {
            id: parse_id(&row.id)?,
            title: row.title,
            description: row.description,
            image: row.image,
            price: row.price,
            location: row.location,
            country: row.country,
        })
    }
}

#[async_trait]
impl ListingStore for SqliteStore {
    async fn find_all(&self) -> Result<Vec<Listing>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM listings ORDER BY rowid");
        sqlx::query_as::<_, ListingRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Listing::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, StoreError> {
        let id = parse_id(id)?;
        let sql = format!("SELECT {COLUMNS} FROM listings WHERE id = ?");
        sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Listing::try_from)
            .transpose()
    }

    async fn create(&self, fields: ListingFields) -> Result<Listing, StoreError> {
        let listing = new_listing(fields)?;
        sqlx::query(
            "INSERT INTO listings (id, title, description, image, price, location, country)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(listing.id.to_string())
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.image)
        .bind(listing.price)
        .bind(&listing.location)
        .bind(&listing.country)
        .execute(&self.pool)
        .await?;
        Ok(listing)
    }

    async fn update_by_id(
        &self,
        id: &str,
        fields: ListingFields,
    ) -> Result<Option<Listing>, StoreError> {
        let id = parse_id(id)?;
        let sql = format!(
            "UPDATE listings SET
                title       = COALESCE(?, title),
                description = COALESCE(?, description),
                image       = COALESCE(?, image),
                price       = COALESCE(?, price),
                location    = COALESCE(?, location),
                country     = COALESCE(?, country)
             WHERE id = ?
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ListingRow>(&sql)
            .bind(fields.title)
            .bind(fields.description)
            .bind(fields.image)
            .bind(fields.price)
            .bind(fields.location)
            .bind(fields.country)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Listing::try_from)
            .transpose()
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Listing>, StoreError> {
        let id = parse_id(id)?;
        let sql = format!("DELETE FROM listings WHERE id = ? RETURNING {COLUMNS}");
        sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Listing::try_from)
            .transpose()
    }
}
