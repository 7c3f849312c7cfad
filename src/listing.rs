//! The listing resource.
//!
//! [`Listing`] is what the store persists. [`ListingFields`] is the typed
//! edge for request bodies: every field optional, unknown keys ignored. The
//! store decides which fields are required.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::request::Request;

/// Identifier assigned by the store when a listing is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListingId {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ListingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A persisted listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub country: String,
}

impl Listing {
    /// Overwrites every field present in `fields`, leaving the rest alone.
    pub fn apply(&mut self, fields: ListingFields) {
        let ListingFields { title, description, image, price, location, country } = fields;
        if let Some(v) = title { self.title = v; }
        if let Some(v) = description { self.description = v; }
        if let Some(v) = image { self.image = v; }
        if let Some(v) = price { self.price = Some(v); }
        if let Some(v) = location { self.location = v; }
        if let Some(v) = country { self.country = v; }
    }
}

/// Listing fields as submitted by a client.
///
/// Forms send `listing[title]=...`; JSON clients send
/// `{"listing": {"title": ...}}`. Both land here.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListingFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(deserialize_with = "price")]
    pub price: Option<f64>,
    pub location: Option<String>,
    pub country: Option<String>,
}

/// Key the listing fields are nested under in request bodies.
const ENVELOPE: &str = "listing";

impl ListingFields {
    /// Reads the `listing` envelope out of a form or JSON body.
    ///
    /// A body without the envelope yields empty fields; a body that cannot
    /// be decoded is a `400`.
    pub fn from_request(req: &Request) -> Result<Self, AppError> {
        let envelope = if req.is_json() {
            let mut body: Map<String, Value> = serde_json::from_slice(req.body())
                .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {e}")))?;
            body.remove(ENVELOPE).unwrap_or_default()
        } else {
            Value::Object(nested_form_fields(req.body()))
        };

        if envelope.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(envelope)
            .map_err(|e| AppError::bad_request(format!("Invalid listing: {e}")))
    }
}

/// Collects `listing[key]=value` pairs into a JSON object.
fn nested_form_fields(body: &[u8]) -> Map<String, Value> {
    form_urlencoded::parse(body)
        .filter_map(|(k, v)| {
            let field = k.strip_prefix(ENVELOPE)?.strip_prefix('[')?.strip_suffix(']')?;
            Some((field.to_owned(), Value::String(v.into_owned())))
        })
        .collect()
}

/// Accepts a number, a numeric string, an empty string, or null. Decimals
/// are fine; negative or non-finite prices are not.
fn price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let n = match Option::<Raw>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Raw::Number(n)) => n,
        Some(Raw::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("price `{s}` is not a number")))?,
    };

    if !n.is_finite() || n < 0.0 {
        return Err(serde::de::Error::custom(format!("price `{n}` must not be negative")));
    }
    Ok(Some(n))
}
