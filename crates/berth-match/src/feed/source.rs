//! Boundary types between the feed engine and whichever listing catalog
//! backs it. Implementations live under `crate::catalog`; tests supply
//! in-memory fakes.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::BoatId;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Query parameters forwarded verbatim to the catalog. Keys are kept in a
/// sorted map so plans compare and log deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: BTreeMap<String, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// One page worth of catalog records. Pages are 1-based; translating to the
/// provider's offset convention is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    pub filters: FilterSet,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size,
            filters: FilterSet::new(),
        }
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }
}

/// Raw catalog record exactly as the provider ships it. Every field is
/// optional; normalization decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RawBoat {
    #[serde(rename = "BoatID")]
    pub boat_id: Option<String>,
    pub boat_type: Option<String>,
    pub boat_families: Option<String>,
    pub agency_email: Option<String>,
    pub ins_date: Option<String>,
    pub builder: Option<String>,
    pub model: Option<String>,
    pub year_built: Option<i32>,
    pub length: Option<f64>,
    pub beam: Option<f64>,
    pub draft: Option<f64>,
    pub max_people: Option<u32>,
    pub speed_max: Option<f64>,
    pub range: Option<f64>,
    pub fuel: Option<f64>,
    pub water: Option<f64>,
    pub generator: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "CountryISOCode")]
    pub country_iso_code: Option<String>,
    pub harbor: Option<String>,
    pub visible_at: Option<String>,
    pub city: Option<String>,
    pub cabins: Option<u32>,
    pub baths: Option<u32>,
    pub new: Option<bool>,
    pub stock: Option<bool>,
    pub highlighted: Option<bool>,
    pub sold: Option<bool>,
    pub prof_use: Option<bool>,
    pub vintage: Option<bool>,
    pub watercraft: Option<bool>,
    pub sale: Option<bool>,
    pub charter: Option<bool>,
    pub sell_price: Option<f64>,
    pub sell_price_currency: Option<String>,
    pub sell_price_formatted: Option<String>,
    pub sell_price_reduced: Option<bool>,
    pub image_url: Option<String>,
    pub images_list: Option<Vec<RawImage>>,
    #[serde(rename = "ImagesHQ")]
    pub images_hq: Option<bool>,
    #[serde(rename = "Images360")]
    pub images_360: Option<bool>,
    pub video: Option<bool>,
    pub hull_material: Option<String>,
    pub engines_list: Option<Vec<RawEngine>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RawImage {
    pub image_url: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RawEngine {
    pub qty: Option<u32>,
    #[serde(rename = "HP")]
    pub hp: Option<f64>,
    pub hours: Option<f64>,
    pub year_built: Option<i32>,
}

/// Envelope the provider wraps list responses in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CatalogPage {
    pub results: Vec<RawBoat>,
    pub total_results: Option<u64>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog transport failure: {0}")]
    Transport(String),
    #[error("catalog returned status {0}")]
    Status(u16),
    #[error("catalog payload could not be decoded: {0}")]
    Decode(String),
}

/// Read side of the listing provider.
pub trait CatalogSource: Send + Sync {
    fn fetch_page<'a>(
        &'a self,
        request: &'a PageRequest,
    ) -> BoxFuture<'a, Result<Vec<RawBoat>, CatalogError>>;

    fn fetch_detail<'a>(
        &'a self,
        id: &'a BoatId,
    ) -> BoxFuture<'a, Result<Option<RawBoat>, CatalogError>>;
}

/// Contact details a member leaves before their accepts start notifying
/// brokers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactIdentity {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Everything a broker needs to follow up on an accepted listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestNotice {
    pub boat_id: BoatId,
    pub builder: String,
    pub model: String,
    pub year_built: i32,
    pub price_display: String,
    pub broker_email: Option<String>,
    pub contact: ContactIdentity,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no broker address available for listing {0}")]
    NoRecipient(String),
    #[error("notification transport failure: {0}")]
    Transport(String),
    #[error("notification rejected with status {0}")]
    Status(u16),
}

/// Outbound side: wherever accepted-listing interest gets delivered.
pub trait NotificationSink: Send + Sync {
    fn notify_interest<'a>(
        &'a self,
        notice: &'a InterestNotice,
    ) -> BoxFuture<'a, Result<(), NotifyError>>;
}
