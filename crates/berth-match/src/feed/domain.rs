//! Normalized catalog domain model. Everything downstream of
//! [`crate::feed::pipeline::normalize`] works with these types; raw
//! provider records never leave the boundary layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-issued listing identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoatId(pub String);

impl fmt::Display for BoatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BoatId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The two verdicts a member can swipe on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Reject => "reject",
        }
    }

    pub const fn is_accept(self) -> bool {
        matches!(self, Decision::Accept)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoatImage {
    pub url: String,
}

/// One propulsion unit as normalized from the catalog engine list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSpec {
    pub qty: u32,
    pub hp: Option<f64>,
    pub hours: Option<f64>,
    pub year_built: Option<i32>,
}

impl EngineSpec {
    /// Combined horsepower across the units this spec describes.
    pub fn total_hp(&self) -> f64 {
        self.hp.unwrap_or(0.0) * f64::from(self.qty.max(1))
    }
}

/// A listing that survived normalization: identity, builder, model, build
/// year and asking price are always present, everything else is best
/// effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boat {
    pub id: BoatId,
    pub builder: String,
    pub model: String,
    pub year_built: i32,
    pub sell_price: f64,
    pub price_display: Option<String>,
    pub boat_type: Option<String>,
    pub families: Vec<String>,
    pub country: Option<String>,
    pub country_iso: Option<String>,
    pub city: Option<String>,
    pub length: Option<f64>,
    pub beam: Option<f64>,
    pub draft: Option<f64>,
    pub cabins: Option<u32>,
    pub baths: Option<u32>,
    pub max_people: Option<u32>,
    pub speed_max: Option<f64>,
    pub range_nm: Option<f64>,
    pub fuel_capacity: Option<f64>,
    pub water_capacity: Option<f64>,
    pub generator: Option<String>,
    pub hull_material: Option<String>,
    pub engines: Vec<EngineSpec>,
    pub is_new: bool,
    pub in_stock: bool,
    pub highlighted: bool,
    pub sold: bool,
    pub for_sale: bool,
    pub charter: bool,
    pub prof_use: bool,
    pub vintage: bool,
    pub watercraft: bool,
    pub price_reduced: bool,
    pub images_hq: bool,
    pub images_360: bool,
    pub has_video: bool,
    pub images: Vec<BoatImage>,
    pub broker_email: Option<String>,
    pub listed_at: Option<DateTime<Utc>>,
}

impl Boat {
    /// Combined horsepower across every engine on board.
    pub fn total_horsepower(&self) -> f64 {
        self.engines.iter().map(EngineSpec::total_hp).sum()
    }

    /// Short human-readable label used in logs and the demo output.
    pub fn headline(&self) -> String {
        format!("{} {} ({})", self.builder, self.model, self.year_built)
    }
}
