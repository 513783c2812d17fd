//! Deterministic synthetic inventory. Stands in for the remote catalog in
//! local development and whenever a live fetch fails, so the card deck
//! never goes dark.

use crate::feed::domain::BoatId;
use crate::feed::source::{
    BoxFuture, CatalogError, CatalogSource, PageRequest, RawBoat, RawImage,
};

const BUILDERS: [&str; 10] = [
    "Azimut",
    "Sunseeker",
    "Ferretti",
    "Riva",
    "Princess",
    "Sanlorenzo",
    "Benetti",
    "Pershing",
    "Bavaria",
    "Jeanneau",
];

const MODEL_LINES: [&str; 8] = [
    "Flybridge",
    "Grande",
    "Predator",
    "Yacht",
    "Sportfly",
    "Magellano",
    "Atlantis",
    "Superyacht",
];

const LOCATIONS: [(&str, &str); 8] = [
    ("Viareggio", "Italy"),
    ("Cannes", "France"),
    ("Miami", "USA"),
    ("Monaco", "Monaco"),
    ("Split", "Croatia"),
    ("Athens", "Greece"),
    ("Palma", "Spain"),
    ("Dubai", "UAE"),
];

const IMAGE_POOL: [&str; 5] = [
    "https://images.unsplash.com/photo-1569263979104-865ab7cd8d13?q=80&w=2000&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1567899378494-47b22a2ae96a?q=80&w=2000&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1605281317010-fe5ffe798166?q=80&w=2000&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1544551763-46a8723ba3f9?q=80&w=2000&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1621275471769-e6aa344546d5?q=80&w=2000&auto=format&fit=crop",
];

const ID_PREFIX: &str = "synthetic-";

/// Congruential hash keyed on the listing ordinal. Every attribute of a
/// given boat derives from the same ordinal, so pages are stable across
/// requests and processes.
fn scramble(ordinal: u64, modulus: u64) -> u64 {
    (ordinal.wrapping_mul(9301).wrapping_add(49_297)) % modulus
}

fn pick<'a>(values: &'a [&'a str], ordinal: u64) -> &'a str {
    values[scramble(ordinal, values.len() as u64) as usize]
}

fn synthetic_boat(ordinal: u64) -> RawBoat {
    let price = 200_000 + scramble(ordinal, 100) * 100_000;
    let length = 10.0 + scramble(ordinal, 30) as f64 + scramble(ordinal, 100) as f64 / 100.0;
    let (city, country) = LOCATIONS[scramble(ordinal, LOCATIONS.len() as u64) as usize];
    let image = IMAGE_POOL[(ordinal % IMAGE_POOL.len() as u64) as usize];

    RawBoat {
        boat_id: Some(format!("{ID_PREFIX}{ordinal}")),
        builder: Some(pick(&BUILDERS, ordinal).to_string()),
        model: Some(format!(
            "{} {}",
            pick(&MODEL_LINES, ordinal),
            40 + scramble(ordinal, 60)
        )),
        year_built: Some(2010 + scramble(ordinal, 15) as i32),
        length: Some(length),
        cabins: Some(3 + scramble(ordinal, 3) as u32),
        baths: Some(2 + scramble(ordinal, 3) as u32),
        sell_price: Some(price as f64),
        sell_price_currency: Some("EUR".to_string()),
        sell_price_formatted: Some(format!("€ {price}")),
        city: Some(city.to_string()),
        country: Some(country.to_string()),
        images_list: Some(vec![RawImage {
            image_url: Some(image.to_string()),
            text: None,
        }]),
        ..RawBoat::default()
    }
}

/// One page of synthetic listings. Page and size follow the same 1-based
/// convention as the live catalog.
pub fn synthetic_page(page: u32, page_size: u32) -> Vec<RawBoat> {
    let start = u64::from(page.saturating_sub(1)) * u64::from(page_size);
    (0..u64::from(page_size))
        .map(|offset| synthetic_boat(start + offset))
        .collect()
}

/// Catalog backend serving only synthetic inventory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticCatalog;

impl CatalogSource for SyntheticCatalog {
    fn fetch_page<'a>(
        &'a self,
        request: &'a PageRequest,
    ) -> BoxFuture<'a, Result<Vec<RawBoat>, CatalogError>> {
        Box::pin(async move { Ok(synthetic_page(request.page, request.page_size)) })
    }

    fn fetch_detail<'a>(
        &'a self,
        id: &'a BoatId,
    ) -> BoxFuture<'a, Result<Option<RawBoat>, CatalogError>> {
        Box::pin(async move {
            let ordinal = id.0.strip_prefix(ID_PREFIX).and_then(|rest| rest.parse::<u64>().ok());
            Ok(ordinal.map(synthetic_boat))
        })
    }
}
