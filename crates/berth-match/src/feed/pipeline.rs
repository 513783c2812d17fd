//! Normalization and ranking. Raw catalog records come in one end; a
//! scored, shuffled, threshold-pruned page comes out the other.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

use super::domain::{Boat, BoatId, BoatImage, EngineSpec};
use super::learner::LearnedPreferences;
use super::scoring::ScoringEngine;
use super::source::{RawBoat, RawImage};
use super::strategy::EngagementPhase;

/// Width of the rank shuffle before the phase factor is applied.
pub const PHASE_JITTER_SPAN: f64 = 200.0;

const HI_RES_SUFFIX: &str = ".512.jpg";

fn image_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.\d+\.jpg$").expect("valid image suffix pattern"))
}

/// Rewrites a legacy thumbnail suffix (`.64.jpg`, `.256.jpg`, ...) to the
/// high-resolution variant. URLs without the suffix pass through unchanged.
pub fn upgrade_image_url(url: &str) -> String {
    image_suffix_re().replace(url, HI_RES_SUFFIX).into_owned()
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_listing_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&parsed));
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return parsed
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight));
    }
    None
}

fn collect_images(images_list: Option<Vec<RawImage>>, image_url: Option<String>) -> Vec<BoatImage> {
    let from_list: Vec<BoatImage> = images_list
        .unwrap_or_default()
        .into_iter()
        .filter_map(|image| clean(image.image_url))
        .map(|url| BoatImage { url })
        .collect();
    if !from_list.is_empty() {
        return from_list;
    }

    // Legacy records carry a single thumbnail; synthesize a one-entry list
    // at full resolution.
    clean(image_url)
        .map(|url| {
            vec![BoatImage {
                url: upgrade_image_url(&url),
            }]
        })
        .unwrap_or_default()
}

fn split_families(raw: Option<String>) -> Vec<String> {
    raw.map(|families| {
        families
            .split(',')
            .map(str::trim)
            .filter(|family| !family.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Converts a raw catalog record into the domain model. Records missing
/// identity, builder, model, build year or a positive asking price are
/// unusable for cards and are dropped.
pub fn normalize(raw: RawBoat) -> Option<Boat> {
    let id = clean(raw.boat_id)?;
    let builder = clean(raw.builder)?;
    let model = clean(raw.model)?;
    let year_built = raw.year_built.filter(|year| *year > 0)?;
    let sell_price = raw.sell_price.filter(|price| *price > 0.0)?;

    let city = clean(raw.city)
        .or_else(|| clean(raw.visible_at))
        .or_else(|| clean(raw.harbor));
    let images = collect_images(raw.images_list, raw.image_url);
    let listed_at = raw.ins_date.as_deref().and_then(parse_listing_date);

    let engines = raw
        .engines_list
        .unwrap_or_default()
        .into_iter()
        .map(|engine| EngineSpec {
            qty: engine.qty.unwrap_or(1).max(1),
            hp: engine.hp,
            hours: engine.hours,
            year_built: engine.year_built,
        })
        .collect();

    Some(Boat {
        id: BoatId(id),
        builder,
        model,
        year_built,
        sell_price,
        price_display: clean(raw.sell_price_formatted),
        boat_type: clean(raw.boat_type),
        families: split_families(raw.boat_families),
        country: clean(raw.country),
        country_iso: clean(raw.country_iso_code),
        city,
        length: raw.length,
        beam: raw.beam,
        draft: raw.draft,
        cabins: raw.cabins,
        baths: raw.baths,
        max_people: raw.max_people,
        speed_max: raw.speed_max,
        range_nm: raw.range,
        fuel_capacity: raw.fuel,
        water_capacity: raw.water,
        generator: clean(raw.generator),
        hull_material: clean(raw.hull_material),
        engines,
        is_new: raw.new.unwrap_or(false),
        in_stock: raw.stock.unwrap_or(false),
        highlighted: raw.highlighted.unwrap_or(false),
        sold: raw.sold.unwrap_or(false),
        for_sale: raw.sale.unwrap_or(false),
        charter: raw.charter.unwrap_or(false),
        prof_use: raw.prof_use.unwrap_or(false),
        vintage: raw.vintage.unwrap_or(false),
        watercraft: raw.watercraft.unwrap_or(false),
        price_reduced: raw.sell_price_reduced.unwrap_or(false),
        images_hq: raw.images_hq.unwrap_or(false),
        images_360: raw.images_360.unwrap_or(false),
        has_video: raw.video.unwrap_or(false),
        images,
        broker_email: clean(raw.agency_email),
        listed_at,
    })
}

/// Normalizes a whole page, silently dropping unusable records.
pub fn normalize_page(raw: Vec<RawBoat>) -> Vec<Boat> {
    raw.into_iter().filter_map(normalize).collect()
}

struct ScoredBoat {
    base: f64,
    sort_key: f64,
    boat: Boat,
}

/// Scores, shuffles and prunes one fetched page.
///
/// Ordering uses the organic score plus a phase-scaled shuffle; admission
/// uses the organic score alone so the shuffle can reorder a page but never
/// sneak a weak listing past the threshold. When nothing clears the
/// threshold the top of the sorted page ships anyway so the feed stays
/// alive.
pub fn rank(
    boats: Vec<Boat>,
    engine: &ScoringEngine,
    learned: Option<&LearnedPreferences>,
    phase: EngagementPhase,
    now: DateTime<Utc>,
    rng: &mut fastrand::Rng,
    phase_jitter_span: f64,
) -> Vec<Boat> {
    let mut scored: Vec<ScoredBoat> = boats
        .into_iter()
        .map(|boat| {
            let base = engine.score(&boat, learned, now, rng);
            let shuffle = rng.f64() * phase_jitter_span * phase.jitter_factor();
            ScoredBoat {
                base,
                sort_key: base + shuffle,
                boat,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.sort_key.total_cmp(&a.sort_key));

    let threshold = phase.admission_threshold();
    let cut = phase.page_cut();

    if scored.iter().any(|entry| entry.base >= threshold) {
        scored
            .into_iter()
            .filter(|entry| entry.base >= threshold)
            .take(cut)
            .map(|entry| entry.boat)
            .collect()
    } else {
        scored
            .into_iter()
            .take(cut)
            .map(|entry| entry.boat)
            .collect()
    }
}
