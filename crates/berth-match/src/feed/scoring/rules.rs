use chrono::{DateTime, Datelike, Utc};

use super::super::domain::Boat;
use super::super::learner::LearnedPreferences;
use super::preferences::SearchPreferences;

/// Score assigned when a hard filter trips. Far below anything the soft
/// rules can produce, so these listings sort last and never pass admission.
pub const HARD_FILTER_SCORE: f64 = -1000.0;

/// Learned brand hits count a little more than the static wishlist.
const LEARNED_BRAND_WEIGHT: f64 = 1.2;

pub(crate) fn score_boat(
    boat: &Boat,
    prefs: &SearchPreferences,
    learned: Option<&LearnedPreferences>,
    now: DateTime<Utc>,
    rng: &mut fastrand::Rng,
    diversity_span: f64,
) -> f64 {
    // Hard filters sink the listing outright; no soft rule can recover it.
    if prefs.exclude_sold && boat.sold {
        return HARD_FILTER_SCORE;
    }
    if !prefs.include_charter && boat.charter && !boat.for_sale {
        return HARD_FILTER_SCORE;
    }

    let mut score = 0.0;
    score += brand_affinity(boat, prefs, learned);
    score += price_fit(boat, prefs, learned);
    score += location_fit(boat, prefs, learned);
    score += size_fit(boat, prefs, learned);
    score += year_fit(boat, prefs, learned, now);
    score += category_affinity(boat, learned);
    score += accommodation_fit(boat, prefs);
    score += quality_signals(boat, prefs);
    score += mechanical_fit(boat);
    score += freshness(boat, now);
    score += rng.f64() * diversity_span;
    score
}

fn brand_affinity(boat: &Boat, prefs: &SearchPreferences, learned: Option<&LearnedPreferences>) -> f64 {
    let mut score = 0.0;

    let learned_brands = learned
        .map(|profile| profile.brands.as_slice())
        .filter(|brands| !brands.is_empty());
    let (ranked, weight) = match learned_brands {
        Some(brands) => (brands, LEARNED_BRAND_WEIGHT),
        None => (prefs.preferred_brands.as_slice(), 1.0),
    };

    if let Some(rank) = ranked.iter().position(|brand| brand == &boat.builder) {
        score += (50.0 - 10.0 * rank as f64) * weight;
    }

    if prefs.disliked_brands.iter().any(|brand| brand == &boat.builder) {
        score -= 50.0;
    }

    score
}

fn price_fit(boat: &Boat, prefs: &SearchPreferences, learned: Option<&LearnedPreferences>) -> f64 {
    let mut score = 0.0;
    let price = boat.sell_price;

    if let Some(ceiling) = prefs.max_price {
        if price > 0.0 {
            let target = learned
                .map(|profile| profile.average_price)
                .filter(|avg| *avg > 0.0)
                .unwrap_or(ceiling * 0.6);
            if price <= ceiling {
                // Gaussian falloff around the target keeps mid-range
                // listings ahead of bargain-bin and limit-priced ones.
                let sigma = ceiling * 0.3;
                let diff = price - target;
                score += 40.0 * (-(diff * diff) / (2.0 * sigma * sigma)).exp();
            } else {
                score -= 30.0;
            }
        }
    }

    if let Some(floor) = prefs.min_price {
        if price > 0.0 && price < floor {
            score -= 25.0;
        }
    }

    score
}

fn location_fit(boat: &Boat, prefs: &SearchPreferences, learned: Option<&LearnedPreferences>) -> f64 {
    let ranked = learned
        .map(|profile| profile.countries.as_slice())
        .filter(|countries| !countries.is_empty())
        .unwrap_or(prefs.preferred_countries.as_slice());

    let country = boat.country.as_deref().unwrap_or("").to_lowercase();
    let iso = boat.country_iso.as_deref().unwrap_or("").to_lowercase();
    if country.is_empty() && iso.is_empty() {
        return 0.0;
    }

    for (rank, preferred) in ranked.iter().enumerate() {
        let needle = preferred.to_lowercase();
        if country.contains(&needle) || iso.contains(&needle) {
            return 30.0 - 5.0 * rank as f64;
        }
    }

    0.0
}

fn size_fit(boat: &Boat, prefs: &SearchPreferences, learned: Option<&LearnedPreferences>) -> f64 {
    let mut score = 0.0;
    let Some(length) = boat.length else {
        return 0.0;
    };

    let target = learned
        .map(|profile| profile.average_length)
        .filter(|avg| *avg > 0.0)
        .or(prefs.min_length)
        .unwrap_or(20.0);

    if let Some(min_length) = prefs.min_length {
        if length >= min_length {
            score += 25.0 * (-(length - target).abs() / 8.0).exp();
        }
    }
    if let Some(max_length) = prefs.max_length {
        if length > max_length {
            score -= 20.0;
        }
    }

    score
}

fn year_fit(
    boat: &Boat,
    prefs: &SearchPreferences,
    learned: Option<&LearnedPreferences>,
    now: DateTime<Utc>,
) -> f64 {
    let mut score = 0.0;
    let year = f64::from(boat.year_built);

    let target = learned
        .map(|profile| profile.average_year)
        .filter(|avg| *avg > 0.0)
        .unwrap_or(2020.0);
    if year >= target {
        score += (2.0 * (year - target + 1.0)).min(20.0);
    }

    let age = f64::from(now.year() - boat.year_built);
    if age > 15.0 {
        score -= (age - 15.0) * 0.5;
    }

    if let Some(min_year) = prefs.min_year {
        if boat.year_built < min_year {
            score -= 15.0;
        }
    }

    score
}

fn category_affinity(boat: &Boat, learned: Option<&LearnedPreferences>) -> f64 {
    let Some(learned) = learned else {
        return 0.0;
    };
    let mut score = 0.0;

    if let Some(boat_type) = &boat.boat_type {
        if learned.boat_types.iter().any(|known| known == boat_type) {
            score += 40.0;
        }
    }
    if !learned.families.is_empty()
        && boat
            .families
            .iter()
            .any(|family| learned.families.contains(family))
    {
        score += 30.0;
    }

    score
}

fn accommodation_fit(boat: &Boat, prefs: &SearchPreferences) -> f64 {
    let mut score = 0.0;

    if let (Some(min_cabins), Some(cabins)) = (prefs.min_cabins, boat.cabins) {
        if cabins >= min_cabins {
            score += 8.0;
        }
    }
    if let (Some(min_baths), Some(baths)) = (prefs.min_baths, boat.baths) {
        if baths >= min_baths {
            score += 7.0;
        }
    }

    score
}

fn quality_signals(boat: &Boat, prefs: &SearchPreferences) -> f64 {
    let mut score = 0.0;

    if boat.is_new {
        score += 20.0;
    }
    if boat.highlighted {
        score += 12.0;
    }
    if boat.images_hq {
        score += 5.0;
    }
    if prefs.prefer_video && boat.has_video {
        score += 8.0;
    }
    if prefs.prefer_360_images && boat.images_360 {
        score += 6.0;
    }
    if boat.price_reduced {
        score += 15.0;
    }
    if boat.in_stock {
        score += 5.0;
    }

    score
}

fn mechanical_fit(boat: &Boat) -> f64 {
    let mut score = 0.0;

    let total_hp = boat.total_horsepower();
    if let Some(length) = boat.length {
        if total_hp > 0.0 && length > 0.0 {
            let ratio = total_hp / length;
            if ratio > 20.0 {
                score += 8.0;
            } else if ratio > 10.0 {
                score += 4.0;
            }
        }
    }

    for engine in &boat.engines {
        if let Some(hours) = engine.hours {
            if hours > 0.0 && hours < 500.0 {
                score += 10.0;
            } else if hours > 0.0 && hours < 1000.0 {
                score += 5.0;
            }
        }
        if let Some(year) = engine.year_built {
            if year >= 2018 {
                score += 3.0;
            }
        }
    }

    if boat.range_nm.unwrap_or(0.0) > 300.0 {
        score += 8.0;
    }
    if boat.fuel_capacity.unwrap_or(0.0) > 500.0 {
        score += 4.0;
    }
    if boat.water_capacity.unwrap_or(0.0) > 300.0 {
        score += 2.0;
    }
    if boat.speed_max.unwrap_or(0.0) > 30.0 {
        score += 5.0;
    }

    if let (Some(beam), Some(length)) = (boat.beam, boat.length) {
        if length > 0.0 && beam / length > 0.23 {
            score += 4.0;
        }
    }
    if let Some(draft) = boat.draft {
        if draft > 0.0 && draft < 2.5 {
            score += 4.0;
        }
    }

    if boat.prof_use {
        score += 5.0;
    }
    if boat.generator.is_some() {
        score += 3.0;
    }
    if boat.max_people.unwrap_or(0) >= 8 {
        score += 3.0;
    }

    if let Some(hull) = &boat.hull_material {
        let hull = hull.to_lowercase();
        if hull.contains("carbon") {
            score += 10.0;
        } else if hull.contains("fiberglass") || hull.contains("vetroresina") {
            score += 2.0;
        }
    }

    if boat.vintage {
        score += 6.0;
    }
    if boat.watercraft {
        score += 2.0;
    }

    score
}

fn freshness(boat: &Boat, now: DateTime<Utc>) -> f64 {
    let Some(listed_at) = boat.listed_at else {
        return 0.0;
    };
    let days = (now - listed_at).num_days();
    if days < 7 {
        10.0
    } else if days < 30 {
        5.0
    } else {
        0.0
    }
}
