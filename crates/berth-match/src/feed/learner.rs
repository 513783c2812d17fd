//! Derives a taste profile from accepted swipes. The learner is pure: it
//! reads the ledger and returns a value, so callers decide when relearning
//! is worth the walk over the history.

use serde::Serialize;

use super::ledger::SwipeLedger;

/// Accepted swipes required before a profile is considered trustworthy.
pub const MIN_ACCEPTS_FOR_LEARNING: usize = 3;

/// Family labels must appear on more than one accepted boat to count;
/// a single sighting is treated as noise.
const FAMILY_MIN_COUNT: usize = 2;

/// Ranked taste profile distilled from accepted swipes. Attribute lists are
/// ordered most-frequent first; averages are over the accepts that carried
/// the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LearnedPreferences {
    pub brands: Vec<String>,
    pub boat_types: Vec<String>,
    pub families: Vec<String>,
    pub countries: Vec<String>,
    pub average_price: f64,
    pub average_length: f64,
    pub average_year: f64,
}

impl LearnedPreferences {
    pub fn top_brand(&self) -> Option<&str> {
        self.brands.first().map(String::as_str)
    }

    pub fn top_boat_type(&self) -> Option<&str> {
        self.boat_types.first().map(String::as_str)
    }
}

/// Frequency counter that remembers first-observed order so ties rank the
/// earlier sighting first.
#[derive(Debug, Default)]
struct RankedCounter {
    entries: Vec<(String, usize)>,
}

impl RankedCounter {
    fn bump(&mut self, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((value.to_string(), 1)),
        }
    }

    fn ranked(mut self, min_count: usize) -> Vec<String> {
        self.entries.retain(|(_, count)| *count >= min_count);
        // Stable sort keeps first-observed order among equal counts.
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.into_iter().map(|(value, _)| value).collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Builds a profile from the ledger, or `None` while the accept history is
/// too thin to generalize from.
pub fn learn(ledger: &SwipeLedger) -> Option<LearnedPreferences> {
    let accepted: Vec<_> = ledger.accepted().collect();
    if accepted.len() < MIN_ACCEPTS_FOR_LEARNING {
        return None;
    }

    let mut brands = RankedCounter::default();
    let mut boat_types = RankedCounter::default();
    let mut families = RankedCounter::default();
    let mut countries = RankedCounter::default();
    let mut prices = Vec::new();
    let mut lengths = Vec::new();
    let mut years = Vec::new();

    for record in &accepted {
        let snapshot = &record.snapshot;
        brands.bump(&snapshot.builder);
        if let Some(boat_type) = &snapshot.boat_type {
            boat_types.bump(boat_type);
        }
        for family in &snapshot.families {
            families.bump(family);
        }
        if let Some(country) = &snapshot.country {
            countries.bump(country);
        }
        if snapshot.sell_price > 0.0 {
            prices.push(snapshot.sell_price);
        }
        if let Some(length) = snapshot.length {
            if length > 0.0 {
                lengths.push(length);
            }
        }
        years.push(f64::from(snapshot.year_built));
    }

    Some(LearnedPreferences {
        brands: brands.ranked(1),
        boat_types: boat_types.ranked(1),
        families: families.ranked(FAMILY_MIN_COUNT),
        countries: countries.ranked(1),
        average_price: mean(&prices),
        average_length: mean(&lengths),
        average_year: mean(&years),
    })
}
