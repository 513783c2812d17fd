//! Swipe history storage. The ledger is the only long-lived state the
//! engine keeps per member; everything adaptive is derived from it.

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Boat, BoatId, Decision};

/// Oldest entries are dropped once the ledger grows past this.
pub const LEDGER_CAPACITY: usize = 500;

/// Accepts allowed per member per calendar day.
pub const DAILY_ACCEPT_CAP: u32 = 10;

/// The listing traits worth remembering about a swiped boat. Captured at
/// swipe time so later learning does not depend on the catalog still
/// serving the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitSnapshot {
    pub builder: String,
    pub model: String,
    pub sell_price: f64,
    pub length: Option<f64>,
    pub year_built: i32,
    pub boat_type: Option<String>,
    pub families: Vec<String>,
    pub country: Option<String>,
}

impl TraitSnapshot {
    pub fn of(boat: &Boat) -> Self {
        Self {
            builder: boat.builder.clone(),
            model: boat.model.clone(),
            sell_price: boat.sell_price,
            length: boat.length,
            year_built: boat.year_built,
            boat_type: boat.boat_type.clone(),
            families: boat.families.clone(),
            country: boat.country.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeRecord {
    pub boat_id: BoatId,
    pub decision: Decision,
    pub recorded_at: DateTime<Utc>,
    pub snapshot: TraitSnapshot,
}

/// Bounded ring of swipe records, newest at the back.
#[derive(Debug, Clone, Default)]
pub struct SwipeLedger {
    entries: VecDeque<SwipeRecord>,
}

impl SwipeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: SwipeRecord) {
        self.entries.push_back(record);
        while self.entries.len() > LEDGER_CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn accept_count(&self) -> usize {
        self.accepted().count()
    }

    pub fn reject_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|record| record.decision == Decision::Reject)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SwipeRecord> {
        self.entries.iter()
    }

    pub fn accepted(&self) -> impl Iterator<Item = &SwipeRecord> {
        self.entries
            .iter()
            .filter(|record| record.decision == Decision::Accept)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Accept counter scoped to one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTally {
    pub date: NaiveDate,
    pub accepts: u32,
}

impl DailyTally {
    pub fn for_day(date: NaiveDate) -> Self {
        Self { date, accepts: 0 }
    }

    /// Resets the counter when the calendar day has rolled over.
    pub fn roll(&mut self, today: NaiveDate) {
        if self.date != today {
            self.date = today;
            self.accepts = 0;
        }
    }

    /// Rolls the day forward if needed, then counts one accept. Returns the
    /// updated total for `today`.
    pub fn register_accept(&mut self, today: NaiveDate) -> u32 {
        self.roll(today);
        self.accepts = self.accepts.saturating_add(1);
        self.accepts
    }

    pub fn accepts_on(&self, today: NaiveDate) -> u32 {
        if self.date == today {
            self.accepts
        } else {
            0
        }
    }

    pub fn cap_reached_on(&self, today: NaiveDate) -> bool {
        self.accepts_on(today) >= DAILY_ACCEPT_CAP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(builder: &str) -> TraitSnapshot {
        TraitSnapshot {
            builder: builder.to_string(),
            model: "Test 40".to_string(),
            sell_price: 500_000.0,
            length: Some(14.0),
            year_built: 2020,
            boat_type: Some("Motor Yacht".to_string()),
            families: vec!["Flybridge".to_string()],
            country: Some("Italy".to_string()),
        }
    }

    fn record(id: &str, decision: Decision) -> SwipeRecord {
        SwipeRecord {
            boat_id: BoatId::from(id),
            decision,
            recorded_at: Utc::now(),
            snapshot: snapshot("Azimut"),
        }
    }

    #[test]
    fn ledger_drops_oldest_past_capacity() {
        let mut ledger = SwipeLedger::new();
        for index in 0..(LEDGER_CAPACITY + 25) {
            ledger.record(record(&format!("boat-{index}"), Decision::Reject));
        }

        assert_eq!(ledger.len(), LEDGER_CAPACITY);
        let first = ledger.iter().next().expect("ledger not empty");
        assert_eq!(first.boat_id, BoatId::from("boat-25"));
    }

    #[test]
    fn accept_count_only_counts_accepts() {
        let mut ledger = SwipeLedger::new();
        ledger.record(record("a", Decision::Accept));
        ledger.record(record("b", Decision::Reject));
        ledger.record(record("c", Decision::Accept));

        assert_eq!(ledger.accept_count(), 2);
        assert_eq!(ledger.reject_count(), 1);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn tally_rolls_over_on_new_day() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).expect("valid date");

        let mut tally = DailyTally::for_day(monday);
        for _ in 0..DAILY_ACCEPT_CAP {
            tally.register_accept(monday);
        }
        assert!(tally.cap_reached_on(monday));

        assert_eq!(tally.accepts_on(tuesday), 0);
        assert!(!tally.cap_reached_on(tuesday));
        assert_eq!(tally.register_accept(tuesday), 1);
        assert_eq!(tally.date, tuesday);
    }
}
