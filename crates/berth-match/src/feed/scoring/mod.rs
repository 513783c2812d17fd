//! Listing scorer. The rules mirror what a concierge broker would weigh:
//! brand and location affinity, price and size fit against the member's
//! profile, plus a stack of smaller quality and mechanical signals.

mod preferences;
mod rules;

pub use preferences::SearchPreferences;
pub use rules::HARD_FILTER_SCORE;

use chrono::{DateTime, Utc};

use super::domain::Boat;
use super::learner::LearnedPreferences;

/// Width of the random nudge added to every organic score so near-ties do
/// not render in a frozen order.
pub const DIVERSITY_JITTER_SPAN: f64 = 8.0;

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    preferences: SearchPreferences,
    diversity_span: f64,
}

impl ScoringEngine {
    pub fn new(preferences: SearchPreferences) -> Self {
        Self {
            preferences,
            diversity_span: DIVERSITY_JITTER_SPAN,
        }
    }

    /// Overrides the diversity nudge width. Zero makes scores fully
    /// deterministic, which ordering tests rely on.
    pub fn with_diversity_span(mut self, span: f64) -> Self {
        self.diversity_span = span;
        self
    }

    pub fn preferences(&self) -> &SearchPreferences {
        &self.preferences
    }

    /// Scores a single listing. Hard-filtered listings come back at
    /// [`HARD_FILTER_SCORE`] with no nudge applied.
    pub fn score(
        &self,
        boat: &Boat,
        learned: Option<&LearnedPreferences>,
        now: DateTime<Utc>,
        rng: &mut fastrand::Rng,
    ) -> f64 {
        rules::score_boat(
            boat,
            &self.preferences,
            learned,
            now,
            rng,
            self.diversity_span,
        )
    }
}
