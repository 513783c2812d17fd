//! Engagement phases and the retrieval ladder. The phase decides how the
//! catalog is queried and how aggressively ranking shuffles and prunes;
//! the ladder decides what to try when a query comes back empty.

use serde::Serialize;

use super::learner::LearnedPreferences;
use super::source::FilterSet;

/// Swipes before the engine stops treating the member as brand new.
pub const EXPLORATION_SWIPE_CEILING: usize = 30;

/// Accepts needed (on top of a usable profile) to serve personalized pages.
pub const PERSONALIZATION_ACCEPT_FLOOR: usize = 5;

/// Price floor applied by the relaxed ladder step to keep dinghies and
/// trailer stock out of a luxury feed.
pub const RELAXED_PRICE_FLOOR: u32 = 100_000;

/// Length ceiling for the first exploration step: approachable boats first.
pub const EXPLORATION_LENGTH_CAP: u32 = 15;

/// The open-ended ladder step picks a random page within this span.
pub const RANDOM_PAGE_SPAN: u32 = 20;

/// Where a member currently sits in the adaptation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementPhase {
    /// Few swipes so far: broad, approachable inventory with heavy shuffle.
    Exploration,
    /// Enough history to judge, not enough accepts to personalize.
    Baseline,
    /// A learned profile drives both retrieval and ranking.
    Personalized,
}

impl EngagementPhase {
    /// Phase from the raw engagement numbers. `learned_available` matters
    /// because accepts alone do not guarantee a usable profile.
    pub fn resolve(total_swipes: usize, accepts: usize, learned_available: bool) -> Self {
        if total_swipes < EXPLORATION_SWIPE_CEILING {
            EngagementPhase::Exploration
        } else if accepts >= PERSONALIZATION_ACCEPT_FLOOR && learned_available {
            EngagementPhase::Personalized
        } else {
            EngagementPhase::Baseline
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EngagementPhase::Exploration => "exploration",
            EngagementPhase::Baseline => "baseline",
            EngagementPhase::Personalized => "personalized",
        }
    }

    /// Multiplier on the rank-shuffle span: exploration churns hard,
    /// personalized pages barely move.
    pub const fn jitter_factor(self) -> f64 {
        match self {
            EngagementPhase::Exploration => 1.5,
            EngagementPhase::Baseline => 0.8,
            EngagementPhase::Personalized => 0.2,
        }
    }

    /// Minimum organic score a listing needs to be admitted to the page.
    pub const fn admission_threshold(self) -> f64 {
        match self {
            EngagementPhase::Exploration => 5.0,
            EngagementPhase::Baseline | EngagementPhase::Personalized => 20.0,
        }
    }

    /// Listings delivered per page.
    pub const fn page_cut(self) -> usize {
        match self {
            EngagementPhase::Exploration => 12,
            EngagementPhase::Baseline | EngagementPhase::Personalized => 20,
        }
    }
}

/// Which catalog page a plan targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePolicy {
    /// Use the page the client asked for.
    Requested,
    /// Pick a random page in `1..=max` to resurface unseen inventory.
    RandomWithin(u32),
}

/// One rung of the retrieval ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPlan {
    pub label: &'static str,
    pub filters: FilterSet,
    pub page: PagePolicy,
}

impl FetchPlan {
    fn new(label: &'static str, filters: FilterSet) -> Self {
        Self {
            label,
            filters,
            page: PagePolicy::Requested,
        }
    }

    fn random_page(mut self) -> Self {
        self.page = PagePolicy::RandomWithin(RANDOM_PAGE_SPAN);
        self
    }
}

/// Builds the ordered list of fetch attempts for a phase. Later rungs only
/// run when the previous one produced nothing usable.
pub fn fetch_ladder(phase: EngagementPhase, learned: Option<&LearnedPreferences>) -> Vec<FetchPlan> {
    match phase {
        EngagementPhase::Exploration => vec![
            FetchPlan::new(
                "exploration",
                FilterSet::new().with("lengthTo", EXPLORATION_LENGTH_CAP.to_string()),
            ),
            relaxed_plan(),
            open_plan(),
        ],
        EngagementPhase::Personalized => {
            let filters = learned.map(personalized_filters).unwrap_or_default();
            vec![
                FetchPlan::new("personalized", filters),
                relaxed_plan(),
                open_plan(),
            ]
        }
        EngagementPhase::Baseline => vec![FetchPlan::new("baseline", FilterSet::new())],
    }
}

fn relaxed_plan() -> FetchPlan {
    FetchPlan::new(
        "relaxed",
        FilterSet::new().with("priceFrom", RELAXED_PRICE_FLOOR.to_string()),
    )
}

fn open_plan() -> FetchPlan {
    FetchPlan::new("open", FilterSet::new()).random_page()
}

/// Translates a learned profile into catalog filters: a generous price
/// band around the average accept, a tighter length band, a year floor
/// when the member leans recent, and the top boat type.
fn personalized_filters(learned: &LearnedPreferences) -> FilterSet {
    let mut filters = FilterSet::new();

    if learned.average_price > 0.0 {
        let floor = (learned.average_price * 0.4).floor() as i64;
        let ceiling = (learned.average_price * 1.6).floor() as i64;
        filters.set("priceFrom", floor.to_string());
        filters.set("priceTo", ceiling.to_string());
    }
    if learned.average_length > 0.0 {
        filters.set("lengthFrom", format!("{:.1}", learned.average_length * 0.6));
        filters.set("lengthTo", format!("{:.1}", learned.average_length * 1.4));
    }
    if learned.average_year > 1990.0 {
        let floor = learned.average_year.round() as i32 - 20;
        filters.set("yearFrom", floor.to_string());
    }
    if let Some(top_type) = learned.top_boat_type() {
        filters.set("boatType", top_type);
    }

    filters
}
