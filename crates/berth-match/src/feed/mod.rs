//! The adaptive feed engine: swipe history, preference learning, listing
//! scoring, retrieval strategy and the per-session orchestration that ties
//! them together behind the HTTP surface.

pub mod domain;
pub mod ledger;
pub mod learner;
pub mod pipeline;
pub mod router;
pub mod scoring;
pub mod session;
pub mod source;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use domain::{Boat, BoatId, BoatImage, Decision, EngineSpec};
pub use ledger::{
    DailyTally, SwipeLedger, SwipeRecord, TraitSnapshot, DAILY_ACCEPT_CAP, LEDGER_CAPACITY,
};
pub use learner::{learn, LearnedPreferences, MIN_ACCEPTS_FOR_LEARNING};
pub use pipeline::{normalize, normalize_page, rank, upgrade_image_url, PHASE_JITTER_SPAN};
pub use router::{feed_router, SESSION_HEADER};
pub use scoring::{ScoringEngine, SearchPreferences, DIVERSITY_JITTER_SPAN, HARD_FILTER_SCORE};
pub use session::{
    BatchSource, DailyStatus, EngagementStats, FeedBatch, FeedError, FeedHub, FeedSession,
    SwipeReceipt, DEFAULT_SESSION_KEY, FETCH_PAGE_SIZE,
};
pub use source::{
    CatalogError, CatalogPage, CatalogSource, ContactIdentity, FilterSet, InterestNotice,
    NotificationSink, NotifyError, PageRequest, RawBoat, RawEngine, RawImage,
};
pub use strategy::{
    fetch_ladder, EngagementPhase, FetchPlan, PagePolicy, EXPLORATION_SWIPE_CEILING,
    PERSONALIZATION_ACCEPT_FLOOR, RANDOM_PAGE_SPAN, RELAXED_PRICE_FLOOR,
};
