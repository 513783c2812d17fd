//! Per-member feed orchestration. A [`FeedSession`] owns one member's
//! swipe history and rides the retrieval ladder on every page request;
//! [`FeedHub`] hands sessions out by key so the HTTP layer stays stateless.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::domain::{Boat, BoatId, Decision};
use super::ledger::{DailyTally, SwipeLedger, SwipeRecord, TraitSnapshot, DAILY_ACCEPT_CAP};
use super::learner::{learn, LearnedPreferences};
use super::pipeline::{self, PHASE_JITTER_SPAN};
use super::scoring::{ScoringEngine, SearchPreferences};
use super::source::{CatalogSource, ContactIdentity, InterestNotice, NotificationSink, PageRequest};
use super::strategy::{fetch_ladder, EngagementPhase, PagePolicy};
use crate::catalog::synthetic::synthetic_page;

/// Catalog records fetched per ladder attempt; ranking prunes from there.
pub const FETCH_PAGE_SIZE: u32 = 50;

/// Session key used when a client does not supply one.
pub const DEFAULT_SESSION_KEY: &str = "default";

/// Where the records behind a delivered page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSource {
    Catalog,
    Synthetic,
}

impl BatchSource {
    pub const fn label(self) -> &'static str {
        match self {
            BatchSource::Catalog => "catalog",
            BatchSource::Synthetic => "synthetic",
        }
    }
}

/// One delivered feed page.
#[derive(Debug, Clone, Serialize)]
pub struct FeedBatch {
    pub boats: Vec<Boat>,
    pub phase: EngagementPhase,
    pub source: BatchSource,
    /// True when every ladder rung came back empty; the catalog has nothing
    /// further for this session.
    pub exhausted: bool,
}

/// Outcome of one recorded swipe.
#[derive(Debug, Clone, Serialize)]
pub struct SwipeReceipt {
    pub boat_id: BoatId,
    pub decision: Decision,
    pub accepts_today: u32,
    pub daily_cap: u32,
    pub cap_reached: bool,
    pub broker_notified: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EngagementStats {
    pub total_swipes: usize,
    pub accepts: usize,
    pub rejects: usize,
    pub phase: EngagementPhase,
    pub profile_ready: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DailyStatus {
    pub accepts_today: u32,
    pub daily_cap: u32,
    pub cap_reached: bool,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("boat {0} was never delivered to this session")]
    UnknownBoat(BoatId),
}

/// Creates and caches [`FeedSession`]s by key. Every session shares the
/// same catalog, sink and scoring configuration.
pub struct FeedHub<C, N> {
    catalog: Arc<C>,
    sink: Arc<N>,
    engine: ScoringEngine,
    fetch_size: u32,
    seed: Option<u64>,
    sessions: Mutex<HashMap<String, Arc<FeedSession<C, N>>>>,
}

impl<C, N> FeedHub<C, N>
where
    C: CatalogSource,
    N: NotificationSink,
{
    pub fn new(catalog: Arc<C>, sink: Arc<N>, preferences: SearchPreferences) -> Self {
        Self::with_engine(catalog, sink, ScoringEngine::new(preferences))
    }

    pub fn with_engine(catalog: Arc<C>, sink: Arc<N>, engine: ScoringEngine) -> Self {
        Self {
            catalog,
            sink,
            engine,
            fetch_size: FETCH_PAGE_SIZE,
            seed: None,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Gives every new session a fixed RNG seed. Demos and tests use this
    /// for repeatable ordering.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = fetch_size.max(1);
        self
    }

    /// Returns the session for `key`, creating it on first sight.
    pub fn session(&self, key: &str) -> Arc<FeedSession<C, N>> {
        let mut sessions = self.sessions.lock().expect("session map mutex poisoned");
        sessions
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(FeedSession::with_engine(
                    self.catalog.clone(),
                    self.sink.clone(),
                    self.engine.clone(),
                    self.fetch_size,
                    self.seed,
                ))
            })
            .clone()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().expect("session map mutex poisoned").len()
    }
}

struct SessionState {
    ledger: SwipeLedger,
    seen: HashSet<BoatId>,
    delivered: HashMap<BoatId, Boat>,
    tally: DailyTally,
    identity: Option<ContactIdentity>,
    rng: fastrand::Rng,
}

impl SessionState {
    fn new(seed: Option<u64>) -> Self {
        Self {
            ledger: SwipeLedger::new(),
            seen: HashSet::new(),
            delivered: HashMap::new(),
            tally: DailyTally::for_day(Local::now().date_naive()),
            identity: None,
            rng: seed
                .map(fastrand::Rng::with_seed)
                .unwrap_or_else(fastrand::Rng::new),
        }
    }
}

/// One member's adaptive feed.
pub struct FeedSession<C, N> {
    catalog: Arc<C>,
    sink: Arc<N>,
    engine: ScoringEngine,
    fetch_size: u32,
    state: Mutex<SessionState>,
}

impl<C, N> FeedSession<C, N>
where
    C: CatalogSource,
    N: NotificationSink,
{
    pub fn new(catalog: Arc<C>, sink: Arc<N>, preferences: SearchPreferences) -> Self {
        Self::with_engine(
            catalog,
            sink,
            ScoringEngine::new(preferences),
            FETCH_PAGE_SIZE,
            None,
        )
    }

    pub fn with_engine(
        catalog: Arc<C>,
        sink: Arc<N>,
        engine: ScoringEngine,
        fetch_size: u32,
        seed: Option<u64>,
    ) -> Self {
        Self {
            catalog,
            sink,
            engine,
            fetch_size: fetch_size.max(1),
            state: Mutex::new(SessionState::new(seed)),
        }
    }

    /// Assembles the next feed page: resolve the phase, walk the retrieval
    /// ladder until a rung yields records, then normalize, rank and strip
    /// already-seen listings. Transport failures swap in synthetic
    /// inventory rather than surfacing an error to the card deck.
    pub async fn next_batch(&self, page: u32) -> FeedBatch {
        let page = page.max(1);
        let (phase, learned) = {
            let state = self.lock_state();
            let learned = learn(&state.ledger);
            let phase = EngagementPhase::resolve(
                state.ledger.len(),
                state.ledger.accept_count(),
                learned.is_some(),
            );
            (phase, learned)
        };

        let ladder = fetch_ladder(phase, learned.as_ref());
        let mut fetched = None;
        let mut source = BatchSource::Catalog;

        for plan in &ladder {
            let target_page = match plan.page {
                PagePolicy::Requested => page,
                PagePolicy::RandomWithin(span) => self.lock_state().rng.u32(1..=span),
            };
            let request =
                PageRequest::new(target_page, self.fetch_size).with_filters(plan.filters.clone());

            match self.catalog.fetch_page(&request).await {
                Ok(batch) if !batch.is_empty() => {
                    debug!(
                        step = plan.label,
                        page = target_page,
                        records = batch.len(),
                        "catalog step produced records"
                    );
                    fetched = Some(batch);
                    break;
                }
                Ok(_) => {
                    debug!(
                        step = plan.label,
                        page = target_page,
                        "catalog step returned no records"
                    );
                }
                Err(err) => {
                    warn!(
                        step = plan.label,
                        error = %err,
                        "catalog fetch failed; substituting synthetic inventory"
                    );
                    fetched = Some(synthetic_page(page, self.fetch_size));
                    source = BatchSource::Synthetic;
                    break;
                }
            }
        }

        let Some(raw) = fetched else {
            info!(phase = phase.label(), page, "catalog exhausted for this session");
            return FeedBatch {
                boats: Vec::new(),
                phase,
                source,
                exhausted: true,
            };
        };

        let normalized = pipeline::normalize_page(raw);
        let now = Utc::now();

        let boats = {
            let mut guard = self.lock_state();
            let state = &mut *guard;
            let ranked = pipeline::rank(
                normalized,
                &self.engine,
                learned.as_ref(),
                phase,
                now,
                &mut state.rng,
                PHASE_JITTER_SPAN,
            );

            // Deduplication runs after ranking so the threshold judges the
            // whole page, not just its unseen remainder.
            let mut unseen = Vec::with_capacity(ranked.len());
            for boat in ranked {
                if state.seen.contains(&boat.id) {
                    continue;
                }
                state.seen.insert(boat.id.clone());
                state.delivered.insert(boat.id.clone(), boat.clone());
                unseen.push(boat);
            }
            unseen
        };

        info!(
            phase = phase.label(),
            source = source.label(),
            page,
            delivered = boats.len(),
            "feed page assembled"
        );

        FeedBatch {
            boats,
            phase,
            source,
            exhausted: false,
        }
    }

    /// Records a verdict on a previously delivered listing. Accepts bump
    /// the daily tally and, once contact details are on file, notify the
    /// broker. Notification failures are logged and never retried.
    pub async fn record_swipe(
        &self,
        boat_id: &BoatId,
        decision: Decision,
    ) -> Result<SwipeReceipt, FeedError> {
        let today = Local::now().date_naive();
        let (notice, accepts_today) = {
            let mut state = self.lock_state();
            let boat = state
                .delivered
                .get(boat_id)
                .cloned()
                .ok_or_else(|| FeedError::UnknownBoat(boat_id.clone()))?;

            state.ledger.record(SwipeRecord {
                boat_id: boat_id.clone(),
                decision,
                recorded_at: Utc::now(),
                snapshot: TraitSnapshot::of(&boat),
            });

            state.tally.roll(today);
            let mut notice = None;
            if decision.is_accept() {
                state.tally.register_accept(today);
                if let Some(identity) = &state.identity {
                    notice = Some(InterestNotice {
                        boat_id: boat.id.clone(),
                        builder: boat.builder.clone(),
                        model: boat.model.clone(),
                        year_built: boat.year_built,
                        price_display: boat
                            .price_display
                            .clone()
                            .unwrap_or_else(|| format!("€ {:.0}", boat.sell_price)),
                        broker_email: boat.broker_email.clone(),
                        contact: identity.clone(),
                    });
                }
            }
            (notice, state.tally.accepts_on(today))
        };

        let mut broker_notified = false;
        if let Some(notice) = notice {
            match self.sink.notify_interest(&notice).await {
                Ok(()) => {
                    broker_notified = true;
                    info!(boat = %notice.boat_id, "broker notified of accepted listing");
                }
                Err(err) => {
                    warn!(boat = %notice.boat_id, error = %err, "broker notification failed");
                }
            }
        }

        Ok(SwipeReceipt {
            boat_id: boat_id.clone(),
            decision,
            accepts_today,
            daily_cap: DAILY_ACCEPT_CAP,
            cap_reached: accepts_today >= DAILY_ACCEPT_CAP,
            broker_notified,
        })
    }

    /// Full listing detail, preferring a fresh catalog read and falling
    /// back to the copy delivered earlier in this session.
    pub async fn boat_detail(&self, boat_id: &BoatId) -> Option<Boat> {
        match self.catalog.fetch_detail(boat_id).await {
            Ok(Some(raw)) => pipeline::normalize(raw).or_else(|| self.delivered_copy(boat_id)),
            Ok(None) => self.delivered_copy(boat_id),
            Err(err) => {
                warn!(boat = %boat_id, error = %err, "detail fetch failed; serving session copy");
                self.delivered_copy(boat_id)
            }
        }
    }

    pub fn set_identity(&self, identity: ContactIdentity) {
        let mut state = self.lock_state();
        state.identity = Some(identity);
        info!("contact identity captured for session");
    }

    pub fn identity(&self) -> Option<ContactIdentity> {
        self.lock_state().identity.clone()
    }

    pub fn engagement(&self) -> EngagementStats {
        let state = self.lock_state();
        let learned = learn(&state.ledger);
        let total_swipes = state.ledger.len();
        let accepts = state.ledger.accept_count();
        EngagementStats {
            total_swipes,
            accepts,
            rejects: state.ledger.reject_count(),
            phase: EngagementPhase::resolve(total_swipes, accepts, learned.is_some()),
            profile_ready: learned.is_some(),
        }
    }

    pub fn daily(&self) -> DailyStatus {
        let today = Local::now().date_naive();
        let state = self.lock_state();
        DailyStatus {
            accepts_today: state.tally.accepts_on(today),
            daily_cap: DAILY_ACCEPT_CAP,
            cap_reached: state.tally.cap_reached_on(today),
        }
    }

    /// Current taste profile, or `None` while the accept history is thin.
    pub fn learned(&self) -> Option<LearnedPreferences> {
        learn(&self.lock_state().ledger)
    }

    /// Clears swipe history, the seen set and delivered copies. The daily
    /// accept tally survives a reset.
    pub fn reset_history(&self) {
        let mut state = self.lock_state();
        state.ledger.clear();
        state.seen.clear();
        state.delivered.clear();
        info!("session history reset");
    }

    fn delivered_copy(&self, boat_id: &BoatId) -> Option<Boat> {
        self.lock_state().delivered.get(boat_id).cloned()
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state mutex poisoned")
    }
}
