//! Shared fixtures and in-memory fakes for the feed engine tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::feed::domain::{Boat, BoatId};
use crate::feed::pipeline;
use crate::feed::scoring::{ScoringEngine, SearchPreferences};
use crate::feed::session::{FeedSession, FETCH_PAGE_SIZE};
use crate::feed::source::{
    BoxFuture, CatalogError, CatalogSource, ContactIdentity, InterestNotice, NotificationSink,
    NotifyError, PageRequest, RawBoat, RawImage,
};

/// A listing that clears every admission threshold: wishlist brand,
/// mid-band price, preferred country, comfortable length.
pub(super) fn raw_boat(id: &str) -> RawBoat {
    RawBoat {
        boat_id: Some(id.to_string()),
        builder: Some("Azimut".to_string()),
        model: Some("Magellano 53".to_string()),
        boat_type: Some("Motor Yacht".to_string()),
        boat_families: Some("Flybridge".to_string()),
        year_built: Some(2022),
        sell_price: Some(3_000_000.0),
        sell_price_formatted: Some("€ 3.000.000".to_string()),
        length: Some(16.0),
        country: Some("Italy".to_string()),
        city: Some("Genoa".to_string()),
        agency_email: Some("broker@example.com".to_string()),
        images_list: Some(vec![RawImage {
            image_url: Some("https://cdn.example.com/boats/alpha.512.jpg".to_string()),
            text: None,
        }]),
        ..RawBoat::default()
    }
}

/// A listing no soft rule rescues: unknown brand, over the price ceiling,
/// short, far from any preferred coast, and old enough for an age penalty.
pub(super) fn weak_raw_boat(id: &str) -> RawBoat {
    RawBoat {
        boat_id: Some(id.to_string()),
        builder: Some("Cantiere Anonimo".to_string()),
        model: Some("Runabout 18".to_string()),
        year_built: Some(2004),
        sell_price: Some(5_500_000.0),
        length: Some(12.0),
        country: Some("Chile".to_string()),
        city: Some("Valparaiso".to_string()),
        ..RawBoat::default()
    }
}

pub(super) fn boat(id: &str) -> Boat {
    pipeline::normalize(raw_boat(id)).expect("fixture normalizes")
}

pub(super) fn weak_boat(id: &str) -> Boat {
    pipeline::normalize(weak_raw_boat(id)).expect("fixture normalizes")
}

/// Page of strong listings with distinct ids.
pub(super) fn rich_page(count: usize) -> Vec<RawBoat> {
    (0..count)
        .map(|index| raw_boat(&format!("boat-{index}")))
        .collect()
}

pub(super) fn contact() -> ContactIdentity {
    ContactIdentity {
        name: "Giulia Conti".to_string(),
        email: "giulia.conti@example.com".to_string(),
        phone: "+39 333 0000000".to_string(),
    }
}

/// Frozen clock for scoring and ranking tests so age and freshness rules
/// are exact.
pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Catalog fake that replays a scripted sequence of page responses and
/// records every request it sees. Once the script runs dry it keeps
/// answering with empty pages.
pub(super) struct ScriptedCatalog {
    script: Mutex<VecDeque<Result<Vec<RawBoat>, CatalogError>>>,
    requests: Mutex<Vec<PageRequest>>,
    details: Mutex<HashMap<String, RawBoat>>,
}

impl ScriptedCatalog {
    pub(super) fn new(script: Vec<Result<Vec<RawBoat>, CatalogError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            details: Mutex::new(HashMap::new()),
        }
    }

    pub(super) fn with_detail(self, raw: RawBoat) -> Self {
        let id = raw.boat_id.clone().expect("detail fixture carries an id");
        self.details.lock().expect("lock").insert(id, raw);
        self
    }

    pub(super) fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl CatalogSource for ScriptedCatalog {
    fn fetch_page<'a>(
        &'a self,
        request: &'a PageRequest,
    ) -> BoxFuture<'a, Result<Vec<RawBoat>, CatalogError>> {
        self.requests.lock().expect("lock").push(request.clone());
        let next = self
            .script
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { next })
    }

    fn fetch_detail<'a>(
        &'a self,
        id: &'a BoatId,
    ) -> BoxFuture<'a, Result<Option<RawBoat>, CatalogError>> {
        let found = self.details.lock().expect("lock").get(id.0.as_str()).cloned();
        Box::pin(async move { Ok(found) })
    }
}

/// Notification fake. The failing variant refuses every delivery so tests
/// can check that swipes survive a dead outbound channel.
#[derive(Default)]
pub(super) struct RecordingSink {
    notices: Mutex<Vec<InterestNotice>>,
    fail: bool,
}

impl RecordingSink {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn notices(&self) -> Vec<InterestNotice> {
        self.notices.lock().expect("lock").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify_interest<'a>(
        &'a self,
        notice: &'a InterestNotice,
    ) -> BoxFuture<'a, Result<(), NotifyError>> {
        if self.fail {
            return Box::pin(async { Err(NotifyError::Transport("sink offline".to_string())) });
        }
        self.notices.lock().expect("lock").push(notice.clone());
        Box::pin(async { Ok(()) })
    }
}

pub(super) fn build_session(
    script: Vec<Result<Vec<RawBoat>, CatalogError>>,
) -> (
    FeedSession<ScriptedCatalog, RecordingSink>,
    Arc<ScriptedCatalog>,
    Arc<RecordingSink>,
) {
    let catalog = Arc::new(ScriptedCatalog::new(script));
    let sink = Arc::new(RecordingSink::default());
    let session = FeedSession::with_engine(
        catalog.clone(),
        sink.clone(),
        ScoringEngine::new(SearchPreferences::default()),
        FETCH_PAGE_SIZE,
        Some(17),
    );
    (session, catalog, sink)
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json payload")
}
