use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{BoatId, Decision};
use super::session::{FeedError, FeedHub, DEFAULT_SESSION_KEY};
use super::source::{CatalogSource, ContactIdentity, NotificationSink};

/// Header carrying the caller's session key; absent means the shared
/// default session.
pub const SESSION_HEADER: &str = "x-session-id";

/// Router builder exposing the feed over HTTP.
pub fn feed_router<C, N>(hub: Arc<FeedHub<C, N>>) -> Router
where
    C: CatalogSource + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route("/api/v1/feed", get(feed_handler::<C, N>))
        .route("/api/v1/feed/swipes", post(swipe_handler::<C, N>))
        .route("/api/v1/feed/stats", get(stats_handler::<C, N>))
        .route("/api/v1/feed/contact", put(contact_handler::<C, N>))
        .route("/api/v1/feed/history", delete(history_handler::<C, N>))
        .route("/api/v1/boats/:boat_id", get(detail_handler::<C, N>))
        .with_state(hub)
}

fn session_key(headers: &HeaderMap) -> &str {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_SESSION_KEY)
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedQuery {
    #[serde(default = "default_page")]
    page: u32,
}

fn default_page() -> u32 {
    1
}

pub(crate) async fn feed_handler<C, N>(
    State(hub): State<Arc<FeedHub<C, N>>>,
    headers: HeaderMap,
    Query(query): Query<FeedQuery>,
) -> Response
where
    C: CatalogSource + 'static,
    N: NotificationSink + 'static,
{
    let session = hub.session(session_key(&headers));
    let batch = session.next_batch(query.page).await;
    let payload = json!({
        "phase": batch.phase.label(),
        "source": batch.source.label(),
        "exhausted": batch.exhausted,
        "count": batch.boats.len(),
        "boats": batch.boats,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SwipeSubmission {
    pub(crate) boat_id: String,
    pub(crate) decision: Decision,
}

pub(crate) async fn swipe_handler<C, N>(
    State(hub): State<Arc<FeedHub<C, N>>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<SwipeSubmission>,
) -> Response
where
    C: CatalogSource + 'static,
    N: NotificationSink + 'static,
{
    let session = hub.session(session_key(&headers));

    // The cap gates accepts before they touch the ledger so a capped
    // member keeps browsing but stops matching until tomorrow.
    if submission.decision.is_accept() {
        let daily = session.daily();
        if daily.cap_reached {
            let payload = json!({
                "error": "daily accept cap reached",
                "accepts_today": daily.accepts_today,
                "daily_cap": daily.daily_cap,
            });
            return (StatusCode::TOO_MANY_REQUESTS, axum::Json(payload)).into_response();
        }
    }

    let boat_id = BoatId(submission.boat_id);
    match session.record_swipe(&boat_id, submission.decision).await {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(FeedError::UnknownBoat(id)) => {
            let payload = json!({
                "error": format!("boat {id} was never delivered to this session"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn stats_handler<C, N>(
    State(hub): State<Arc<FeedHub<C, N>>>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogSource + 'static,
    N: NotificationSink + 'static,
{
    let session = hub.session(session_key(&headers));
    let payload = json!({
        "engagement": session.engagement(),
        "daily": session.daily(),
        "learned": session.learned(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn contact_handler<C, N>(
    State(hub): State<Arc<FeedHub<C, N>>>,
    headers: HeaderMap,
    axum::Json(identity): axum::Json<ContactIdentity>,
) -> Response
where
    C: CatalogSource + 'static,
    N: NotificationSink + 'static,
{
    let session = hub.session(session_key(&headers));
    session.set_identity(identity);
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn history_handler<C, N>(
    State(hub): State<Arc<FeedHub<C, N>>>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogSource + 'static,
    N: NotificationSink + 'static,
{
    let session = hub.session(session_key(&headers));
    session.reset_history();
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn detail_handler<C, N>(
    State(hub): State<Arc<FeedHub<C, N>>>,
    headers: HeaderMap,
    Path(boat_id): Path<String>,
) -> Response
where
    C: CatalogSource + 'static,
    N: NotificationSink + 'static,
{
    let session = hub.session(session_key(&headers));
    let id = BoatId(boat_id);
    match session.boat_detail(&id).await {
        Some(boat) => (StatusCode::OK, axum::Json(boat)).into_response(),
        None => {
            let payload = json!({
                "error": format!("no detail available for boat {id}"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
