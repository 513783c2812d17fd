use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use crate::feed::router::{feed_router, SESSION_HEADER};
use crate::feed::scoring::{ScoringEngine, SearchPreferences};
use crate::feed::session::FeedHub;
use crate::feed::source::{CatalogError, RawBoat};

use super::common::{contact, raw_boat, read_json_body, rich_page, RecordingSink, ScriptedCatalog};

fn build_router(
    script: Vec<Result<Vec<RawBoat>, CatalogError>>,
) -> (Router, Arc<ScriptedCatalog>, Arc<RecordingSink>) {
    let catalog = Arc::new(ScriptedCatalog::new(script));
    let sink = Arc::new(RecordingSink::default());
    let hub = FeedHub::with_engine(
        catalog.clone(),
        sink.clone(),
        ScoringEngine::new(SearchPreferences::default()),
    )
    .seeded(23);
    (feed_router(Arc::new(hub)), catalog, sink)
}

async fn get(router: &Router, uri: &str, session: &str) -> Response {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(SESSION_HEADER, session)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch")
}

async fn post_swipe(router: &Router, boat_id: &str, decision: &str, session: &str) -> Response {
    let body = json!({ "boat_id": boat_id, "decision": decision });
    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/feed/swipes")
                .header("content-type", "application/json")
                .header(SESSION_HEADER, session)
                .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
                .expect("request"),
        )
        .await
        .expect("router dispatch")
}

async fn delivered_ids(router: &Router, session: &str) -> Vec<String> {
    let response = get(router, "/api/v1/feed", session).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    payload["boats"]
        .as_array()
        .expect("boats array")
        .iter()
        .map(|boat| boat["id"].as_str().expect("listing id").to_string())
        .collect()
}

#[tokio::test]
async fn feed_endpoint_reports_phase_and_listings() {
    let (router, _, _) = build_router(vec![Ok(rich_page(3))]);

    let response = get(&router, "/api/v1/feed", "feed-basics").await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json_body(response).await;
    assert_eq!(payload["phase"], "exploration");
    assert_eq!(payload["source"], "catalog");
    assert_eq!(payload["exhausted"], false);
    assert_eq!(payload["count"], 3);

    let boats = payload["boats"].as_array().expect("boats array");
    assert_eq!(boats.len(), 3);
    assert_eq!(boats[0]["builder"], "Azimut");
    assert!(boats[0]["id"].as_str().is_some());
}

#[tokio::test]
async fn page_query_parameter_reaches_the_catalog() {
    let (router, catalog, _) = build_router(vec![Ok(rich_page(1))]);

    let response = get(&router, "/api/v1/feed?page=3", "pager").await;
    assert_eq!(response.status(), StatusCode::OK);

    let requests = catalog.requests();
    assert_eq!(requests[0].page, 3);
}

#[tokio::test]
async fn swipes_round_trip_and_unknown_listings_are_rejected() {
    let (router, _, _) = build_router(vec![Ok(rich_page(2))]);

    let ids = delivered_ids(&router, "swiper").await;
    let response = post_swipe(&router, &ids[0], "accept", "swiper").await;
    assert_eq!(response.status(), StatusCode::OK);

    let receipt = read_json_body(response).await;
    assert_eq!(receipt["decision"], "accept");
    assert_eq!(receipt["accepts_today"], 1);
    assert_eq!(receipt["broker_notified"], false);

    let response = post_swipe(&router, "ghost", "reject", "swiper").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("ghost"));
}

#[tokio::test]
async fn accept_cap_gates_at_the_router() {
    let (router, _, _) = build_router(vec![Ok(rich_page(12))]);

    let ids = delivered_ids(&router, "power-user").await;
    assert_eq!(ids.len(), 12);

    for id in &ids[..10] {
        let response = post_swipe(&router, id, "accept", "power-user").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // The eleventh accept of the day bounces before touching the ledger.
    let response = post_swipe(&router, &ids[10], "accept", "power-user").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let payload = read_json_body(response).await;
    assert_eq!(payload["accepts_today"], 10);
    assert_eq!(payload["daily_cap"], 10);

    // Browsing continues: rejects still land.
    let response = post_swipe(&router, &ids[10], "reject", "power-user").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn contact_stats_and_history_routes_round_trip() {
    let (router, _, _) = build_router(vec![Ok(rich_page(2))]);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/feed/contact")
                .header("content-type", "application/json")
                .header(SESSION_HEADER, "settler")
                .body(Body::from(
                    serde_json::to_vec(&contact()).expect("serialize contact"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&router, "/api/v1/feed/stats", "settler").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["engagement"]["total_swipes"], 0);
    assert_eq!(payload["engagement"]["phase"], "exploration");
    assert_eq!(payload["daily"]["daily_cap"], 10);
    assert!(payload["learned"].is_null());

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/feed/history")
                .header(SESSION_HEADER, "settler")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn detail_route_serves_catalog_copies_and_rejects_unknowns() {
    let mut refit = raw_boat("boat-0");
    refit.model = Some("Magellano 53 Refit".to_string());
    let catalog = Arc::new(ScriptedCatalog::new(vec![Ok(rich_page(1))]).with_detail(refit));
    let sink = Arc::new(RecordingSink::default());
    let hub = FeedHub::with_engine(
        catalog,
        sink,
        ScoringEngine::new(SearchPreferences::default()),
    )
    .seeded(23);
    let router = feed_router(Arc::new(hub));

    let response = get(&router, "/api/v1/boats/boat-0", "detail-reader").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["model"], "Magellano 53 Refit");

    let response = get(&router, "/api/v1/boats/boat-9", "detail-reader").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sessions_are_isolated_by_header() {
    let (router, _, _) = build_router(vec![Ok(rich_page(2)), Ok(rich_page(2))]);

    // Same listings served to both sessions; each keeps its own seen set.
    let first = delivered_ids(&router, "session-a").await;
    let second = delivered_ids(&router, "session-b").await;
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
}
