// tests/api_http.rs
//
// HTTP-level tests for the public Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/dashboard (fresh, cached fallback, unavailable)

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, Response, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use dashboard_aggregator::cache::FailingCache;
use dashboard_aggregator::sources::StubFetcher;
use dashboard_aggregator::{
    create_router, Aggregator, AppState, CacheStore, MemoryCache, Source, CACHE_KEY,
};

const BODY_LIMIT: usize = 1024 * 1024;

fn router_with(fetcher: StubFetcher, cache: Arc<dyn CacheStore>, names: &[&str]) -> Router {
    let sources = names
        .iter()
        .map(|n| Source::new(*n, format!("http://upstream.test/{n}")))
        .collect();
    let aggregator = Aggregator::new(sources, Arc::new(fetcher), cache);
    create_router(AppState::new(aggregator))
}

async fn get(app: Router, uri: &str) -> Response<Body> {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    app.oneshot(req).await.expect("router response")
}

fn header<'a>(resp: &'a Response<Body>, name: &str) -> &'a str {
    resp.headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .expect("ascii header")
}

async fn body_string(resp: Response<Body>) -> String {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[tokio::test]
async fn health_returns_ok() {
    let app = router_with(StubFetcher::new(), Arc::new(MemoryCache::new()), &[]);
    let resp = get(app, "/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "ok");
}

#[tokio::test]
async fn dashboard_fresh_has_json_and_version_headers() {
    let fetcher = StubFetcher::new()
        .ok("ip", json!({"ip": "127.0.0.1"}))
        .fail("weather", "connection reset");
    let app = router_with(fetcher, Arc::new(MemoryCache::new()), &["ip", "weather"]);

    let resp = get(app, "/api/dashboard").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "content-type"), "application/json");
    assert_eq!(header(&resp, "x-service-version"), "aggregator-v2");
    assert_eq!(header(&resp, "x-dashboard-source"), "fresh");

    let v: Json = serde_json::from_str(&body_string(resp).await).expect("json body");
    assert_eq!(v, json!({"ip": {"ip": "127.0.0.1"}}));
}

#[tokio::test]
async fn dashboard_falls_back_to_cached_body() {
    let cache = MemoryCache::with_entry(CACHE_KEY, r#"{"cached":true}"#, Duration::from_secs(60));
    let fetcher = StubFetcher::new().fail("ip", "API down");
    let app = router_with(fetcher, Arc::new(cache), &["ip"]);

    let resp = get(app, "/api/dashboard").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "x-dashboard-source"), "cache");
    assert_eq!(body_string(resp).await, r#"{"cached":true}"#);
}

#[tokio::test]
async fn dashboard_unavailable_is_502_plain_text() {
    let fetcher = StubFetcher::new().fail("ip", "API down");
    let app = router_with(fetcher, Arc::new(FailingCache), &["ip"]);

    let resp = get(app, "/api/dashboard").await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(header(&resp, "content-type").starts_with("text/plain"));
    assert!(resp.headers().get("x-service-version").is_none());
    assert_eq!(
        body_string(resp).await,
        "Upstream services unavailable or cache empty"
    );
}

#[tokio::test]
async fn second_request_is_served_from_cache_once_upstream_dies() {
    let cache: Arc<MemoryCache> = Arc::new(MemoryCache::new());

    let up = router_with(
        StubFetcher::new().ok("ip", json!({"ip": "10.0.0.1"})),
        cache.clone(),
        &["ip"],
    );
    let fresh = body_string(get(up, "/api/dashboard").await).await;

    let down = router_with(StubFetcher::new().fail("ip", "down"), cache, &["ip"]);
    let resp = get(down, "/api/dashboard").await;
    assert_eq!(header(&resp, "x-dashboard-source"), "cache");
    assert_eq!(body_string(resp).await, fresh);
}
