use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::util::ServiceExt;

use plant_care_api::config::{Config, RateLimitConfig};
use plant_care_api::middleware::rate_limiter::{LimiterConfig, RateLimiter};
use plant_care_api::models::AppState;
use plant_care_api::queue::JobQueue;

fn build_app(max_calls: u32, window_seconds: i64) -> axum::Router {
    let config = Config {
        rate_limit: RateLimitConfig {
            max_calls,
            window_seconds,
            ..RateLimitConfig::default()
        },
        ..Config::default()
    };
    let limiter = RateLimiter::new(LimiterConfig::from(&config.rate_limit));
    let (jobs, _rx) = JobQueue::initialize(&config.redis).unwrap();
    plant_care_api::create_router(AppState::new(config, limiter, jobs))
}

fn request(path: &str, client: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap()
}

fn header<'a>(res: &'a axum::response::Response, name: &str) -> Option<&'a str> {
    res.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn quota_headers_count_down_then_requests_reject() {
    let app = build_app(2, 60);

    let first = app.clone().oneshot(request("/api/v1/", "10.0.0.1")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header(&first, "x-ratelimit-limit"), Some("2"));
    assert_eq!(header(&first, "x-ratelimit-remaining"), Some("1"));
    assert!(header(&first, "x-ratelimit-reset").is_some());

    let second = app.clone().oneshot(request("/api/v1/", "10.0.0.1")).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(header(&second, "x-ratelimit-remaining"), Some("0"));

    let third = app.clone().oneshot(request("/api/v1/", "10.0.0.1")).await.unwrap();
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&third, "x-ratelimit-remaining"), Some("0"));

    let retry_after: u64 = header(&third, "retry-after").unwrap().parse().unwrap();
    assert!(retry_after <= 60);

    let body = axum::body::to_bytes(third.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["error"]["code"], "RATE_LIMIT_EXCEEDED");
    assert!(payload["error"]["message"].as_str().unwrap().contains("2 requests per 60 seconds"));
    assert!(payload["error"]["retry_after"].is_u64());
}

#[tokio::test]
async fn exempt_paths_bypass_the_limiter() {
    let app = build_app(1, 60);

    // Exhaust the client's quota
    let ok = app.clone().oneshot(request("/api/v1/", "10.0.0.2")).await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let rejected = app.clone().oneshot(request("/api/v1/", "10.0.0.2")).await.unwrap();
    assert_eq!(rejected.status(), StatusCode::TOO_MANY_REQUESTS);

    // Health checks still pass, with no quota headers attached
    for _ in 0..3 {
        let health = app.clone().oneshot(request("/health", "10.0.0.2")).await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        assert!(header(&health, "x-ratelimit-limit").is_none());
    }
}

#[tokio::test]
async fn clients_do_not_share_quota() {
    let app = build_app(1, 60);

    let a1 = app.clone().oneshot(request("/api/v1/", "10.0.0.3")).await.unwrap();
    assert_eq!(a1.status(), StatusCode::OK);
    let a2 = app.clone().oneshot(request("/api/v1/", "10.0.0.3")).await.unwrap();
    assert_eq!(a2.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different caller is unaffected by the exhausted one
    let b1 = app.clone().oneshot(request("/api/v1/", "10.0.0.4")).await.unwrap();
    assert_eq!(b1.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_client_identity_falls_back_to_sentinel_bucket() {
    let app = build_app(1, 60);

    // No X-Forwarded-For and no socket info: both requests land in the
    // shared "unknown" bucket
    let bare = |path: &str| {
        Request::builder()
            .method("GET")
            .uri(path.to_string())
            .body(Body::empty())
            .unwrap()
    };

    let first = app.clone().oneshot(bare("/api/v1/")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.clone().oneshot(bare("/api/v1/")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn rejected_requests_skip_inner_layers() {
    let app = build_app(1, 60);

    app.clone().oneshot(request("/api/v1/", "10.0.0.5")).await.unwrap();
    let rejected = app.clone().oneshot(request("/api/v1/", "10.0.0.5")).await.unwrap();

    assert_eq!(rejected.status(), StatusCode::TOO_MANY_REQUESTS);
    // Logging sits outside the limiter, so the request id is still set
    assert!(header(&rejected, "x-request-id").is_some());
    // Security headers sit inside it and never run for a 429
    assert!(header(&rejected, "x-content-type-options").is_none());
}
