//! End-to-end tests for manual tracking against a mock collector

mod common;

use common::{RecordingSink, assert_close, openai_completion};
use costgpt::dispatch::EVENTS_PATH;
use costgpt::{
    CostTracker, EventDispatcher, PriceCatalog, PriceEntry, TrackOptions, TrackerConfig,
    track_usage,
};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_config(server: &MockServer) -> TrackerConfig {
    TrackerConfig::new()
        .with_api_key("sk-test")
        .with_api_url(server.uri())
}

#[tokio::test]
async fn test_track_posts_event_to_collector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = remote_config(&server).with_default_feature("support-bot");
    let tracker = CostTracker::from_config(&config).unwrap();

    let event = tracker
        .track(
            "gpt-4o",
            1000,
            500,
            TrackOptions::new().user_id("alice").meta("ticket", 1234),
        )
        .await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["id"], event.id().to_string());
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["input_tokens"], 1000);
    assert_eq!(body["output_tokens"], 500);
    assert_close(body["total_cost"].as_f64().unwrap(), 0.0075);
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["feature"], "support-bot");
    assert_eq!(body["duration_ms"], Value::Null);
    assert_eq!(body["metadata"]["ticket"], 1234);
}

#[tokio::test]
async fn test_collector_failure_does_not_affect_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let failures = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&failures);
    let dispatcher = EventDispatcher::new("sk-test", &server.uri())
        .unwrap()
        .with_error_callback(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
    let tracker = CostTracker::new().with_sink(Arc::new(dispatcher));

    let event = tracker
        .track("claude-3.5-sonnet", 1000, 500, TrackOptions::new())
        .await;

    assert_close(event.input_cost(), 0.003);
    assert_close(event.output_cost(), 0.0075);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_collector_is_silent() {
    let config = TrackerConfig::new()
        .with_api_key("sk-test")
        .with_api_url("http://127.0.0.1:9");
    let tracker = CostTracker::from_config(&config).unwrap();

    let event = tracker.track("o1-mini", 10, 10, TrackOptions::new()).await;
    assert_close(event.total_cost(), 10.0 * 3.0 / 1e6 + 10.0 * 12.0 / 1e6);
}

#[tokio::test]
async fn test_local_tracker_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = TrackerConfig::new().with_api_url(server.uri());
    let tracker = CostTracker::from_config(&config).unwrap();
    assert!(!tracker.is_remote());

    let event = tracker.track("gpt-4o-mini", 100, 100, TrackOptions::new()).await;
    assert_eq!(event.model().as_str(), "gpt-4o-mini");
}

#[tokio::test]
async fn test_huge_token_counts_with_debug_logging() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let event = CostTracker::new()
        .track("gpt-4o", u64::MAX, 1, TrackOptions::new())
        .await;

    assert_eq!(event.input_tokens(), u64::MAX);
    assert_eq!(event.tokens().total(), u64::MAX);
    assert!(event.total_cost().is_finite());
    assert_eq!(event.total_cost(), event.input_cost() + event.output_cost());
}

#[tokio::test]
async fn test_custom_catalog_drops_invalid_prices() {
    let catalog = PriceCatalog::new(
        vec![
            PriceEntry::new("m", -5.0, f64::NAN),
            PriceEntry::new("cheap", 1.0, 2.0),
        ],
        Vec::new(),
    );
    let tracker = CostTracker::new().with_catalog(Arc::new(catalog));

    let event = tracker.track("m", 1_000_000, 1, TrackOptions::new()).await;
    assert_eq!(event.total_cost(), 0.0);

    let event = tracker
        .track("cheap", 1_000_000, 1_000_000, TrackOptions::new())
        .await;
    assert_close(event.total_cost(), 3.0);
    let body = serde_json::to_value(&event).unwrap();
    assert!(body["total_cost"].is_number());
}

#[tokio::test]
async fn test_each_event_has_fresh_id() {
    let tracker = CostTracker::new();
    let first = tracker.track("gpt-4", 1, 1, TrackOptions::new()).await;
    let second = tracker.track("gpt-4", 1, 1, TrackOptions::new()).await;

    assert_ne!(first.id(), second.id());
    assert!(second.timestamp() >= first.timestamp());
}

#[tokio::test]
async fn test_track_usage_measures_call() {
    let sink = Arc::new(RecordingSink::default());
    let tracker = CostTracker::new()
        .with_default_user_id("batch-job")
        .with_sink(sink.clone());

    let completion = track_usage(
        &tracker,
        "gpt-4o-mini",
        TrackOptions::new().feature("summaries"),
        || async {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            openai_completion("gpt-4o-mini-2024-07-18", Some((2000, 300)))
        },
    )
    .await;

    assert_eq!(completion.id, "chatcmpl-test");

    let events = sink.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.model().as_str(), "gpt-4o-mini");
    assert_eq!(event.input_tokens(), 2000);
    assert_eq!(event.output_tokens(), 300);
    assert!(event.duration_ms().unwrap() >= 5);
    assert_eq!(event.user_id(), Some("batch-job"));
    assert_eq!(event.feature(), Some("summaries"));
}

#[tokio::test]
async fn test_track_usage_ignores_failed_calls() {
    let sink = Arc::new(RecordingSink::default());
    let tracker = CostTracker::new().with_sink(sink.clone());

    let result: Result<costgpt::provider_openai::ChatCompletion, String> =
        track_usage(&tracker, "gpt-4o", TrackOptions::new(), || async {
            Err("rate limited".to_string())
        })
        .await;

    assert_eq!(result.unwrap_err(), "rate limited");
    assert_eq!(sink.len(), 0);
}
