//! Acquisition flow integration tests.
//!
//! Exercises the public library surface end to end: policy + fetch client
//! against a live stub server, with both store backends.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sketchtab::connectivity::Diagnoser;
use sketchtab::fetch::FetchClient;
use sketchtab::policy::{AcquisitionPolicy, RecencyWindow};
use sketchtab::store::{keys, FileStore, MemoryStore, Store};
use sketchtab::types::{AcquireError, ConnectivityState, FailureResolution, FetchError, FetchFrequency, SketchRecord};

// ── Helpers ──

fn sketch_body(uid: &str) -> serde_json::Value {
    json!({
        "uid": uid,
        "title": format!("Sketch {uid}"),
        "imageUrlOptimised": format!("https://cdn.example.com/{uid}.webp"),
        "pageUrl": format!("https://example.com/sketch/{uid}"),
        "description": "ink on paper",
    })
}

fn client_for(server: &MockServer) -> FetchClient {
    let endpoint = Url::parse(&format!("{}/sketch/random", server.uri())).unwrap();
    FetchClient::new(endpoint)
        .with_retry_delays(vec![Duration::from_millis(10), Duration::from_millis(20)])
}

fn offline_diagnoser() -> Diagnoser {
    Diagnoser::new(Url::parse("http://127.0.0.1:1/").unwrap())
        .with_probe_timeout(Duration::from_millis(100))
}

fn policy_over(store: Store, server: &MockServer) -> AcquisitionPolicy {
    AcquisitionPolicy::new(store, Arc::new(client_for(server)), offline_diagnoser())
}

async fn mount_sketch(server: &MockServer, uid: &str) {
    Mock::given(method("GET"))
        .and(path("/sketch/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sketch_body(uid)))
        .mount(server)
        .await;
}

// ── Scenarios ──

#[tokio::test]
async fn daily_cadence_end_to_end() {
    let server = MockServer::start().await;
    mount_sketch(&server, "harbor-fog").await;

    let store = Store::new(Arc::new(MemoryStore::new()));
    let yesterday = Utc::now().timestamp_millis() - 24 * 3_600_000;
    store.set(keys::FREQUENCY, &FetchFrequency::Daily).await.unwrap();
    store.set(keys::LAST_FETCH_TIME, &yesterday).await.unwrap();
    store.set(keys::RECENT, &RecencyWindow::new()).await.unwrap();

    let policy = policy_over(store.clone(), &server);
    let record = policy.next_sketch().await.unwrap();
    assert_eq!(record.uid, "harbor-fog");
    assert_eq!(record.title, "Sketch harbor-fog");

    // Exactly one fetch for a novel uid
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    // Bookkeeping moved forward together
    let last_fetch: i64 = store.get(keys::LAST_FETCH_TIME).await.unwrap().unwrap();
    assert!(last_fetch > yesterday);
    let last: SketchRecord = store.get(keys::LAST_SKETCH).await.unwrap().unwrap();
    assert_eq!(last.uid, "harbor-fog");

    // The caller records the shown sketch
    policy.record_shown(&record.uid).await.unwrap();
    let recent: RecencyWindow = store.get(keys::RECENT).await.unwrap().unwrap();
    assert_eq!(recent.as_slice(), ["harbor-fog"]);

    // A second tab the same day reuses the cached sketch with no request
    let again = policy.next_sketch().await.unwrap();
    assert_eq!(again.uid, "harbor-fog");
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn transient_errors_retry_through_the_policy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sketch/random"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sketch/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sketch_body("third-try")))
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::new(Arc::new(MemoryStore::new()));
    let policy = policy_over(store, &server);

    let record = policy.refresh().await.unwrap();
    assert_eq!(record.uid, "third-try");
}

#[tokio::test]
async fn hard_failure_classifies_offline_via_override() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sketch/random"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::new(Arc::new(MemoryStore::new()));
    store.set(keys::TEST_OFFLINE_MODE, &true).await.unwrap();
    let policy = policy_over(store.clone(), &server);

    let err = policy.refresh().await.unwrap_err();
    assert!(matches!(err, AcquireError::Fetch(FetchError::HttpStatus(404))));

    let resolution = policy.classify_failure().await.unwrap();
    assert!(matches!(
        resolution,
        FailureResolution::Classified(ConnectivityState::Offline)
    ));
}

#[tokio::test]
async fn dedup_gives_up_after_bounded_attempts() {
    let server = MockServer::start().await;
    mount_sketch(&server, "repeat").await;

    let store = Store::new(Arc::new(MemoryStore::new()));
    let mut recent = RecencyWindow::new();
    recent.push("repeat");
    store.set(keys::RECENT, &recent).await.unwrap();

    let policy = policy_over(store, &server);
    let record = policy.refresh().await.unwrap();

    // Bounded attempts take priority over strict uniqueness
    assert_eq!(record.uid, "repeat");
    assert_eq!(server.received_requests().await.unwrap().len(), 6);
}

#[tokio::test]
async fn file_store_state_survives_reopen() {
    let server = MockServer::start().await;
    mount_sketch(&server, "persisted").await;

    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("sketchtab.json");

    {
        let backend = FileStore::open(&store_path).await.unwrap();
        let store = Store::new(Arc::new(backend));
        store.set(keys::FREQUENCY, &FetchFrequency::Daily).await.unwrap();

        let policy = policy_over(store, &server);
        let record = policy.next_sketch().await.unwrap();
        policy.record_shown(&record.uid).await.unwrap();
    }

    // New session: cadence satisfied, cached sketch reused, no new request
    let backend = FileStore::open(&store_path).await.unwrap();
    let store = Store::new(Arc::new(backend));
    let policy = policy_over(store.clone(), &server);

    let record = policy.next_sketch().await.unwrap();
    assert_eq!(record.uid, "persisted");
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    let recent: RecencyWindow = store.get(keys::RECENT).await.unwrap().unwrap();
    assert!(recent.contains("persisted"));
}
