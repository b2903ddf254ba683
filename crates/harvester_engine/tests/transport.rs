use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use harvester_core::HarvestTarget;
use harvester_engine::{
    CatalogTransport, Credentials, TmdbTransport, TransportError, TransportSettings,
};

/// Millisecond-scale backoff so retry tests measure real delays cheaply.
const BACKOFF_UNIT: Duration = Duration::from_millis(20);

fn test_settings(base_url: String) -> TransportSettings {
    TransportSettings {
        base_url,
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(2),
        rate_limit_backoff: BACKOFF_UNIT,
        transient_backoff: Duration::from_millis(5),
    }
}

fn transport(server: &MockServer, target: HarvestTarget) -> TmdbTransport {
    engine_logging::initialize_for_tests();
    TmdbTransport::new(
        Credentials::new("test-key"),
        test_settings(server.uri()),
        target,
    )
    .expect("client builds")
}

fn page_body(count: usize) -> serde_json::Value {
    let results: Vec<_> = (0..count)
        .map(|index| {
            serde_json::json!({
                "title": format!("Movie {index}"),
                "release_date": "2020-01-01",
                "vote_average": 7.0,
                "overview": "fine",
                "genre_ids": [28],
                "adult": false
            })
        })
        .collect();
    serde_json::json!({ "results": results })
}

#[tokio::test]
async fn fetch_page_returns_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("page", "3"))
        .and(query_param("sort_by", "popularity.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(20)))
        .mount(&server)
        .await;

    let transport = transport(&server, HarvestTarget::new(100, 2, false));
    let entries = transport.fetch_page(3).await.expect("fetch ok");
    assert_eq!(entries.map(|e| e.len()), Some(20));
}

#[tokio::test]
async fn adult_flag_is_sent_only_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1)))
        .mount(&server)
        .await;

    let with_flag = transport(&server, HarvestTarget::new(100, 2, true));
    with_flag.fetch_page(1).await.expect("fetch ok");
    let without_flag = transport(&server, HarvestTarget::new(100, 2, false));
    without_flag.fetch_page(1).await.expect("fetch ok");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 2);
    let has_adult = |index: usize| {
        requests[index]
            .url
            .query_pairs()
            .any(|(key, value)| key == "include_adult" && value == "true")
    };
    assert!(has_adult(0));
    assert!(!has_adult(1));
}

#[tokio::test]
async fn unauthorized_fails_fatally_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server, HarvestTarget::new(100, 2, false));
    let err = transport.fetch_page(1).await.unwrap_err();
    assert!(matches!(err, TransportError::InvalidCredentials(_)));
}

#[tokio::test]
async fn rate_limit_backs_off_exponentially_then_succeeds() {
    let server = MockServer::start().await;
    // Three throttled responses, then the page arrives.
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(20)))
        .mount(&server)
        .await;

    let transport = transport(&server, HarvestTarget::new(100, 2, false));
    let started = Instant::now();
    let entries = transport.fetch_page(1).await.expect("fetch ok");
    let elapsed = started.elapsed();

    assert_eq!(entries.map(|e| e.len()), Some(20));
    // Backoff slept 1, 2 and 4 units before the final attempt.
    assert!(
        elapsed >= BACKOFF_UNIT * 7,
        "expected at least {:?} of backoff, got {elapsed:?}",
        BACKOFF_UNIT * 7
    );
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn transient_errors_exhaust_to_the_empty_signal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;

    let transport = transport(&server, HarvestTarget::new(100, 2, false));
    let entries = transport.fetch_page(1).await.expect("absorbed");
    assert_eq!(entries, None);
}

#[tokio::test]
async fn empty_result_list_is_the_empty_signal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .mount(&server)
        .await;

    let transport = transport(&server, HarvestTarget::new(100, 2, false));
    assert_eq!(transport.fetch_page(42).await.expect("fetch ok"), None);
}

#[tokio::test]
async fn malformed_body_drops_the_page_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server, HarvestTarget::new(100, 2, false));
    assert_eq!(transport.fetch_page(1).await.expect("absorbed"), None);
}

#[tokio::test]
async fn categories_resolve_into_a_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/genre/movie/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "genres": [
                {"id": 28, "name": "Action"},
                {"id": 18, "name": "Drama"}
            ]
        })))
        .mount(&server)
        .await;

    let transport = transport(&server, HarvestTarget::new(100, 2, false));
    let categories = transport.fetch_categories().await.expect("resolved");
    assert_eq!(categories.len(), 2);
    assert_eq!(categories.get(&28).map(String::as_str), Some("Action"));
}

#[tokio::test]
async fn category_failure_is_fatal_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/genre/movie/list"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let transport = transport(&server, HarvestTarget::new(100, 2, false));
    let err = transport.fetch_categories().await.unwrap_err();
    assert!(matches!(err, TransportError::Categories(_)));
    assert!(err.to_string().contains("category"));
}

#[tokio::test]
async fn category_unauthorized_is_a_credential_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/genre/movie/list"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let transport = transport(&server, HarvestTarget::new(100, 2, false));
    let err = transport.fetch_categories().await.unwrap_err();
    assert!(matches!(err, TransportError::InvalidCredentials(_)));
}
