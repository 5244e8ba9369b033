//! Integration tests for the analytics query layer using wiremock

use chrono::NaiveDate;
use futures::StreamExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

use carbontrace_client::analytics::AnalyticsClient;
use carbontrace_client::client::ServiceConfig;
use carbontrace_core::result::ResultState;
use carbontrace_core::types::DateRange;

fn january() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
}

fn kpis_body(total: f64) -> serde_json::Value {
    serde_json::json!({
        "total_co2e_kg": total,
        "scope1_kg": 1500.0,
        "scope2_kg": 950.4,
        "scope3_kg": 0.0
    })
}

fn summary_body() -> serde_json::Value {
    serde_json::json!({
        "total_co2e_kg": 2450.4,
        "facilities_count": 3,
        "last_event_at": "2024-01-31T12:00:00Z",
        "top_categories": [["waste", 20.0], ["fuel_combustion", 1500.0]]
    })
}

async fn mount_summary(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/analytics/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body()))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_load_success_assembles_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/kpis"))
        .and(query_param("from", "2024-01-01"))
        .and(query_param("to", "2024-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kpis_body(2450.4)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/trend"))
        .and(query_param("from", "2024-01-01"))
        .and(query_param("granularity", "day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"period": "2024-01-02", "co2e_kg": 2.0},
            {"period": "2024-01-01", "co2e_kg": 1.0}
        ])))
        .mount(&mock_server)
        .await;

    mount_summary(&mock_server).await;

    let client = AnalyticsClient::new(ServiceConfig::new(mock_server.uri())).unwrap();

    let states: Vec<_> = client.load(Some(january())).collect().await;

    assert_eq!(states.len(), 2);
    assert_eq!(states[0], ResultState::Loading);
    let snapshot = states[1].clone().into_success().unwrap();

    assert_eq!(snapshot.kpis.total_co2e_kg, 2450.4);
    // Trend re-ordered ascending regardless of response order.
    assert_eq!(snapshot.trend[0].period, "2024-01-01");
    assert_eq!(snapshot.trend[1].period, "2024-01-02");
    // Categories ordered by value descending, display-ready.
    assert_eq!(snapshot.top_categories[0].label, "FUEL COMBUSTION");
    assert_eq!(snapshot.top_categories[0].display_value, "1.5t");
    assert_eq!(snapshot.top_categories[1].label, "WASTE");
    assert_eq!(snapshot.top_categories[1].display_value, "20.0kg");

    // The snapshot was committed to presentation state.
    assert_eq!(client.snapshot(), Some(snapshot));
}

#[tokio::test]
async fn test_trend_failure_fails_composite_and_commits_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/kpis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kpis_body(2450.4)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/trend"))
        .respond_with(ResponseTemplate::new(500).set_body_string("query timeout"))
        .mount(&mock_server)
        .await;

    mount_summary(&mock_server).await;

    let client = AnalyticsClient::new(ServiceConfig::new(mock_server.uri())).unwrap();

    let states: Vec<_> = client.load(Some(january())).collect().await;

    assert_eq!(states.len(), 2);
    assert_eq!(states[0], ResultState::Loading);
    let message = states[1].error_message().unwrap();
    assert!(message.contains("500"), "missing status in: {message}");
    assert!(message.contains("query timeout"), "missing body in: {message}");
    // No partial KPI/summary state leaks into presentation.
    assert_eq!(client.snapshot(), None);
}

#[tokio::test]
async fn test_overlapping_loads_commit_only_the_latest() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/kpis"))
        .and(query_param("from", "2024-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kpis_body(111.0)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/kpis"))
        .and(query_param("from", "2024-02-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kpis_body(222.0)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/trend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    mount_summary(&mock_server).await;

    let client = AnalyticsClient::new(ServiceConfig::new(mock_server.uri())).unwrap();

    let february = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
    );

    // The second call starts before the first resolves, superseding it.
    let first = client.load(Some(january()));
    let second = client.load(Some(february));

    let second_states: Vec<_> = second.collect().await;
    let first_states: Vec<_> = first.collect().await;

    // Both invocations complete their own streams...
    assert!(second_states[1].is_success());
    assert!(first_states[1].is_success());

    // ...but only the latest call's results are committed.
    let committed = client.snapshot().unwrap();
    assert_eq!(committed.kpis.total_co2e_kg, 222.0);
}

#[tokio::test]
async fn test_load_without_range_defaults_to_trailing_month() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/kpis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kpis_body(2450.4)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/trend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    mount_summary(&mock_server).await;

    let client = AnalyticsClient::new(ServiceConfig::new(mock_server.uri())).unwrap();

    let states: Vec<_> = client.load(None).collect().await;
    assert!(states[1].is_success());

    // Date-scoped reads were parameterized with a concrete range.
    let requests = mock_server.received_requests().await.unwrap();
    let kpis_request = requests
        .iter()
        .find(|r| r.url.path() == "/v1/analytics/kpis")
        .unwrap();
    let query = kpis_request.url.query().unwrap();
    assert!(query.contains("from="), "missing from in: {query}");
    assert!(query.contains("to="), "missing to in: {query}");
}

#[tokio::test]
async fn test_watch_snapshots_sees_commits() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/kpis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kpis_body(2450.4)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/analytics/trend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    mount_summary(&mock_server).await;

    let client = AnalyticsClient::new(ServiceConfig::new(mock_server.uri())).unwrap();

    let mut snapshots = client.watch_snapshots();
    assert_eq!(snapshots.next().await, Some(None));

    let states: Vec<_> = client.load(Some(january())).collect().await;
    assert!(states[1].is_success());

    let committed = snapshots.next().await.unwrap();
    assert_eq!(committed.unwrap().kpis.total_co2e_kg, 2450.4);
}
