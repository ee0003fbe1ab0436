//! Submission / refresh / clear against a mocked matching service.

use gazette_matcher::client::{HttpMatchClient, UploadFile};
use gazette_matcher::config::{ClearFailurePolicy, Config};
use gazette_matcher::controller::{AssumeNo, AssumeYes, ClearOutcome, Controller};
use gazette_matcher_common::{
    Error, MatchMode, Outcome, Record, RecordField, Session, SubmissionParameters, SubmissionState,
    Threshold,
};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn config(server: &MockServer, grace_ms: u64) -> Config {
    Config {
        api_base: server.url("/api"),
        progress_grace_ms: grace_ms,
        ..Default::default()
    }
}

fn controller(config: &Config) -> Controller<HttpMatchClient> {
    let client = HttpMatchClient::new(&config.api_base, config.timeout()).unwrap();
    Controller::new(client, config)
}

fn pdf() -> UploadFile {
    UploadFile::new("gazette.pdf", b"%PDF-1.4 test".repeat(1000))
}

fn excel() -> UploadFile {
    UploadFile::new("registry.xlsx", b"PK\x03\x04".repeat(500))
}

fn fuzzy() -> SubmissionParameters {
    SubmissionParameters::new(MatchMode::Fuzzy, Threshold::new(0.9).unwrap())
}

fn record(name: &str, date: &str) -> Record {
    Record {
        name_of_deceased: Some(name.to_string()),
        date_published: Some(date.to_string()),
        ..Default::default()
    }
}

fn match_body(rows: serde_json::Value) -> serde_json::Value {
    json!({
        "matchedRows": rows,
        "mode": "fuzzy",
        "threshold": 0.9,
        "totalGazette": 120,
        "totalExcel": 45,
        "matchedCount": 2,
        "insertedCount": 1
    })
}

// =============================================
// Submission
// =============================================

#[tokio::test]
async fn test_submit_success_replaces_records() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/match")
                .query_param("mode", "fuzzy")
                .query_param("threshold", "0.90");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(match_body(json!([
                    {"id": 7, "court_station": "Nairobi", "cause_no": "E12/2024",
                     "name_of_deceased": "JOHN KAMAU", "status_at_gp": "Intestate",
                     "volume_no": "CXXVI", "date_published": "2024-01-19"},
                    {"name_of_deceased": "MARY OTIENO", "date_published": null}
                ])));
        })
        .await;

    let config = config(&server, 60_000);
    let mut controller = controller(&config).with_session(Session::with_records(vec![record("OLD", "2020-01-01")]));
    controller.session_mut().set_search("old");

    let mut seen = Vec::new();
    controller
        .submit(Some(pdf()), Some(excel()), fuzzy(), |p| seen.push(p))
        .await
        .unwrap();

    mock.assert_async().await;
    let session = controller.session();
    assert_eq!(session.records().len(), 2);
    assert_eq!(session.records()[0].id.as_deref(), Some("7"));
    assert_eq!(session.view_state().search, "");
    assert_eq!(session.summary().unwrap().inserted_count, Some(1));
    assert_eq!(session.state(), SubmissionState::Idle);
    assert_eq!(session.last_outcome(), Some(Outcome::Success));
    assert_eq!(session.error(), None);

    // progress never goes backwards and ends at 100
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{:?}", seen);
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.iter().any(|&p| p > 0 && p <= 30), "no upload progress seen: {:?}", seen);

    // still inside the grace window
    assert_eq!(controller.progress(), 100);
}

#[tokio::test]
async fn test_progress_settles_after_grace() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/match");
            then.status(200).json_body(match_body(json!([])));
        })
        .await;

    let config = config(&server, 0);
    let mut controller = controller(&config);
    controller.submit(Some(pdf()), Some(excel()), fuzzy(), |_| {}).await.unwrap();
    assert_eq!(controller.progress(), 0);
}

#[tokio::test]
async fn test_empty_result_still_replaces_records() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/match");
            then.status(200).json_body(json!({"matchedRows": [], "matchedCount": 0}));
        })
        .await;

    let config = config(&server, 60_000);
    let mut controller = controller(&config).with_session(Session::with_records(vec![
        record("A", "2024-01-01"),
        record("B", "2024-01-02"),
    ]));

    controller.submit(Some(pdf()), Some(excel()), fuzzy(), |_| {}).await.unwrap();
    assert!(controller.session().records().is_empty());
    assert_eq!(controller.progress(), 100);
}

#[tokio::test]
async fn test_missing_file_makes_no_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/match");
            then.status(200).json_body(match_body(json!([])));
        })
        .await;

    let config = config(&server, 0);
    let mut controller = controller(&config);
    let err = controller.submit(Some(pdf()), None, fuzzy(), |_| {}).await.unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(controller.session().error(), Some("Upload both PDF & Excel files."));
    assert_eq!(controller.session().state(), SubmissionState::Idle);
    mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_remote_error_is_non_destructive() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/match");
            then.status(400).json_body(json!({"error": "Excel file is missing a name column"}));
        })
        .await;

    let config = config(&server, 0);
    let mut controller = controller(&config).with_session(Session::with_records(vec![record("KEEP", "2024-01-01")]));
    let err = controller.submit(Some(pdf()), Some(excel()), fuzzy(), |_| {}).await.unwrap_err();

    assert!(matches!(err, Error::Remote { status: 400, .. }));
    let session = controller.session();
    assert_eq!(session.records().len(), 1);
    assert_eq!(session.error(), Some("Excel file is missing a name column"));
    assert_eq!(session.last_outcome(), Some(Outcome::Error));
    assert!(!session.is_submitting());
}

#[tokio::test]
async fn test_remote_error_without_message_uses_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/match");
            then.status(500).body("Internal Server Error");
        })
        .await;

    let config = config(&server, 0);
    let mut controller = controller(&config);
    let _ = controller.submit(Some(pdf()), Some(excel()), fuzzy(), |_| {}).await;
    assert_eq!(controller.session().error(), Some("Error processing files"));
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // nothing listens on port 9 in the test environment
    let config = Config {
        api_base: "http://127.0.0.1:9/api".into(),
        progress_grace_ms: 0,
        ..Default::default()
    };
    let mut controller = controller(&config);
    let err = controller.submit(Some(pdf()), Some(excel()), fuzzy(), |_| {}).await.unwrap_err();

    assert!(err.is_network());
    assert_eq!(controller.session().error(), Some("Error processing files"));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/match");
            then.status(200).delay(Duration::from_secs(3)).json_body(match_body(json!([])));
        })
        .await;

    let config = Config {
        timeout_seconds: 1,
        ..config(&server, 0)
    };
    let mut controller = controller(&config);
    let err = controller.submit(Some(pdf()), Some(excel()), fuzzy(), |_| {}).await.unwrap_err();

    assert!(matches!(err, Error::Timeout(1)), "{:?}", err);
    assert!(!controller.session().is_submitting());
    assert_eq!(controller.session().error(), Some("Error processing files"));
}

#[tokio::test]
async fn test_new_submission_clears_previous_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/match");
            then.status(200).json_body(match_body(json!([])));
        })
        .await;

    let config = config(&server, 0);
    let mut controller = controller(&config);
    let _ = controller.submit(None, Some(excel()), fuzzy(), |_| {}).await;
    assert!(controller.session().error().is_some());

    controller.submit(Some(pdf()), Some(excel()), fuzzy(), |_| {}).await.unwrap();
    assert_eq!(controller.session().error(), None);
}

// =============================================
// Refresh
// =============================================

#[tokio::test]
async fn test_refresh_replaces_list_and_view() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/records");
            then.status(200).json_body(json!([
                {"name_of_deceased": "A", "date_published": "2024-01-01"},
                {"name_of_deceased": "B", "date_published": "2024-01-02"},
                {"name_of_deceased": "C"}
            ]));
        })
        .await;

    let config = config(&server, 0);
    let mut controller = controller(&config);
    controller.session_mut().toggle_sort(RecordField::NameOfDeceased);

    assert_eq!(controller.refresh().await.unwrap(), 3);
    let view = controller.session().view();
    assert_eq!(view.groups.len(), 3);
    assert_eq!(view.sort.key, RecordField::DatePublished);
}

#[tokio::test]
async fn test_refresh_failure_keeps_list() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/records");
            then.status(502);
        })
        .await;

    let config = config(&server, 0);
    let mut controller = controller(&config).with_session(Session::with_records(vec![record("A", "2024-01-01")]));

    assert!(controller.refresh().await.is_err());
    assert_eq!(controller.session().records().len(), 1);
    assert_eq!(
        controller.session().error(),
        Some("Failed to fetch records. Please check the server.")
    );
}

#[tokio::test]
async fn test_slow_refresh_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/records");
            then.status(200).delay(Duration::from_secs(3)).json_body(json!([]));
        })
        .await;

    let config = Config {
        timeout_seconds: 1,
        ..config(&server, 0)
    };
    let mut controller = controller(&config);
    let err = controller.refresh().await.unwrap_err();

    assert!(matches!(err, Error::Timeout(1)), "{:?}", err);
}

// =============================================
// Clear
// =============================================

#[tokio::test]
async fn test_clear_confirmed() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/clear-records");
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;

    let config = config(&server, 0);
    let mut controller = controller(&config).with_session(Session::with_records(vec![record("A", "2024-01-01")]));
    controller.session_mut().set_search("a");

    let outcome = controller.clear(&AssumeYes).await.unwrap();
    assert_eq!(outcome, ClearOutcome::Cleared);
    mock.assert_async().await;

    let session = controller.session();
    assert!(session.records().is_empty());
    assert!(session.summary().is_none());
    assert_eq!(session.view_state().search, "");
    assert!(!session.can_export());
}

#[tokio::test]
async fn test_clear_declined_makes_no_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/clear-records");
            then.status(200);
        })
        .await;

    let config = config(&server, 0);
    let mut controller = controller(&config).with_session(Session::with_records(vec![record("A", "2024-01-01")]));

    let outcome = controller.clear(&AssumeNo).await.unwrap();
    assert_eq!(outcome, ClearOutcome::Declined);
    assert_eq!(controller.session().records().len(), 1);
    mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_failed_clear_refetches() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/clear-records");
            then.status(500).json_body(json!({"error": "database locked"}));
        })
        .await;
    let refetch = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/records");
            then.status(200).json_body(json!([
                {"name_of_deceased": "SERVER", "date_published": "2024-02-01"}
            ]));
        })
        .await;

    let config = config(&server, 0);
    let mut controller = controller(&config).with_session(Session::with_records(vec![record("STALE", "2024-01-01")]));

    let err = controller.clear(&AssumeYes).await.unwrap_err();
    assert!(matches!(err, Error::Clear(_)));
    refetch.assert_async().await;

    let session = controller.session();
    assert_eq!(session.records()[0].name_of_deceased.as_deref(), Some("SERVER"));
    assert_eq!(session.error(), Some("Failed to clear records."));
}

#[tokio::test]
async fn test_failed_clear_keeps_stale_list() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/clear-records");
            then.status(503);
        })
        .await;
    let refetch = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/records");
            then.status(200).json_body(json!([]));
        })
        .await;

    let config = Config {
        clear_failure: ClearFailurePolicy::KeepStale,
        ..config(&server, 0)
    };
    let mut controller = controller(&config).with_session(Session::with_records(vec![record("STALE", "2024-01-01")]));

    assert!(controller.clear(&AssumeYes).await.is_err());
    refetch.assert_calls_async(0).await;
    assert_eq!(controller.session().records().len(), 1);
    assert_eq!(controller.session().error(), Some("Failed to clear records."));
}
