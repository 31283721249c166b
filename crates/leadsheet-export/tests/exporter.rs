//! End-to-end exporter flows against a wiremock backend.
//!
//! One mock server plays both the Sheets and Drive hosts. Remote call
//! counts are pinned with `Mock::expect`, which the server verifies when it
//! is dropped at the end of each test.

use leadsheet_core::records::{QueryDetails, RowLayout, ScrapedRecord};
use leadsheet_export::{CallerContext, ResultExporter, SheetsError};
use leadsheet_sheets::SheetsClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_exporter(base_url: &str) -> ResultExporter {
    let client = SheetsClient::with_base_urls("test-token", 30, base_url, base_url)
        .expect("client construction should not fail");
    ResultExporter::new(client, "qa@example.com", RowLayout::Standard)
}

fn spa_query() -> QueryDetails {
    QueryDetails {
        category: "Spa".to_string(),
        country: "UK".to_string(),
        city: "London".to_string(),
    }
}

async fn mount_empty_drive_search(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_create_spreadsheet(server: &MockServer, id: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "spreadsheetId": id })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_grant_permission(server: &MockServer, id: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/drive/v3/files/{id}/permissions")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "perm-1", "type": "user", "role": "writer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// resolve_user_document
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolve_creates_once_then_serves_from_cache() {
    let server = MockServer::start().await;
    mount_empty_drive_search(&server, 1).await;
    mount_create_spreadsheet(&server, "doc-9", 1).await;
    mount_grant_permission(&server, "doc-9", 1).await;

    let mut exporter = test_exporter(&server.uri());
    let first = exporter
        .resolve_user_document(7, "alice")
        .await
        .expect("first resolution should succeed");
    let second = exporter
        .resolve_user_document(7, "alice")
        .await
        .expect("second resolution should succeed");

    assert_eq!(first, "doc-9");
    assert_eq!(second, "doc-9");
    // expect(1) on every mock: the second call must not reach the backend.
}

#[tokio::test]
async fn resolve_reuses_existing_document_without_creating() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "name = 'Results for alice'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{ "id": "doc-5", "name": "Results for alice" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_create_spreadsheet(&server, "doc-never", 0).await;

    let mut exporter = test_exporter(&server.uri());
    let id = exporter
        .resolve_user_document(7, "alice")
        .await
        .expect("resolution should succeed");

    assert_eq!(id, "doc-5");
}

#[tokio::test]
async fn resolve_does_not_cache_when_grant_fails() {
    let server = MockServer::start().await;
    // Both attempts run the full search/create/grant sequence: a failed
    // resolution must leave no cache entry behind.
    mount_empty_drive_search(&server, 2).await;
    mount_create_spreadsheet(&server, "doc-9", 2).await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files/doc-9/permissions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": 500, "message": "backend exploded" }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let mut exporter = test_exporter(&server.uri());
    for _ in 0..2 {
        let err = exporter
            .resolve_user_document(7, "alice")
            .await
            .expect_err("resolution should fail");
        assert!(
            matches!(err, SheetsError::Api { status: 500, .. }),
            "expected Api(500), got: {err:?}"
        );
    }
}

#[tokio::test]
async fn resolve_propagates_search_failure_without_creating() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "code": 503, "message": "try later" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_create_spreadsheet(&server, "doc-never", 0).await;

    let mut exporter = test_exporter(&server.uri());
    let err = exporter
        .resolve_user_document(7, "alice")
        .await
        .expect_err("resolution should fail");

    assert!(matches!(err, SheetsError::Api { status: 503, .. }));
}

// ---------------------------------------------------------------------------
// export_query_results
// ---------------------------------------------------------------------------

fn sample_records() -> Vec<ScrapedRecord> {
    vec![
        ScrapedRecord::new(
            "TrustPilot",
            json!([
                "Acme",
                "acme.com",
                ["a@x.com", "b@x.com"],
                "555-1234567",
                "NYC",
                "4.5",
                "120",
                "Verified"
            ]),
        ),
        // Shape mismatch: skipped with a warning, never aborts the export.
        ScrapedRecord::new("LinkedIn", json!("opaque blob")),
        ScrapedRecord::new(
            "Google Maps",
            json!(["Cafe", "cafe.example", [], "N/A", "London", "89"]),
        ),
    ]
}

#[tokio::test]
async fn export_writes_header_plus_rows_in_input_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/doc-1:batchUpdate"))
        .and(body_partial_json(json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "gridProperties": { "rowCount": 1000, "columnCount": 10 }
                    }
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "replies": [] })))
        .expect(1)
        .mount(&server)
        .await;

    // Header + 2 decodable records = 3 rows, ending at column J.
    Mock::given(method("PUT"))
        .and(path_regex(r"^/v4/spreadsheets/doc-1/values/.+!A1:J3$"))
        .and(query_param("valueInputOption", "RAW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updatedRows": 3, "updatedColumns": 10, "updatedCells": 30
        })))
        .expect(1)
        .mount(&server)
        .await;

    let exporter = test_exporter(&server.uri());
    let worksheet = exporter
        .export_query_results("doc-1", &spa_query(), &sample_records())
        .await
        .expect("export should succeed");

    assert!(
        worksheet.starts_with("Spa-UK-London-"),
        "unexpected worksheet name: {worksheet}"
    );

    let requests = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    let bulk_write = requests
        .iter()
        .find(|r| r.method.to_string() == "PUT")
        .expect("a bulk write should have been sent");
    let body: serde_json::Value =
        serde_json::from_slice(&bulk_write.body).expect("bulk write body is JSON");

    assert_eq!(
        body["values"],
        json!([
            [
                "Source", "Company Name", "Website", "Email", "Phone", "WhatsApp Link",
                "Location", "Rating", "Reviews", "Verification"
            ],
            [
                "TrustPilot", "Acme", "acme.com", "a@x.com, b@x.com", "555-1234567",
                "https://wa.me/5551234567", "NYC", "4.5", "120", "Verified"
            ],
            [
                "Google Maps", "Cafe", "cafe.example", "", "N/A",
                "N/A", "London", "N/A", "89", "N/A"
            ]
        ])
    );
}

#[tokio::test]
async fn export_fails_without_bulk_write_when_worksheet_creation_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/doc-1:batchUpdate"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "duplicate sheet title" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/v4/spreadsheets/doc-1/values/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let exporter = test_exporter(&server.uri());
    let err = exporter
        .export_query_results("doc-1", &spa_query(), &sample_records())
        .await
        .expect_err("export should fail");

    assert!(
        matches!(err, SheetsError::Api { status: 400, ref message } if message == "duplicate sheet title"),
        "expected Api(400), got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// export (top-level entry point)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_resolves_document_then_writes_worksheet() {
    let server = MockServer::start().await;

    // No display name: the title falls back to the stringified user id.
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "name = 'Results for 42'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .expect(1)
        .mount(&server)
        .await;
    mount_create_spreadsheet(&server, "doc-42", 1).await;
    mount_grant_permission(&server, "doc-42", 1).await;

    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/doc-42:batchUpdate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "replies": [] })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/v4/spreadsheets/doc-42/values/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updatedRows": 3, "updatedColumns": 10, "updatedCells": 30
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut exporter = test_exporter(&server.uri());
    let caller = CallerContext {
        user_id: 42,
        username: None,
    };
    let document_id = exporter
        .export(&caller, &sample_records(), &spa_query())
        .await
        .expect("export should succeed");

    assert_eq!(document_id, "doc-42");
}

#[tokio::test]
async fn export_propagates_resolution_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "rate limit exceeded" }
        })))
        .mount(&server)
        .await;

    let mut exporter = test_exporter(&server.uri());
    let caller = CallerContext {
        user_id: 42,
        username: Some("alice".to_string()),
    };
    let err = exporter
        .export(&caller, &sample_records(), &spa_query())
        .await
        .expect_err("export should fail");

    assert!(matches!(err, SheetsError::Api { status: 429, .. }));
}
