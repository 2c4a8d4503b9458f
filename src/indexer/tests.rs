//! Tests for the indexer client module

use super::*;
use crate::config::ServiceConfig;
use crate::error::Error;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;
use wiremock::matchers::{basic_auth, body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> IndexerClient {
    let url = format!("{}/indexes", server.uri());
    IndexerClient::new(&ServiceConfig::new(url, "indexer-client", "indexer-secret")).unwrap()
}

fn ok(details: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "ok",
        "message": "",
        "details": details
    }))
}

fn absolute_details() -> Value {
    json!({
        "type": "absolute",
        "data": {
            "status": "ok",
            "retry": false,
            "updated": "2024-05-01T12:00:00Z",
            "outcome": "extracted 120 records",
            "index": "2024-05",
            "expires": "2024-06-01T00:00:00Z"
        }
    })
}

fn rolling_details() -> Value {
    json!({
        "type": "rolling",
        "data": [
            {
                "index": "2024-04",
                "period": "2024-04",
                "outcome": "done",
                "retry": false,
                "status": "ok",
                "updated": "2024-05-01T12:00:00Z"
            },
            {
                "index": "2024-05",
                "period": "2024-05",
                "outcome": "",
                "retry": true,
                "status": "err",
                "updated": "2024-05-02T12:00:00Z"
            }
        ]
    })
}

// ============================================================================
// Types
// ============================================================================

#[test_case("absolute", IndexType::Absolute)]
#[test_case("rolling", IndexType::Rolling)]
fn test_index_type_parse(input: &str, expected: IndexType) {
    assert_eq!(input.parse::<IndexType>().unwrap(), expected);
    assert_eq!(expected.to_string(), input);
}

#[test]
fn test_index_type_unknown() {
    assert!("Absolute".parse::<IndexType>().is_err());
}

#[test]
fn test_indexer_index_form() {
    let index = IndexerIndex::new("conn-1", "invoices", IndexType::Rolling, "2024-05")
        .with_count(12)
        .with_storage("s3");

    assert_eq!(
        index.to_form(),
        vec![
            ("connection", "conn-1".to_string()),
            ("datasource", "invoices".to_string()),
            ("count", "12".to_string()),
            ("type", "rolling".to_string()),
            ("storage", "s3".to_string()),
            ("cycle", "2024-05".to_string()),
        ]
    );
}

#[test_case(true, false, "ok", "false")]
#[test_case(false, true, "err", "true")]
#[test_case(false, false, "err", "false")]
fn test_index_update_form(ok: bool, retry: bool, status: &str, retry_text: &str) {
    let mut update = IndexUpdate::new("2024-05", "done").retry(retry);
    if !ok {
        update = update.failed();
    }

    assert_eq!(update.status(), status);
    assert_eq!(
        update.to_form(),
        vec![
            ("outcome", "done".to_string()),
            ("status", status.to_string()),
            ("retry", retry_text.to_string()),
        ]
    );
}

// ============================================================================
// new_index
// ============================================================================

#[tokio::test]
async fn test_new_index_absolute() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/indexes"))
        .and(basic_auth("indexer-client", "indexer-secret"))
        .and(body_string(
            "connection=conn-1&datasource=balance&count=1&type=absolute&storage=gcs&cycle=2024-05",
        ))
        .respond_with(ok(absolute_details()))
        .expect(1)
        .mount(&server)
        .await;

    let index = IndexerIndex::new("conn-1", "balance", IndexType::Absolute, "2024-05")
        .with_storage("gcs");
    let created = client(&server).new_index(&index).await.unwrap();

    assert_eq!(
        created,
        IndexerDatasource::Absolute(AbsoluteRecord {
            status: "ok".to_string(),
            retry: false,
            updated: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            outcome: "extracted 120 records".to_string(),
            index: "2024-05".to_string(),
            expires: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        })
    );
}

#[tokio::test]
async fn test_new_index_rolling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(ok(rolling_details()))
        .expect(1)
        .mount(&server)
        .await;

    let index = IndexerIndex::new("conn-1", "invoices", IndexType::Rolling, "2024-05")
        .with_count(2);
    let created = client(&server).new_index(&index).await.unwrap();

    assert_eq!(created.index_type(), IndexType::Rolling);
    let records = created.as_rolling().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].index, "2024-04");
    assert_eq!(records[1].status, "err");
    assert!(records[1].retry);
}

#[tokio::test]
async fn test_new_index_non_ok() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "status": "error",
            "message": "index already exists for cycle 2024-05"
        })))
        .mount(&server)
        .await;

    let index = IndexerIndex::new("conn-1", "invoices", IndexType::Rolling, "2024-05");
    let err = client(&server).new_index(&index).await.unwrap_err();
    assert!(matches!(err, Error::Service { .. }));
    assert!(err
        .to_string()
        .contains("index already exists for cycle 2024-05"));
}

// ============================================================================
// get_index
// ============================================================================

#[tokio::test]
async fn test_get_index_absolute() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexes/conn-1/balance"))
        .and(query_param("cycle", "2024-05"))
        .and(basic_auth("indexer-client", "indexer-secret"))
        .respond_with(ok(absolute_details()))
        .expect(1)
        .mount(&server)
        .await;

    let found = client(&server)
        .get_index("conn-1", "balance", "2024-05")
        .await
        .unwrap();

    let record = found.as_absolute().unwrap();
    assert_eq!(record.index, "2024-05");
    assert_eq!(
        record.expires,
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_get_index_rolling_preserves_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexes/conn-1/invoices"))
        .and(query_param("cycle", "2024-05"))
        .respond_with(ok(rolling_details()))
        .expect(1)
        .mount(&server)
        .await;

    let found = client(&server)
        .get_index("conn-1", "invoices", "2024-05")
        .await
        .unwrap();

    let periods: Vec<&str> = found
        .as_rolling()
        .unwrap()
        .iter()
        .map(|r| r.period.as_str())
        .collect();
    assert_eq!(periods, vec!["2024-04", "2024-05"]);
}

#[tokio::test]
async fn test_get_index_malformed_entry_is_an_error() {
    let server = MockServer::start().await;

    let mut details = rolling_details();
    details["data"][1]
        .as_object_mut()
        .unwrap()
        .remove("outcome");

    Mock::given(method("GET"))
        .and(path("/indexes/conn-1/invoices"))
        .respond_with(ok(details))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_index("conn-1", "invoices", "2024-05")
        .await
        .unwrap_err();

    match err {
        Error::RollingEntries { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].position, 1);
            assert_eq!(failures[0].field, "outcome");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_index_unexpected_shape_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexes/conn-1/balance"))
        .respond_with(ok(json!({"type": "absolute", "data": ["not", "an", "object"]})))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_index("conn-1", "balance", "2024-05")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedField { ref field, .. } if field == "data"));
}

#[test_case(json!({"status": "ok", "message": ""}) ; "missing details")]
#[test_case(json!({"status": "ok", "message": null, "details": null}) ; "null details")]
#[tokio::test]
async fn test_get_index_without_details_is_decode_error(body: Value) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexes/conn-1/balance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .get_index("conn-1", "balance", "2024-05")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }), "{err:?}");
    assert!(err.to_string().contains("no details"));
}

#[tokio::test]
async fn test_get_index_non_ok() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexes/conn-1/balance"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "error",
            "message": "no index for cycle",
            "details": {"type": "absolute"}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_index("conn-1", "balance", "2024-05")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no index for cycle"));
}

#[tokio::test]
async fn test_get_index_dot_ids_never_reach_collection() {
    let server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ok(absolute_details()))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .get_index("..", "..", "2024-05")
        .await
        .unwrap_err();
    assert!(err.is_local());
}

// ============================================================================
// update_index
// ============================================================================

#[tokio::test]
async fn test_update_index_failure_maps_to_err() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/indexes/conn-1/invoices"))
        .and(query_param("cycle", "2024-05"))
        .and(query_param("index", "2024-04"))
        .and(body_string("outcome=rate+limited&status=err&retry=true"))
        .respond_with(ok(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    let update = IndexUpdate::new("2024-04", "rate limited")
        .failed()
        .retry(true);
    client(&server)
        .update_index("conn-1", "invoices", "2024-05", &update)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_index_success() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/indexes/conn-1/invoices"))
        .and(body_string("outcome=done&status=ok&retry=false"))
        .respond_with(ok(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .update_index(
            "conn-1",
            "invoices",
            "2024-05",
            &IndexUpdate::new("2024-05", "done"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_index_non_ok() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/indexes/conn-1/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "message": "unknown index 2099-01"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .update_index(
            "conn-1",
            "invoices",
            "2024-05",
            &IndexUpdate::new("2099-01", "done"),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown index 2099-01"));
}
