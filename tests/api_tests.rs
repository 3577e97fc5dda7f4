// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use mineraldesk::api::{ApiClient, ApiError, ApiResult, RequestOptions};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The blocking client must not run on the async test runtime's threads.
async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

fn client(uri: String) -> ApiClient {
    ApiClient::new(&uri, Duration::from_secs(5)).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn success_returns_parsed_body() {
    let server = MockServer::start().await;
    let body = json!([{"id": 1, "name": "Minera Norte SAC", "website": null}]);
    Mock::given(method("GET"))
        .and(path("/buyers/"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let res = blocking(move || {
        let opts = RequestOptions::default().query("skip", 0).query("limit", 100);
        client(uri).get_with("/buyers/", &opts)
    })
    .await;
    assert_eq!(res, ApiResult::Success(body));
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_uses_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/buyers/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Buyer not found"})))
        .mount(&server)
        .await;

    let uri = server.uri();
    let res = blocking(move || client(uri).get("/buyers/99")).await;
    match res {
        ApiResult::Failure { error, details } => {
            assert_eq!(error, "Buyer not found");
            assert!(matches!(details, ApiError::Status { status: 404, .. }));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_without_detail_reports_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prices/refresh"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let res = blocking(move || client(uri).post("/prices/refresh", &serde_json::Value::Null)).await;
    assert_eq!(res.error(), Some("HTTP 500"));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_success_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let res = blocking(move || client(uri).get("/health")).await;
    assert!(matches!(
        res,
        ApiResult::Failure {
            details: ApiError::Decode { .. },
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn post_sends_json_body_verbatim() {
    let server = MockServer::start().await;
    let sent = json!({"message": "hola", "context": "Trujillo"});
    Mock::given(method("POST"))
        .and(path("/chat/ask"))
        .and(header("content-type", "application/json"))
        .and(body_json(&sent))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Hola"})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let res = blocking(move || client(uri).post("/chat/ask", &sent)).await;
    assert_eq!(res.data(), Some(&json!({"response": "Hola"})));
}

#[tokio::test(flavor = "multi_thread")]
async fn caller_headers_override_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("content-type", "text/plain"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let res = blocking(move || {
        let opts = RequestOptions::default()
            .header("Content-Type", "text/plain")
            .header("X-Trace", "abc");
        client(uri).get_with("/health", &opts)
    })
    .await;
    assert!(res.is_success());
}

#[test]
fn unreachable_backend_is_a_failure_not_a_panic() {
    // Port 1 is reserved; nothing listens there.
    let c = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let res = c.get("/health");
    assert!(!res.is_success());
    assert!(matches!(
        res,
        ApiResult::Failure {
            details: ApiError::Transport { .. },
            ..
        }
    ));
    assert!(!res.error().unwrap_or_default().is_empty());
}

#[test]
fn bad_header_is_reported_before_sending() {
    let c = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let opts = RequestOptions::default().header("bad header", "x");
    let res = c.get_with("/health", &opts);
    assert!(matches!(
        res,
        ApiResult::Failure {
            details: ApiError::InvalidRequest { .. },
            ..
        }
    ));
}
