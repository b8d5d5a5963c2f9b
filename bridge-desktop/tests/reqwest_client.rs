use bridge_desktop::ReqwestHttpClient;
use bridge_traits::error::BridgeError;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bytes::Bytes;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn sends_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/files/upload"))
        .and(header("Authorization", "Bearer sl.token"))
        .and(header("Dropbox-API-Arg", r#"{"path":"/a.txt"}"#))
        .and(body_bytes(b"hello".to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "a.txt"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new().unwrap();
    let request = HttpRequest::new(HttpMethod::Post, format!("{}/2/files/upload", server.uri()))
        .bearer_token("sl.token")
        .header("Dropbox-API-Arg", r#"{"path":"/a.txt"}"#)
        .body(Bytes::from_static(b"hello"));

    let response = client.execute(request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(
        response.json::<serde_json::Value>().unwrap(),
        json!({"name": "a.txt"})
    );
}

#[tokio::test]
async fn error_statuses_are_returned_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new().unwrap();
    let request = HttpRequest::new(
        HttpMethod::Post,
        format!("{}/2/files/list_folder", server.uri()),
    );

    let response = client.execute(request).await.unwrap();
    assert_eq!(response.status, 503);
    assert!(!response.is_success());
    assert_eq!(response.text().unwrap(), "busy");
}

#[tokio::test]
async fn request_timeout_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new().unwrap();
    let request =
        HttpRequest::new(HttpMethod::Get, server.uri()).timeout(Duration::from_millis(100));

    let err = client.execute(request).await.unwrap_err();
    assert!(matches!(err, BridgeError::Transport(_)));
}
