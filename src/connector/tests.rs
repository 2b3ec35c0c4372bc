use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::{AwsConfig, BasicAuth, ConnectorConfig, OAuthConfig};
use crate::connector::{CallOptions, Connector, Reply, ResponseBody};
use crate::error::Error;

async fn connector_for(server: &MockServer) -> Connector {
    Connector::new(ConnectorConfig::new(server.uri())).unwrap()
}

fn buffered(reply: Reply) -> crate::connector::HttpResponse {
    reply.into_buffered().expect("expected buffered reply")
}

#[tokio::test]
async fn verb_shortcuts_force_their_method() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let connector = connector_for(&server).await;
    // Caller-supplied method is overwritten by the shortcut.
    let reply = connector
        .post(CallOptions::new().method("GET").path("/submit"))
        .await
        .unwrap();

    assert_eq!(buffered(reply).status, 200);
}

#[tokio::test]
async fn exec_requires_a_method() {
    let server = MockServer::start().await;
    let connector = connector_for(&server).await;

    let err = connector.exec(CallOptions::new()).await.unwrap_err();
    assert!(matches!(err, Error::MissingMethod(_)));

    let err = connector
        .exec(CallOptions::new().method(""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingMethod(_)));

    // Nothing was sent for either call.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn exec_uppercases_the_method() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/thing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let connector = connector_for(&server).await;
    let reply = connector
        .exec(CallOptions::new().method("delete").path("/thing"))
        .await
        .unwrap();

    assert_eq!(buffered(reply).status, 204);
}

#[tokio::test]
async fn call_query_overrides_config_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("v", "2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = ConnectorConfig::new(server.uri()).query("v", "1");
    let connector = Connector::new(config).unwrap();

    let reply = connector
        .get(CallOptions::new().query("v", "2"))
        .await
        .unwrap();
    assert_eq!(buffered(reply).status, 200);
}

#[tokio::test]
async fn config_query_applies_when_call_is_silent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("v", "1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = ConnectorConfig::new(server.uri()).query("v", "1");
    let connector = Connector::new(config).unwrap();

    let reply = connector.get(CallOptions::new()).await.unwrap();
    assert_eq!(buffered(reply).status, 200);
}

#[tokio::test]
async fn json_body_is_posted_and_json_response_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(body_json(json!({"name": "widget"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_raw("{\"id\":7}", "application/json"),
        )
        .mount(&server)
        .await;

    let connector = connector_for(&server).await;
    let reply = connector
        .post(CallOptions::new().path("/items").json(json!({"name": "widget"})))
        .await
        .unwrap();

    let response = buffered(reply);
    assert_eq!(response.status, 201);
    assert_eq!(response.body, ResponseBody::Json(json!({"id": 7})));
}

#[tokio::test]
async fn non_2xx_responses_normalize_instead_of_erroring() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("Content-Type", "text/plain")
                .set_body_string("no such thing"),
        )
        .mount(&server)
        .await;

    let connector = connector_for(&server).await;
    let reply = connector
        .get(CallOptions::new().path("/missing"))
        .await
        .unwrap();

    let response = buffered(reply);
    assert_eq!(response.status, 404);
    assert_eq!(response.body, ResponseBody::Text("no such thing".to_string()));
}

#[tokio::test]
async fn per_call_timeout_produces_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let connector = connector_for(&server).await;
    let err = connector
        .get(
            CallOptions::new()
                .path("/slow")
                .timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got: {err:?}");
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn basic_auth_descriptor_sets_authorization() {
    let server = MockServer::start().await;
    // base64("user:pass")
    Mock::given(method("GET"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = ConnectorConfig::new(server.uri()).auth(BasicAuth::new("user", "pass"));
    let connector = Connector::new(config).unwrap();

    let reply = connector.get(CallOptions::new()).await.unwrap();
    assert_eq!(buffered(reply).status, 200);
}

#[tokio::test]
async fn oauth_descriptor_adds_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config =
        ConnectorConfig::new(server.uri()).oauth(OAuthConfig::new("ck", "cs").with_token("t", "s"));
    let connector = Connector::new(config).unwrap();

    let reply = connector.get(CallOptions::new()).await.unwrap();
    assert_eq!(buffered(reply).status, 200);

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap();
    assert!(auth.to_str().unwrap().starts_with("OAuth "));
}

#[tokio::test]
async fn aws_descriptor_adds_date_and_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(header_exists("authorization"))
        .and(header_exists("date"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = ConnectorConfig::new(server.uri())
        .aws(AwsConfig::new("AKID", "secret").with_bucket("logs"));
    let connector = Connector::new(config).unwrap();

    let reply = connector
        .put(CallOptions::new().path("/2024/01").text("payload"))
        .await
        .unwrap();
    assert_eq!(buffered(reply).status, 200);

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap();
    assert!(auth.to_str().unwrap().starts_with("AWS AKID:"));
}

#[tokio::test]
async fn stream_mode_skips_normalization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(201).set_body_raw("{\"x\":1}", "application/json"),
        )
        .mount(&server)
        .await;

    let connector = connector_for(&server).await;
    let reply = connector
        .get(CallOptions::new().path("/feed").stream(true))
        .await
        .unwrap();

    let handle = reply.into_stream().expect("expected stream reply");
    assert_eq!(handle.status(), 201);
    assert_eq!(
        handle.headers().get("content-type").unwrap(),
        "application/json"
    );

    // The body arrives as raw bytes; no JSON decoding happened.
    let body = handle.into_inner().bytes().await.unwrap();
    assert_eq!(&body[..], b"{\"x\":1}");
}

#[tokio::test]
async fn concurrent_calls_share_one_connector() {
    use futures_util::future::join_all;
    use std::sync::Arc;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let connector = Arc::new(connector_for(&server).await);

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let connector = connector.clone();
            tokio::spawn(async move {
                connector.get(CallOptions::new().path("/ping")).await
            })
        })
        .collect();

    for joined in join_all(handles).await {
        let response = buffered(joined.unwrap().unwrap());
        assert_eq!(response.status, 200);
    }
}

#[tokio::test]
async fn invalid_per_call_header_aborts_before_sending() {
    let server = MockServer::start().await;
    let connector = connector_for(&server).await;

    let err = connector
        .get(CallOptions::new().header("bad name", "v"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidOptions(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
