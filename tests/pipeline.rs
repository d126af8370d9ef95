//! End-to-end pipeline tests against a scripted transport.

use async_trait::async_trait;
use courier::prelude::*;
use courier::settle;
use parking_lot::Mutex;
use serde_json::{json, Map};
use std::sync::Arc;

/// Transport stub that settles whatever the script returns.
struct ScriptedTransport {
    status: u16,
    body: Value,
    seen: Mutex<Vec<RequestConfig>>,
}

impl ScriptedTransport {
    fn new(status: u16, body: Value) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Adapter for ScriptedTransport {
    async fn call(&self, config: RequestConfig) -> Result<Response> {
        self.seen.lock().push(config.clone());
        let method = config.method.unwrap_or_default();
        let url = config.url.clone().unwrap_or_default();
        settle(Response {
            data: self.body.clone(),
            status: self.status,
            status_text: String::new(),
            headers: HeaderBucket::new(),
            config: Arc::new(config),
            request: Some(RequestHandle { method, url }),
        })
    }
}

fn client(transport: Arc<ScriptedTransport>) -> Client {
    Client::builder().adapter(transport).build().unwrap()
}

#[tokio::test]
async fn get_parses_json_and_keeps_effective_config() {
    let transport = ScriptedTransport::new(200, json!("{\"id\":1}"));
    let client = client(Arc::clone(&transport));

    let response = client.get("/users", None).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({"id": 1}));

    // The response carries the effective config it was produced from.
    assert_eq!(response.config.url.as_deref(), Some("/users"));
    assert_eq!(response.config.method, Some(Method::Get));
    let handle = response.request.as_ref().unwrap();
    assert_eq!(handle.url, "/users");
}

#[tokio::test]
async fn status_validation_failure_is_reportable() {
    let transport = ScriptedTransport::new(404, json!(""));
    let client = client(transport);

    let err = client.get("/users/0", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status code 404");
    assert!(!is_cancel(&err));

    let details = match &err {
        Error::Request(details) => details,
        other => panic!("expected a request error, got {other:?}"),
    };
    assert_eq!(details.kind, ErrorKind::StatusValidation);
    let report = details.to_json();
    assert_eq!(report["name"], "StatusValidationError");
    assert_eq!(report["config"]["url"], "/users/0");
}

#[tokio::test]
async fn auth_interceptor_decorates_every_request() {
    let transport = ScriptedTransport::new(200, json!("{}"));
    let client = client(Arc::clone(&transport));

    client.interceptors().request.add(InterceptorPair::new().on_fulfilled(
        |config: RequestConfig| async move { Ok(config.header("Authorization", "Bearer t0")) },
    ));

    client.get("/a", None).await.unwrap();
    client.get("/b", None).await.unwrap();

    let seen = transport.seen.lock();
    assert_eq!(seen.len(), 2);
    for config in seen.iter() {
        assert_eq!(config.headers.direct["Authorization"], "Bearer t0");
    }
}

#[tokio::test]
async fn request_body_is_serialized_by_default_transforms() {
    let transport = ScriptedTransport::new(200, json!("{}"));
    let client = client(Arc::clone(&transport));

    client
        .post("/users", Some(json!({"name": "ann"})), None)
        .await
        .unwrap();

    let seen = transport.seen.lock();
    let config = &seen[0];
    assert_eq!(config.data, Some(json!("{\"name\":\"ann\"}")));
    // The post bucket's default content type was already set, so the
    // transform left it alone.
    assert_eq!(
        config.headers.direct["Content-Type"],
        "application/x-www-form-urlencoded"
    );
}

#[tokio::test]
async fn cancellation_source_drives_the_request() {
    let transport = ScriptedTransport::new(200, json!("{}"));
    let client = client(Arc::clone(&transport));

    let source = CancelToken::source();
    source.cancel.cancel(Some("shutting down"));

    let err = client
        .request(RequestConfig::new().url("/x").cancel_token(source.token))
        .await
        .unwrap_err();
    assert!(is_cancel(&err));
    assert_eq!(err.to_string(), "Cancel: shutting down");
    assert!(transport.seen.lock().is_empty());
}

#[tokio::test]
async fn custom_validate_status_widens_success() {
    let transport = ScriptedTransport::new(404, json!("\"tolerated\""));
    let client = Client::builder()
        .defaults(RequestConfig::new().validate_status(|status| status < 500))
        .adapter(transport)
        .build()
        .unwrap();

    let response = client.get("/missing", None).await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.data, json!("tolerated"));
}

#[tokio::test]
async fn all_settles_a_batch() {
    let transport = ScriptedTransport::new(200, json!("{}"));
    let client = client(transport);

    let responses = all([
        client.get("/a", None),
        client.get("/b", None),
        client.get("/c", None),
    ])
    .await
    .unwrap();
    assert_eq!(responses.len(), 3);
}

#[tokio::test]
async fn params_survive_merging_and_reach_the_transport() {
    let transport = ScriptedTransport::new(200, json!("{}"));
    let parent = client(Arc::clone(&transport));
    let child = parent.create(RequestConfig::new().param("page", 1).param("q", "rust"));

    child
        .request(RequestConfig::new().url("/search").param("page", 2))
        .await
        .unwrap();

    let seen = transport.seen.lock();
    let params: &Map<String, Value> = seen[0].params.as_ref().unwrap();
    assert_eq!(params["page"], 2);
    assert_eq!(params["q"], "rust");
}
