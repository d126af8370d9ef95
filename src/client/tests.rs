use super::*;
use crate::adapter::{settle, Adapter};
use crate::cancel::CancelToken;
use crate::config::{Method, RequestConfig};
use crate::error::{Error, ErrorKind, Result};
use crate::interceptor::InterceptorPair;
use crate::response::{RequestHandle, Response};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Responder = Box<dyn Fn(&RequestConfig) -> Result<(u16, Value)> + Send + Sync>;

/// Scripted transport: applies the settle step like a real adapter, but
/// the outcome is decided by the test.
struct StubAdapter {
    responder: Responder,
    calls: AtomicUsize,
}

impl StubAdapter {
    fn new(
        responder: impl Fn(&RequestConfig) -> Result<(u16, Value)> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
        })
    }

    fn with_status(status: u16, data: Value) -> Arc<Self> {
        Self::new(move |_| Ok((status, data.clone())))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Adapter for StubAdapter {
    async fn call(&self, config: RequestConfig) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (status, data) = (self.responder)(&config)?;
        let method = config.method.unwrap_or_default();
        let url = config.url.clone().unwrap_or_default();
        settle(Response {
            data,
            status,
            status_text: String::new(),
            headers: Default::default(),
            config: Arc::new(config),
            request: Some(RequestHandle { method, url }),
        })
    }
}

fn client_with(adapter: Arc<StubAdapter>) -> Client {
    Client::builder().adapter(adapter).build().unwrap()
}

/// Client whose transforms are cleared so adapters see raw config values.
fn plain_client_with(adapter: Arc<StubAdapter>) -> Client {
    Client::builder()
        .defaults(
            RequestConfig::new()
                .transform_request(Vec::new())
                .transform_response(Vec::new()),
        )
        .adapter(adapter)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_get_parses_json_body_with_default_transforms() {
    let adapter = StubAdapter::with_status(200, json!("{\"id\":1}"));
    let client = client_with(adapter);

    let response = client.get("/users", None).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({"id": 1}));
    assert_eq!(response.config.method, Some(Method::Get));
}

#[tokio::test]
async fn test_unparseable_body_stays_a_string() {
    let adapter = StubAdapter::with_status(200, json!("plain text"));
    let client = client_with(adapter);

    let response = client.get("/motd", None).await.unwrap();
    assert_eq!(response.data, json!("plain text"));
}

#[tokio::test]
async fn test_rejected_status_carries_transformed_response() {
    let adapter = StubAdapter::with_status(404, json!("{\"error\":\"missing\"}"));
    let client = client_with(adapter);

    let err = client.get("/users/9", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status code 404");
    assert_eq!(err.kind(), Some(ErrorKind::StatusValidation));

    // The failure body went through the same response transforms as a
    // success body.
    let response = err.response().unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.data, json!({"error": "missing"}));
}

#[tokio::test]
async fn test_interceptor_sandwich_ordering() {
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let adapter = {
        let log = Arc::clone(&log);
        StubAdapter::new(move |_| {
            log.lock().push("dispatch");
            Ok((200, json!(null)))
        })
    };
    let client = client_with(adapter);

    for tag in ["r1", "r2"] {
        let log = Arc::clone(&log);
        client.interceptors().request.add(InterceptorPair::new().on_fulfilled(
            move |config: RequestConfig| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().push(tag);
                    Ok(config)
                }
            },
        ));
    }
    for tag in ["s1", "s2"] {
        let log = Arc::clone(&log);
        client.interceptors().response.add(InterceptorPair::new().on_fulfilled(
            move |response: Response| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().push(tag);
                    Ok(response)
                }
            },
        ));
    }

    client.get("/ordered", None).await.unwrap();
    assert_eq!(*log.lock(), vec!["r2", "r1", "dispatch", "s1", "s2"]);
}

#[tokio::test]
async fn test_ejected_interceptor_is_skipped() {
    let adapter = StubAdapter::with_status(200, json!(null));
    let client = client_with(adapter);

    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();
    for tag in ["a", "b"] {
        let log = Arc::clone(&log);
        handles.push(client.interceptors().request.add(
            InterceptorPair::new().on_fulfilled(move |config: RequestConfig| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().push(tag);
                    Ok(config)
                }
            }),
        ));
    }

    client.interceptors().request.eject(handles[0]);
    client.get("/x", None).await.unwrap();
    assert_eq!(*log.lock(), vec!["b"]);
}

#[tokio::test]
async fn test_chain_snapshot_is_taken_when_chain_is_built() {
    let adapter = StubAdapter::with_status(200, json!("untouched"));
    let client = client_with(adapter);

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let gate = Arc::new(Mutex::new(Some(rx)));
    client.interceptors().request.add(InterceptorPair::new().on_fulfilled(
        move |config: RequestConfig| {
            let gate = Arc::clone(&gate);
            async move {
                let rx = gate.lock().take();
                if let Some(rx) = rx {
                    let _ = rx.await;
                }
                Ok(config)
            }
        },
    ));
    let tagger = client.interceptors().response.add(InterceptorPair::new().on_fulfilled(
        |mut response: Response| async move {
            response.data = json!("tagged");
            Ok(response)
        },
    ));

    let task = {
        let client = client.clone();
        tokio::spawn(async move { client.get("/slow", None).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    // The in-flight chain snapshot already contains the tagger, so
    // ejecting it now must not remove it from that chain...
    client.interceptors().response.eject(tagger);
    // ...and an interceptor registered now must not join that chain.
    client.interceptors().response.add(InterceptorPair::new().on_fulfilled(
        |mut response: Response| async move {
            response.data = json!("mutated");
            Ok(response)
        },
    ));

    tx.send(()).unwrap();
    let response = task.await.unwrap().unwrap();
    assert_eq!(response.data, json!("tagged"));
}

#[tokio::test]
async fn test_request_interceptor_failure_skips_dispatch() {
    let adapter = StubAdapter::with_status(200, json!(null));
    let client = client_with(Arc::clone(&adapter));

    client.interceptors().request.add(InterceptorPair::new().on_fulfilled(
        |_: RequestConfig| async move { Err(Error::pipeline("auth token missing")) },
    ));

    let err = client.get("/x", None).await.unwrap_err();
    assert!(matches!(err, Error::Pipeline(_)));
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn test_response_interceptor_can_recover_a_failure() {
    let adapter = StubAdapter::with_status(404, json!("null"));
    let client = client_with(adapter);

    client.interceptors().response.add(InterceptorPair::new().on_rejected(
        |err: Error| async move {
            if let Some(response) = err.response() {
                return Ok(response.clone());
            }
            Err(err)
        },
    ));

    let response = client.get("/maybe", None).await.unwrap();
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_pre_cancelled_token_never_reaches_adapter() {
    let adapter = StubAdapter::with_status(200, json!(null));
    let client = client_with(Arc::clone(&adapter));

    let source = CancelToken::source();
    source.cancel.cancel(Some("superseded"));

    let err = client
        .request(RequestConfig::new().url("/x").cancel_token(source.token))
        .await
        .unwrap_err();
    assert!(err.is_cancel());
    assert_eq!(err.cancel_reason().unwrap().message, "superseded");
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn test_late_cancellation_wins_over_success() {
    let source = CancelToken::source();
    let cancel = source.cancel.clone();
    let adapter = StubAdapter::new(move |_| {
        cancel.cancel(Some("late"));
        Ok((200, json!("completed")))
    });
    let client = client_with(Arc::clone(&adapter));

    let err = client
        .request(RequestConfig::new().url("/x").cancel_token(source.token))
        .await
        .unwrap_err();
    assert!(err.is_cancel());
    assert_eq!(err.cancel_reason().unwrap().message, "late");
    assert_eq!(adapter.calls(), 1);
}

#[tokio::test]
async fn test_late_cancellation_wins_over_failure() {
    let source = CancelToken::source();
    let cancel = source.cancel.clone();
    let adapter = StubAdapter::new(move |config| {
        cancel.cancel(Some("late"));
        Err(Error::network(
            "Network Error",
            Arc::new(config.clone()),
            None,
        ))
    });
    let client = client_with(adapter);

    let err = client
        .request(RequestConfig::new().url("/x").cancel_token(source.token))
        .await
        .unwrap_err();
    assert!(err.is_cancel());
    assert_eq!(err.cancel_reason().unwrap().message, "late");
}

#[tokio::test]
async fn test_reasonless_cancellation_does_not_trip_checkpoints() {
    let adapter = StubAdapter::with_status(200, json!("ok"));
    let client = client_with(adapter);

    let source = CancelToken::source();
    source.cancel.cancel(None);

    // No reason was recorded, so the dispatcher checkpoints stay quiet and
    // a transport that does not observe the signal completes normally.
    let response = client
        .request(RequestConfig::new().url("/x").cancel_token(source.token))
        .await
        .unwrap();
    assert_eq!(response.data, json!("ok"));
}

#[tokio::test]
async fn test_verbs_inject_method_url_and_data() {
    let adapter = StubAdapter::new(|config| {
        Ok((
            200,
            json!({
                "method": config.method.unwrap_or_default().as_str(),
                "url": config.url,
                "data": config.data,
            }),
        ))
    });
    let client = plain_client_with(adapter);

    let response = client.get("/users", None).await.unwrap();
    assert_eq!(response.data, json!({"method": "get", "url": "/users", "data": null}));

    let response = client
        .post("/users", Some(json!({"name": "ann"})), None)
        .await
        .unwrap();
    assert_eq!(
        response.data,
        json!({"method": "post", "url": "/users", "data": {"name": "ann"}})
    );

    let response = client.put("/users/1", Some(json!(1)), None).await.unwrap();
    assert_eq!(response.data["method"], "put");

    let response = client.patch("/users/1", None, None).await.unwrap();
    assert_eq!(response.data["method"], "patch");

    for (method, response) in [
        ("delete", client.delete("/users/1", None).await.unwrap()),
        ("head", client.head("/users/1", None).await.unwrap()),
        ("options", client.options("/users/1", None).await.unwrap()),
    ] {
        assert_eq!(response.data["method"], method);
    }
}

#[tokio::test]
async fn test_base_url_combines_relative_urls_only() {
    let adapter = StubAdapter::new(|config| Ok((200, json!(config.url))));
    let client = plain_client_with(adapter)
        .create(RequestConfig::new().base_url("https://api.example.com"));

    let response = client.get("/users", None).await.unwrap();
    assert_eq!(response.data, json!("https://api.example.com/users"));

    let response = client.get("https://other.example.com/users", None).await.unwrap();
    assert_eq!(response.data, json!("https://other.example.com/users"));
}

#[tokio::test]
async fn test_headers_are_flattened_before_transport() {
    let adapter = StubAdapter::new(|config| Ok((200, Value::Object(config.headers.direct.clone()))));
    let client = plain_client_with(adapter).create(
        RequestConfig::new()
            .header("Authorization", "z"),
    );

    let mut config = RequestConfig::new();
    config.headers.common.insert("Accept".to_string(), json!("x"));
    config
        .headers
        .for_method_mut(Method::Post)
        .insert("Content-Type".to_string(), json!("y"));

    let response = client.post("/users", None, Some(config)).await.unwrap();
    assert_eq!(
        response.data,
        json!({"Accept": "x", "Content-Type": "y", "Authorization": "z"})
    );
}

#[tokio::test]
async fn test_create_merges_defaults_and_isolates_interceptors() {
    let adapter = StubAdapter::new(|config| {
        Ok((200, json!({"url": config.url, "timeout": config.timeout.map(|t| t.as_secs())})))
    });
    let parent = plain_client_with(adapter);

    let called = Arc::new(AtomicUsize::new(0));
    {
        let called = Arc::clone(&called);
        parent.interceptors().request.add(InterceptorPair::new().on_fulfilled(
            move |config: RequestConfig| {
                let called = Arc::clone(&called);
                async move {
                    called.fetch_add(1, Ordering::SeqCst);
                    Ok(config)
                }
            },
        ));
    }

    let child = parent.create(
        RequestConfig::new()
            .base_url("https://api.example.com")
            .timeout(std::time::Duration::from_secs(9)),
    );

    let response = child.get("/users", None).await.unwrap();
    assert_eq!(
        response.data,
        json!({"url": "https://api.example.com/users", "timeout": 9})
    );
    // Fresh registries: the parent's interceptor did not run.
    assert_eq!(called.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_per_call_adapter_override_wins() {
    let default_adapter = StubAdapter::with_status(200, json!("default"));
    let override_adapter = StubAdapter::with_status(200, json!("override"));
    let client = plain_client_with(Arc::clone(&default_adapter));

    let response = client
        .request(
            RequestConfig::new()
                .url("/x")
                .adapter(Arc::clone(&override_adapter) as Arc<dyn Adapter>),
        )
        .await
        .unwrap();
    assert_eq!(response.data, json!("override"));
    assert_eq!(default_adapter.calls(), 0);
    assert_eq!(override_adapter.calls(), 1);
}

#[tokio::test]
async fn test_all_joins_requests() {
    let adapter = StubAdapter::new(|config| Ok((200, json!(config.url))));
    let client = plain_client_with(adapter);

    let responses = all([client.get("/a", None), client.get("/b", None)])
        .await
        .unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].data, json!("/a"));
    assert_eq!(responses[1].data, json!("/b"));
}
