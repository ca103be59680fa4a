use api_playground::history::MemoryHistoryStore;
use api_playground::{router, AppState, HistoryStore, HttpProxyService, ProxyExecutor};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app() -> Router {
    let store: Arc<dyn HistoryStore> = Arc::new(MemoryHistoryStore::new());
    let executor = ProxyExecutor::new(Duration::from_secs(10)).unwrap();
    let proxy = HttpProxyService::arc(executor, store.clone());
    router(AppState::new(proxy, store, "x-user-id"))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(uri: &str, owner: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(owner) = owner {
        builder = builder.header("x-user-id", owner);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, owner: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user-id", owner)
        .body(Body::empty())
        .unwrap()
}

async fn mock_target() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"name": "Ada", "roles": ["admin", "dev"]},
            "version": 1
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("access-control-allow-origin", "*")
                .set_body_json(json!({
                    "user": {"name": "Ada", "roles": ["dev", "admin"]},
                    "version": 2,
                    "beta": true
                })),
        )
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_proxy_requires_owner() {
    let app = app();
    let (status, body) = send(
        &app,
        post("/api/proxy", None, json!({"method": "GET", "url": "https://x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_proxy_rejects_invalid_config() {
    let app = app();
    let (status, body) = send(
        &app,
        post(
            "/api/proxy",
            Some("alice"),
            json!({"method": "FETCH", "url": "not-a-url"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["method", "url"]);

    let (_, history) = send(&app, get("/api/history", "alice")).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_malformed_json_body_uses_error_envelope() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/proxy")
        .header("content-type", "application/json")
        .header("x-user-id", "alice")
        .body(Body::from("{method: GET"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["field"], "request");

    let (status, body) = send(
        &app,
        post("/api/compare", Some("alice"), json!({"previousId": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_proxy_then_history_round_trip() {
    let target = mock_target().await;
    let app = app();

    let url = format!("{}/v1", target.uri());
    let (status, envelope) = send(
        &app,
        post("/api/proxy", Some("alice"), json!({"method": "GET", "url": url})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["status"], 200);
    assert_eq!(envelope["statusText"], "OK");
    assert_eq!(envelope["data"]["user"]["name"], "Ada");
    assert!(envelope["responseTimeMs"].is_u64());
    assert!(envelope["size"].as_u64().unwrap() > 0);
    let id = envelope["id"].as_str().unwrap().to_string();

    let (status, history) = send(&app, get("/api/history", "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["id"], id.as_str());
    assert_eq!(history[0]["ownerId"], "alice");

    let (status, record) = send(&app, get(&format!("/api/history/{}", id), "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["url"], url.as_str());
    assert_eq!(record["responseBody"]["version"], 1);

    let (status, _) = send(&app, get(&format!("/api/history/{}", id), "mallory")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, other) = send(&app, get("/api/history", "mallory")).await;
    assert_eq!(other, json!([]));
}

#[tokio::test]
async fn test_unknown_history_id_is_not_found() {
    let app = app();
    let (status, body) = send(&app, get("/api/history/does-not-exist", "alice")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_compare_and_analyze() {
    let target = mock_target().await;
    let app = app();

    let mut ids = Vec::new();
    for version in ["v1", "v2"] {
        let (_, envelope) = send(
            &app,
            post(
                "/api/proxy",
                Some("alice"),
                json!({
                    "method": "GET",
                    "url": format!("{}/{}", target.uri(), version),
                    "headers": {"User-Agent": "playground-test"}
                }),
            ),
        )
        .await;
        ids.push(envelope["id"].as_str().unwrap().to_string());
    }

    let (status, comparison) = send(
        &app,
        post(
            "/api/compare",
            Some("alice"),
            json!({"previousId": ids[0], "currentId": ids[1]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        comparison["items"],
        json!([
            {"path": "beta", "kind": "added", "newValue": true},
            {"path": "user.roles[0]", "kind": "changed", "oldValue": "admin", "newValue": "dev"},
            {"path": "user.roles[1]", "kind": "changed", "oldValue": "dev", "newValue": "admin"},
            {"path": "version", "kind": "changed", "oldValue": 1, "newValue": 2}
        ])
    );
    assert_eq!(
        comparison["summary"],
        json!({"added": 1, "removed": 0, "changed": 3, "unchanged": 0})
    );

    let (status, same) = send(
        &app,
        post(
            "/api/compare",
            Some("alice"),
            json!({"previousId": ids[0], "currentId": ids[0]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same["items"].as_array().unwrap().len(), 1);
    assert_eq!(same["items"][0]["kind"], "unchanged");

    let (status, analysis) = send(
        &app,
        get(&format!("/api/history/{}/analysis", ids[1]), "alice"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // http, no Authorization, User-Agent present, CORS wildcard
    assert_eq!(analysis["securityScore"], 35);
    assert_eq!(analysis["securityLevel"], "needs-attention");
    assert_eq!(analysis["statusClass"], "success");
    assert_eq!(analysis["structure"]["maxDepth"], 3);
    assert_eq!(analysis["structure"]["complexity"], "nested");
    assert_eq!(analysis["suggestions"][0], "Use HTTPS for secure communication");

    let (status, _) = send(
        &app,
        post(
            "/api/compare",
            Some("mallory"),
            json!({"previousId": ids[0], "currentId": ids[1]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
