//! HTTP surface tests
//!
//! Drive the router directly with tower's `oneshot` and point outbound
//! calls at a wiremock server.
//!
//! Run with: cargo test --test http_api

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adpanel_api::{create_router, AppState};
use adpanel_core::config::VmixHttpConfig;
use adpanel_core::service::{LibraryService, SettingsService};
use adpanel_core::store::{JsonStore, SharedState};
use adpanel_core::vmix::{DispatchOptions, Dispatcher, VmixClient};

const STATE_XML: &str = r#"<vmix>
  <inputs>
    <input key="def456" number="2" type="VideoList" title="Ads" state="Running" selectedIndex="1">
      <list>
        <item selected="true">C:\Ads\Commercial-1.mp4</item>
        <item>C:\Ads\Promo.mp4</item>
      </list>
    </input>
  </inputs>
  <active>2</active>
</vmix>"#;

fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let shared = SharedState::open(JsonStore::new(dir.path().join("state.json"))).unwrap();
    let library = LibraryService::new(shared.clone());
    let settings = SettingsService::new(shared);
    let client = VmixClient::new(&VmixHttpConfig::default()).unwrap();
    let dispatcher = Dispatcher::new(
        client.clone(),
        DispatchOptions {
            pacing: std::time::Duration::from_millis(0),
            removal_pacing: std::time::Duration::from_millis(0),
            max_failures: 3,
        },
    );
    (
        AppState {
            library,
            settings,
            client,
            dispatcher,
            status_rx: None,
        },
        dir,
    )
}

fn test_router() -> (Router, AppState, tempfile::TempDir) {
    let (state, dir) = test_state();
    (create_router(state.clone()), state, dir)
}

async fn request(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_put(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn save_settings(router: &Router, server: &MockServer) {
    let address = server.address();
    let (status, _) = request(
        router,
        json_put(
            "/api/settings",
            json!({
                "vmixIp": address.ip().to_string(),
                "vmixPort": address.port().to_string(),
                "vmixInput": "Ads",
                "folderPath": "C:\\Ads",
                "useProxy": true,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_answers_ok() {
    let (router, _state, _dir) = test_router();
    let (status, body) = request(&router, get_req("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn add_list_and_duplicate_conflict() {
    let (router, _state, _dir) = test_router();

    let (status, body) = request(
        &router,
        json_post("/api/clips", json!({"filename": "Promo", "priority": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["filename"], "Promo.mp4");
    assert_eq!(body["priority"], 3);

    // Case-insensitive duplicate is a conflict, not a crash.
    let (status, _) = request(
        &router,
        json_post("/api/clips", json!({"filename": "PROMO.MP4"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = request(&router, get_req("/api/clips")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn bulk_add_reports_skip_counts() {
    let (router, _state, _dir) = test_router();

    let (status, body) = request(
        &router,
        json_post(
            "/api/clips/bulk",
            json!({"text": "Ad-1\nAd-2\nAD-1.mp4"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], 2);
    assert_eq!(body["skipped"], 1);
}

#[tokio::test]
async fn import_uses_requested_priority() {
    let (router, state, _dir) = test_router();

    let (status, body) = request(
        &router,
        json_post(
            "/api/clips/import",
            json!({"filenames": ["Spot-1.mp4", "Spot-2.mp4"], "priority": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], 2);

    let clip = state.library.find("Spot-1.mp4").unwrap();
    assert_eq!(u8::from(clip.priority), 1);
}

#[tokio::test]
async fn preview_maps_duration_to_slots() {
    let (router, _state, _dir) = test_router();

    for filename in ["Ad-1", "Ad-2", "Promo"] {
        let (status, _) = request(
            &router,
            json_post("/api/clips", json!({"filename": filename})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = request(
        &router,
        json_post("/api/playlist/preview", json!({"duration_seconds": 60})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["duration_seconds"], 60);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][0]["preview_id"], 1);

    // Neither knob supplied is a caller error.
    let (status, _) = request(&router, json_post("/api/playlist/preview", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_requires_configuration_before_any_network_call() {
    let (router, _state, _dir) = test_router();

    let (status, body) = request(
        &router,
        json_post("/api/clips", json!({"filename": "Promo"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &router,
        json_post("/api/playlist/send", json!({"items": [id]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("IP address is not configured"));
}

#[tokio::test]
async fn send_dispatches_each_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("Function", "ListRemoveAll"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("Function", "ListAdd"))
        .and(query_param("Input", "Ads"))
        .and(query_param("Value", "C:\\Ads\\Promo.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Function completed"))
        .expect(1)
        .mount(&server)
        .await;

    let (router, _state, _dir) = test_router();
    save_settings(&router, &server).await;

    let (status, _) = request(
        &router,
        json_post("/api/clips", json!({"filename": "Promo"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
        &router,
        json_post(
            "/api/playlist/send",
            json!({"items": ["Promo.mp4"], "replace": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], 1);
    assert_eq!(body["failed"], 0);
    assert_eq!(body["aborted"], false);
}

#[tokio::test]
async fn status_reports_the_parsed_playlist_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STATE_XML))
        .mount(&server)
        .await;

    let (router, _state, _dir) = test_router();
    save_settings(&router, &server).await;

    let (status, body) = request(&router, get_req("/api/playlist/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["input_title"], "Ads");
    assert_eq!(body["state"], "Playing");
    assert_eq!(body["in_program"], true);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Commercial-1");
    assert_eq!(items[0]["selected"], true);
    assert_eq!(items[1]["selected"], false);
}

#[tokio::test]
async fn relay_validates_parameters() {
    let (router, _state, _dir) = test_router();

    let (status, body) = request(&router, get_req("/api/relay")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("ip"));

    let (status, body) = request(&router, get_req("/api/relay?ip=10.0.0.5")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("function"));

    let (status, body) = request(
        &router,
        get_req("/api/relay?ip=bad%20host&function=ListAdd"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid IP"));
}

#[tokio::test]
async fn relay_wraps_the_upstream_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("Function", "ListAdd"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Function completed"))
        .mount(&server)
        .await;

    let (router, _state, _dir) = test_router();
    let address = server.address();
    let uri = format!(
        "/api/relay?ip={}&port={}&function=ListAdd&input=Ads",
        address.ip(),
        address.port()
    );

    let (status, body) = request(&router, get_req(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["response"], "Function completed");
    assert_eq!(body["httpCode"], 200);
    assert!(body["url"].as_str().unwrap().contains("Function=ListAdd"));
}

#[tokio::test]
async fn relay_reports_connection_failures() {
    let (router, _state, _dir) = test_router();

    // Nothing listens on this port; the envelope should say so.
    let (status, body) = request(
        &router,
        get_req("/api/relay?ip=127.0.0.1&port=9&getState=1"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Connection failed"));
    assert!(body["url"].as_str().unwrap().contains("127.0.0.1"));
}

#[tokio::test]
async fn relay_forwards_upstream_errors_in_the_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such function"))
        .mount(&server)
        .await;

    let (router, _state, _dir) = test_router();
    let address = server.address();
    let uri = format!(
        "/api/relay?ip={}&port={}&function=Bogus",
        address.ip(),
        address.port()
    );

    let (status, body) = request(&router, get_req(&uri)).await;
    // The relay itself succeeded; the upstream verdict rides along.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["httpCode"], 404);
}
