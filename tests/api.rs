//! HTTP surface tests driven through the router with tower's oneshot.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use cafe_site::{
    api,
    app_state::AppState,
    config::{CacheConfig, Config, ServerConfig, StoreConfig},
};

fn test_config(dir: &TempDir) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        store: StoreConfig {
            data_dir: dir.path().join("data").to_str().unwrap().to_string(),
            backup_dir: dir.path().join("backups").to_str().unwrap().to_string(),
        },
        cache: CacheConfig {
            ttl_secs: 30,
            offline_ttl_secs: 86400,
            refresh_interval_secs: 60,
        },
    }
}

async fn test_app(dir: &TempDir) -> Router {
    let state = AppState::new(test_config(dir)).await.unwrap();
    api::app(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn seeded_menu() -> Value {
    json!({
        "categories": ["Coffee"],
        "items": [{
            "id": 1,
            "name": "Latte",
            "category": "Coffee",
            "price": 4.5,
            "description": "x",
            "image": "a.jpg"
        }]
    })
}

#[tokio::test]
async fn health_reports_success() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["status"], json!("healthy"));
}

#[tokio::test]
async fn post_then_get_round_trips_document() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let doc = seeded_menu();

    let (status, body) = send(&app, json_request("POST", "/api/data/menu.json", &doc)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, body) = send(&app, get("/api/data/menu.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], doc);
}

#[tokio::test]
async fn invalid_filenames_are_rejected_by_every_data_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    for uri in [
        "/api/data/menu.txt",
        "/api/data/menu.json.bak",
        "/api/data/m%20enu.json",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "GET {}", uri);
        assert_eq!(body["success"], json!(false));

        let (status, _) = send(&app, json_request("POST", uri, &json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "POST {}", uri);

        let item_uri = format!("{}/1", uri);
        let (status, _) = send(&app, json_request("PUT", &item_uri, &json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "PUT {}", item_uri);

        let (status, _) = send(
            &app,
            Request::builder()
                .method("DELETE")
                .uri(&*item_uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "DELETE {}", item_uri);
    }
}

#[tokio::test]
async fn unknown_document_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let (status, body) = send(&app, get("/api/data/mystery.json")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn patch_changes_only_named_fields() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let mut doc = seeded_menu();
    doc["items"].as_array_mut().unwrap().extend([
        json!({ "id": 2, "name": "Mocha", "category": "Coffee", "price": 5.0,
                "description": "y", "image": "b.jpg" }),
        json!({ "id": 3, "name": "Flat White", "category": "Coffee", "price": 4.0,
                "description": "z", "image": "c.jpg" }),
    ]);
    send(&app, json_request("POST", "/api/data/menu.json", &doc)).await;

    let (status, body) = send(
        &app,
        json_request("PUT", "/api/data/menu.json/3", &json!({ "price": 9.99 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], json!(9.99));
    assert_eq!(body["data"]["name"], json!("Flat White"));

    let (_, body) = send(&app, get("/api/data/menu.json")).await;
    assert_eq!(body["data"]["items"][2]["price"], json!(9.99));
    assert_eq!(body["data"]["items"][2]["description"], json!("z"));
    assert_eq!(body["data"]["items"][0], doc["items"][0]);
    assert_eq!(body["data"]["items"][1], doc["items"][1]);
}

#[tokio::test]
async fn delete_missing_item_is_404_and_leaves_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let doc = seeded_menu();
    send(&app, json_request("POST", "/api/data/menu.json", &doc)).await;

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/api/data/menu.json/42")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, get("/api/data/menu.json")).await;
    assert_eq!(body["data"], doc);
}

#[tokio::test]
async fn delete_preserves_order_of_remaining_items() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let mut doc = seeded_menu();
    doc["items"].as_array_mut().unwrap().extend([
        json!({ "id": 2, "name": "Mocha", "category": "Coffee", "price": 5.0 }),
        json!({ "id": 3, "name": "Flat White", "category": "Coffee", "price": 4.0 }),
    ]);
    send(&app, json_request("POST", "/api/data/menu.json", &doc)).await;

    let (status, body) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/api/data/menu.json/2")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Mocha"));

    let (_, body) = send(&app, get("/api/data/menu.json")).await;
    let ids: Vec<u64> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn invalid_menu_document_is_rejected_and_file_untouched() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let doc = seeded_menu();
    send(&app, json_request("POST", "/api/data/menu.json", &doc)).await;

    for invalid in [
        json!({ "categories": ["Coffee"] }),
        json!({ "items": [] }),
        json!({ "categories": ["Coffee"],
                "items": [{ "id": 1, "name": "Latte", "category": "Coffee", "price": -1 }] }),
    ] {
        let (status, body) =
            send(&app, json_request("POST", "/api/data/menu.json", &invalid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().len() > 0);
    }

    let (_, body) = send(&app, get("/api/data/menu.json")).await;
    assert_eq!(body["data"], doc);
}

#[tokio::test]
async fn missing_body_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/data/menu.json")
        .header("content-type", "application/json")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn full_document_replace_updates_price() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    send(&app, json_request("POST", "/api/data/menu.json", &seeded_menu())).await;

    let mut updated = seeded_menu();
    updated["items"][0]["price"] = json!(5.0);
    let (status, _) = send(&app, json_request("POST", "/api/data/menu.json", &updated)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/api/data/menu.json")).await;
    assert_eq!(body["data"]["items"][0]["price"], json!(5.0));
    assert_eq!(body["data"]["items"][0]["id"], json!(1));
}

#[tokio::test]
async fn combined_endpoint_surfaces_missing_file_as_null() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    // Startup seeded all four; drop events to simulate the missing file.
    std::fs::remove_file(dir.path().join("data").join("events.json")).unwrap();

    let (status, body) = send(&app, get("/api/data")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["events"], Value::Null);
    assert!(body["data"]["menu"].is_object());
    assert!(body["data"]["specials"].is_object());
    assert!(body["data"]["contact"].is_object());
}

#[tokio::test]
async fn unmatched_route_is_404_with_envelope() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let (status, body) = send(&app, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn backup_snapshots_the_data_directory() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/backup")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["files"], json!(4));

    let backup_dir = dir
        .path()
        .join("backups")
        .join(body["data"]["directory"].as_str().unwrap());
    assert!(backup_dir.join("menu.json").exists());
    assert!(backup_dir.join("contact.json").exists());
}
