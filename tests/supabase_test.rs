//! REST client wire format, checked against a local mock of the hosted API.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use inscriptions::config::Credentials;
use inscriptions::ranking;
use inscriptions::store::supabase::{error_message, SupabaseClient};
use inscriptions::store::{ObjectStore, RelationalStore, SelectQuery, StoreLayout, Stores};

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Bytes,
}

type Log = Arc<Mutex<Vec<Captured>>>;

async fn mock_upload(
    State(log): State<Log>,
    Path((bucket, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    log.lock().push(Captured {
        path: format!("{bucket}/{path}"),
        headers,
        query: HashMap::new(),
        body,
    });
    if path.contains("reject") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"statusCode": "409", "error": "Duplicate", "message": "The resource already exists"})),
        );
    }
    (StatusCode::OK, Json(json!({ "Key": format!("{bucket}/{path}") })))
}

async fn mock_insert(
    State(log): State<Log>,
    Path(table): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    log.lock().push(Captured { path: table.clone(), headers, query: HashMap::new(), body });
    if table == "broken" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"code": "42P01", "message": "relation \"public.broken\" does not exist"})),
        )
            .into_response();
    }
    StatusCode::CREATED.into_response()
}

async fn mock_select(
    State(log): State<Log>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    log.lock().push(Captured { path: table, headers, query, body: Bytes::new() });
    Json(json!([
        { "name": "Top", "club": "Leones TC", "rating": 2100, "category": "Open" },
        { "name": "Next", "club": null, "rating": 1800.5, "category": "Open" }
    ]))
}

async fn spawn_mock() -> (Log, SupabaseClient) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/storage/v1/object/{bucket}/{*path}", post(mock_upload))
        .route("/rest/v1/{table}", post(mock_insert).get(mock_select))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });

    let client = SupabaseClient::new(
        Credentials { url: format!("http://{addr}"), key: "test-key".into() },
        Duration::from_secs(5),
    )
    .expect("client");
    (log, client)
}

fn assert_auth(headers: &HeaderMap) {
    assert_eq!(headers["apikey"], "test-key");
    assert_eq!(headers["authorization"], "Bearer test-key");
}

#[test]
fn test_url_building() {
    let client = SupabaseClient::new(
        Credentials { url: "https://abc.supabase.co".into(), key: "k".into() },
        Duration::from_secs(5),
    )
    .expect("client");

    assert_eq!(
        client.public_object_url("photos", "1700000000_Ana_Li.png").expect("url").as_str(),
        "https://abc.supabase.co/storage/v1/object/public/photos/1700000000_Ana_Li.png"
    );
    assert_eq!(
        client.object_url("photos", "1_a.png").expect("url").as_str(),
        "https://abc.supabase.co/storage/v1/object/photos/1_a.png"
    );
    // Path separators in a player name stay inside one segment.
    assert_eq!(
        client.object_url("photos", "1_a/b.png").expect("url").as_str(),
        "https://abc.supabase.co/storage/v1/object/photos/1_a%2Fb.png"
    );
    let url = client
        .table_url("players", Some(&ranking::ranking_query()))
        .expect("url");
    assert_eq!(url.path(), "/rest/v1/players");
    let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(pairs["select"], "name,club,rating,category");
    assert_eq!(pairs["order"], "rating.desc");
}

#[test]
fn test_error_message_extraction() {
    let status = reqwest::StatusCode::BAD_REQUEST;
    assert_eq!(error_message(status, r#"{"message":"boom","code":"1"}"#), "boom");
    assert_eq!(error_message(status, r#"{"error":"bad"}"#), "bad");
    assert_eq!(error_message(status, "plain failure"), "plain failure");
    assert!(error_message(status, "").contains("400"));
}

#[tokio::test]
async fn test_upload_sends_bytes_and_headers() {
    let (log, client) = spawn_mock().await;

    client
        .upload("photos", "1700000000_Ana.png", Bytes::from_static(b"PNGDATA"), "image/png")
        .await
        .expect("upload");

    let captured = log.lock().clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].path, "photos/1700000000_Ana.png");
    assert_eq!(&captured[0].body[..], b"PNGDATA");
    assert_eq!(captured[0].headers["content-type"], "image/png");
    assert_eq!(captured[0].headers["x-upsert"], "false");
    assert_auth(&captured[0].headers);
}

#[tokio::test]
async fn test_upload_error_carries_store_message() {
    let (_log, client) = spawn_mock().await;
    let err = client
        .upload("photos", "reject.png", Bytes::from_static(b"x"), "image/png")
        .await
        .expect_err("upload must fail");
    assert_eq!(err.to_string(), "The resource already exists");
}

#[tokio::test]
async fn test_insert_posts_json_row() {
    let (log, client) = spawn_mock().await;
    let row = match json!({"player_name": "Ana", "club": "", "category": "Open", "photo_url": ""}) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };

    client.insert("inscriptions", row).await.expect("insert");

    let captured = log.lock().clone();
    assert_eq!(captured[0].path, "inscriptions");
    assert_eq!(captured[0].headers["prefer"], "return=minimal");
    assert_auth(&captured[0].headers);
    let sent: Value = serde_json::from_slice(&captured[0].body).expect("json body");
    assert_eq!(sent["player_name"], "Ana");
    assert_eq!(sent["photo_url"], "");
}

#[tokio::test]
async fn test_insert_error_carries_store_message() {
    let (_log, client) = spawn_mock().await;
    let err = client
        .insert("broken", serde_json::Map::new())
        .await
        .expect_err("insert must fail");
    assert_eq!(err.to_string(), "relation \"public.broken\" does not exist");
}

#[tokio::test]
async fn test_select_sends_projection_and_order() {
    let (log, client) = spawn_mock().await;
    let query = SelectQuery::columns(["name", "rating"]).order_desc("rating");

    let rows = client.select("players", &query).await.expect("select");

    assert_eq!(rows.len(), 2);
    let captured = log.lock().clone();
    assert_eq!(captured[0].query["select"], "name,rating");
    assert_eq!(captured[0].query["order"], "rating.desc");
    assert_auth(&captured[0].headers);
}

#[tokio::test]
async fn test_fetch_ranking_through_client() {
    let (_log, client) = spawn_mock().await;
    let client = Arc::new(client);
    let stores = Stores {
        objects: client.clone(),
        rows: client,
        layout: StoreLayout::default(),
    };

    let rows = ranking::fetch_ranking(&stores).await.expect("ranking");
    assert_eq!(rows[0]["rating"], json!(2100));
    assert!(rows[0]["rating"].is_u64(), "integer rating is kept as sent");
    assert!(rows[1]["club"].is_null());

    let players = ranking::fetch_players(&stores).await.expect("players");
    assert_eq!(players.len(), 2);
    assert_eq!(players[0].name.as_deref(), Some("Top"));
    assert_eq!(players[0].rating, Some(2100.0));
    assert_eq!(players[1].club, None);
}

#[tokio::test]
async fn test_unreachable_store_is_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = SupabaseClient::new(
        Credentials { url: format!("http://{addr}"), key: "k".into() },
        Duration::from_secs(2),
    )
    .expect("client");
    let err = client
        .insert("inscriptions", serde_json::Map::new())
        .await
        .expect_err("connection must fail");
    assert!(matches!(err, inscriptions::error::RegistrationError::Http { .. }));
}
