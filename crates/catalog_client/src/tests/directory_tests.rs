use super::*;
use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use shared::error::ErrorCode;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct DirectoryServerState {
    search_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

async fn handle_lookup(
    State(state): State<DirectoryServerState>,
    Path(file): Path<String>,
) -> Json<Value> {
    state.lookups.lock().await.push(file.clone());
    match file.as_str() {
        "3017620422003.json" => Json(json!({
            "status": 1,
            "product": {
                "code": "3017620422003",
                "product_name": "Hazelnut spread",
                "nutrition_grades": "e"
            }
        })),
        "0000000000000.json" => Json(json!({})),
        _ => Json(json!({ "status": 0, "status_verbose": "product not found" })),
    }
}

async fn handle_search(
    State(state): State<DirectoryServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let terms = params.get("search_terms").cloned();
    state.search_queries.lock().await.push(params);
    match terms.as_deref() {
        Some("chocolate") => Json(json!({
            "count": 3,
            "products": [
                { "code": "1", "product_name": "A" },
                { "code": "2", "product_name": "B" },
                { "code": "3", "product_name": "" }
            ]
        })),
        Some(_) => Json(json!({ "count": 0, "products": [] })),
        None => Json(json!({
            "products": [
                { "code": "10", "product_name": "Default one" },
                { "code": "11", "product_name": "Default two" }
            ]
        })),
    }
}

async fn handle_categories() -> Json<Value> {
    let tags: Vec<Value> = (0..25)
        .map(|i| json!({ "id": format!("en:category-{i}"), "name": format!("Category {i}"), "products": 100 - i }))
        .collect();
    Json(json!({ "count": 25, "tags": tags }))
}

async fn handle_broken() -> impl IntoResponse {
    (StatusCode::OK, "<html>not json</html>")
}

async fn handle_unavailable() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}

async fn spawn_directory_server() -> Result<(String, DirectoryServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = DirectoryServerState::default();
    let app = Router::new()
        .route("/api/v0/product/:file", get(handle_lookup))
        .route("/cgi/search.pl", get(handle_search))
        .route("/categories.json", get(handle_categories))
        .route("/broken/categories.json", get(handle_broken))
        .route("/down/categories.json", get(handle_unavailable))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn directory_for(base_url: &str) -> HttpProductDirectory {
    HttpProductDirectory::new(&Settings {
        api_base_url: base_url.to_string(),
        ..Settings::default()
    })
    .expect("directory")
}

#[tokio::test]
async fn search_sends_terms_json_flag_and_page_size() {
    let (base_url, state) = spawn_directory_server().await.expect("spawn server");
    let directory = directory_for(&base_url);

    let products = directory.search(Some("chocolate")).await.expect("search");

    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);

    let queries = state.search_queries.lock().await.clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("search_terms").map(String::as_str), Some("chocolate"));
    assert_eq!(queries[0].get("json").map(String::as_str), Some("true"));
    assert_eq!(queries[0].get("page_size").map(String::as_str), Some("100"));
}

#[tokio::test]
async fn default_listing_omits_search_terms() {
    let (base_url, state) = spawn_directory_server().await.expect("spawn server");
    let directory = directory_for(&base_url);

    let products = directory.search(None).await.expect("listing");
    assert_eq!(products.len(), 2);

    let queries = state.search_queries.lock().await.clone();
    assert!(!queries[0].contains_key("search_terms"));
}

#[tokio::test]
async fn barcode_lookup_returns_single_product() {
    let (base_url, state) = spawn_directory_server().await.expect("spawn server");
    let directory = directory_for(&base_url);

    let products = directory
        .lookup_barcode(&Barcode::new("3017620422003"))
        .await
        .expect("lookup");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Hazelnut spread");
    assert_eq!(products[0].key.code(), Some("3017620422003"));
    assert_eq!(
        state.lookups.lock().await.clone(),
        vec!["3017620422003.json".to_string()]
    );
}

#[tokio::test]
async fn unknown_barcode_is_empty_not_error() {
    let (base_url, _state) = spawn_directory_server().await.expect("spawn server");
    let directory = directory_for(&base_url);

    let missing = directory
        .lookup_barcode(&Barcode::new("123"))
        .await
        .expect("status 0 is not an error");
    assert!(missing.is_empty());

    let bare = directory
        .lookup_barcode(&Barcode::new("0000000000000"))
        .await
        .expect("empty object is not an error");
    assert!(bare.is_empty());
}

#[tokio::test]
async fn barcode_path_segment_is_escaped() {
    let (base_url, state) = spawn_directory_server().await.expect("spawn server");
    let directory = directory_for(&base_url);

    let products = directory
        .lookup_barcode(&Barcode::new("12 34"))
        .await
        .expect("lookup");
    assert!(products.is_empty());
    assert_eq!(state.lookups.lock().await.clone(), vec!["12 34.json".to_string()]);
}

#[tokio::test]
async fn categories_are_limited_to_configured_count() {
    let (base_url, _state) = spawn_directory_server().await.expect("spawn server");
    let directory = directory_for(&base_url);

    let categories = directory.list_categories().await.expect("categories");
    assert_eq!(categories.len(), 20);
    assert_eq!(categories[0].id.as_str(), "en:category-0");
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let (base_url, _state) = spawn_directory_server().await.expect("spawn server");
    let directory = directory_for(&format!("{base_url}/broken"));

    let err = directory.list_categories().await.expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::Decode);
}

#[tokio::test]
async fn error_status_is_reported_with_status_code() {
    let (base_url, _state) = spawn_directory_server().await.expect("spawn server");
    let directory = directory_for(&format!("{base_url}/down/"));

    let err = directory.list_categories().await.expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::Status);
    assert!(err.to_string().contains("503"), "unexpected error: {err}");
}

#[tokio::test]
async fn unreachable_directory_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let directory = directory_for(&format!("http://{addr}"));
    let err = directory.search(Some("tea")).await.expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::Transport);
}
