//! HTTP surface of the café site.
//!
//! Every response uses the `{success, data|error}` envelope; error mapping
//! lives in [`crate::error::AppError`]. The data endpoints are generic over
//! the filename path parameter, with per-document behavior supplied by
//! [`crate::documents::DocumentKind`].

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Map, Value};
use tower_http::cors::CorsLayer;

use crate::{
    app_state::AppState,
    documents::DocumentKind,
    error::{AppError, AppResult},
};

/// Build the full application router, ready to serve.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router(state))
        .layer(CorsLayer::permissive())
        .fallback(fallback_handler)
}

fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/data", get(get_all_handler))
        .route("/data/{filename}", get(get_document_handler).post(replace_document_handler))
        .route("/data/{filename}/{id}", put(update_item_handler).delete(delete_item_handler))
        .route("/backup", post(backup_handler))
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// All four documents in one response. A missing file shows up as `null`
/// under its key instead of failing the whole call.
async fn get_all_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let reads = DocumentKind::ALL.map(|kind| {
        let store = state.store.clone();
        async move { (kind, store.get(kind.filename()).await) }
    });

    let mut data = Map::new();
    for (kind, result) in futures::future::join_all(reads).await {
        let value = match result {
            Ok(doc) => doc,
            Err(AppError::NotFound(_)) => Value::Null,
            Err(err) => return Err(err),
        };
        data.insert(kind.data_key().to_string(), value);
    }

    Ok(Json(json!({ "success": true, "data": data })))
}

async fn get_document_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Json<Value>> {
    let doc = state.store.get(&filename).await?;
    Ok(Json(json!({ "success": true, "data": doc })))
}

async fn replace_document_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(doc) = body.map_err(reject_body)?;
    state.store.put(&filename, &doc).await?;
    tracing::info!("replaced {}", filename);
    Ok(Json(json!({ "success": true, "data": doc })))
}

async fn update_item_handler(
    State(state): State<AppState>,
    Path((filename, id)): Path<(String, u64)>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(patch) = body.map_err(reject_body)?;
    let updated = state.store.update_item(&filename, id, &patch).await?;
    tracing::info!("updated item {} in {}", id, filename);
    Ok(Json(json!({ "success": true, "data": updated })))
}

async fn delete_item_handler(
    State(state): State<AppState>,
    Path((filename, id)): Path<(String, u64)>,
) -> AppResult<Json<Value>> {
    let removed = state.store.delete_item(&filename, id).await?;
    tracing::info!("deleted item {} from {}", id, filename);
    Ok(Json(json!({ "success": true, "data": removed })))
}

async fn backup_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let report = state.store.backup().await?;
    Ok(Json(json!({
        "success": true,
        "data": { "directory": report.directory, "files": report.files }
    })))
}

async fn fallback_handler() -> AppError {
    AppError::NotFound("no such route".to_string())
}

fn reject_body(rejection: JsonRejection) -> AppError {
    AppError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
}
