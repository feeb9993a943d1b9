use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use petdeck_catalog::{CatalogError, CatalogResult};
use petdeck_store::StoreError;
use petdeck_types::PetTypeId;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Run blocking filesystem work off the async runtime.
async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> CatalogResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(ServerError::from)
}

fn parse_level(raw: &str) -> ServerResult<i64> {
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("level must be an integer, got {raw:?}")))
}

/// Unwrap a buffered body, reporting an over-limit body as `PayloadTooLarge`.
fn read_body(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Bytes> {
    match body {
        Ok(bytes) => Ok(bytes),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let size = headers
                .get(header::CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok())
                .unwrap_or_else(|| state.body_limit());
            Err(CatalogError::from(StoreError::PayloadTooLarge {
                size,
                max: state.service.limits().max_upload_bytes,
            })
            .into())
        }
        Err(rejection) => Err(ServerError::BadRequest(rejection.body_text())),
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /types`: the caller's catalog.
pub async fn list_types(State(state): State<AppState>, headers: HeaderMap) -> ServerResult<Response> {
    let bucket = state.bucket(&headers).await?;
    let service = state.service.clone();
    let catalog = blocking(move || service.list_types(&bucket)).await?;
    Ok(Json(&*catalog).into_response())
}

/// `POST /upload/{type}/{level}` with the raw image as body.
pub async fn upload_image(
    State(state): State<AppState>,
    Path((pet_type, level)): Path<(String, String)>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Json<serde_json::Value>> {
    let bucket = state.bucket(&headers).await?;
    PetTypeId::parse(&pet_type).map_err(CatalogError::from)?;
    let level = parse_level(&level)?;
    let body = read_body(&state, &headers, body)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let service = state.service.clone();
    let url = blocking(move || {
        service.upload_image(&bucket, &pet_type, level, &content_type, &body)
    })
    .await?;
    Ok(Json(json!({ "success": true, "url": url })))
}

/// `DELETE /delete/{type}/{level}`.
pub async fn delete_image(
    State(state): State<AppState>,
    Path((pet_type, level)): Path<(String, String)>,
    headers: HeaderMap,
) -> ServerResult<Json<serde_json::Value>> {
    let bucket = state.bucket(&headers).await?;
    let level = parse_level(&level)?;
    let service = state.service.clone();
    let deleted = blocking(move || service.delete_image(&bucket, &pet_type, level)).await?;
    Ok(Json(json!({ "success": true, "deleted": deleted })))
}

#[derive(Debug, Deserialize)]
pub struct CreateTypeRequest {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "stageNames")]
    pub stage_names: Option<Vec<String>>,
}

/// `POST /create-type` with a JSON [`CreateTypeRequest`].
///
/// The body is parsed after authentication so anonymous callers always get 401.
pub async fn create_type(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Json<serde_json::Value>> {
    let bucket = state.bucket(&headers).await?;
    let body = read_body(&state, &headers, body)?;
    let request: CreateTypeRequest =
        serde_json::from_slice(&body).map_err(|e| ServerError::BadRequest(e.to_string()))?;
    let service = state.service.clone();
    let id = blocking(move || {
        service.create_type(
            &bucket,
            &request.id,
            request.name.as_deref(),
            request.stage_names.as_deref(),
        )
    })
    .await?;
    Ok(Json(json!({ "success": true, "id": id })))
}

/// `DELETE /delete-type/{type}`.
pub async fn delete_type(
    State(state): State<AppState>,
    Path(pet_type): Path<String>,
    headers: HeaderMap,
) -> ServerResult<Json<serde_json::Value>> {
    let bucket = state.bucket(&headers).await?;
    let service = state.service.clone();
    blocking(move || service.delete_type(&bucket, &pet_type)).await?;
    Ok(Json(json!({ "success": true })))
}
