use super::ack::{Ack, ApiError};
use super::tenant::Tenant;
use crate::services::directory::DirectoryService;
use crate::services::tree::normalize_path;
use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub type AppState = Arc<DirectoryService>;

/// Body of the path based endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathRequest {
    #[serde(default)]
    pub path: String,
}

fn path_request(payload: Result<Json<PathRequest>, JsonRejection>) -> Result<PathRequest, ApiError> {
    payload
        .map(|Json(req)| req)
        .map_err(|rejection| ApiError::bad_args(format!("invalid json: {}", rejection.body_text())))
}

pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

pub async fn list(
    State(service): State<AppState>,
    tenant: Tenant,
    payload: Result<Json<PathRequest>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let req = path_request(payload)?;
    let entries = service.list(tenant.root(), &req.path);
    Ok(Ack::success(entries, &req))
}

pub async fn get_url(
    State(service): State<AppState>,
    tenant: Tenant,
    payload: Result<Json<PathRequest>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let req = path_request(payload)?;
    let url = service
        .signed_url(tenant.root(), &req.path)
        .await
        .map_err(|err| ApiError::from(err).with_req(&req))?;
    Ok(Ack::success(url.as_str(), &req))
}

/// Streams the object back as an attachment.
pub async fn get_object(
    State(service): State<AppState>,
    tenant: Tenant,
    payload: Result<Json<PathRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req = path_request(payload)?;
    let object = service
        .open(tenant.root(), &req.path)
        .await
        .map_err(|err| ApiError::from(err).with_req(&req))?;

    let disposition = format!("attachment; filename=\"{}\"", object.file_name().replace('"', ""));
    let headers = [
        (CONTENT_TYPE, object.content_type.clone()),
        (CONTENT_LENGTH, object.size.to_string()),
        (CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, Body::from_stream(object.body)).into_response())
}

/// Stores the multipart field `file` under its file name.
pub async fn put_object(
    State(service): State<AppState>,
    tenant: Tenant,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Ack>, ApiError> {
    let mut multipart = multipart
        .map_err(|rejection| ApiError::bad_args(format!("get data error {}", rejection.body_text())))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_args(format!("get data error {}", err.body_text())))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().replace('\\', "/");
        if file_name.is_empty() || file_name.ends_with('/') {
            return Err(ApiError::bad_args("file name must name a file"));
        }
        let data = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_args(format!("get data error {}", err.body_text())))?;
        let size = data.len();

        service.store(tenant.root(), &file_name, data).await?;
        tracing::info!(root = tenant.root(), path = %file_name, size, "stored upload");
        return Ok(Ack::success(
            json!({ "path": normalize_path(&file_name), "size": size }),
            Value::Null,
        ));
    }

    Err(ApiError::bad_args("missing multipart field 'file'"))
}
