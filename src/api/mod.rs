//! HTTP surface: thin axum handlers over [`DirectoryService`].

pub mod ack;
pub mod routes;
pub mod tenant;

pub use ack::{Ack, AckCode, ApiError};
pub use tenant::{Tenant, TENANT_HEADER};

use crate::services::directory::DirectoryService;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub fn router(service: Arc<DirectoryService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/ping", get(routes::ping))
        .route("/api/list", post(routes::list))
        .route("/api/geturl", post(routes::get_url))
        .route("/api/get", post(routes::get_object))
        .route("/api/put", post(routes::put_object))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors())
        .with_state(service)
}

/// Browser front ends are served from other origins.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static(TENANT_HEADER),
        ])
}
