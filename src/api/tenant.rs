use super::ack::ApiError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the user name authenticated by the fronting proxy.
pub const TENANT_HEADER: &str = "x-authenticated-user";

/// Root of the calling user. Each user only sees keys under their own root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant(pub String);

impl Tenant {
    pub fn root(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();
        if user.is_empty() {
            return Err(ApiError::unauthorized("missing authenticated user"));
        }
        if user.contains('/') {
            return Err(ApiError::unauthorized("invalid user name"));
        }
        Ok(Tenant(user.to_string()))
    }
}
