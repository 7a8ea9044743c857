use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::Json,
};

use crate::api::handlers::ErrorResponse;
use crate::model::UserContext;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Axum extractor for UserContext from request headers
///
/// Requests without a non-empty `X-User-Id` header are rejected with 401.
/// Whether the id names a real user is checked later by the handlers.
#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_header_value(&parts.headers, USER_ID_HEADER)
            .map(UserContext::new)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new("missing X-User-Id header")),
                )
            })
    }
}

/// Extract header value as string
fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
