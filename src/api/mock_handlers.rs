use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

use crate::api::handlers::{error_response, AppState};
use crate::error::ServiceError;
use crate::model::Endpoint;
use crate::store::traits::Store;

/// Serve the stored response of the endpoint matching `/mock/{code}/{path}` and the request method
pub async fn serve_mock<S: Store>(
    State(state): State<AppState<S>>,
    Path(params): Path<HashMap<String, String>>,
    method: Method,
) -> Response {
    let code = params.get("code").cloned().unwrap_or_default();
    let path = format!("/{}", params.get("path").map(String::as_str).unwrap_or_default());

    match find_mock(&*state.store, &code, method.as_str(), &path).await {
        Ok(endpoint) => mock_response(&endpoint),
        Err(e) => error_response(e).into_response(),
    }
}

async fn find_mock<S: Store>(
    store: &S,
    code: &str,
    method: &str,
    path: &str,
) -> Result<Endpoint, ServiceError> {
    let project = store
        .get_project_by_code(code)
        .await?
        .ok_or_else(|| ServiceError::not_found("project"))?;

    store
        .find_endpoint(&project.id, method, path)
        .await?
        .ok_or_else(|| ServiceError::not_found("endpoint"))
}

fn mock_response(endpoint: &Endpoint) -> Response {
    let status = u16::try_from(endpoint.response_status)
        .ok()
        .and_then(|status| StatusCode::from_u16(status).ok())
        .unwrap_or(StatusCode::OK);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in stored_headers(&endpoint.response_headers) {
        headers.insert(name, value);
    }

    (status, headers, endpoint.response_body.clone()).into_response()
}

/// Header pairs from the stored JSON map; a malformed map or invalid entries are ignored
fn stored_headers(raw: &str) -> Vec<(HeaderName, HeaderValue)> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let map: HashMap<String, String> = match serde_json::from_str(raw) {
        Ok(map) => map,
        Err(e) => {
            log::debug!("Ignoring stored response headers that are not a string map: {}", e);
            return Vec::new();
        }
    };

    map.into_iter()
        .filter_map(|(name, value)| {
            let name = HeaderName::try_from(name.as_str()).ok()?;
            let value = HeaderValue::try_from(value.as_str()).ok()?;
            Some((name, value))
        })
        .collect()
}
