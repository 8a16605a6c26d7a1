//! Action log middleware.
//!
//! Records every authenticated request in `action_logs` before the handler
//! runs. The body is buffered, stripped of secrets for the log entry and put
//! back untouched for the handler. A failed write is logged and never fails
//! the request.

use axum::{
    body::{self, Body},
    extract::{OriginalUri, Request, State},
    http::header::CONTENT_TYPE,
    middleware::Next,
    response::Response,
};
use serde_json::{json, Value};

use super::CurrentUser;
use crate::api::AppState;
use crate::config::{ACTION_LOG_MAX_BODY_BYTES, REDACTED_BODY_FIELDS, TIMEZONE_HEADER};
use crate::domain::ActionLog;
use crate::errors::AppError;

pub async fn action_log_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();
    let bytes = body::to_bytes(body, ACTION_LOG_MAX_BODY_BYTES)
        .await
        .map_err(|_| AppError::bad_request("Request body is too large"))?;

    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let timezone = parts
        .headers
        .get(TIMEZONE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let entry = ActionLog::new(
        parts.extensions.get::<CurrentUser>().map(|u| u.id),
        format!("{} {}", parts.method, path),
        body_metadata(content_type, &bytes),
        timezone,
    );
    let action = entry.action_type.clone();
    if let Err(e) = state.action_log_service.record(entry).await {
        tracing::warn!(error = %e, action = %action, "Failed to record action log");
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// JSON text stored as the entry's metadata.
fn body_metadata(content_type: Option<&str>, body: &[u8]) -> String {
    if body.is_empty() {
        return "{}".to_string();
    }
    if !content_type.is_some_and(is_json) {
        return json!({ "note": "non-JSON content type" }).to_string();
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(mut value) => {
            redact(&mut value);
            value.to_string()
        }
        Err(_) => json!({ "note": "invalid JSON body" }).to_string(),
    }
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for field in REDACTED_BODY_FIELDS {
                map.remove(*field);
            }
            map.values_mut().for_each(redact);
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}
