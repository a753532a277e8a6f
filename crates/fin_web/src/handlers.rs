use axum::{
    body::Bytes,
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use fin_core::{Document, Error, RawResponse};
use fin_news::NewsParams;
use serde_json::json;
use tracing::{error, warn};
use crate::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// Relays the analyze body to the backend unchanged.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    relay(state.gateway.forward_analyze(body, content_type).await)
}

/// Takes the `file` field, rejects formats nobody can extract, and forwards
/// the rest to the backend.
pub async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let document = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let mime = field.content_type().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) => break Document::new(filename, mime, bytes),
                    Err(e) => return bad_request(format!("Failed to read upload: {}", e)),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => return bad_request("No file provided".to_string()),
            Err(e) => return bad_request(format!("Invalid multipart body: {}", e)),
        }
    };

    if let Err(e) = state.registry.classify(&document) {
        warn!("Rejected upload {}: {}", document.filename, e);
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    relay(state.gateway.forward_upload(&document).await)
}

pub async fn news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsParams>,
) -> Response {
    match state.news.get_articles(&params.into()).await {
        Ok(articles) => Json(articles).into_response(),
        Err(Error::Config(message)) => {
            error!("News unavailable: {}", message);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message }))).into_response()
        }
        Err(Error::Upstream { status, detail }) => {
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                code,
                Json(json!({ "error": format!("Marketaux error ({})", status), "detail": detail })),
            )
                .into_response()
        }
        Err(e) => {
            error!("News request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Unexpected server error", "detail": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn relay(raw: RawResponse) -> Response {
    let status = StatusCode::from_u16(raw.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = raw
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    let mut response = (status, raw.body).into_response();
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    response
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
