//! Proxy request handlers
//!
//! Both handlers are strict pass-throughs: upstream status and body are
//! forwarded verbatim, and the audio handler additionally forwards
//! `Content-Type` and `Content-Length` while streaming the body chunk by
//! chunk. Upstream failures map to 502, local failures to 500.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Json, Response};
use serde::Serialize;
use tracing::{debug, error};

use crate::server::RelayContext;

/// Content type assumed when the catalog omits one on an audio response
const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

fn upstream_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// GET /api/random - forward the catalog's random-song endpoint
///
/// Status and body pass through verbatim so the front end sees exactly
/// what the catalog answered.
pub async fn proxy_random(
    State(ctx): State<RelayContext>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let url = ctx.catalog.random_url();
    debug!(url = %url, "Proxying random-song request");

    let upstream = ctx.http_client.get(&url).send().await.map_err(|e| {
        error!("Error fetching from catalog: {}", e);
        upstream_error("Failed to fetch from API")
    })?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);

    let body = upstream.bytes().await.map_err(|e| {
        error!("Error reading catalog response: {}", e);
        upstream_error("Failed to fetch from API")
    })?;

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .map_err(|e| {
            error!("Failed to build response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal error".to_string(),
                }),
            )
        })
}

/// GET /api/audio/<path> - stream a song's audio bytes from the catalog
///
/// The captured path is the song's opaque catalog identifier; the body is
/// streamed through without buffering.
pub async fn proxy_audio(
    State(ctx): State<RelayContext>,
    Path(song_path): Path<String>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let url = ctx.catalog.audio_url(&song_path);
    debug!(song_path = %song_path, "Proxying audio request");

    let upstream = ctx.http_client.get(&url).send().await.map_err(|e| {
        error!("Error fetching audio: {}", e);
        upstream_error("Failed to fetch audio")
    })?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);

    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE)
        .to_string();

    let content_length = upstream
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(length) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| {
            error!("Failed to build audio response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal error".to_string(),
                }),
            )
        })
}
