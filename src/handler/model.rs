use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use bytes::BytesMut;
use futures_util::StreamExt;
use validator::Validate;

use crate::calculate;
use crate::error::AppError;
use crate::handler::AppState;
use crate::model::{
    self, AnalysisError, MeshParser, stl::BufferedParser, stream::StreamAnalyzer,
};
use crate::models::{
    self,
    mdl::{AnalyzeQuery, AnalyzeRes},
};

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|length| length.to_str().ok())
        .and_then(|length| length.parse::<u64>().ok())
}

/// Analyze a binary STL model streamed in the request body.
///
/// The body is consumed incrementally and never held in memory as a whole,
/// so models up to the streaming size limit (400MB by default) are accepted.
/// ASCII STL files are rejected.
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "Model Calculations",
    params(AnalyzeQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Model analyzed successfully", body = AnalyzeRes),
        (status = 400, description = "Bad Request (malformed or truncated STL, validation error)", body = models::error::ResponseError),
        (status = 413, description = "Model exceeds the size limit", body = models::error::ResponseError),
        (status = 415, description = "Not a binary STL model", body = models::error::ResponseError),
        (status = 422, description = "Model has no triangles or no volume", body = models::error::ResponseError),
        (status = 500, description = "Internal Server Error", body = models::error::ResponseError),
    )
)]
pub async fn analyze_stream(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;
    model::Format::resolve(&query.file_name, content_type(&headers))?;

    let stream = std::pin::pin!(body.into_data_stream());
    let metrics = StreamAnalyzer::new(state.limits)
        .analyze(stream, content_length(&headers))
        .await?;
    metrics.check_printable()?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(AnalyzeRes::new(&metrics, query.unit)),
    ))
}

/// Analyze a small STL model by buffering the whole request body.
///
/// Bodies larger than the buffered size limit (25MB by default) are rejected,
/// use `/api/analyze` for larger models. ASCII STL files are recognised but
/// rejected.
#[utoipa::path(
    post,
    path = "/api/analyze/buffered",
    tag = "Model Calculations",
    params(AnalyzeQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Model analyzed successfully", body = AnalyzeRes),
        (status = 400, description = "Bad Request (malformed STL, validation error)", body = models::error::ResponseError),
        (status = 413, description = "Model exceeds the size limit", body = models::error::ResponseError),
        (status = 415, description = "Not a binary STL model", body = models::error::ResponseError),
        (status = 422, description = "Model has no triangles or no volume", body = models::error::ResponseError),
        (status = 500, description = "Internal Server Error", body = models::error::ResponseError),
    )
)]
pub async fn analyze_buffered(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;
    model::Format::resolve(&query.file_name, content_type(&headers))?;

    let max_size = state.limits.max_buffer_bytes;
    if content_length(&headers).is_some_and(|length| length > max_size) {
        return Err(AnalysisError::TooLarge { limit: max_size }.into());
    }

    let mut stream = std::pin::pin!(body.into_data_stream());
    let mut buffer = BytesMut::with_capacity(8192); // 8KB initial capacity
    let mut total_size = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| AppError::bad_request_with_source("error reading model stream", e))?;
        total_size += chunk.len() as u64;
        if total_size > max_size {
            return Err(AnalysisError::TooLarge { limit: max_size }.into());
        }
        buffer.extend_from_slice(&chunk);
    }

    let bytes = buffer.freeze();
    let mesh = BufferedParser::new(state.limits).parse(&bytes)?;
    if !mesh.is_binary {
        return Err(AnalysisError::unsupported_format(
            "ASCII STL is not supported, export the model as binary STL",
        )
        .into());
    }

    let metrics = calculate::metrics(&mesh.triangles);
    metrics.check_printable()?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(AnalyzeRes::new(&metrics, query.unit)),
    ))
}
