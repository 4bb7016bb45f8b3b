use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::middleware::auth::TokenClaims;
use crate::modules::media::dto::{StatusResponse, UploadResponse};
use crate::state::AppState;
use axum::{
    Extension,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::info;

/// Submit one video for conversion
#[utoipa::path(
    post,
    path = "/api/v1/media/upload",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Job accepted", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Media",
    security(("bearer_auth" = []))
)]
pub async fn upload(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut files: Vec<Bytes> = Vec::new();

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.file_name().is_none() {
            continue;
        }
        match field.bytes().await {
            Ok(bytes) => files.push(bytes),
            Err(e) => {
                return ApiError(format!("failed to read upload: {e}"), StatusCode::BAD_REQUEST)
                    .into_response();
            }
        }
    }

    if files.len() != 1 {
        return ApiError("exactly 1 file required".to_string(), StatusCode::BAD_REQUEST)
            .into_response();
    }

    info!(username = %claims.username, "received upload");

    match state.submission.submit(files.remove(0), &claims.username).await {
        Ok(video_key) => ApiSuccess(
            ApiResponse::success(UploadResponse { video_key }, "Video queued for conversion"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Check conversion status for a submitted video
#[utoipa::path(
    get,
    path = "/api/v1/media/status/{video_key}",
    params(
        ("video_key" = String, Path, description = "Job id returned by upload")
    ),
    responses(
        (status = 200, description = "Conversion completed", body = ApiResponse<StatusResponse>),
        (status = 202, description = "Still processing", body = ApiResponse<StatusResponse>),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Media"
)]
pub async fn check_status(
    State(state): State<AppState>,
    Path(video_key): Path<String>,
) -> impl IntoResponse {
    match state.status.check(&video_key).await {
        Ok(status @ StatusResponse::Completed { .. }) => ApiSuccess(
            ApiResponse::success(status, "Conversion completed"),
            StatusCode::OK,
        )
        .into_response(),
        Ok(status) => ApiSuccess(
            ApiResponse::success(status, "Conversion in progress"),
            StatusCode::ACCEPTED,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Download a finished conversion result
#[utoipa::path(
    get,
    path = "/api/v1/media/download/{key}",
    params(
        ("key" = String, Path, description = "Result key from the status response")
    ),
    responses(
        (status = 200, description = "Result bytes"),
        (status = 404, description = "Unknown result key"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Media"
)]
pub async fn download(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match state.download.fetch(&key).await {
        Ok(bytes) => {
            let content_type = mime_guess::from_path(&key).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{key}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
