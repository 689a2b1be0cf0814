use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};

use crate::{
    dto::content::UploadResponse,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
    uploads::UploadedFile,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(upload_images))
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = String, content_type = "multipart/form-data", description = "One or more image files"),
    responses(
        (status = 201, description = "Stored image URLs, in upload order", body = ApiResponse<UploadResponse>),
        (status = 400, description = "No files, too many files or unsupported format"),
        (status = 413, description = "File too large"),
    ),
    security(("bearer_auth" = [])),
    tag = "Uploads"
)]
pub async fn upload_images(
    State(state): State<AppState>,
    _user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UploadResponse>>)> {
    let limit = state.config.max_upload_files;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart request: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?;
        if bytes.is_empty() {
            continue;
        }
        if files.len() == limit {
            return Err(AppError::BadRequest(format!(
                "At most {limit} files per upload"
            )));
        }
        files.push(UploadedFile { file_name, bytes });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files".into()));
    }

    let mut urls = Vec::with_capacity(files.len());
    for file in files {
        urls.push(state.images.store(file).await?);
    }

    let total = urls.len() as i64;
    let body = ApiResponse::success("Upload successful", UploadResponse { urls }, Some(Meta::total(total)));
    Ok((StatusCode::CREATED, Json(body)))
}
