//! Image uploads.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use folio_common::{AppError, UploadFolder};
use folio_core::UploadResponse;

use crate::{
    extractors::AdminSession,
    middleware::AppState,
    response::FlatResult,
};

/// Room for multipart boundaries and the text fields next to the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Upload an image via multipart form (`file`, `folder`).
async fn upload(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> FlatResult<Json<UploadResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut folder: Option<UploadFolder> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                file_name = field.file_name().map(ToString::to_string);
                content_type = field.content_type().map(ToString::to_string);
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?
                        .to_vec(),
                );
            }
            "folder" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                folder = Some(text.trim().parse()?);
            }
            _ => {}
        }
    }

    let data = file_data.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let folder = folder.ok_or_else(|| AppError::BadRequest("No folder provided".to_string()))?;
    let file_name = file_name.unwrap_or_else(|| "upload".to_string());
    let content_type = content_type.unwrap_or_default();

    let uploaded = state
        .upload_service
        .upload_image(folder, &file_name, &content_type, &data)
        .await?;

    tracing::info!(admin = %admin.email, key = %uploaded.key, "Uploaded image");
    Ok(Json(uploaded))
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/",
        post(upload).layer(DefaultBodyLimit::max(
            state.upload_service.max_bytes() + MULTIPART_OVERHEAD,
        )),
    )
}
