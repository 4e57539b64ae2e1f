//! Photo store routes

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch},
};
use gallery::{
    MediaItem, ReorderPayload,
    http::{CAPTIONS_FIELD, FILES_FIELD},
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::log_requests,
    models::{AckResponse, NewPhoto},
    state::AppState,
};

/// Create the router for the photo store service
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.settings.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/assets/:photo_id", get(get_asset))
        .route(
            "/offices/:office_id/photos",
            get(list_photos).post(upload_photos),
        )
        .route("/offices/:office_id/photos/reorder", patch(reorder_photos))
        .route("/offices/:office_id/photos/:photo_id", delete(delete_photo))
        .route("/offices/:office_id/photos/:photo_id/main", patch(mark_main))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.repository.health_check().await.unwrap_or(false);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unavailable" },
            "service": "photo-store"
        })),
    )
}

/// Unknown routes answer with the same JSON error shape as handlers
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// List a gallery's photos in persisted order
pub async fn list_photos(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Vec<MediaItem>>> {
    let Path(office_id) = path?;
    let photos = state.repository.list(office_id).await?;
    let public_url = &state.settings.public_url;

    Ok(Json(
        photos.iter().map(|photo| photo.to_item(public_url)).collect(),
    ))
}

/// Append uploaded photos to a gallery
pub async fn upload_photos(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(office_id) = path?;
    let photos = read_upload(multipart?).await?;
    let created = state.repository.insert_batch(office_id, photos).await?;
    info!("Uploaded {} photos to office {}", created.len(), office_id);

    let public_url = &state.settings.public_url;
    let items: Vec<MediaItem> = created
        .iter()
        .map(|photo| photo.to_item(public_url))
        .collect();

    Ok((StatusCode::CREATED, Json(items)))
}

/// Make a photo the gallery's main photo
pub async fn mark_main(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<Json<AckResponse>> {
    let Path((office_id, photo_id)) = path?;
    state.repository.set_main(office_id, photo_id).await?;
    info!("Photo {} is now main for office {}", photo_id, office_id);
    Ok(Json(AckResponse::ok()))
}

/// Persist a new ordering of a gallery
pub async fn reorder_photos(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ReorderPayload>, JsonRejection>,
) -> ApiResult<Json<AckResponse>> {
    let Path(office_id) = path?;
    let Json(payload) = payload?;
    state.repository.reorder(office_id, payload).await?;
    info!("Reordered photos of office {}", office_id);
    Ok(Json(AckResponse::ok()))
}

/// Delete a photo from a gallery
pub async fn delete_photo(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<Json<AckResponse>> {
    let Path((office_id, photo_id)) = path?;
    state.repository.delete(office_id, photo_id).await?;
    info!("Deleted photo {} from office {}", photo_id, office_id);
    Ok(Json(AckResponse::ok()))
}

/// Serve a photo's stored bytes
pub async fn get_asset(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(photo_id) = path?;
    let asset = state.repository.asset(photo_id).await?;
    Ok(([(header::CONTENT_TYPE, asset.content_type)], asset.bytes))
}

/// Read `files` parts and their positional `captions` from a multipart body
///
/// Both `files` and `files[]` style field names are accepted.
async fn read_upload(mut multipart: Multipart) -> ApiResult<Vec<NewPhoto>> {
    let mut files: Vec<(String, String, Vec<u8>)> = Vec::new();
    let mut captions: Vec<Option<String>> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field
            .name()
            .unwrap_or_default()
            .trim_end_matches("[]")
            .to_string();

        if name == FILES_FIELD {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            if !content_type.starts_with("image/") {
                return Err(ApiError::BadRequest(format!(
                    "File {} has unsupported type {}",
                    file_name, content_type
                )));
            }

            let bytes = field.bytes().await?;
            if bytes.is_empty() {
                return Err(ApiError::BadRequest(format!("File {} is empty", file_name)));
            }
            files.push((file_name, content_type, bytes.to_vec()));
        } else if name == CAPTIONS_FIELD {
            let caption = field.text().await?;
            let caption = caption.trim();
            captions.push((!caption.is_empty()).then(|| caption.to_string()));
        }
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("No files were uploaded".to_string()));
    }
    if captions.len() > files.len() {
        return Err(ApiError::BadRequest(format!(
            "Received {} captions for {} files",
            captions.len(),
            files.len()
        )));
    }

    captions.resize(files.len(), None);
    Ok(files
        .into_iter()
        .zip(captions)
        .map(|((file_name, content_type, bytes), caption)| NewPhoto {
            file_name,
            content_type,
            bytes,
            caption,
        })
        .collect())
}
