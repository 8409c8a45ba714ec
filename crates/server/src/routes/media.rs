use crate::dtos::content::{MediaQuery, MediaResponse};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::utils::multipart::read_form;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use database::entities::media;
use database::services::media::MediaService;
use models::forms::MediaForm;
use uuid::Uuid;

fn media_list(state: &AppState, items: Vec<media::Model>) -> Vec<MediaResponse> {
    items
        .into_iter()
        .map(|m| MediaResponse::new(m, state.storage.as_ref()))
        .collect()
}

/// Public media library
#[utoipa::path(
    get,
    path = "/media",
    params(MediaQuery),
    responses((status = 200, description = "Public media, newest first", body = Vec<MediaResponse>)),
    tag = "Media"
)]
pub async fn list_media(
    State(state): State<AppState>,
    Query(query): Query<MediaQuery>,
) -> ApiResult<Json<Vec<MediaResponse>>> {
    let items = MediaService::list(&state.db, true, query.kind).await?;
    Ok(Json(media_list(&state, items)))
}

#[utoipa::path(
    get,
    path = "/admin/media",
    params(MediaQuery),
    responses((status = 200, description = "Every media item", body = Vec<MediaResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_list_media(
    State(state): State<AppState>,
    Query(query): Query<MediaQuery>,
) -> ApiResult<Json<Vec<MediaResponse>>> {
    let items = MediaService::list(&state.db, false, query.kind).await?;
    Ok(Json(media_list(&state, items)))
}

/// Upload a media item; the `file` part is required
#[utoipa::path(
    post,
    path = "/admin/media",
    request_body(content = MediaForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Media uploaded", body = MediaResponse),
        (status = 422, description = "Invalid data or missing file")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<MediaResponse>)> {
    let form = read_form::<MediaForm>(multipart).await?;
    let item =
        MediaService::create(&state.db, state.storage.as_ref(), form.data, form.file).await?;
    Ok((
        StatusCode::CREATED,
        Json(MediaResponse::new(item, state.storage.as_ref())),
    ))
}

#[utoipa::path(
    put,
    path = "/admin/media/{id}",
    params(("id" = Uuid, Path, description = "Media ID")),
    request_body(content = MediaForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Media updated", body = MediaResponse),
        (status = 404, description = "Media not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn update_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<MediaResponse>> {
    let form = read_form::<MediaForm>(multipart).await?;
    let item =
        MediaService::update(&state.db, state.storage.as_ref(), id, form.data, form.file).await?;
    Ok(Json(MediaResponse::new(item, state.storage.as_ref())))
}

#[utoipa::path(
    delete,
    path = "/admin/media/{id}",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 204, description = "Media and its file deleted"),
        (status = 404, description = "Media not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    MediaService::delete(&state.db, state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
