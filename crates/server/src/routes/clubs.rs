use crate::dtos::content::ClubResponse;
use crate::dtos::{MessageResponse, StatusChangeResponse};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::utils::multipart::read_form;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use database::entities::club;
use database::services::club::ClubService;
use models::forms::{ClubApplicationForm, ClubForm};
use uuid::Uuid;

fn club_list(state: &AppState, clubs: Vec<club::Model>) -> Vec<ClubResponse> {
    clubs
        .into_iter()
        .map(|c| ClubResponse::new(c, state.storage.as_ref()))
        .collect()
}

#[utoipa::path(
    get,
    path = "/clubs",
    responses((status = 200, description = "Active clubs", body = Vec<ClubResponse>)),
    tag = "Clubs"
)]
pub async fn list_clubs(State(state): State<AppState>) -> ApiResult<Json<Vec<ClubResponse>>> {
    let clubs = ClubService::list(&state.db, true).await?;
    Ok(Json(club_list(&state, clubs)))
}

#[utoipa::path(
    get,
    path = "/clubs/{slug}",
    params(("slug" = String, Path, description = "Club slug")),
    responses(
        (status = 200, description = "Club found", body = ClubResponse),
        (status = 404, description = "Club not found or inactive")
    ),
    tag = "Clubs"
)]
pub async fn show_club(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ClubResponse>> {
    let club = ClubService::get_active_by_slug(&state.db, &slug).await?;
    Ok(Json(ClubResponse::new(club, state.storage.as_ref())))
}

/// Send a membership application to the club and the center
#[utoipa::path(
    post,
    path = "/clubs/{slug}/applications",
    params(("slug" = String, Path, description = "Club slug")),
    request_body = ClubApplicationForm,
    responses(
        (status = 202, description = "Application forwarded", body = MessageResponse),
        (status = 404, description = "Club not found or inactive"),
        (status = 422, description = "Invalid data")
    ),
    tag = "Clubs"
)]
pub async fn apply_to_club(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(form): Json<ClubApplicationForm>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let club = ClubService::get_active_by_slug(&state.db, &slug).await?;
    ClubService::apply(&state.db, &state.notifier, club.id, form).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Votre candidature a bien été envoyée.")),
    ))
}

#[utoipa::path(
    get,
    path = "/admin/clubs",
    responses((status = 200, description = "Every club", body = Vec<ClubResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_list_clubs(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ClubResponse>>> {
    let clubs = ClubService::list(&state.db, false).await?;
    Ok(Json(club_list(&state, clubs)))
}

#[utoipa::path(
    get,
    path = "/admin/clubs/{id}",
    params(("id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Club found", body = ClubResponse),
        (status = 404, description = "Club not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_show_club(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ClubResponse>> {
    let club = ClubService::get(&state.db, id).await?;
    Ok(Json(ClubResponse::new(club, state.storage.as_ref())))
}

#[utoipa::path(
    post,
    path = "/admin/clubs",
    request_body(content = ClubForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Club created", body = ClubResponse),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_club(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ClubResponse>)> {
    let form = read_form::<ClubForm>(multipart).await?;
    let club =
        ClubService::create(&state.db, state.storage.as_ref(), form.data, form.file).await?;
    Ok((
        StatusCode::CREATED,
        Json(ClubResponse::new(club, state.storage.as_ref())),
    ))
}

#[utoipa::path(
    put,
    path = "/admin/clubs/{id}",
    params(("id" = Uuid, Path, description = "Club ID")),
    request_body(content = ClubForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Club updated", body = ClubResponse),
        (status = 404, description = "Club not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn update_club(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<ClubResponse>> {
    let form = read_form::<ClubForm>(multipart).await?;
    let club =
        ClubService::update(&state.db, state.storage.as_ref(), id, form.data, form.file).await?;
    Ok(Json(ClubResponse::new(club, state.storage.as_ref())))
}

#[utoipa::path(
    post,
    path = "/admin/clubs/{id}/toggle-status",
    params(("id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Switched between active and inactive"),
        (status = 404, description = "Club not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn toggle_club(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusChangeResponse<ClubResponse>>> {
    let (club, outcome) = ClubService::toggle_status(&state.db, id).await?;
    Ok(Json(StatusChangeResponse::new(
        ClubResponse::new(club, state.storage.as_ref()),
        outcome,
    )))
}

#[utoipa::path(
    delete,
    path = "/admin/clubs/{id}",
    params(("id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 204, description = "Club and its logo deleted"),
        (status = 404, description = "Club not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_club(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ClubService::delete(&state.db, state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
