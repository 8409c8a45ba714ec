use crate::auth::Account;
use crate::dtos::activity::{CompetitionRegistrationResponse, CompetitionResponse};
use crate::dtos::{StatusChangeResponse, StatusRequest};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::utils::multipart::read_form;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use database::entities::competition;
use database::services::competition::CompetitionService;
use models::forms::{CompetitionForm, CompetitionRegistrationForm};
use models::status::CompetitionRegistrationStatus;
use uuid::Uuid;

fn competition_list(
    state: &AppState,
    competitions: Vec<competition::Model>,
) -> Vec<CompetitionResponse> {
    competitions
        .into_iter()
        .map(|c| CompetitionResponse::new(c, state.storage.as_ref()))
        .collect()
}

#[utoipa::path(
    get,
    path = "/competitions",
    responses((status = 200, description = "Competitions by date", body = Vec<CompetitionResponse>)),
    tag = "Competitions"
)]
pub async fn list_competitions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CompetitionResponse>>> {
    let competitions = CompetitionService::list(&state.db).await?;
    Ok(Json(competition_list(&state, competitions)))
}

#[utoipa::path(
    get,
    path = "/competitions/{slug}",
    params(("slug" = String, Path, description = "Competition slug")),
    responses(
        (status = 200, description = "Competition found", body = CompetitionResponse),
        (status = 404, description = "Competition not found")
    ),
    tag = "Competitions"
)]
pub async fn show_competition(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<CompetitionResponse>> {
    let competition = CompetitionService::get_by_slug(&state.db, &slug).await?;
    Ok(Json(CompetitionResponse::new(
        competition,
        state.storage.as_ref(),
    )))
}

/// Apply to a competition; group competitions take the team members along
#[utoipa::path(
    post,
    operation_id = "register_competition",
    path = "/me/competitions/{id}/registrations",
    params(("id" = Uuid, Path, description = "Competition ID")),
    request_body = CompetitionRegistrationForm,
    responses(
        (status = 201, description = "Application recorded as pending", body = CompetitionRegistrationResponse),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Closed, full, past deadline or already registered"),
        (status = 422, description = "Invalid data or team")
    ),
    security(("jwt" = [])),
    tag = "Competitions"
)]
pub async fn register(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
    Json(form): Json<CompetitionRegistrationForm>,
) -> ApiResult<(StatusCode, Json<CompetitionRegistrationResponse>)> {
    let (registration, members) =
        CompetitionService::register(&state.db, user.id, id, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(CompetitionRegistrationResponse::new(registration, members)),
    ))
}

#[utoipa::path(
    get,
    operation_id = "my_competition_registrations",
    path = "/me/competition-registrations",
    responses((status = 200, description = "The caller's applications", body = Vec<CompetitionRegistrationResponse>)),
    security(("jwt" = [])),
    tag = "Competitions"
)]
pub async fn my_registrations(
    State(state): State<AppState>,
    Account(user): Account,
) -> ApiResult<Json<Vec<CompetitionRegistrationResponse>>> {
    let registrations = CompetitionService::registrations_for_user(&state.db, user.id).await?;
    Ok(Json(registrations.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/admin/competitions",
    responses((status = 200, description = "All competitions", body = Vec<CompetitionResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_list_competitions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CompetitionResponse>>> {
    let competitions = CompetitionService::list(&state.db).await?;
    Ok(Json(competition_list(&state, competitions)))
}

#[utoipa::path(
    get,
    path = "/admin/competitions/{id}",
    params(("id" = Uuid, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Competition found", body = CompetitionResponse),
        (status = 404, description = "Competition not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_show_competition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CompetitionResponse>> {
    let competition = CompetitionService::get(&state.db, id).await?;
    Ok(Json(CompetitionResponse::new(
        competition,
        state.storage.as_ref(),
    )))
}

#[utoipa::path(
    post,
    path = "/admin/competitions",
    request_body(content = CompetitionForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Competition opened", body = CompetitionResponse),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_competition(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<CompetitionResponse>)> {
    let form = read_form::<CompetitionForm>(multipart).await?;
    let competition =
        CompetitionService::create(&state.db, state.storage.as_ref(), form.data, form.file)
            .await?;
    Ok((
        StatusCode::CREATED,
        Json(CompetitionResponse::new(
            competition,
            state.storage.as_ref(),
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/admin/competitions/{id}",
    params(("id" = Uuid, Path, description = "Competition ID")),
    request_body(content = CompetitionForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Competition updated", body = CompetitionResponse),
        (status = 404, description = "Competition not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn update_competition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<CompetitionResponse>> {
    let form = read_form::<CompetitionForm>(multipart).await?;
    let competition =
        CompetitionService::update(&state.db, state.storage.as_ref(), id, form.data, form.file)
            .await?;
    Ok(Json(CompetitionResponse::new(
        competition,
        state.storage.as_ref(),
    )))
}

#[utoipa::path(
    delete,
    path = "/admin/competitions/{id}",
    params(("id" = Uuid, Path, description = "Competition ID")),
    responses(
        (status = 204, description = "Competition and its applications deleted"),
        (status = 404, description = "Competition not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_competition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    CompetitionService::delete(&state.db, state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/admin/competitions/{id}/close",
    params(("id" = Uuid, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Registrations closed"),
        (status = 404, description = "Competition not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn close_competition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusChangeResponse<CompetitionResponse>>> {
    let (competition, outcome) = CompetitionService::close(&state.db, id).await?;
    Ok(Json(StatusChangeResponse::new(
        CompetitionResponse::new(competition, state.storage.as_ref()),
        outcome,
    )))
}

/// Reopen registrations, landing on `Complet` when already at capacity
#[utoipa::path(
    post,
    path = "/admin/competitions/{id}/reopen",
    params(("id" = Uuid, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Registrations reopened"),
        (status = 404, description = "Competition not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn reopen_competition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusChangeResponse<CompetitionResponse>>> {
    let (competition, outcome) = CompetitionService::reopen(&state.db, id).await?;
    Ok(Json(StatusChangeResponse::new(
        CompetitionResponse::new(competition, state.storage.as_ref()),
        outcome,
    )))
}

#[utoipa::path(
    get,
    path = "/admin/competitions/{id}/registrations",
    params(("id" = Uuid, Path, description = "Competition ID")),
    responses((status = 200, description = "Applications with their teams", body = Vec<CompetitionRegistrationResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn competition_registrations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<CompetitionRegistrationResponse>>> {
    CompetitionService::get(&state.db, id).await?;
    let registrations = CompetitionService::registrations(&state.db, id).await?;
    Ok(Json(
        registrations
            .into_iter()
            .map(|(registration, members)| {
                CompetitionRegistrationResponse::new(registration, members)
            })
            .collect(),
    ))
}

/// Confirm or refuse an application; the competition status follows the
/// confirmed count
#[utoipa::path(
    put,
    operation_id = "review_competition_registration",
    path = "/admin/competition-registrations/{id}/status",
    params(("id" = Uuid, Path, description = "Registration ID")),
    request_body(content = CompetitionRegistrationStatus, description = "JSON object with a `status` field"),
    responses(
        (status = 200, description = "Status applied or already current"),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "Illegal transition or competition full")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn review_registration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StatusRequest<CompetitionRegistrationStatus>>,
) -> ApiResult<Json<StatusChangeResponse<CompetitionRegistrationResponse>>> {
    let (registration, outcome) =
        CompetitionService::review_registration(&state.db, &state.notifier, id, request.status)
            .await?;
    Ok(Json(StatusChangeResponse::new(registration.into(), outcome)))
}
