use crate::dtos::activity::ReservationResponse;
use crate::dtos::{StatusChangeResponse, StatusFilter};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::services::reservation::ReservationService;
use models::forms::{ReservationForm, ReviewForm};
use models::status::ReservationStatus;
use uuid::Uuid;

/// Request a room, computer or equipment slot
#[utoipa::path(
    post,
    path = "/reservations",
    request_body = ReservationForm,
    responses(
        (status = 201, description = "Request recorded as pending", body = ReservationResponse),
        (status = 409, description = "A pending request already exists for this email"),
        (status = 422, description = "Invalid data")
    ),
    tag = "Reservations"
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(form): Json<ReservationForm>,
) -> ApiResult<(StatusCode, Json<ReservationResponse>)> {
    let reservation = ReservationService::create(&state.db, form).await?;
    Ok((StatusCode::CREATED, Json(reservation.into())))
}

#[utoipa::path(
    get,
    path = "/admin/reservations",
    params(("status" = Option<ReservationStatus>, Query, description = "Only requests with this status")),
    responses((status = 200, description = "Requests, newest first", body = Vec<ReservationResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter<ReservationStatus>>,
) -> ApiResult<Json<Vec<ReservationResponse>>> {
    let reservations = ReservationService::list(&state.db, filter.status).await?;
    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/admin/reservations/{id}",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation found", body = ReservationResponse),
        (status = 404, description = "Reservation not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn show_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReservationResponse>> {
    let reservation = ReservationService::get(&state.db, id).await?;
    Ok(Json(reservation.into()))
}

async fn review(
    state: AppState,
    id: Uuid,
    status: ReservationStatus,
    form: ReviewForm,
) -> ApiResult<Json<StatusChangeResponse<ReservationResponse>>> {
    let (reservation, outcome) =
        ReservationService::review(&state.db, &state.notifier, id, status, form).await?;
    Ok(Json(StatusChangeResponse::new(reservation.into(), outcome)))
}

/// Approve a pending request; approving twice is reported as unchanged
#[utoipa::path(
    post,
    path = "/admin/reservations/{id}/approve",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    request_body = ReviewForm,
    responses(
        (status = 200, description = "Approved or already approved"),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation already rejected")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn approve_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<ReviewForm>,
) -> ApiResult<Json<StatusChangeResponse<ReservationResponse>>> {
    review(state, id, ReservationStatus::Approved, form).await
}

#[utoipa::path(
    post,
    path = "/admin/reservations/{id}/reject",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    request_body = ReviewForm,
    responses(
        (status = 200, description = "Rejected or already rejected"),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation already approved")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn reject_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<ReviewForm>,
) -> ApiResult<Json<StatusChangeResponse<ReservationResponse>>> {
    review(state, id, ReservationStatus::Rejected, form).await
}

#[utoipa::path(
    delete,
    path = "/admin/reservations/{id}",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 204, description = "Reservation deleted"),
        (status = 404, description = "Reservation not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ReservationService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
