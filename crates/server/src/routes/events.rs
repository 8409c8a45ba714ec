use crate::auth::Account;
use crate::dtos::activity::{EventRegistrationResponse, EventResponse};
use crate::dtos::{StatusChangeResponse, StatusRequest};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::utils::multipart::read_form;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use database::entities::event;
use database::services::event::EventService;
use models::forms::{EventForm, EventRegistrationForm};
use models::status::EventRegistrationStatus;
use uuid::Uuid;

fn event_list(state: &AppState, events: Vec<event::Model>) -> Vec<EventResponse> {
    events
        .into_iter()
        .map(|e| EventResponse::new(e, state.storage.as_ref()))
        .collect()
}

/// List events, soonest first
#[utoipa::path(
    get,
    path = "/events",
    responses((status = 200, description = "Events with up-to-date statuses", body = Vec<EventResponse>)),
    tag = "Events"
)]
pub async fn list_events(State(state): State<AppState>) -> ApiResult<Json<Vec<EventResponse>>> {
    let events = EventService::list(&state.db).await?;
    Ok(Json(event_list(&state, events)))
}

#[utoipa::path(
    get,
    path = "/events/{slug}",
    params(("slug" = String, Path, description = "Event slug")),
    responses(
        (status = 200, description = "Event found", body = EventResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "Events"
)]
pub async fn show_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<EventResponse>> {
    let event = EventService::get_by_slug(&state.db, &slug).await?;
    Ok(Json(EventResponse::new(event, state.storage.as_ref())))
}

/// Register the caller to an upcoming event.
///
/// A previously cancelled registration is reactivated; a rejected one cannot be.
#[utoipa::path(
    post,
    operation_id = "register_event",
    path = "/me/events/{id}/registrations",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = EventRegistrationForm,
    responses(
        (status = 201, description = "Registration recorded", body = EventRegistrationResponse),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event full, not upcoming, or already registered"),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Events"
)]
pub async fn register(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
    Json(form): Json<EventRegistrationForm>,
) -> ApiResult<(StatusCode, Json<EventRegistrationResponse>)> {
    let registration = EventService::register(&state.db, user.id, id, form).await?;
    Ok((StatusCode::CREATED, Json(registration.into())))
}

#[utoipa::path(
    get,
    operation_id = "my_event_registrations",
    path = "/me/event-registrations",
    responses((status = 200, description = "The caller's registrations", body = Vec<EventRegistrationResponse>)),
    security(("jwt" = [])),
    tag = "Events"
)]
pub async fn my_registrations(
    State(state): State<AppState>,
    Account(user): Account,
) -> ApiResult<Json<Vec<EventRegistrationResponse>>> {
    let registrations = EventService::registrations_for_user(&state.db, user.id).await?;
    Ok(Json(registrations.into_iter().map(Into::into).collect()))
}

/// Cancel one of the caller's registrations
#[utoipa::path(
    delete,
    path = "/me/event-registrations/{id}",
    params(("id" = Uuid, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Registration cancelled"),
        (status = 403, description = "Not the caller's registration"),
        (status = 409, description = "Registration can no longer be cancelled")
    ),
    security(("jwt" = [])),
    tag = "Events"
)]
pub async fn cancel_registration(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusChangeResponse<Uuid>>> {
    let outcome = EventService::cancel_registration(&state.db, user.id, id).await?;
    Ok(Json(StatusChangeResponse::new(id, outcome)))
}

#[utoipa::path(
    get,
    path = "/admin/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event found", body = EventResponse),
        (status = 404, description = "Event not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_show_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventResponse>> {
    let event = EventService::get(&state.db, id).await?;
    Ok(Json(EventResponse::new(event, state.storage.as_ref())))
}

#[utoipa::path(
    post,
    path = "/admin/events",
    request_body(content = EventForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_event(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<EventResponse>)> {
    let form = read_form::<EventForm>(multipart).await?;
    let event =
        EventService::create(&state.db, state.storage.as_ref(), form.data, form.file).await?;
    Ok((
        StatusCode::CREATED,
        Json(EventResponse::new(event, state.storage.as_ref())),
    ))
}

#[utoipa::path(
    put,
    path = "/admin/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body(content = EventForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 404, description = "Event not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<EventResponse>> {
    let form = read_form::<EventForm>(multipart).await?;
    let event =
        EventService::update(&state.db, state.storage.as_ref(), id, form.data, form.file).await?;
    Ok(Json(EventResponse::new(event, state.storage.as_ref())))
}

#[utoipa::path(
    delete,
    path = "/admin/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event and its registrations deleted"),
        (status = 404, description = "Event not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    EventService::delete(&state.db, state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/admin/events/{id}/cancel",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event cancelled"),
        (status = 409, description = "Event already completed")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn cancel_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusChangeResponse<EventResponse>>> {
    let (event, outcome) = EventService::cancel(&state.db, id).await?;
    Ok(Json(StatusChangeResponse::new(
        EventResponse::new(event, state.storage.as_ref()),
        outcome,
    )))
}

#[utoipa::path(
    get,
    path = "/admin/events/{id}/registrations",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses((status = 200, description = "Registrations of the event", body = Vec<EventRegistrationResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn event_registrations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<EventRegistrationResponse>>> {
    EventService::get(&state.db, id).await?;
    let registrations = EventService::registrations(&state.db, id).await?;
    Ok(Json(registrations.into_iter().map(Into::into).collect()))
}

/// Approve, reject or cancel a registration; the attendee is notified
#[utoipa::path(
    put,
    operation_id = "review_event_registration",
    path = "/admin/event-registrations/{id}/status",
    params(("id" = Uuid, Path, description = "Registration ID")),
    request_body(content = EventRegistrationStatus, description = "JSON object with a `status` field"),
    responses(
        (status = 200, description = "Status applied or already current"),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "Illegal transition or event full")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn review_registration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StatusRequest<EventRegistrationStatus>>,
) -> ApiResult<Json<StatusChangeResponse<EventRegistrationResponse>>> {
    let (registration, outcome) =
        EventService::review_registration(&state.db, &state.notifier, id, request.status).await?;
    Ok(Json(StatusChangeResponse::new(registration.into(), outcome)))
}

#[utoipa::path(
    get,
    path = "/admin/events",
    responses((status = 200, description = "All events", body = Vec<EventResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_list_events(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<EventResponse>>> {
    let events = EventService::list(&state.db).await?;
    Ok(Json(event_list(&state, events)))
}
