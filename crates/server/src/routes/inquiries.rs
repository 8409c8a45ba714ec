use crate::dtos::MessageResponse;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use database::services::inquiry::InquiryService;
use models::forms::{ContactForm, PartnershipForm};

/// Forward a contact message to the center
#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactForm,
    responses(
        (status = 202, description = "Message forwarded", body = MessageResponse),
        (status = 422, description = "Invalid data")
    ),
    tag = "Contact"
)]
pub async fn contact(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    InquiryService::contact(&state.notifier, form).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Votre message a bien été envoyé.")),
    ))
}

#[utoipa::path(
    post,
    path = "/partnerships",
    request_body = PartnershipForm,
    responses(
        (status = 202, description = "Request forwarded", body = MessageResponse),
        (status = 422, description = "Invalid data")
    ),
    tag = "Contact"
)]
pub async fn partnership(
    State(state): State<AppState>,
    Json(form): Json<PartnershipForm>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    InquiryService::partnership(&state.notifier, form).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new(
            "Votre demande de partenariat a bien été envoyée.",
        )),
    ))
}
