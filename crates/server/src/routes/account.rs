use crate::auth::{Account, Identity};
use crate::dtos::account::{AccountResponse, RoleRequest};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use database::ServiceError;
use database::services::account::AccountService;
use models::forms::ProfileForm;
use models::status::Role;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "The caller's account", body = AccountResponse),
        (status = 403, description = "No profile saved yet")
    ),
    security(("jwt" = [])),
    tag = "Account"
)]
pub async fn me(Account(user): Account) -> Json<AccountResponse> {
    Json(user.into())
}

/// Create or update the caller's profile.
///
/// The first save creates the account; subjects listed in `ADMIN_SUBJECTS`
/// start as admins.
#[utoipa::path(
    put,
    path = "/me/profile",
    request_body = ProfileForm,
    responses(
        (status = 200, description = "Profile saved", body = AccountResponse),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Account"
)]
pub async fn save_profile(
    State(state): State<AppState>,
    Identity(context): Identity,
    Json(form): Json<ProfileForm>,
) -> ApiResult<Json<AccountResponse>> {
    let admin = state.config.is_admin_subject(&context.subject);
    let user = AccountService::save_profile(&state.db, &context.subject, form, admin).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/admin/accounts",
    responses((status = 200, description = "Accounts by name", body = Vec<AccountResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn list_accounts(State(state): State<AppState>) -> ApiResult<Json<Vec<AccountResponse>>> {
    let users = AccountService::list(&state.db).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/admin/accounts/{id}/role",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role updated", body = AccountResponse),
        (status = 403, description = "Admins cannot demote themselves"),
        (status = 404, description = "Account not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn set_role(
    State(state): State<AppState>,
    Account(caller): Account,
    Path(id): Path<Uuid>,
    Json(request): Json<RoleRequest>,
) -> ApiResult<Json<AccountResponse>> {
    if caller.id == id && request.role != Role::Admin {
        return Err(ServiceError::forbidden("Vous ne pouvez pas retirer votre propre rôle.").into());
    }
    let user = AccountService::set_role(&state.db, id, request.role).await?;
    Ok(Json(user.into()))
}
