//! Request-scoped identity.
//!
//! The OAuth2 layer validates the bearer token, [`subject_from_claims`] keeps
//! only its subject and [`resolve_account`] attaches the matching account as
//! an [`AuthContext`]. Handlers read it through the [`Identity`] and
//! [`Account`] extractors; `/admin` routes are guarded by [`require_admin`].

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Extension,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use database::entities::user;
use database::services::account::AccountService;
use database::ServiceError;
use log::info;
use models::status::Role;
use tower_oauth2_resource_server::claims::DefaultClaims;

/// OIDC subject of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(pub String);

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub subject: String,
    /// `None` until the caller has saved a profile
    pub account: Option<user::Model>,
}

impl AuthContext {
    pub fn role(&self) -> Option<Role> {
        self.account.as_ref().map(|account| account.role)
    }
}

pub async fn subject_from_claims(
    Extension(claims): Extension<DefaultClaims>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let subject = claims
        .sub
        .as_ref()
        .map(ToString::to_string)
        .ok_or(ApiError::Unauthorized)?;

    request.extensions_mut().insert(Subject(subject));
    Ok(next.run(request).await)
}

pub async fn resolve_account(
    State(state): State<AppState>,
    Extension(Subject(subject)): Extension<Subject>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut account = AccountService::find_by_subject(&state.db, &subject).await?;

    if let Some(existing) = &account
        && existing.role != Role::Admin
        && state.config.is_admin_subject(&subject)
    {
        info!("Granting admin role to {subject}");
        account = Some(AccountService::set_role(&state.db, existing.id, Role::Admin).await?);
    }

    request
        .extensions_mut()
        .insert(AuthContext { subject, account });
    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let context = request
        .extensions()
        .get::<AuthContext>()
        .ok_or(ApiError::Unauthorized)?;

    match context.role() {
        Some(Role::Admin) => Ok(next.run(request).await),
        Some(Role::Student) => {
            Err(ServiceError::forbidden("Accès réservé aux administrateurs.").into())
        }
        None => Err(ApiError::MissingProfile),
    }
}

/// The caller's identity, whether or not they have an account yet
#[derive(Debug, Clone)]
pub struct Identity(pub AuthContext);

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

/// The caller's account; fails when no profile was saved
#[derive(Debug, Clone)]
pub struct Account(pub user::Model);

impl<S: Send + Sync> FromRequestParts<S> for Account {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Identity(context) = Identity::from_request_parts(parts, state).await?;
        context.account.map(Self).ok_or(ApiError::MissingProfile)
    }
}
