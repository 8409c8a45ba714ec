use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::ServiceError;
use log::error;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Failure of a request, rendered as JSON
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Authentification requise.")]
    Unauthorized,

    #[error("Veuillez compléter votre profil avant de continuer.")]
    MissingProfile,

    #[error("{0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Field-by-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub fields: Option<serde_json::Value>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => match err {
                ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::Authorization(_) => StatusCode::FORBIDDEN,
                ServiceError::StateConflict(_) => StatusCode::CONFLICT,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Database(_) | ServiceError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingProfile => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Service(ServiceError::Validation(errors)) => ErrorBody {
                error: self.to_string(),
                fields: serde_json::to_value(errors).ok(),
            },
            Self::Service(ServiceError::Database(_) | ServiceError::Storage(_)) => ErrorBody {
                error: "Une erreur interne est survenue.".to_owned(),
                fields: None,
            },
            _ => ErrorBody {
                error: self.to_string(),
                fields: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        }
        (status, Json(self.body())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn test_service_errors_map_to_statuses() {
        let cases = [
            (
                ServiceError::Validation(ValidationErrors::new()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ServiceError::forbidden("Accès refusé"), StatusCode::FORBIDDEN),
            (
                ServiceError::StateConflict("Déjà inscrit".to_owned()),
                StatusCode::CONFLICT,
            ),
            (ServiceError::NotFound("Formation"), StatusCode::NOT_FOUND),
            (
                ServiceError::Database(DbErr::Custom("boom".to_owned())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MissingProfile.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("email", ValidationError::new("email"));

        let body = ApiError::from(ServiceError::Validation(errors)).body();
        let fields = body.fields.unwrap();
        assert!(fields.get("email").is_some());
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let body = ApiError::from(ServiceError::Database(DbErr::Custom(
            "relation \"users\" does not exist".to_owned(),
        )))
        .body();
        assert!(!body.error.contains("users"));
        assert!(body.fields.is_none());
    }

    #[test]
    fn test_not_found_message() {
        let body = ApiError::from(ServiceError::NotFound("Événement")).body();
        assert_eq!(body.error, "Événement introuvable");
    }
}
