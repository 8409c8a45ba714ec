pub mod account;
pub mod activity;
pub mod content;
pub mod formation;

use models::transition::TransitionOutcome;
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use storage::BlobStore;
use utoipa::ToSchema;

/// Result of a status change; re-applying the current status is reported,
/// not refused
#[derive(Debug, Serialize)]
pub struct StatusChangeResponse<T> {
    pub data: T,
    pub changed: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> StatusChangeResponse<T> {
    pub fn new<S>(data: T, outcome: TransitionOutcome<S>) -> Self
    where
        S: ActiveEnum<Value = String> + Copy,
    {
        let status = outcome.status().to_value();
        let message = (!outcome.is_applied())
            .then(|| format!("Aucun changement : le statut est déjà « {status} »."));

        Self {
            data,
            changed: outcome.is_applied(),
            status,
            message,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of the admin endpoints that move a registration or request to a
/// new status
#[derive(Debug, Deserialize)]
pub struct StatusRequest<S> {
    pub status: S,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter<S> {
    pub status: Option<S>,
}

pub(crate) fn public_url(storage: &dyn BlobStore, path: Option<&str>) -> Option<String> {
    path.and_then(|path| storage.url(path))
}
