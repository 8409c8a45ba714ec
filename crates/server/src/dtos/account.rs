use chrono::NaiveDateTime;
use database::entities::{certificate, formation, user};
use models::status::{CertificateStatus, Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

impl From<user::Model> for AccountResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CertificateResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub formation_id: Uuid,
    /// Missing when the formation was removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formation_title: Option<String>,
    pub verification_code: String,
    pub status: CertificateStatus,
    pub downloadable: bool,
    pub issued_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl From<certificate::Model> for CertificateResponse {
    fn from(certificate: certificate::Model) -> Self {
        Self {
            id: certificate.id,
            student_id: certificate.student_id,
            formation_id: certificate.formation_id,
            formation_title: None,
            downloadable: certificate.status == CertificateStatus::Generated
                && certificate.file_path.is_some(),
            verification_code: certificate.verification_code,
            status: certificate.status,
            issued_at: certificate.issued_at,
            created_at: certificate.created_at,
        }
    }
}

impl CertificateResponse {
    pub fn with_formation(
        certificate: certificate::Model,
        formation: Option<formation::Model>,
    ) -> Self {
        Self {
            formation_title: formation.map(|formation| formation.title),
            ..Self::from(certificate)
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CertificateRequest {
    pub student_id: Uuid,
    pub formation_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkIssueRequest {
    pub ids: Vec<Uuid>,
}
