use super::public_url;
use chrono::NaiveDateTime;
use database::entities::{formation, formation_registration, module};
use models::{certificate::Progress, status::PublicationStatus};
use serde::Serialize;
use storage::BlobStore;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct FormationResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub level: Option<String>,
    pub duration_hours: Option<i32>,
    pub image_url: Option<String>,
    pub status: PublicationStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl FormationResponse {
    pub fn new(formation: formation::Model, storage: &dyn BlobStore) -> Self {
        Self {
            image_url: public_url(storage, formation.image_path.as_deref()),
            id: formation.id,
            title: formation.title,
            slug: formation.slug,
            description: formation.description,
            level: formation.level,
            duration_hours: formation.duration_hours,
            status: formation.status,
            created_at: formation.created_at,
            updated_at: formation.updated_at,
        }
    }
}

/// Public outline of a module; content stays behind enrollment
#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleOutline {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub position: i32,
}

impl From<module::Model> for ModuleOutline {
    fn from(module: module::Model) -> Self {
        Self {
            id: module.id,
            title: module.title,
            description: module.description,
            position: module.position,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FormationDetailResponse {
    #[serde(flatten)]
    pub formation: FormationResponse,
    pub modules: Vec<ModuleOutline>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleResponse {
    pub id: Uuid,
    pub formation_id: Uuid,
    pub title: String,
    pub description: String,
    pub content: Option<String>,
    pub position: i32,
    pub has_file: bool,
    pub file_mime: Option<String>,
    /// Only set on a student's own module list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<module::Model> for ModuleResponse {
    fn from(module: module::Model) -> Self {
        Self {
            id: module.id,
            formation_id: module.formation_id,
            title: module.title,
            description: module.description,
            content: module.content,
            position: module.position,
            has_file: module.file_path.is_some(),
            file_mime: module.file_mime,
            completed: None,
            created_at: module.created_at,
            updated_at: module.updated_at,
        }
    }
}

impl ModuleResponse {
    pub fn for_student(module: module::Model, completed: &[Uuid]) -> Self {
        let done = completed.contains(&module.id);
        Self {
            completed: Some(done),
            ..Self::from(module)
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressResponse {
    pub completed: u64,
    pub total: u64,
    pub percent: u8,
    /// Whether a certificate can be issued
    pub eligible: bool,
}

impl From<Progress> for ProgressResponse {
    fn from(progress: Progress) -> Self {
        Self {
            completed: progress.completed,
            total: progress.total,
            percent: progress.percent(),
            eligible: progress.is_complete(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub formation_id: Uuid,
    pub enrolled_at: NaiveDateTime,
}

impl From<formation_registration::Model> for EnrollmentResponse {
    fn from(registration: formation_registration::Model) -> Self {
        Self {
            id: registration.id,
            student_id: registration.student_id,
            formation_id: registration.formation_id,
            enrolled_at: registration.enrolled_at,
        }
    }
}
