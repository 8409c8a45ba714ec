//! Formation enrollment, module access and completion tracking.

use super::{found, now};
use crate::entities::{formation, formation_registration, module, module_completion};
use crate::error::{ServiceError, ServiceResult};
use crate::services::{formation::FormationService, module::ModuleService};
use log::info;
use models::{
    certificate::Progress,
    registration::{RegistrationError, check_enrollment},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, SqlErr,
    sea_query::JoinType,
};
use storage::BlobStore;
use uuid::Uuid;

pub struct EnrollmentService;

impl EnrollmentService {
    pub async fn enroll(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<formation_registration::Model> {
        let formation = FormationService::get(db, formation_id).await?;
        let already = Self::is_enrolled(db, student_id, formation_id).await?;
        check_enrollment(formation.status, already)?;

        let registration = formation_registration::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            formation_id: Set(formation_id),
            enrolled_at: Set(now()),
        }
        .insert(db)
        .await
        .map_err(|e| {
            ServiceError::conflict_on_duplicate(e, &RegistrationError::AlreadyEnrolled.to_string())
        })?;

        info!("Student {student_id} enrolled in formation {formation_id}");
        Ok(registration)
    }

    /// Completions are kept so progress survives a re-enrollment
    pub async fn unenroll(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<()> {
        let result = formation_registration::Entity::delete_many()
            .filter(formation_registration::Column::StudentId.eq(student_id))
            .filter(formation_registration::Column::FormationId.eq(formation_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Inscription"));
        }

        info!("Student {student_id} left formation {formation_id}");
        Ok(())
    }

    pub async fn is_enrolled(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<bool> {
        let count = formation_registration::Entity::find()
            .filter(formation_registration::Column::StudentId.eq(student_id))
            .filter(formation_registration::Column::FormationId.eq(formation_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    pub async fn ensure_access(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<()> {
        if Self::is_enrolled(db, student_id, formation_id).await? {
            Ok(())
        } else {
            Err(ServiceError::forbidden(
                "Vous devez être inscrit à cette formation pour accéder à son contenu.",
            ))
        }
    }

    pub async fn enrolled_formations(
        db: &DatabaseConnection,
        student_id: Uuid,
    ) -> ServiceResult<Vec<formation::Model>> {
        Ok(formation::Entity::find()
            .join(JoinType::InnerJoin, formation::Relation::Registrations.def())
            .filter(formation_registration::Column::StudentId.eq(student_id))
            .order_by_desc(formation_registration::Column::EnrolledAt)
            .all(db)
            .await?)
    }

    pub async fn registrations(
        db: &DatabaseConnection,
        formation_id: Uuid,
    ) -> ServiceResult<Vec<formation_registration::Model>> {
        Ok(formation_registration::Entity::find()
            .filter(formation_registration::Column::FormationId.eq(formation_id))
            .order_by_asc(formation_registration::Column::EnrolledAt)
            .all(db)
            .await?)
    }

    /// Modules of a formation the student is enrolled in
    pub async fn modules(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<Vec<module::Model>> {
        Self::ensure_access(db, student_id, formation_id).await?;
        ModuleService::list(db, formation_id).await
    }

    pub async fn module_file(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        student_id: Uuid,
        module_id: Uuid,
    ) -> ServiceResult<(module::Model, Vec<u8>)> {
        let module = ModuleService::get(db, module_id).await?;
        Self::ensure_access(db, student_id, module.formation_id).await?;
        let bytes = ModuleService::read_file(storage, &module).await?;
        Ok((module, bytes))
    }

    /// Marking an already completed module returns the existing completion
    pub async fn complete_module(
        db: &DatabaseConnection,
        student_id: Uuid,
        module_id: Uuid,
    ) -> ServiceResult<module_completion::Model> {
        let module = ModuleService::get(db, module_id).await?;
        Self::ensure_access(db, student_id, module.formation_id).await?;

        if let Some(existing) = Self::completion(db, student_id, module_id).await? {
            return Ok(existing);
        }

        let inserted = module_completion::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            module_id: Set(module_id),
            completed_at: Set(now()),
        }
        .insert(db)
        .await;

        match inserted {
            Ok(completion) => Ok(completion),
            // A concurrent request recorded it first
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => found(
                Self::completion(db, student_id, module_id).await?,
                "Module terminé",
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn uncomplete_module(
        db: &DatabaseConnection,
        student_id: Uuid,
        module_id: Uuid,
    ) -> ServiceResult<()> {
        let module = ModuleService::get(db, module_id).await?;
        Self::ensure_access(db, student_id, module.formation_id).await?;

        module_completion::Entity::delete_many()
            .filter(module_completion::Column::StudentId.eq(student_id))
            .filter(module_completion::Column::ModuleId.eq(module_id))
            .exec(db)
            .await?;
        Ok(())
    }

    async fn completion(
        db: &DatabaseConnection,
        student_id: Uuid,
        module_id: Uuid,
    ) -> ServiceResult<Option<module_completion::Model>> {
        Ok(module_completion::Entity::find()
            .filter(module_completion::Column::StudentId.eq(student_id))
            .filter(module_completion::Column::ModuleId.eq(module_id))
            .one(db)
            .await?)
    }

    pub async fn completed_module_ids(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<Vec<Uuid>> {
        let completions = module_completion::Entity::find()
            .join(JoinType::InnerJoin, module_completion::Relation::Module.def())
            .filter(module_completion::Column::StudentId.eq(student_id))
            .filter(module::Column::FormationId.eq(formation_id))
            .all(db)
            .await?;
        Ok(completions.into_iter().map(|c| c.module_id).collect())
    }

    pub async fn progress(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<Progress> {
        found(
            formation::Entity::find_by_id(formation_id).one(db).await?,
            "Formation",
        )?;

        let total = module::Entity::find()
            .filter(module::Column::FormationId.eq(formation_id))
            .count(db)
            .await?;
        let completed = module_completion::Entity::find()
            .join(JoinType::InnerJoin, module_completion::Relation::Module.def())
            .filter(module_completion::Column::StudentId.eq(student_id))
            .filter(module::Column::FormationId.eq(formation_id))
            .count(db)
            .await?;

        Ok(Progress::new(completed, total))
    }
}
