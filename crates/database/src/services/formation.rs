use super::{found, now, persist, release, store, unique_slug};
use crate::entities::{certificate, formation, formation_registration, module, module_completion};
use crate::error::ServiceResult;
use log::info;
use models::{
    forms::FormationForm,
    status::PublicationStatus,
    transition::{StateMachine, TransitionOutcome},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use storage::{BlobStore, Upload, Visibility};
use uuid::Uuid;
use validator::Validate;

pub struct FormationService;

impl FormationService {
    const DIR: &'static str = "formations";

    pub async fn list(
        db: &DatabaseConnection,
        published_only: bool,
    ) -> ServiceResult<Vec<formation::Model>> {
        let mut query = formation::Entity::find().order_by_desc(formation::Column::CreatedAt);
        if published_only {
            query = query.filter(formation::Column::Status.eq(PublicationStatus::Published));
        }
        Ok(query.all(db).await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<formation::Model> {
        found(formation::Entity::find_by_id(id).one(db).await?, "Formation")
    }

    /// Public lookup; drafts are invisible
    pub async fn get_published_by_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> ServiceResult<formation::Model> {
        found(
            formation::Entity::find()
                .filter(formation::Column::Slug.eq(slug))
                .filter(formation::Column::Status.eq(PublicationStatus::Published))
                .one(db)
                .await?,
            "Formation",
        )
    }

    pub async fn create(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        form: FormationForm,
        image: Option<Upload>,
    ) -> ServiceResult<formation::Model> {
        form.validate()?;
        let slug = unique_slug::<formation::Entity, _>(db, formation::Column::Slug, &form.title)
            .await?;
        let image_path = store(storage, Self::DIR, image.as_ref(), Visibility::Public).await?;
        let timestamp = now();

        let model = formation::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(form.title),
            slug: Set(slug),
            description: Set(form.description),
            level: Set(form.level),
            duration_hours: Set(form.duration_hours),
            image_path: Set(image_path.clone()),
            status: Set(form.status.unwrap_or_default()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        };
        let created = persist(storage, image_path.as_deref(), model.insert(db).await).await?;

        info!("Created formation {} ({})", created.slug, created.id);
        Ok(created)
    }

    pub async fn update(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
        form: FormationForm,
        image: Option<Upload>,
    ) -> ServiceResult<formation::Model> {
        form.validate()?;
        let existing = Self::get(db, id).await?;
        let image_path = store(storage, Self::DIR, image.as_ref(), Visibility::Public).await?;
        let previous = existing.image_path.clone();

        let mut active: formation::ActiveModel = existing.into();
        active.title = Set(form.title);
        active.description = Set(form.description);
        active.level = Set(form.level);
        active.duration_hours = Set(form.duration_hours);
        if let Some(status) = form.status {
            active.status = Set(status);
        }
        if image_path.is_some() {
            active.image_path = Set(image_path.clone());
        }
        active.updated_at = Set(now());

        let updated = persist(storage, image_path.as_deref(), active.update(db).await).await?;
        release(storage, image_path.is_some(), previous.as_deref()).await;
        Ok(updated)
    }

    pub async fn toggle_status(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> ServiceResult<(formation::Model, TransitionOutcome<PublicationStatus>)> {
        let existing = Self::get(db, id).await?;
        let outcome = existing.status.transition(existing.status.toggled())?;

        let mut active: formation::ActiveModel = existing.into();
        active.status = Set(outcome.status());
        active.updated_at = Set(now());
        let updated = active.update(db).await?;

        info!("Formation {} is now {:?}", updated.id, updated.status);
        Ok((updated, outcome))
    }

    /// Removes the formation with its modules, completions, enrollments and
    /// certificates, then their files.
    pub async fn delete(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
    ) -> ServiceResult<()> {
        let existing = Self::get(db, id).await?;

        let txn = db.begin().await?;
        let modules = module::Entity::find()
            .filter(module::Column::FormationId.eq(id))
            .all(&txn)
            .await?;
        let module_ids: Vec<Uuid> = modules.iter().map(|m| m.id).collect();
        let certificates = certificate::Entity::find()
            .filter(certificate::Column::FormationId.eq(id))
            .all(&txn)
            .await?;

        module_completion::Entity::delete_many()
            .filter(module_completion::Column::ModuleId.is_in(module_ids))
            .exec(&txn)
            .await?;
        module::Entity::delete_many()
            .filter(module::Column::FormationId.eq(id))
            .exec(&txn)
            .await?;
        formation_registration::Entity::delete_many()
            .filter(formation_registration::Column::FormationId.eq(id))
            .exec(&txn)
            .await?;
        certificate::Entity::delete_many()
            .filter(certificate::Column::FormationId.eq(id))
            .exec(&txn)
            .await?;
        formation::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        let files = std::iter::once(existing.image_path)
            .chain(modules.into_iter().map(|m| m.file_path))
            .chain(certificates.into_iter().map(|c| c.file_path))
            .flatten();
        for path in files {
            storage::discard(storage, Some(path.as_str())).await;
        }

        info!("Deleted formation {id}");
        Ok(())
    }
}
