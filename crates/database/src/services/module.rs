use super::{found, now, persist, release, store};
use crate::entities::{formation, module, module_completion};
use crate::error::{ServiceError, ServiceResult};
use log::info;
use models::forms::ModuleForm;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use storage::{BlobStore, Upload, Visibility};
use uuid::Uuid;
use validator::Validate;

pub struct ModuleService;

impl ModuleService {
    /// Module files are only served to enrolled students
    const DIR: &'static str = "modules";

    pub async fn list(
        db: &DatabaseConnection,
        formation_id: Uuid,
    ) -> ServiceResult<Vec<module::Model>> {
        Ok(module::Entity::find()
            .filter(module::Column::FormationId.eq(formation_id))
            .order_by_asc(module::Column::Position)
            .order_by_asc(module::Column::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<module::Model> {
        found(module::Entity::find_by_id(id).one(db).await?, "Module")
    }

    /// Without an explicit position the module is appended
    pub async fn create(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        formation_id: Uuid,
        form: ModuleForm,
        file: Option<Upload>,
    ) -> ServiceResult<module::Model> {
        form.validate()?;
        found(
            formation::Entity::find_by_id(formation_id).one(db).await?,
            "Formation",
        )?;

        let position = match form.position {
            Some(position) => position,
            None => {
                let count = module::Entity::find()
                    .filter(module::Column::FormationId.eq(formation_id))
                    .count(db)
                    .await?;
                i32::try_from(count).unwrap_or(i32::MAX)
            }
        };
        let file_path = store(storage, Self::DIR, file.as_ref(), Visibility::Private).await?;
        let timestamp = now();

        let model = module::ActiveModel {
            id: Set(Uuid::new_v4()),
            formation_id: Set(formation_id),
            title: Set(form.title),
            description: Set(form.description),
            content: Set(form.content),
            position: Set(position),
            file_path: Set(file_path.clone()),
            file_mime: Set(file.and_then(|f| f.content_type)),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        };
        let created = persist(storage, file_path.as_deref(), model.insert(db).await).await?;

        info!("Added module {} to formation {formation_id}", created.id);
        Ok(created)
    }

    pub async fn update(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
        form: ModuleForm,
        file: Option<Upload>,
    ) -> ServiceResult<module::Model> {
        form.validate()?;
        let existing = Self::get(db, id).await?;
        let file_path = store(storage, Self::DIR, file.as_ref(), Visibility::Private).await?;
        let previous = existing.file_path.clone();

        let mut active: module::ActiveModel = existing.into();
        active.title = Set(form.title);
        active.description = Set(form.description);
        active.content = Set(form.content);
        if let Some(position) = form.position {
            active.position = Set(position);
        }
        if let Some(file) = file {
            active.file_path = Set(file_path.clone());
            active.file_mime = Set(file.content_type);
        }
        active.updated_at = Set(now());

        let updated = persist(storage, file_path.as_deref(), active.update(db).await).await?;
        release(storage, file_path.is_some(), previous.as_deref()).await;
        Ok(updated)
    }

    /// Positions of the remaining modules are left as they are
    pub async fn delete(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
    ) -> ServiceResult<()> {
        let existing = Self::get(db, id).await?;

        module_completion::Entity::delete_many()
            .filter(module_completion::Column::ModuleId.eq(id))
            .exec(db)
            .await?;
        module::Entity::delete_by_id(id).exec(db).await?;
        storage::discard(storage, existing.file_path.as_deref()).await;

        info!("Deleted module {id}");
        Ok(())
    }

    pub async fn read_file(
        storage: &dyn BlobStore,
        module: &module::Model,
    ) -> ServiceResult<Vec<u8>> {
        let path = module
            .file_path
            .as_deref()
            .ok_or(ServiceError::NotFound("Fichier"))?;
        Ok(storage.read(path).await?)
    }
}
