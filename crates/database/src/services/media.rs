use super::{found, now, persist, release, store};
use crate::entities::media;
use crate::error::ServiceResult;
use log::info;
use models::{content::MediaKind, forms::MediaForm};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::borrow::Cow;
use storage::{BlobStore, Upload, Visibility};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

pub struct MediaService;

impl MediaService {
    const DIR: &'static str = "media";

    pub async fn list(
        db: &DatabaseConnection,
        public_only: bool,
        kind: Option<MediaKind>,
    ) -> ServiceResult<Vec<media::Model>> {
        let mut query = media::Entity::find().order_by_desc(media::Column::CreatedAt);
        if public_only {
            query = query.filter(media::Column::IsPublic.eq(true));
        }
        if let Some(kind) = kind {
            query = query.filter(media::Column::Kind.eq(kind));
        }
        Ok(query.all(db).await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<media::Model> {
        found(media::Entity::find_by_id(id).one(db).await?, "Média")
    }

    /// A media entry cannot exist without its file
    pub async fn create(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        form: MediaForm,
        file: Option<Upload>,
    ) -> ServiceResult<media::Model> {
        form.validate()?;
        let Some(file) = file else {
            let mut error = ValidationError::new("required");
            error.message = Some(Cow::Borrowed("Le fichier est requis."));
            let mut errors = ValidationErrors::new();
            errors.add("file", error);
            return Err(errors.into());
        };

        let path = storage.put(Self::DIR, &file, Visibility::Public).await?;
        let timestamp = now();
        let model = media::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(form.title),
            description: Set(form.description),
            kind: Set(form.kind),
            file_path: Set(path.clone()),
            is_public: Set(form.is_public.unwrap_or(true)),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        };
        let created = persist(storage, Some(path.as_str()), model.insert(db).await).await?;

        info!("Added {:?} media {}", created.kind, created.id);
        Ok(created)
    }

    pub async fn update(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
        form: MediaForm,
        file: Option<Upload>,
    ) -> ServiceResult<media::Model> {
        form.validate()?;
        let existing = Self::get(db, id).await?;
        let file_path = store(storage, Self::DIR, file.as_ref(), Visibility::Public).await?;
        let previous = existing.file_path.clone();

        let mut active: media::ActiveModel = existing.into();
        active.title = Set(form.title);
        active.description = Set(form.description);
        active.kind = Set(form.kind);
        if let Some(is_public) = form.is_public {
            active.is_public = Set(is_public);
        }
        if let Some(path) = &file_path {
            active.file_path = Set(path.clone());
        }
        active.updated_at = Set(now());

        let updated = persist(storage, file_path.as_deref(), active.update(db).await).await?;
        release(storage, file_path.is_some(), Some(previous.as_str())).await;
        Ok(updated)
    }

    pub async fn delete(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
    ) -> ServiceResult<()> {
        let existing = Self::get(db, id).await?;
        media::Entity::delete_by_id(id).exec(db).await?;
        storage::discard(storage, Some(existing.file_path.as_str())).await;

        info!("Deleted media {id}");
        Ok(())
    }
}
