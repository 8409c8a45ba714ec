use super::{found, now, persist, release, store, unique_slug};
use crate::entities::{article, article_image};
use crate::error::{ServiceError, ServiceResult};
use futures::future::join_all;
use log::info;
use models::{
    content::ArticleCategory,
    forms::ArticleForm,
    status::PublicationStatus,
    transition::{StateMachine, TransitionOutcome},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use storage::{BlobStore, Upload, Visibility};
use uuid::Uuid;
use validator::Validate;

/// An article with its gallery, in display order
pub type ArticleWithImages = (article::Model, Vec<article_image::Model>);

pub struct ArticleService;

impl ArticleService {
    const DIR: &'static str = "articles";
    const GALLERY_DIR: &'static str = "articles/gallery";

    pub async fn list(
        db: &DatabaseConnection,
        published_only: bool,
        category: Option<ArticleCategory>,
    ) -> ServiceResult<Vec<article::Model>> {
        let mut query = article::Entity::find()
            .order_by_desc(article::Column::PublishedAt)
            .order_by_desc(article::Column::CreatedAt);
        if published_only {
            query = query.filter(article::Column::Status.eq(PublicationStatus::Published));
        }
        if let Some(category) = category {
            query = query.filter(article::Column::Category.eq(category));
        }
        Ok(query.all(db).await?)
    }

    async fn images<C: ConnectionTrait>(
        db: &C,
        article_id: Uuid,
    ) -> Result<Vec<article_image::Model>, DbErr> {
        article_image::Entity::find()
            .filter(article_image::Column::ArticleId.eq(article_id))
            .order_by_asc(article_image::Column::Position)
            .all(db)
            .await
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<ArticleWithImages> {
        let model = found(article::Entity::find_by_id(id).one(db).await?, "Article")?;
        let images = Self::images(db, id).await?;
        Ok((model, images))
    }

    pub async fn get_published_by_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> ServiceResult<ArticleWithImages> {
        let model = found(
            article::Entity::find()
                .filter(article::Column::Slug.eq(slug))
                .filter(article::Column::Status.eq(PublicationStatus::Published))
                .one(db)
                .await?,
            "Article",
        )?;
        let images = Self::images(db, model.id).await?;
        Ok((model, images))
    }

    async fn store_gallery(
        storage: &dyn BlobStore,
        images: &[Upload],
    ) -> ServiceResult<Vec<String>> {
        let mut paths = Vec::with_capacity(images.len());
        for image in images {
            match storage.put(Self::GALLERY_DIR, image, Visibility::Public).await {
                Ok(path) => paths.push(path),
                Err(e) => {
                    Self::discard_all(storage, &paths).await;
                    return Err(e.into());
                }
            }
        }
        Ok(paths)
    }

    async fn discard_all(storage: &dyn BlobStore, paths: &[String]) {
        join_all(
            paths
                .iter()
                .map(|path| storage::discard(storage, Some(path.as_str()))),
        )
        .await;
    }

    async fn insert_images<C: ConnectionTrait>(
        db: &C,
        article_id: Uuid,
        first_position: i32,
        paths: &[String],
    ) -> Result<(), DbErr> {
        for (offset, path) in paths.iter().enumerate() {
            article_image::ActiveModel {
                id: Set(Uuid::new_v4()),
                article_id: Set(article_id),
                path: Set(path.clone()),
                position: Set(first_position + i32::try_from(offset).unwrap_or(i32::MAX)),
            }
            .insert(db)
            .await?;
        }
        Ok(())
    }

    pub async fn create(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        form: ArticleForm,
        cover: Option<Upload>,
        images: Vec<Upload>,
    ) -> ServiceResult<ArticleWithImages> {
        form.validate()?;
        let slug = unique_slug::<article::Entity, _>(db, article::Column::Slug, &form.title).await?;
        let cover_path = store(storage, Self::DIR, cover.as_ref(), Visibility::Public).await?;
        let gallery = match Self::store_gallery(storage, &images).await {
            Ok(paths) => paths,
            Err(e) => {
                storage::discard(storage, cover_path.as_deref()).await;
                return Err(e);
            }
        };

        let timestamp = now();
        let status = form.status.unwrap_or_default();
        let id = Uuid::new_v4();
        let model = article::ActiveModel {
            id: Set(id),
            title: Set(form.title),
            slug: Set(slug),
            excerpt: Set(form.excerpt),
            body: Set(form.body),
            category: Set(form.category),
            status: Set(status),
            cover_path: Set(cover_path.clone()),
            published_at: Set((status == PublicationStatus::Published).then_some(timestamp)),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        };

        let written = async {
            let txn = db.begin().await?;
            model.insert(&txn).await?;
            Self::insert_images(&txn, id, 0, &gallery).await?;
            txn.commit().await
        }
        .await;
        if written.is_err() {
            Self::discard_all(storage, &gallery).await;
        }
        persist(storage, cover_path.as_deref(), written).await?;

        info!("Created article {id} with {} images", gallery.len());
        Self::get(db, id).await
    }

    /// New images are appended to the gallery; a new cover replaces the old one
    pub async fn update(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
        form: ArticleForm,
        cover: Option<Upload>,
        images: Vec<Upload>,
    ) -> ServiceResult<ArticleWithImages> {
        form.validate()?;
        let (existing, current_images) = Self::get(db, id).await?;
        let cover_path = store(storage, Self::DIR, cover.as_ref(), Visibility::Public).await?;
        let gallery = match Self::store_gallery(storage, &images).await {
            Ok(paths) => paths,
            Err(e) => {
                storage::discard(storage, cover_path.as_deref()).await;
                return Err(e);
            }
        };
        let previous = existing.cover_path.clone();
        let next_position = current_images
            .last()
            .map(|image| image.position + 1)
            .unwrap_or(0);
        let timestamp = now();

        let mut active: article::ActiveModel = existing.clone().into();
        active.title = Set(form.title);
        active.excerpt = Set(form.excerpt);
        active.body = Set(form.body);
        active.category = Set(form.category);
        if let Some(status) = form.status {
            active.status = Set(status);
            if status == PublicationStatus::Published && existing.published_at.is_none() {
                active.published_at = Set(Some(timestamp));
            }
        }
        if cover_path.is_some() {
            active.cover_path = Set(cover_path.clone());
        }
        active.updated_at = Set(timestamp);

        let written = async {
            let txn = db.begin().await?;
            active.update(&txn).await?;
            Self::insert_images(&txn, id, next_position, &gallery).await?;
            txn.commit().await
        }
        .await;
        if written.is_err() {
            Self::discard_all(storage, &gallery).await;
        }
        persist(storage, cover_path.as_deref(), written).await?;
        release(storage, cover_path.is_some(), previous.as_deref()).await;

        Self::get(db, id).await
    }

    pub async fn remove_image(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        article_id: Uuid,
        image_id: Uuid,
    ) -> ServiceResult<()> {
        let image = article_image::Entity::find_by_id(image_id)
            .filter(article_image::Column::ArticleId.eq(article_id))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Image"))?;

        article_image::Entity::delete_by_id(image_id).exec(db).await?;
        storage::discard(storage, Some(image.path.as_str())).await;
        Ok(())
    }

    /// Publishing for the first time stamps `published_at`
    pub async fn toggle_status(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> ServiceResult<(article::Model, TransitionOutcome<PublicationStatus>)> {
        let existing = found(article::Entity::find_by_id(id).one(db).await?, "Article")?;
        let outcome = existing.status.transition(existing.status.toggled())?;
        let timestamp = now();
        let first_publication =
            outcome.status() == PublicationStatus::Published && existing.published_at.is_none();

        let mut active: article::ActiveModel = existing.into();
        active.status = Set(outcome.status());
        if first_publication {
            active.published_at = Set(Some(timestamp));
        }
        active.updated_at = Set(timestamp);
        let updated = active.update(db).await?;

        info!("Article {} is now {:?}", updated.id, updated.status);
        Ok((updated, outcome))
    }

    pub async fn delete(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
    ) -> ServiceResult<()> {
        let (existing, images) = Self::get(db, id).await?;

        let txn = db.begin().await?;
        article_image::Entity::delete_many()
            .filter(article_image::Column::ArticleId.eq(id))
            .exec(&txn)
            .await?;
        article::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        storage::discard(storage, existing.cover_path.as_deref()).await;
        let paths: Vec<String> = images.into_iter().map(|image| image.path).collect();
        Self::discard_all(storage, &paths).await;

        info!("Deleted article {id}");
        Ok(())
    }
}
