use super::{found, now, persist, release, store, unique_slug};
use crate::entities::club;
use crate::error::{ServiceError, ServiceResult};
use log::info;
use mailer::{Message, Notifier, Template};
use models::{
    forms::{ClubApplicationForm, ClubForm},
    status::ClubStatus,
    transition::{StateMachine, TransitionOutcome},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde_json::json;
use storage::{BlobStore, Upload, Visibility};
use uuid::Uuid;
use validator::Validate;

pub struct ClubService;

impl ClubService {
    const DIR: &'static str = "clubs";

    pub async fn list(
        db: &DatabaseConnection,
        active_only: bool,
    ) -> ServiceResult<Vec<club::Model>> {
        let mut query = club::Entity::find().order_by_asc(club::Column::Name);
        if active_only {
            query = query.filter(club::Column::Status.eq(ClubStatus::Active));
        }
        Ok(query.all(db).await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<club::Model> {
        found(club::Entity::find_by_id(id).one(db).await?, "Club")
    }

    pub async fn get_active_by_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> ServiceResult<club::Model> {
        found(
            club::Entity::find()
                .filter(club::Column::Slug.eq(slug))
                .filter(club::Column::Status.eq(ClubStatus::Active))
                .one(db)
                .await?,
            "Club",
        )
    }

    pub async fn create(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        form: ClubForm,
        logo: Option<Upload>,
    ) -> ServiceResult<club::Model> {
        form.validate()?;
        let slug = unique_slug::<club::Entity, _>(db, club::Column::Slug, &form.name).await?;
        let logo_path = store(storage, Self::DIR, logo.as_ref(), Visibility::Public).await?;
        let timestamp = now();

        let model = club::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(form.name),
            slug: Set(slug),
            description: Set(form.description),
            category: Set(form.category),
            logo_path: Set(logo_path.clone()),
            contact_email: Set(form.contact_email),
            status: Set(form.status.unwrap_or_default()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        };
        let created = persist(storage, logo_path.as_deref(), model.insert(db).await).await?;

        info!("Created club {} ({})", created.slug, created.id);
        Ok(created)
    }

    pub async fn update(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
        form: ClubForm,
        logo: Option<Upload>,
    ) -> ServiceResult<club::Model> {
        form.validate()?;
        let existing = Self::get(db, id).await?;
        let logo_path = store(storage, Self::DIR, logo.as_ref(), Visibility::Public).await?;
        let previous = existing.logo_path.clone();

        let mut active: club::ActiveModel = existing.into();
        active.name = Set(form.name);
        active.description = Set(form.description);
        active.category = Set(form.category);
        active.contact_email = Set(form.contact_email);
        if let Some(status) = form.status {
            active.status = Set(status);
        }
        if logo_path.is_some() {
            active.logo_path = Set(logo_path.clone());
        }
        active.updated_at = Set(now());

        let updated = persist(storage, logo_path.as_deref(), active.update(db).await).await?;
        release(storage, logo_path.is_some(), previous.as_deref()).await;
        Ok(updated)
    }

    pub async fn toggle_status(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> ServiceResult<(club::Model, TransitionOutcome<ClubStatus>)> {
        let existing = Self::get(db, id).await?;
        let outcome = existing.status.transition(existing.status.toggled())?;

        let mut active: club::ActiveModel = existing.into();
        active.status = Set(outcome.status());
        active.updated_at = Set(now());
        let updated = active.update(db).await?;

        info!("Club {} is now {:?}", updated.id, updated.status);
        Ok((updated, outcome))
    }

    pub async fn delete(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
    ) -> ServiceResult<()> {
        let existing = Self::get(db, id).await?;
        club::Entity::delete_by_id(id).exec(db).await?;
        storage::discard(storage, existing.logo_path.as_deref()).await;

        info!("Deleted club {id}");
        Ok(())
    }

    /// Forwards a membership application to the club and to the center
    pub async fn apply(
        db: &DatabaseConnection,
        notifier: &Notifier,
        id: Uuid,
        form: ClubApplicationForm,
    ) -> ServiceResult<()> {
        form.validate()?;
        let club = Self::get(db, id).await?;
        if club.status != ClubStatus::Active {
            return Err(ServiceError::StateConflict(
                "Ce club n'accepte pas de nouveaux membres.".to_owned(),
            ));
        }

        let data = json!({
            "name": form.name,
            "email": form.email,
            "club": club.name,
            "motivation": form.motivation,
        });
        for to in [club.contact_email.as_str(), notifier.admin_email()] {
            notifier
                .dispatch(Message::new(Template::ClubApplication, to, &data))
                .await;
        }

        info!("Forwarded application to club {}", club.id);
        Ok(())
    }
}
