use super::{found, now, persist, release, store, unique_slug};
use crate::entities::{event, event_registration};
use crate::error::{ServiceError, ServiceResult};
use log::info;
use mailer::{Message, Notifier, Template};
use models::{
    forms::{EventForm, EventRegistrationForm},
    registration::{EventGate, EventRegistrationPlan, RegistrationError, plan_event_registration},
    status::{EventRegistrationStatus, EventStatus},
    transition::{StateMachine, TransitionOutcome},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde_json::json;
use storage::{BlobStore, Upload, Visibility};
use uuid::Uuid;
use validator::Validate;

pub struct EventService;

impl EventService {
    const DIR: &'static str = "events";

    /// Brings the stored status in line with the calendar.
    ///
    /// Status is only derived from dates on read, so every read goes through here.
    async fn refresh<C: ConnectionTrait>(db: &C, model: event::Model) -> ServiceResult<event::Model> {
        let resolved = model.status.resolve(model.starts_at, model.ends_at, now());
        if resolved == model.status {
            return Ok(model);
        }

        let mut active: event::ActiveModel = model.into();
        active.status = Set(resolved);
        Ok(active.update(db).await?)
    }

    pub async fn list(db: &DatabaseConnection) -> ServiceResult<Vec<event::Model>> {
        let events = event::Entity::find()
            .order_by_asc(event::Column::StartsAt)
            .all(db)
            .await?;

        let mut refreshed = Vec::with_capacity(events.len());
        for model in events {
            refreshed.push(Self::refresh(db, model).await?);
        }
        Ok(refreshed)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<event::Model> {
        let model = found(event::Entity::find_by_id(id).one(db).await?, "Événement")?;
        Self::refresh(db, model).await
    }

    pub async fn get_by_slug(db: &DatabaseConnection, slug: &str) -> ServiceResult<event::Model> {
        let model = found(
            event::Entity::find()
                .filter(event::Column::Slug.eq(slug))
                .one(db)
                .await?,
            "Événement",
        )?;
        Self::refresh(db, model).await
    }

    pub async fn create(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        form: EventForm,
        image: Option<Upload>,
    ) -> ServiceResult<event::Model> {
        form.validate()?;
        let slug = unique_slug::<event::Entity, _>(db, event::Column::Slug, &form.title).await?;
        let image_path = store(storage, Self::DIR, image.as_ref(), Visibility::Public).await?;
        let timestamp = now();

        let model = event::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(form.title),
            slug: Set(slug),
            description: Set(form.description),
            location: Set(form.location),
            image_path: Set(image_path.clone()),
            starts_at: Set(form.starts_at),
            ends_at: Set(form.ends_at),
            max_attendees: Set(form.max_attendees),
            requires_approval: Set(form.requires_approval.unwrap_or(false)),
            status: Set(EventStatus::Upcoming.resolve(form.starts_at, form.ends_at, timestamp)),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        };
        let created = persist(storage, image_path.as_deref(), model.insert(db).await).await?;

        info!("Created event {} ({})", created.slug, created.id);
        Ok(created)
    }

    pub async fn update(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
        form: EventForm,
        image: Option<Upload>,
    ) -> ServiceResult<event::Model> {
        form.validate()?;
        let existing = Self::get(db, id).await?;
        let image_path = store(storage, Self::DIR, image.as_ref(), Visibility::Public).await?;
        let previous = existing.image_path.clone();
        let timestamp = now();
        let status = existing
            .status
            .resolve(form.starts_at, form.ends_at, timestamp);

        let mut active: event::ActiveModel = existing.into();
        active.title = Set(form.title);
        active.description = Set(form.description);
        active.location = Set(form.location);
        active.starts_at = Set(form.starts_at);
        active.ends_at = Set(form.ends_at);
        active.max_attendees = Set(form.max_attendees);
        if let Some(requires_approval) = form.requires_approval {
            active.requires_approval = Set(requires_approval);
        }
        if image_path.is_some() {
            active.image_path = Set(image_path.clone());
        }
        active.status = Set(status);
        active.updated_at = Set(timestamp);

        let updated = persist(storage, image_path.as_deref(), active.update(db).await).await?;
        release(storage, image_path.is_some(), previous.as_deref()).await;
        Ok(updated)
    }

    pub async fn delete(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
    ) -> ServiceResult<()> {
        let existing = Self::get(db, id).await?;

        let txn = db.begin().await?;
        event_registration::Entity::delete_many()
            .filter(event_registration::Column::EventId.eq(id))
            .exec(&txn)
            .await?;
        event::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        storage::discard(storage, existing.image_path.as_deref()).await;

        info!("Deleted event {id}");
        Ok(())
    }

    pub async fn cancel(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> ServiceResult<(event::Model, TransitionOutcome<EventStatus>)> {
        let existing = Self::get(db, id).await?;
        let outcome = existing.status.transition(EventStatus::Cancelled)?;
        if !outcome.is_applied() {
            return Ok((existing, outcome));
        }

        let mut active: event::ActiveModel = existing.into();
        active.status = Set(EventStatus::Cancelled);
        active.updated_at = Set(now());
        let updated = active.update(db).await?;

        info!("Cancelled event {id}");
        Ok((updated, outcome))
    }

    async fn active_count<C: ConnectionTrait>(db: &C, event_id: Uuid) -> ServiceResult<u64> {
        Ok(event_registration::Entity::find()
            .filter(event_registration::Column::EventId.eq(event_id))
            .filter(event_registration::Column::Status.is_in([
                EventRegistrationStatus::Pending,
                EventRegistrationStatus::Approved,
            ]))
            .count(db)
            .await?)
    }

    /// Registers the user, or revives their cancelled registration.
    ///
    /// Nothing is written when a gate fails.
    pub async fn register(
        db: &DatabaseConnection,
        user_id: Uuid,
        event_id: Uuid,
        form: EventRegistrationForm,
    ) -> ServiceResult<event_registration::Model> {
        form.validate()?;
        let event = Self::get(db, event_id).await?;
        let prior = event_registration::Entity::find()
            .filter(event_registration::Column::EventId.eq(event_id))
            .filter(event_registration::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        let active_count = Self::active_count(db, event_id).await?;

        let gate = EventGate {
            status: event.status,
            max_attendees: event.max_attendees,
            requires_approval: event.requires_approval,
        };
        let plan = plan_event_registration(gate, prior.as_ref().map(|r| r.status), active_count)?;
        let timestamp = now();

        let registration = match (plan, prior) {
            (EventRegistrationPlan::Reactivate(status), Some(prior)) => {
                let mut active: event_registration::ActiveModel = prior.into();
                active.name = Set(form.name);
                active.email = Set(form.email);
                active.phone = Set(form.phone);
                active.status = Set(status);
                active.created_at = Set(timestamp);
                active.updated_at = Set(timestamp);
                active.update(db).await?
            }
            (plan, _) => event_registration::ActiveModel {
                id: Set(Uuid::new_v4()),
                event_id: Set(event_id),
                user_id: Set(user_id),
                name: Set(form.name),
                email: Set(form.email),
                phone: Set(form.phone),
                status: Set(plan.status()),
                created_at: Set(timestamp),
                updated_at: Set(timestamp),
            }
            .insert(db)
            .await
            .map_err(|e| {
                ServiceError::conflict_on_duplicate(
                    e,
                    &RegistrationError::AlreadyRegistered.to_string(),
                )
            })?,
        };

        info!(
            "User {user_id} registered to event {event_id} as {:?}",
            registration.status
        );
        Ok(registration)
    }

    async fn get_registration(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> ServiceResult<event_registration::Model> {
        found(
            event_registration::Entity::find_by_id(id).one(db).await?,
            "Inscription",
        )
    }

    /// A user withdrawing their own registration
    pub async fn cancel_registration(
        db: &DatabaseConnection,
        user_id: Uuid,
        registration_id: Uuid,
    ) -> ServiceResult<TransitionOutcome<EventRegistrationStatus>> {
        let registration = Self::get_registration(db, registration_id).await?;
        if registration.user_id != user_id {
            return Err(ServiceError::forbidden(
                "Cette inscription ne vous appartient pas.",
            ));
        }

        let outcome = registration
            .status
            .transition(EventRegistrationStatus::Cancelled)?;
        if outcome.is_applied() {
            let mut active: event_registration::ActiveModel = registration.into();
            active.status = Set(EventRegistrationStatus::Cancelled);
            active.updated_at = Set(now());
            active.update(db).await?;
            info!("User {user_id} cancelled event registration {registration_id}");
        }
        Ok(outcome)
    }

    /// Admin decision on a registration; the user is told about any change
    pub async fn review_registration(
        db: &DatabaseConnection,
        notifier: &Notifier,
        registration_id: Uuid,
        status: EventRegistrationStatus,
    ) -> ServiceResult<(event_registration::Model, TransitionOutcome<EventRegistrationStatus>)>
    {
        let registration = Self::get_registration(db, registration_id).await?;
        let outcome = registration.status.transition(status)?;
        if !outcome.is_applied() {
            return Ok((registration, outcome));
        }

        let event = Self::get(db, registration.event_id).await?;
        if !registration.status.is_active()
            && status.is_active()
            && let Some(max) = event.max_attendees
            && Self::active_count(db, event.id).await? >= u64::try_from(max).unwrap_or(0)
        {
            return Err(RegistrationError::EventFull.into());
        }

        let mut active: event_registration::ActiveModel = registration.into();
        active.status = Set(status);
        active.updated_at = Set(now());
        let updated = active.update(db).await?;
        info!("Event registration {registration_id} is now {status:?}");

        notifier
            .dispatch(Message::new(
                Template::EventRegistrationStatusChanged,
                &updated.email,
                &json!({
                    "name": updated.name,
                    "event": event.title,
                    "starts_at": event.starts_at.format("%d/%m/%Y %H:%M").to_string(),
                    "status": Self::label(status),
                }),
            ))
            .await;

        Ok((updated, outcome))
    }

    fn label(status: EventRegistrationStatus) -> &'static str {
        match status {
            EventRegistrationStatus::Pending => "en attente",
            EventRegistrationStatus::Approved => "approuvée",
            EventRegistrationStatus::Rejected => "refusée",
            EventRegistrationStatus::Cancelled => "annulée",
        }
    }

    pub async fn registrations(
        db: &DatabaseConnection,
        event_id: Uuid,
    ) -> ServiceResult<Vec<event_registration::Model>> {
        Ok(event_registration::Entity::find()
            .filter(event_registration::Column::EventId.eq(event_id))
            .order_by_asc(event_registration::Column::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn registrations_for_user(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> ServiceResult<Vec<event_registration::Model>> {
        Ok(event_registration::Entity::find()
            .filter(event_registration::Column::UserId.eq(user_id))
            .order_by_desc(event_registration::Column::CreatedAt)
            .all(db)
            .await?)
    }
}
