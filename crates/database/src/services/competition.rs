use super::{found, now, persist, release, store, unique_slug};
use crate::entities::{competition, competition_registration, competition_team_member};
use crate::error::{ServiceError, ServiceResult};
use log::info;
use mailer::{Message, Notifier, Template};
use models::{
    forms::{CompetitionForm, CompetitionRegistrationForm},
    registration::{
        CompetitionGate, RegistrationError, check_competition_registration,
        check_confirmation_capacity, validate_team,
    },
    status::{CompetitionRegistrationStatus, CompetitionStatus},
    transition::{StateMachine, TransitionOutcome},
};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde_json::json;
use storage::{BlobStore, Upload, Visibility};
use uuid::Uuid;
use validator::Validate;

/// A registration with its team, in member order
pub type RegistrationWithTeam = (
    competition_registration::Model,
    Vec<competition_team_member::Model>,
);

pub struct CompetitionService;

impl CompetitionService {
    const DIR: &'static str = "competitions";

    pub async fn list(db: &DatabaseConnection) -> ServiceResult<Vec<competition::Model>> {
        Ok(competition::Entity::find()
            .order_by_asc(competition::Column::HeldOn)
            .all(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<competition::Model> {
        found(
            competition::Entity::find_by_id(id).one(db).await?,
            "Concours",
        )
    }

    pub async fn get_by_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> ServiceResult<competition::Model> {
        found(
            competition::Entity::find()
                .filter(competition::Column::Slug.eq(slug))
                .one(db)
                .await?,
            "Concours",
        )
    }

    pub async fn create(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        form: CompetitionForm,
        image: Option<Upload>,
    ) -> ServiceResult<competition::Model> {
        form.validate()?;
        let slug = unique_slug::<competition::Entity, _>(db, competition::Column::Slug, &form.title)
            .await?;
        let image_path = store(storage, Self::DIR, image.as_ref(), Visibility::Public).await?;
        let timestamp = now();

        let model = competition::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(form.title),
            slug: Set(slug),
            description: Set(form.description),
            location: Set(form.location),
            image_path: Set(image_path.clone()),
            held_on: Set(form.held_on),
            deadline: Set(form.deadline),
            max_participants: Set(form.max_participants),
            kind: Set(form.kind),
            max_team_size: Set(form.max_team_size),
            status: Set(CompetitionStatus::Open),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        };
        let created = persist(storage, image_path.as_deref(), model.insert(db).await).await?;

        info!("Created competition {} ({})", created.slug, created.id);
        Ok(created)
    }

    /// A new size may open or fill the competition
    pub async fn update(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
        form: CompetitionForm,
        image: Option<Upload>,
    ) -> ServiceResult<competition::Model> {
        form.validate()?;
        let existing = Self::get(db, id).await?;
        let confirmed = Self::confirmed_count(db, id).await?;
        let image_path = store(storage, Self::DIR, image.as_ref(), Visibility::Public).await?;
        let previous = existing.image_path.clone();
        let status = existing
            .status
            .for_confirmed(confirmed, form.max_participants);

        let mut active: competition::ActiveModel = existing.into();
        active.title = Set(form.title);
        active.description = Set(form.description);
        active.location = Set(form.location);
        active.held_on = Set(form.held_on);
        active.deadline = Set(form.deadline);
        active.max_participants = Set(form.max_participants);
        active.kind = Set(form.kind);
        active.max_team_size = Set(form.max_team_size);
        active.status = Set(status);
        if image_path.is_some() {
            active.image_path = Set(image_path.clone());
        }
        active.updated_at = Set(now());

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
        let registration_ids: Vec<Uuid> = competition_registration::Entity::find()
            .filter(competition_registration::Column::CompetitionId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        competition_team_member::Entity::delete_many()
            .filter(competition_team_member::Column::RegistrationId.is_in(registration_ids))
            .exec(&txn)
            .await?;
        competition_registration::Entity::delete_many()
            .filter(competition_registration::Column::CompetitionId.eq(id))
            .exec(&txn)
            .await?;
        competition::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        storage::discard(storage, existing.image_path.as_deref()).await;
        info!("Deleted competition {id}");
        Ok(())
    }

    pub async fn close(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> ServiceResult<(competition::Model, TransitionOutcome<CompetitionStatus>)> {
        let existing = Self::get(db, id).await?;
        Self::set_status(db, existing, CompetitionStatus::Closed).await
    }

    /// Reopens as `Ouvert`, or `Complet` if already at capacity
    pub async fn reopen(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> ServiceResult<(competition::Model, TransitionOutcome<CompetitionStatus>)> {
        let existing = Self::get(db, id).await?;
        if existing.status != CompetitionStatus::Closed {
            let status = existing.status;
            return Ok((existing, TransitionOutcome::Unchanged { status }));
        }

        let confirmed = Self::confirmed_count(db, id).await?;
        let target = CompetitionStatus::Open.for_confirmed(confirmed, existing.max_participants);
        Self::set_status(db, existing, target).await
    }

    async fn set_status<C: ConnectionTrait>(
        db: &C,
        existing: competition::Model,
        status: CompetitionStatus,
    ) -> ServiceResult<(competition::Model, TransitionOutcome<CompetitionStatus>)> {
        let outcome = existing.status.transition(status)?;
        if !outcome.is_applied() {
            return Ok((existing, outcome));
        }

        let mut active: competition::ActiveModel = existing.into();
        active.status = Set(status);
        active.updated_at = Set(now());
        let updated = active.update(db).await?;

        info!("Competition {} is now {}", updated.id, status.to_value());
        Ok((updated, outcome))
    }

    async fn confirmed_count<C: ConnectionTrait>(db: &C, competition_id: Uuid) -> ServiceResult<u64> {
        Ok(competition_registration::Entity::find()
            .filter(competition_registration::Column::CompetitionId.eq(competition_id))
            .filter(
                competition_registration::Column::Status
                    .eq(CompetitionRegistrationStatus::Confirmed),
            )
            .count(db)
            .await?)
    }

    /// Applies for the competition, with team members for group competitions
    pub async fn register(
        db: &DatabaseConnection,
        user_id: Uuid,
        competition_id: Uuid,
        form: CompetitionRegistrationForm,
    ) -> ServiceResult<RegistrationWithTeam> {
        form.validate()?;
        let competition = Self::get(db, competition_id).await?;
        let already = competition_registration::Entity::find()
            .filter(competition_registration::Column::CompetitionId.eq(competition_id))
            .filter(competition_registration::Column::UserId.eq(user_id))
            .count(db)
            .await?
            > 0;
        let confirmed = Self::confirmed_count(db, competition_id).await?;

        let gate = CompetitionGate {
            status: competition.status,
            deadline: competition.deadline,
            max_participants: competition.max_participants,
        };
        let timestamp = now();
        check_competition_registration(gate, already, confirmed, timestamp)?;
        validate_team(
            competition.kind,
            competition.max_team_size,
            form.team_name.as_deref(),
            form.members.len(),
        )?;

        let txn = db.begin().await?;
        let registration = competition_registration::ActiveModel {
            id: Set(Uuid::new_v4()),
            competition_id: Set(competition_id),
            user_id: Set(user_id),
            name: Set(form.name),
            email: Set(form.email),
            team_name: Set(form.team_name.filter(|name| !name.trim().is_empty())),
            status: Set(CompetitionRegistrationStatus::Pending),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            ServiceError::conflict_on_duplicate(e, &RegistrationError::AlreadyApplied.to_string())
        })?;

        let mut members = Vec::with_capacity(form.members.len());
        for (position, member) in form.members.into_iter().enumerate() {
            let member = competition_team_member::ActiveModel {
                id: Set(Uuid::new_v4()),
                registration_id: Set(registration.id),
                name: Set(member.name),
                email: Set(member.email),
                position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
            }
            .insert(&txn)
            .await?;
            members.push(member);
        }
        txn.commit().await?;

        info!("User {user_id} applied to competition {competition_id}");
        Ok((registration, members))
    }

    /// Admin decision on a registration.
    ///
    /// Confirming is refused once the competition is full; the competition
    /// status follows the new confirmed count in the same transaction.
    pub async fn review_registration(
        db: &DatabaseConnection,
        notifier: &Notifier,
        registration_id: Uuid,
        status: CompetitionRegistrationStatus,
    ) -> ServiceResult<(
        competition_registration::Model,
        TransitionOutcome<CompetitionRegistrationStatus>,
    )> {
        let txn = db.begin().await?;
        let registration = found(
            competition_registration::Entity::find_by_id(registration_id)
                .one(&txn)
                .await?,
            "Inscription",
        )?;
        let outcome = registration.status.transition(status)?;
        if !outcome.is_applied() {
            return Ok((registration, outcome));
        }

        let competition = found(
            competition::Entity::find_by_id(registration.competition_id)
                .one(&txn)
                .await?,
            "Concours",
        )?;
        if status == CompetitionRegistrationStatus::Confirmed {
            let confirmed = Self::confirmed_count(&txn, competition.id).await?;
            check_confirmation_capacity(confirmed, competition.max_participants)?;
        }

        let mut active: competition_registration::ActiveModel = registration.into();
        active.status = Set(status);
        active.updated_at = Set(now());
        let updated = active.update(&txn).await?;

        let confirmed = Self::confirmed_count(&txn, competition.id).await?;
        let competition_status = competition
            .status
            .for_confirmed(confirmed, competition.max_participants);
        let title = competition.title.clone();
        let held_on = competition.held_on;
        Self::set_status(&txn, competition, competition_status).await?;
        txn.commit().await?;

        info!(
            "Competition registration {registration_id} is now {}",
            status.to_value()
        );
        notifier
            .dispatch(Message::new(
                Template::CompetitionRegistrationStatusChanged,
                &updated.email,
                &json!({
                    "name": updated.name,
                    "competition": title,
                    "date": held_on.format("%d/%m/%Y").to_string(),
                    "status": status.to_value(),
                }),
            ))
            .await;

        Ok((updated, outcome))
    }

    pub async fn registrations(
        db: &DatabaseConnection,
        competition_id: Uuid,
    ) -> ServiceResult<Vec<RegistrationWithTeam>> {
        let mut registrations = competition_registration::Entity::find()
            .filter(competition_registration::Column::CompetitionId.eq(competition_id))
            .order_by_asc(competition_registration::Column::CreatedAt)
            .find_with_related(competition_team_member::Entity)
            .all(db)
            .await?;

        for (_, members) in &mut registrations {
            members.sort_by_key(|m| m.position);
        }
        Ok(registrations)
    }

    pub async fn registrations_for_user(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> ServiceResult<Vec<competition_registration::Model>> {
        Ok(competition_registration::Entity::find()
            .filter(competition_registration::Column::UserId.eq(user_id))
            .order_by_desc(competition_registration::Column::CreatedAt)
            .all(db)
            .await?)
    }
}
