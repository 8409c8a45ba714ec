use super::{found, now};
use crate::entities::reservation;
use crate::error::{ServiceError, ServiceResult};
use log::info;
use mailer::{Message, Notifier, Template};
use models::{
    forms::{ReservationForm, ReviewForm},
    registration::check_reservation,
    status::ReservationStatus,
    transition::{StateMachine, TransitionOutcome},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

pub struct ReservationService;

impl ReservationService {
    /// Books a resource; an email may only hold one pending request at a time
    pub async fn create(
        db: &DatabaseConnection,
        form: ReservationForm,
    ) -> ServiceResult<reservation::Model> {
        form.validate()?;
        let email = form.email.trim().to_lowercase();
        let pending = reservation::Entity::find()
            .filter(reservation::Column::Email.eq(email.as_str()))
            .filter(reservation::Column::Status.eq(ReservationStatus::Pending))
            .count(db)
            .await?;
        check_reservation(pending > 0)?;

        let timestamp = now();
        let created = reservation::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(form.name),
            email: Set(email),
            phone: Set(form.phone),
            resource: Set(form.resource),
            reserved_on: Set(form.reserved_on),
            starts_at: Set(form.starts_at),
            ends_at: Set(form.ends_at),
            purpose: Set(form.purpose),
            status: Set(ReservationStatus::Pending),
            admin_note: Set(None),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(db)
        .await?;

        info!("New reservation {} for {}", created.id, created.reserved_on);
        Ok(created)
    }

    pub async fn list(
        db: &DatabaseConnection,
        status: Option<ReservationStatus>,
    ) -> ServiceResult<Vec<reservation::Model>> {
        let mut query = reservation::Entity::find().order_by_desc(reservation::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(reservation::Column::Status.eq(status));
        }
        Ok(query.all(db).await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<reservation::Model> {
        found(
            reservation::Entity::find_by_id(id).one(db).await?,
            "Réservation",
        )
    }

    /// Approves or rejects a pending reservation and tells the requester.
    ///
    /// Re-applying the current decision changes nothing.
    pub async fn review(
        db: &DatabaseConnection,
        notifier: &Notifier,
        id: Uuid,
        status: ReservationStatus,
        review: ReviewForm,
    ) -> ServiceResult<(reservation::Model, TransitionOutcome<ReservationStatus>)> {
        review.validate()?;
        let existing = Self::get(db, id).await?;
        let outcome = existing.status.transition(status)?;
        if !outcome.is_applied() {
            return Ok((existing, outcome));
        }

        let mut active: reservation::ActiveModel = existing.into();
        active.status = Set(status);
        active.admin_note = Set(review.note);
        active.updated_at = Set(now());
        let updated = active.update(db).await?;
        info!("Reservation {id} is now {status:?}");

        let label = match status {
            ReservationStatus::Pending => "en attente",
            ReservationStatus::Approved => "approuvée",
            ReservationStatus::Rejected => "refusée",
        };
        notifier
            .dispatch(Message::new(
                Template::ReservationStatusChanged,
                &updated.email,
                &json!({
                    "name": updated.name,
                    "status": label,
                    "resource": updated.resource.label(),
                    "date": updated.reserved_on.format("%d/%m/%Y").to_string(),
                    "starts_at": updated.starts_at.format("%H:%M").to_string(),
                    "ends_at": updated.ends_at.format("%H:%M").to_string(),
                    "note": updated.admin_note,
                }),
            ))
            .await;

        Ok((updated, outcome))
    }

    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
        let result = reservation::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Réservation"));
        }
        Ok(())
    }
}
