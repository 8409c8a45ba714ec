use super::{found, now};
use crate::entities::user;
use crate::error::ServiceResult;
use log::info;
use models::{forms::ProfileForm, status::Role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;
use validator::Validate;

pub struct AccountService;

impl AccountService {
    pub async fn find_by_subject(
        db: &DatabaseConnection,
        subject: &str,
    ) -> ServiceResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Subject.eq(subject))
            .one(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<user::Model> {
        found(user::Entity::find_by_id(id).one(db).await?, "Compte")
    }

    /// Creates the account on first call, then keeps name and email in sync.
    ///
    /// `admin` only applies on creation; later role changes go through
    /// [`AccountService::set_role`].
    pub async fn save_profile(
        db: &DatabaseConnection,
        subject: &str,
        form: ProfileForm,
        admin: bool,
    ) -> ServiceResult<user::Model> {
        form.validate()?;
        let timestamp = now();

        let saved = match Self::find_by_subject(db, subject).await? {
            Some(existing) => {
                let mut active: user::ActiveModel = existing.into();
                active.name = Set(form.name);
                active.email = Set(form.email);
                active.updated_at = Set(timestamp);
                active.update(db).await?
            }
            None => {
                let role = if admin { Role::Admin } else { Role::Student };
                let created = user::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    subject: Set(subject.to_owned()),
                    name: Set(form.name),
                    email: Set(form.email),
                    role: Set(role),
                    created_at: Set(timestamp),
                    updated_at: Set(timestamp),
                }
                .insert(db)
                .await?;
                info!("Created {:?} account {}", created.role, created.id);
                created
            }
        };

        Ok(saved)
    }

    pub async fn set_role(
        db: &DatabaseConnection,
        id: Uuid,
        role: Role,
    ) -> ServiceResult<user::Model> {
        let existing = Self::get(db, id).await?;
        if existing.role == role {
            return Ok(existing);
        }

        let mut active: user::ActiveModel = existing.into();
        active.role = Set(role);
        active.updated_at = Set(now());
        let updated = active.update(db).await?;
        info!("Account {} is now {:?}", updated.id, updated.role);
        Ok(updated)
    }

    pub async fn list(db: &DatabaseConnection) -> ServiceResult<Vec<user::Model>> {
        Ok(user::Entity::find()
            .order_by_asc(user::Column::Name)
            .all(db)
            .await?)
    }
}
