use models::{content::ReservationResource, status::ReservationStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Request to book a room or a machine; at most one pending per email
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resource: ReservationResource,
    pub reserved_on: Date,
    pub starts_at: Time,
    pub ends_at: Time,
    #[sea_orm(column_type = "Text")]
    pub purpose: String,
    pub status: ReservationStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_note: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
