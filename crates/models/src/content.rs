use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ArticleCategory {
    #[sea_orm(string_value = "news")]
    News,
    #[sea_orm(string_value = "tutorial")]
    Tutorial,
    #[sea_orm(string_value = "announcement")]
    Announcement,
    #[sea_orm(string_value = "success_story")]
    SuccessStory,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "document")]
    Document,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ClubCategory {
    #[sea_orm(string_value = "tech")]
    Tech,
    #[sea_orm(string_value = "science")]
    Science,
    #[sea_orm(string_value = "culture")]
    Culture,
    #[sea_orm(string_value = "entrepreneurship")]
    Entrepreneurship,
    #[sea_orm(string_value = "other")]
    Other,
}

/// What can be booked at the center
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ReservationResource {
    #[sea_orm(string_value = "room")]
    Room,
    #[sea_orm(string_value = "computer")]
    Computer,
    #[sea_orm(string_value = "equipment")]
    Equipment,
}

impl ReservationResource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Room => "salle",
            Self::Computer => "poste informatique",
            Self::Equipment => "équipement",
        }
    }
}
