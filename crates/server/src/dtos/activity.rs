use super::public_url;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use database::entities::{
    competition, competition_registration, competition_team_member, event, event_registration,
    reservation,
};
use models::content::ReservationResource;
use models::status::{
    CompetitionKind, CompetitionRegistrationStatus, CompetitionStatus, EventRegistrationStatus,
    EventStatus, ReservationStatus,
};
use serde::Serialize;
use storage::BlobStore;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: String,
    pub image_url: Option<String>,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub max_attendees: Option<i32>,
    pub requires_approval: bool,
    pub status: EventStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl EventResponse {
    pub fn new(event: event::Model, storage: &dyn BlobStore) -> Self {
        Self {
            image_url: public_url(storage, event.image_path.as_deref()),
            id: event.id,
            title: event.title,
            slug: event.slug,
            description: event.description,
            location: event.location,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            max_attendees: event.max_attendees,
            requires_approval: event.requires_approval,
            status: event.status,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventRegistrationResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: EventRegistrationStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<event_registration::Model> for EventRegistrationResponse {
    fn from(registration: event_registration::Model) -> Self {
        Self {
            id: registration.id,
            event_id: registration.event_id,
            user_id: registration.user_id,
            name: registration.name,
            email: registration.email,
            phone: registration.phone,
            status: registration.status,
            created_at: registration.created_at,
            updated_at: registration.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompetitionResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub held_on: NaiveDate,
    pub deadline: NaiveDateTime,
    pub max_participants: i32,
    pub kind: CompetitionKind,
    pub max_team_size: Option<i32>,
    pub status: CompetitionStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl CompetitionResponse {
    pub fn new(competition: competition::Model, storage: &dyn BlobStore) -> Self {
        Self {
            image_url: public_url(storage, competition.image_path.as_deref()),
            id: competition.id,
            title: competition.title,
            slug: competition.slug,
            description: competition.description,
            location: competition.location,
            held_on: competition.held_on,
            deadline: competition.deadline,
            max_participants: competition.max_participants,
            kind: competition.kind,
            max_team_size: competition.max_team_size,
            status: competition.status,
            created_at: competition.created_at,
            updated_at: competition.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamMemberResponse {
    pub name: String,
    pub email: Option<String>,
}

impl From<competition_team_member::Model> for TeamMemberResponse {
    fn from(member: competition_team_member::Model) -> Self {
        Self {
            name: member.name,
            email: member.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompetitionRegistrationResponse {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub team_name: Option<String>,
    pub status: CompetitionRegistrationStatus,
    /// Empty for individual competitions
    pub members: Vec<TeamMemberResponse>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl CompetitionRegistrationResponse {
    pub fn new(
        registration: competition_registration::Model,
        members: Vec<competition_team_member::Model>,
    ) -> Self {
        Self {
            id: registration.id,
            competition_id: registration.competition_id,
            user_id: registration.user_id,
            name: registration.name,
            email: registration.email,
            team_name: registration.team_name,
            status: registration.status,
            members: members.into_iter().map(Into::into).collect(),
            created_at: registration.created_at,
            updated_at: registration.updated_at,
        }
    }
}

impl From<competition_registration::Model> for CompetitionRegistrationResponse {
    fn from(registration: competition_registration::Model) -> Self {
        Self::new(registration, Vec::new())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resource: ReservationResource,
    pub reserved_on: NaiveDate,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub purpose: String,
    pub status: ReservationStatus,
    pub admin_note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<reservation::Model> for ReservationResponse {
    fn from(reservation: reservation::Model) -> Self {
        Self {
            id: reservation.id,
            name: reservation.name,
            email: reservation.email,
            phone: reservation.phone,
            resource: reservation.resource,
            reserved_on: reservation.reserved_on,
            starts_at: reservation.starts_at,
            ends_at: reservation.ends_at,
            purpose: reservation.purpose,
            status: reservation.status,
            admin_note: reservation.admin_note,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}
