use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role carried by the request-scoped auth context
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "student")]
    #[default]
    Student,
}

/// Visibility of formations and articles
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    #[sea_orm(string_value = "draft")]
    #[default]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
}

impl PublicationStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Draft => Self::Published,
            Self::Published => Self::Draft,
        }
    }
}

/// Lifecycle of an event, derived from its dates unless cancelled
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[sea_orm(string_value = "upcoming")]
    #[default]
    Upcoming,
    #[sea_orm(string_value = "ongoing")]
    Ongoing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl EventStatus {
    /// Computes the status an event should have at `now`.
    ///
    /// Cancellation is sticky; every other state follows the calendar.
    pub fn resolve(
        self,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Self {
        if self == Self::Cancelled {
            Self::Cancelled
        } else if now < starts_at {
            Self::Upcoming
        } else if now <= ends_at {
            Self::Ongoing
        } else {
            Self::Completed
        }
    }

    pub fn accepts_registrations(self) -> bool {
        self == Self::Upcoming
    }
}

/// Status of a user's registration to an event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum EventRegistrationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl EventRegistrationStatus {
    /// Whether the registration holds a seat
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

/// Registration window of a competition
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CompetitionStatus {
    #[sea_orm(string_value = "Ouvert")]
    #[serde(rename = "Ouvert")]
    #[default]
    Open,
    #[sea_orm(string_value = "Complet")]
    #[serde(rename = "Complet")]
    Full,
    #[sea_orm(string_value = "Fermé")]
    #[serde(rename = "Fermé")]
    Closed,
}

impl CompetitionStatus {
    /// Status implied by the number of confirmed participants.
    ///
    /// A closed competition stays closed whatever the count.
    pub fn for_confirmed(self, confirmed: u64, max_participants: i32) -> Self {
        match self {
            Self::Closed => Self::Closed,
            _ if confirmed >= u64::try_from(max_participants).unwrap_or(0) => Self::Full,
            _ => Self::Open,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum CompetitionKind {
    #[sea_orm(string_value = "individual")]
    #[default]
    Individual,
    #[sea_orm(string_value = "group")]
    Group,
}

/// Status of an application to a competition
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CompetitionRegistrationStatus {
    #[sea_orm(string_value = "En attente")]
    #[serde(rename = "En attente")]
    #[default]
    Pending,
    #[sea_orm(string_value = "Confirmé")]
    #[serde(rename = "Confirmé")]
    Confirmed,
    #[sea_orm(string_value = "Refusé")]
    #[serde(rename = "Refusé")]
    Refused,
}

/// Status of a resource reservation request
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "generated")]
    Generated,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ClubStatus {
    #[sea_orm(string_value = "active")]
    #[default]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl ClubStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::Iterable;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_event_status_follows_calendar() {
        let (start, end) = (at(10, 9), at(10, 17));

        assert_eq!(
            EventStatus::Upcoming.resolve(start, end, at(9, 12)),
            EventStatus::Upcoming
        );
        assert_eq!(
            EventStatus::Upcoming.resolve(start, end, at(10, 12)),
            EventStatus::Ongoing
        );
        assert_eq!(
            EventStatus::Ongoing.resolve(start, end, at(11, 0)),
            EventStatus::Completed
        );
    }

    #[test]
    fn test_cancelled_event_stays_cancelled() {
        let (start, end) = (at(10, 9), at(10, 17));
        assert_eq!(
            EventStatus::Cancelled.resolve(start, end, at(9, 0)),
            EventStatus::Cancelled
        );
    }

    #[test]
    fn test_competition_labels_are_french() {
        assert_eq!(CompetitionStatus::Closed.to_value(), "Fermé");
        assert_eq!(
            CompetitionRegistrationStatus::Pending.to_value(),
            "En attente"
        );
        assert_eq!(
            serde_json::to_string(&CompetitionRegistrationStatus::Confirmed).unwrap(),
            "\"Confirmé\""
        );
    }

    #[test]
    fn test_competition_status_tracks_capacity() {
        assert_eq!(
            CompetitionStatus::Open.for_confirmed(10, 10),
            CompetitionStatus::Full
        );
        assert_eq!(
            CompetitionStatus::Full.for_confirmed(9, 10),
            CompetitionStatus::Open
        );
        assert_eq!(
            CompetitionStatus::Closed.for_confirmed(0, 10),
            CompetitionStatus::Closed
        );
    }

    #[test]
    fn test_only_pending_and_approved_hold_seats() {
        let active: Vec<_> = EventRegistrationStatus::iter()
            .filter(|status| status.is_active())
            .collect();
        assert_eq!(
            active,
            vec![
                EventRegistrationStatus::Pending,
                EventRegistrationStatus::Approved
            ]
        );
    }
}
