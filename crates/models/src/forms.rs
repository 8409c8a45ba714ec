//! Validated request payloads shared by the services and the HTTP layer.

use crate::content::{ArticleCategory, ClubCategory, MediaKind, ReservationResource};
use crate::status::{ClubStatus, CompetitionKind, PublicationStatus};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct FormationForm {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(max = 50))]
    pub level: Option<String>,
    #[validate(range(min = 1))]
    pub duration_hours: Option<i32>,
    pub status: Option<PublicationStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ModuleForm {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub content: Option<String>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ArticleForm {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1))]
    pub body: String,
    pub category: ArticleCategory,
    pub status: Option<PublicationStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MediaForm {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub kind: MediaKind,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ClubForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub category: ClubCategory,
    #[validate(email)]
    pub contact_email: String,
    pub status: Option<ClubStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_event_window"))]
pub struct EventForm {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    #[validate(range(min = 1))]
    pub max_attendees: Option<i32>,
    pub requires_approval: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_competition_dates"))]
pub struct CompetitionForm {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub held_on: NaiveDate,
    pub deadline: NaiveDateTime,
    #[validate(range(min = 1))]
    pub max_participants: i32,
    pub kind: CompetitionKind,
    #[validate(range(min = 2))]
    pub max_team_size: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EventRegistrationForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TeamMemberForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CompetitionRegistrationForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 255))]
    pub team_name: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub members: Vec<TeamMemberForm>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_reservation_slot"))]
pub struct ReservationForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub resource: ReservationResource,
    pub reserved_on: NaiveDate,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    #[validate(length(min = 1, max = 1000))]
    pub purpose: String,
}

/// Optional note attached by an admin when deciding on a request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ReviewForm {
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ContactForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PartnershipForm {
    #[validate(length(min = 1, max = 255))]
    pub organization: String,
    #[validate(length(min = 1, max = 255))]
    pub contact_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ClubApplicationForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 2000))]
    pub motivation: String,
}

pub(crate) fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_event_window(form: &EventForm) -> Result<(), ValidationError> {
    if form.ends_at <= form.starts_at {
        return Err(invalid(
            "event_window",
            "La fin de l'événement doit être postérieure à son début.",
        ));
    }
    Ok(())
}

fn validate_competition_dates(form: &CompetitionForm) -> Result<(), ValidationError> {
    if form.deadline.date() > form.held_on {
        return Err(invalid(
            "deadline",
            "La date limite doit précéder la date du concours.",
        ));
    }
    if form.kind == CompetitionKind::Group && form.max_team_size.is_none() {
        return Err(invalid(
            "max_team_size",
            "La taille maximale des équipes est requise.",
        ));
    }
    Ok(())
}

fn validate_reservation_slot(form: &ReservationForm) -> Result<(), ValidationError> {
    if form.ends_at <= form.starts_at {
        return Err(invalid(
            "slot",
            "L'heure de fin doit être postérieure à l'heure de début.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(starts_at: &str, ends_at: &str) -> EventForm {
        EventForm {
            title: "Journée portes ouvertes".to_owned(),
            description: "Découverte du centre".to_owned(),
            location: "Amphi A".to_owned(),
            starts_at: starts_at.parse().unwrap(),
            ends_at: ends_at.parse().unwrap(),
            max_attendees: Some(30),
            requires_approval: None,
        }
    }

    #[test]
    fn test_event_window_must_be_ordered() {
        assert!(event("2025-05-01T09:00:00", "2025-05-01T17:00:00")
            .validate()
            .is_ok());
        assert!(event("2025-05-01T17:00:00", "2025-05-01T09:00:00")
            .validate()
            .is_err());
    }

    #[test]
    fn test_reservation_payload_is_parsed_and_checked() {
        let form: ReservationForm = serde_json::from_value(serde_json::json!({
            "name": "Yao Kouassi",
            "email": "not-an-email",
            "resource": "computer",
            "reserved_on": "2025-05-02",
            "starts_at": "10:00:00",
            "ends_at": "12:00:00",
            "purpose": "Projet de fin d'études"
        }))
        .unwrap();

        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_group_competition_needs_team_size() {
        let form = CompetitionForm {
            title: "Hackathon".to_owned(),
            description: "48h".to_owned(),
            location: None,
            held_on: "2025-06-10".parse().unwrap(),
            deadline: "2025-06-01T23:59:00".parse().unwrap(),
            max_participants: 20,
            kind: CompetitionKind::Group,
            max_team_size: None,
        };
        assert!(form.validate().is_err());
        assert!(
            CompetitionForm {
                max_team_size: Some(4),
                ..form
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_nested_team_members_are_validated() {
        let form = CompetitionRegistrationForm {
            name: "Awa".to_owned(),
            email: "awa@univ.test".to_owned(),
            team_name: Some("Les Octets".to_owned()),
            members: vec![TeamMemberForm {
                name: String::new(),
                email: None,
            }],
        };
        assert!(form.validate().is_err());
    }
}
