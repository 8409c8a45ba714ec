//! Admission rules for formations, events, competitions and reservations.
//!
//! Every gate checks, in order: the target accepts registrations, the actor
//! has no blocking prior registration, and there is room left. Gates are pure;
//! callers load the counts and persist the returned plan in a single write.

use crate::forms::invalid;
use crate::status::{
    CompetitionKind, CompetitionStatus, EventRegistrationStatus, EventStatus, PublicationStatus,
};
use chrono::NaiveDateTime;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Cette formation n'est pas ouverte aux inscriptions.")]
    FormationNotPublished,
    #[error("Vous êtes déjà inscrit à cette formation.")]
    AlreadyEnrolled,
    #[error("Les inscriptions à cet événement sont fermées.")]
    EventClosed,
    #[error("Votre inscription à cet événement a été refusée.")]
    EventRejected,
    #[error("Vous êtes déjà inscrit à cet événement.")]
    AlreadyRegistered,
    #[error("Nombre maximum de places atteintes.")]
    EventFull,
    #[error("Les inscriptions à ce concours ne sont pas ouvertes.")]
    CompetitionNotOpen,
    #[error("La date limite d'inscription à ce concours est dépassée.")]
    DeadlinePassed,
    #[error("Vous avez déjà postulé à ce concours.")]
    AlreadyApplied,
    #[error("Ce concours a atteint le nombre maximum de participants.")]
    CompetitionFull,
    #[error("Vous avez déjà une réservation en attente.")]
    PendingReservationExists,
}

/// What a successful event registration should write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRegistrationPlan {
    Create(EventRegistrationStatus),
    /// Reuse the cancelled row, resetting its status and timestamps
    Reactivate(EventRegistrationStatus),
}

impl EventRegistrationPlan {
    pub fn status(self) -> EventRegistrationStatus {
        match self {
            Self::Create(status) | Self::Reactivate(status) => status,
        }
    }
}

/// The part of an event the admission rules look at
#[derive(Debug, Clone, Copy)]
pub struct EventGate {
    pub status: EventStatus,
    pub max_attendees: Option<i32>,
    pub requires_approval: bool,
}

impl EventGate {
    fn initial_status(&self) -> EventRegistrationStatus {
        if self.requires_approval {
            EventRegistrationStatus::Pending
        } else {
            EventRegistrationStatus::Approved
        }
    }
}

pub fn check_enrollment(
    status: PublicationStatus,
    already_enrolled: bool,
) -> Result<(), RegistrationError> {
    if status != PublicationStatus::Published {
        return Err(RegistrationError::FormationNotPublished);
    }
    if already_enrolled {
        return Err(RegistrationError::AlreadyEnrolled);
    }
    Ok(())
}

/// `status` must already be resolved against the clock.
pub fn plan_event_registration(
    event: EventGate,
    prior: Option<EventRegistrationStatus>,
    active_count: u64,
) -> Result<EventRegistrationPlan, RegistrationError> {
    if !event.status.accepts_registrations() {
        return Err(RegistrationError::EventClosed);
    }

    let plan = match prior {
        None => EventRegistrationPlan::Create(event.initial_status()),
        Some(EventRegistrationStatus::Cancelled) => {
            EventRegistrationPlan::Reactivate(event.initial_status())
        }
        Some(EventRegistrationStatus::Rejected) => return Err(RegistrationError::EventRejected),
        Some(EventRegistrationStatus::Pending | EventRegistrationStatus::Approved) => {
            return Err(RegistrationError::AlreadyRegistered);
        }
    };

    if let Some(max) = event.max_attendees
        && active_count >= u64::try_from(max).unwrap_or(0)
    {
        return Err(RegistrationError::EventFull);
    }

    Ok(plan)
}

/// The part of a competition the admission rules look at
#[derive(Debug, Clone, Copy)]
pub struct CompetitionGate {
    pub status: CompetitionStatus,
    pub deadline: NaiveDateTime,
    pub max_participants: i32,
}

pub fn check_competition_registration(
    competition: CompetitionGate,
    already_applied: bool,
    confirmed_count: u64,
    now: NaiveDateTime,
) -> Result<(), RegistrationError> {
    if competition.status != CompetitionStatus::Open {
        return Err(RegistrationError::CompetitionNotOpen);
    }
    if now > competition.deadline {
        return Err(RegistrationError::DeadlinePassed);
    }
    if already_applied {
        return Err(RegistrationError::AlreadyApplied);
    }
    if confirmed_count >= u64::try_from(competition.max_participants).unwrap_or(0) {
        return Err(RegistrationError::CompetitionFull);
    }
    Ok(())
}

/// Confirming one more participant must not exceed the competition size
pub fn check_confirmation_capacity(
    confirmed_count: u64,
    max_participants: i32,
) -> Result<(), RegistrationError> {
    if confirmed_count >= u64::try_from(max_participants).unwrap_or(0) {
        return Err(RegistrationError::CompetitionFull);
    }
    Ok(())
}

pub fn check_reservation(has_pending: bool) -> Result<(), RegistrationError> {
    if has_pending {
        Err(RegistrationError::PendingReservationExists)
    } else {
        Ok(())
    }
}

/// Team rules depend on the competition, so they run after field validation.
pub fn validate_team(
    kind: CompetitionKind,
    max_team_size: Option<i32>,
    team_name: Option<&str>,
    member_count: usize,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    match kind {
        CompetitionKind::Individual => {
            if member_count > 0 {
                errors.add(
                    "members",
                    invalid("individual", "Ce concours est individuel."),
                );
            }
        }
        CompetitionKind::Group => {
            if team_name.is_none_or(|name| name.trim().is_empty()) {
                errors.add(
                    "team_name",
                    invalid("required", "Le nom de l'équipe est requis."),
                );
            }
            let max = max_team_size
                .and_then(|max| usize::try_from(max).ok())
                .unwrap_or(usize::MAX);
            if member_count == 0 || member_count > max {
                errors.add(
                    "members",
                    invalid("team_size", "Nombre de membres de l'équipe invalide."),
                );
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn open_event(max_attendees: Option<i32>) -> EventGate {
        EventGate {
            status: EventStatus::Upcoming,
            max_attendees,
            requires_approval: false,
        }
    }

    #[test]
    fn test_first_registration_is_created() {
        let plan = plan_event_registration(open_event(None), None, 0).unwrap();
        assert_eq!(
            plan,
            EventRegistrationPlan::Create(EventRegistrationStatus::Approved)
        );

        let moderated = EventGate {
            requires_approval: true,
            ..open_event(None)
        };
        let plan = plan_event_registration(moderated, None, 0).unwrap();
        assert_eq!(plan.status(), EventRegistrationStatus::Pending);
    }

    #[test]
    fn test_cancelled_registration_is_reactivated() {
        let plan = plan_event_registration(
            open_event(Some(5)),
            Some(EventRegistrationStatus::Cancelled),
            1,
        )
        .unwrap();
        assert!(matches!(plan, EventRegistrationPlan::Reactivate(_)));
    }

    #[test]
    fn test_rejected_registration_blocks_forever() {
        let err = plan_event_registration(
            open_event(None),
            Some(EventRegistrationStatus::Rejected),
            0,
        )
        .unwrap_err();
        assert_eq!(err, RegistrationError::EventRejected);
    }

    #[test]
    fn test_full_event_reports_seats_reached() {
        let err = plan_event_registration(open_event(Some(1)), None, 1).unwrap_err();
        assert_eq!(err, RegistrationError::EventFull);
        assert!(err.to_string().contains("places atteintes"));
    }

    #[test]
    fn test_closed_event_is_checked_before_prior_registration() {
        let gate = EventGate {
            status: EventStatus::Completed,
            ..open_event(None)
        };
        let err =
            plan_event_registration(gate, Some(EventRegistrationStatus::Rejected), 0).unwrap_err();
        assert_eq!(err, RegistrationError::EventClosed);
    }

    #[test]
    fn test_competition_gates() {
        let now = Utc::now().naive_utc();
        let gate = CompetitionGate {
            status: CompetitionStatus::Open,
            deadline: now + Duration::days(1),
            max_participants: 2,
        };

        assert!(check_competition_registration(gate, false, 1, now).is_ok());
        assert_eq!(
            check_competition_registration(gate, false, 2, now),
            Err(RegistrationError::CompetitionFull)
        );
        assert_eq!(
            check_competition_registration(gate, true, 0, now),
            Err(RegistrationError::AlreadyApplied)
        );

        let expired = CompetitionGate {
            deadline: now - Duration::days(1),
            ..gate
        };
        assert_eq!(
            check_competition_registration(expired, false, 0, now),
            Err(RegistrationError::DeadlinePassed)
        );

        let closed = CompetitionGate {
            status: CompetitionStatus::Closed,
            ..gate
        };
        assert_eq!(
            check_competition_registration(closed, false, 0, now),
            Err(RegistrationError::CompetitionNotOpen)
        );
    }

    #[test]
    fn test_enrollment_requires_published_formation() {
        assert_eq!(
            check_enrollment(PublicationStatus::Draft, false),
            Err(RegistrationError::FormationNotPublished)
        );
        assert_eq!(
            check_enrollment(PublicationStatus::Published, true),
            Err(RegistrationError::AlreadyEnrolled)
        );
        assert!(check_enrollment(PublicationStatus::Published, false).is_ok());
    }

    #[test]
    fn test_team_rules() {
        assert!(validate_team(CompetitionKind::Individual, None, None, 0).is_ok());
        assert!(validate_team(CompetitionKind::Individual, None, None, 2).is_err());
        assert!(validate_team(CompetitionKind::Group, Some(3), Some("Rustaceans"), 3).is_ok());

        let errors = validate_team(CompetitionKind::Group, Some(3), None, 4).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("team_name"));
        assert!(fields.contains_key("members"));
    }

    #[test]
    fn test_pending_reservation_blocks_new_one() {
        assert_eq!(
            check_reservation(true),
            Err(RegistrationError::PendingReservationExists)
        );
        assert!(check_reservation(false).is_ok());
    }
}
