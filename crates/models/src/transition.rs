use crate::status::{
    ClubStatus, CompetitionRegistrationStatus, CompetitionStatus, EventRegistrationStatus,
    EventStatus, PublicationStatus, ReservationStatus,
};
use sea_orm::ActiveEnum;
use serde::Serialize;
use thiserror::Error;

/// Result of applying an admin transition.
///
/// Re-applying the current state is informational, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome<S> {
    Applied { from: S, to: S },
    Unchanged { status: S },
}

impl<S: Copy> TransitionOutcome<S> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn status(&self) -> S {
        match *self {
            Self::Applied { to, .. } => to,
            Self::Unchanged { status } => status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Transition impossible de « {from} » vers « {to} »")]
pub struct IllegalTransition {
    pub from: String,
    pub to: String,
}

/// A closed status enum with a legality table
pub trait StateMachine: ActiveEnum<Value = String> + Copy + PartialEq {
    /// Whether moving from `self` to a different `to` is allowed
    fn allows(self, to: Self) -> bool;

    fn transition(self, to: Self) -> Result<TransitionOutcome<Self>, IllegalTransition> {
        if self == to {
            Ok(TransitionOutcome::Unchanged { status: self })
        } else if self.allows(to) {
            Ok(TransitionOutcome::Applied { from: self, to })
        } else {
            Err(IllegalTransition {
                from: self.to_value(),
                to: to.to_value(),
            })
        }
    }
}

impl StateMachine for ReservationStatus {
    fn allows(self, to: Self) -> bool {
        self == Self::Pending && matches!(to, Self::Approved | Self::Rejected)
    }
}

impl StateMachine for EventStatus {
    // Date-driven moves go through `EventStatus::resolve`; admins may only cancel.
    fn allows(self, to: Self) -> bool {
        to == Self::Cancelled && matches!(self, Self::Upcoming | Self::Ongoing)
    }
}

impl StateMachine for EventRegistrationStatus {
    fn allows(self, to: Self) -> bool {
        use EventRegistrationStatus::*;

        match (self, to) {
            (Pending, Approved) => true,
            (Pending | Approved, Rejected | Cancelled) => true,
            (Cancelled, Pending | Approved) => true,
            _ => false,
        }
    }
}

impl StateMachine for CompetitionRegistrationStatus {
    fn allows(self, _to: Self) -> bool {
        true
    }
}

impl StateMachine for CompetitionStatus {
    fn allows(self, _to: Self) -> bool {
        true
    }
}

impl StateMachine for PublicationStatus {
    fn allows(self, _to: Self) -> bool {
        true
    }
}

impl StateMachine for ClubStatus {
    fn allows(self, _to: Self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_reservation_decisions_are_terminal() {
        use ReservationStatus::*;

        assert!(Pending.transition(Approved).unwrap().is_applied());
        assert!(Pending.transition(Rejected).unwrap().is_applied());
        assert!(Approved.transition(Rejected).is_err());
        assert!(Rejected.transition(Approved).is_err());
        assert!(Approved.transition(Pending).is_err());
    }

    #[test]
    fn test_reapplying_same_state_is_informational() {
        let outcome = ReservationStatus::Approved
            .transition(ReservationStatus::Approved)
            .unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Unchanged {
                status: ReservationStatus::Approved
            }
        );
        assert!(!outcome.is_applied());
    }

    #[test]
    fn test_event_can_only_be_cancelled_while_live() {
        use EventStatus::*;

        assert!(Upcoming.transition(Cancelled).is_ok());
        assert!(Ongoing.transition(Cancelled).is_ok());
        assert!(Completed.transition(Cancelled).is_err());
        assert!(Upcoming.transition(Completed).is_err());
    }

    #[test]
    fn test_rejected_event_registration_is_final() {
        for to in EventRegistrationStatus::iter() {
            if to != EventRegistrationStatus::Rejected {
                assert!(EventRegistrationStatus::Rejected.transition(to).is_err());
            }
        }
        assert!(
            EventRegistrationStatus::Cancelled
                .transition(EventRegistrationStatus::Pending)
                .is_ok()
        );
    }

    #[test]
    fn test_competition_registration_moves_freely() {
        for from in CompetitionRegistrationStatus::iter() {
            for to in CompetitionRegistrationStatus::iter() {
                assert!(from.transition(to).is_ok());
            }
        }
    }

    #[test]
    fn test_illegal_transition_names_both_states() {
        let err = ReservationStatus::Rejected
            .transition(ReservationStatus::Approved)
            .unwrap_err();
        assert_eq!(err.from, "rejected");
        assert_eq!(err.to, "approved");
    }
}
