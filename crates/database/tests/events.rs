mod common;

use common::{TestContext, in_days};
use database::ServiceError;
use database::entities::event_registration;
use database::services::event::EventService;
use models::forms::{EventForm, EventRegistrationForm};
use models::status::{EventRegistrationStatus, EventStatus};
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

fn event_form(max_attendees: Option<i32>, requires_approval: bool) -> EventForm {
    EventForm {
        title: "Hackathon d'automne".to_owned(),
        description: "Deux jours de code".to_owned(),
        location: "Salle polyvalente".to_owned(),
        starts_at: in_days(7),
        ends_at: in_days(8),
        max_attendees,
        requires_approval: Some(requires_approval),
    }
}

fn registration(name: &str) -> EventRegistrationForm {
    EventRegistrationForm {
        name: name.to_owned(),
        email: format!("{}@univ.test", name.to_lowercase()),
        phone: None,
    }
}

#[tokio::test]
async fn test_initial_status_depends_on_approval() {
    let ctx = TestContext::new().await;
    let open = EventService::create(&ctx.db, &ctx.storage, event_form(None, false), None)
        .await
        .unwrap();
    let moderated = EventService::create(&ctx.db, &ctx.storage, event_form(None, true), None)
        .await
        .unwrap();
    assert_eq!(open.status, EventStatus::Upcoming);

    let user = Uuid::new_v4();
    let direct = EventService::register(&ctx.db, user, open.id, registration("Awa"))
        .await
        .unwrap();
    let waiting = EventService::register(&ctx.db, user, moderated.id, registration("Awa"))
        .await
        .unwrap();

    assert_eq!(direct.status, EventRegistrationStatus::Approved);
    assert_eq!(waiting.status, EventRegistrationStatus::Pending);
}

#[tokio::test]
async fn test_full_event_refuses_registration() {
    let ctx = TestContext::new().await;
    let event = EventService::create(&ctx.db, &ctx.storage, event_form(Some(1), false), None)
        .await
        .unwrap();

    EventService::register(&ctx.db, Uuid::new_v4(), event.id, registration("Awa"))
        .await
        .unwrap();
    let err = EventService::register(&ctx.db, Uuid::new_v4(), event.id, registration("Koffi"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::StateConflict(ref m) if m.contains("places atteintes")));
    assert_eq!(
        event_registration::Entity::find().count(&ctx.db).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_pending_registrations_hold_seats() {
    let ctx = TestContext::new().await;
    let event = EventService::create(&ctx.db, &ctx.storage, event_form(Some(1), true), None)
        .await
        .unwrap();

    EventService::register(&ctx.db, Uuid::new_v4(), event.id, registration("Awa"))
        .await
        .unwrap();
    assert!(
        EventService::register(&ctx.db, Uuid::new_v4(), event.id, registration("Koffi"))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_rejected_registration_is_permanent() {
    let ctx = TestContext::new().await;
    let event = EventService::create(&ctx.db, &ctx.storage, event_form(None, true), None)
        .await
        .unwrap();
    let user = Uuid::new_v4();
    let registered = EventService::register(&ctx.db, user, event.id, registration("Awa"))
        .await
        .unwrap();

    EventService::review_registration(
        &ctx.db,
        &ctx.notifier,
        registered.id,
        EventRegistrationStatus::Rejected,
    )
    .await
    .unwrap();
    let err = EventService::register(&ctx.db, user, event.id, registration("Awa"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::StateConflict(ref m) if m.contains("refusée")));
}

#[tokio::test]
async fn test_cancelled_registration_is_reactivated_in_place() {
    let ctx = TestContext::new().await;
    let event = EventService::create(&ctx.db, &ctx.storage, event_form(None, false), None)
        .await
        .unwrap();
    let user = Uuid::new_v4();
    let registered = EventService::register(&ctx.db, user, event.id, registration("Awa"))
        .await
        .unwrap();

    let (cancelled, _) = EventService::review_registration(
        &ctx.db,
        &ctx.notifier,
        registered.id,
        EventRegistrationStatus::Cancelled,
    )
    .await
    .unwrap();
    assert_eq!(cancelled.status, EventRegistrationStatus::Cancelled);

    let again = EventService::register(&ctx.db, user, event.id, registration("Awa"))
        .await
        .unwrap();

    assert_eq!(again.id, registered.id);
    assert_eq!(again.status, EventRegistrationStatus::Approved);
    assert_eq!(
        event_registration::Entity::find().count(&ctx.db).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_duplicate_registration_is_refused() {
    let ctx = TestContext::new().await;
    let event = EventService::create(&ctx.db, &ctx.storage, event_form(None, false), None)
        .await
        .unwrap();
    let user = Uuid::new_v4();

    EventService::register(&ctx.db, user, event.id, registration("Awa"))
        .await
        .unwrap();
    assert!(matches!(
        EventService::register(&ctx.db, user, event.id, registration("Awa")).await,
        Err(ServiceError::StateConflict(_))
    ));
}

#[tokio::test]
async fn test_users_cancel_only_their_own_registration() {
    let ctx = TestContext::new().await;
    let event = EventService::create(&ctx.db, &ctx.storage, event_form(None, false), None)
        .await
        .unwrap();
    let user = Uuid::new_v4();
    let registered = EventService::register(&ctx.db, user, event.id, registration("Awa"))
        .await
        .unwrap();

    assert!(matches!(
        EventService::cancel_registration(&ctx.db, Uuid::new_v4(), registered.id).await,
        Err(ServiceError::Authorization(_))
    ));
    let outcome = EventService::cancel_registration(&ctx.db, user, registered.id)
        .await
        .unwrap();
    assert!(outcome.is_applied());
    let again = EventService::cancel_registration(&ctx.db, user, registered.id)
        .await
        .unwrap();
    assert!(!again.is_applied());
}

#[tokio::test]
async fn test_past_and_cancelled_events_are_closed() {
    let ctx = TestContext::new().await;
    let mut past = event_form(None, false);
    past.starts_at = in_days(-3);
    past.ends_at = in_days(-2);
    let past = EventService::create(&ctx.db, &ctx.storage, past, None)
        .await
        .unwrap();
    assert_eq!(past.status, EventStatus::Completed);
    assert!(
        EventService::register(&ctx.db, Uuid::new_v4(), past.id, registration("Awa"))
            .await
            .is_err()
    );

    let upcoming = EventService::create(&ctx.db, &ctx.storage, event_form(None, false), None)
        .await
        .unwrap();
    let (cancelled, outcome) = EventService::cancel(&ctx.db, upcoming.id).await.unwrap();
    assert!(outcome.is_applied());
    assert_eq!(cancelled.status, EventStatus::Cancelled);
    assert!(matches!(
        EventService::cancel(&ctx.db, past.id).await,
        Err(ServiceError::StateConflict(_))
    ));
    assert!(
        EventService::register(&ctx.db, Uuid::new_v4(), upcoming.id, registration("Awa"))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_review_notifies_registrant_once() {
    let ctx = TestContext::new().await;
    let event = EventService::create(&ctx.db, &ctx.storage, event_form(None, true), None)
        .await
        .unwrap();
    let registered = EventService::register(&ctx.db, Uuid::new_v4(), event.id, registration("Awa"))
        .await
        .unwrap();

    for _ in 0..2 {
        EventService::review_registration(
            &ctx.db,
            &ctx.notifier,
            registered.id,
            EventRegistrationStatus::Approved,
        )
        .await
        .unwrap();
    }

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "awa@univ.test");
    assert!(sent[0].body.contains("approuvée"));
}

#[tokio::test]
async fn test_delete_removes_event_and_registrations() {
    let ctx = TestContext::new().await;
    let event = EventService::create(&ctx.db, &ctx.storage, event_form(None, false), None)
        .await
        .unwrap();
    let kept = EventService::create(&ctx.db, &ctx.storage, event_form(None, false), None)
        .await
        .unwrap();
    for name in ["Awa", "Koffi"] {
        EventService::register(&ctx.db, Uuid::new_v4(), event.id, registration(name))
            .await
            .unwrap();
    }
    EventService::register(&ctx.db, Uuid::new_v4(), kept.id, registration("Awa"))
        .await
        .unwrap();

    EventService::delete(&ctx.db, &ctx.storage, event.id)
        .await
        .unwrap();

    assert!(matches!(
        EventService::get(&ctx.db, event.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert_eq!(
        event_registration::Entity::find().count(&ctx.db).await.unwrap(),
        1
    );
}
