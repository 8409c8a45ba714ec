mod common;

use common::{TestContext, in_days};
use database::ServiceError;
use database::entities::{competition_registration, competition_team_member};
use database::services::competition::CompetitionService;
use models::forms::{CompetitionForm, CompetitionRegistrationForm, TeamMemberForm};
use models::status::{CompetitionKind, CompetitionRegistrationStatus, CompetitionStatus};
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

fn competition_form(max_participants: i32, kind: CompetitionKind) -> CompetitionForm {
    CompetitionForm {
        title: "Concours de programmation".to_owned(),
        description: "Épreuve algorithmique".to_owned(),
        location: Some("Labo 2".to_owned()),
        held_on: in_days(30).date(),
        deadline: in_days(20),
        max_participants,
        kind,
        max_team_size: (kind == CompetitionKind::Group).then_some(3),
    }
}

fn solo(name: &str) -> CompetitionRegistrationForm {
    CompetitionRegistrationForm {
        name: name.to_owned(),
        email: format!("{}@univ.test", name.to_lowercase()),
        team_name: None,
        members: Vec::new(),
    }
}

fn member(name: &str) -> TeamMemberForm {
    TeamMemberForm {
        name: name.to_owned(),
        email: None,
    }
}

#[tokio::test]
async fn test_registration_after_deadline_is_refused() {
    let ctx = TestContext::new().await;
    let mut form = competition_form(10, CompetitionKind::Individual);
    form.held_on = in_days(0).date();
    form.deadline = in_days(-1);
    let competition = CompetitionService::create(&ctx.db, &ctx.storage, form, None)
        .await
        .unwrap();

    let err = CompetitionService::register(&ctx.db, Uuid::new_v4(), competition.id, solo("Awa"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::StateConflict(ref m) if m.contains("date limite")));
    assert_eq!(
        competition_registration::Entity::find()
            .count(&ctx.db)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_one_application_per_user() {
    let ctx = TestContext::new().await;
    let competition = CompetitionService::create(
        &ctx.db,
        &ctx.storage,
        competition_form(10, CompetitionKind::Individual),
        None,
    )
    .await
    .unwrap();
    let user = Uuid::new_v4();

    let (registration, members) =
        CompetitionService::register(&ctx.db, user, competition.id, solo("Awa"))
            .await
            .unwrap();
    assert_eq!(registration.status, CompetitionRegistrationStatus::Pending);
    assert!(members.is_empty());

    assert!(matches!(
        CompetitionService::register(&ctx.db, user, competition.id, solo("Awa")).await,
        Err(ServiceError::StateConflict(_))
    ));
}

#[tokio::test]
async fn test_group_registration_stores_team() {
    let ctx = TestContext::new().await;
    let competition = CompetitionService::create(
        &ctx.db,
        &ctx.storage,
        competition_form(5, CompetitionKind::Group),
        None,
    )
    .await
    .unwrap();

    let mut form = solo("Awa");
    assert!(matches!(
        CompetitionService::register(&ctx.db, Uuid::new_v4(), competition.id, form.clone()).await,
        Err(ServiceError::Validation(_))
    ));

    form.team_name = Some("Les Octets".to_owned());
    form.members = vec![member("Awa"), member("Koffi"), member("Yao"), member("Ama")];
    assert!(matches!(
        CompetitionService::register(&ctx.db, Uuid::new_v4(), competition.id, form.clone()).await,
        Err(ServiceError::Validation(_))
    ));

    form.members.truncate(2);
    let (registration, members) =
        CompetitionService::register(&ctx.db, Uuid::new_v4(), competition.id, form)
            .await
            .unwrap();
    assert_eq!(registration.team_name.as_deref(), Some("Les Octets"));
    assert_eq!(
        members.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        vec!["Awa", "Koffi"]
    );

    let listed = CompetitionService::registrations(&ctx.db, competition.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].1.len(), 2);
    assert_eq!(
        competition_team_member::Entity::find()
            .count(&ctx.db)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_confirmation_fills_and_frees_the_competition() {
    let ctx = TestContext::new().await;
    let competition = CompetitionService::create(
        &ctx.db,
        &ctx.storage,
        competition_form(1, CompetitionKind::Individual),
        None,
    )
    .await
    .unwrap();
    let (first, _) = CompetitionService::register(&ctx.db, Uuid::new_v4(), competition.id, solo("Awa"))
        .await
        .unwrap();
    let (second, _) =
        CompetitionService::register(&ctx.db, Uuid::new_v4(), competition.id, solo("Koffi"))
            .await
            .unwrap();

    CompetitionService::review_registration(
        &ctx.db,
        &ctx.notifier,
        first.id,
        CompetitionRegistrationStatus::Confirmed,
    )
    .await
    .unwrap();
    let full = CompetitionService::get(&ctx.db, competition.id).await.unwrap();
    assert_eq!(full.status, CompetitionStatus::Full);

    // No room left for a second confirmation
    assert!(matches!(
        CompetitionService::review_registration(
            &ctx.db,
            &ctx.notifier,
            second.id,
            CompetitionRegistrationStatus::Confirmed,
        )
        .await,
        Err(ServiceError::StateConflict(_))
    ));
    // Nor for new applications
    assert!(
        CompetitionService::register(&ctx.db, Uuid::new_v4(), competition.id, solo("Yao"))
            .await
            .is_err()
    );

    CompetitionService::review_registration(
        &ctx.db,
        &ctx.notifier,
        first.id,
        CompetitionRegistrationStatus::Refused,
    )
    .await
    .unwrap();
    let reopened = CompetitionService::get(&ctx.db, competition.id).await.unwrap();
    assert_eq!(reopened.status, CompetitionStatus::Open);

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].body.contains("Confirmé"));
    assert!(sent[1].body.contains("Refusé"));
}

#[tokio::test]
async fn test_closed_competition_refuses_applications() {
    let ctx = TestContext::new().await;
    let competition = CompetitionService::create(
        &ctx.db,
        &ctx.storage,
        competition_form(3, CompetitionKind::Individual),
        None,
    )
    .await
    .unwrap();

    let (closed, outcome) = CompetitionService::close(&ctx.db, competition.id).await.unwrap();
    assert!(outcome.is_applied());
    assert_eq!(closed.status, CompetitionStatus::Closed);
    assert!(matches!(
        CompetitionService::register(&ctx.db, Uuid::new_v4(), competition.id, solo("Awa")).await,
        Err(ServiceError::StateConflict(ref m)) if m.contains("pas ouvertes")
    ));

    let (reopened, _) = CompetitionService::reopen(&ctx.db, competition.id).await.unwrap();
    assert_eq!(reopened.status, CompetitionStatus::Open);
    let (_, again) = CompetitionService::reopen(&ctx.db, competition.id).await.unwrap();
    assert!(!again.is_applied());
}

#[tokio::test]
async fn test_review_is_idempotent() {
    let ctx = TestContext::new().await;
    let competition = CompetitionService::create(
        &ctx.db,
        &ctx.storage,
        competition_form(3, CompetitionKind::Individual),
        None,
    )
    .await
    .unwrap();
    let (registration, _) =
        CompetitionService::register(&ctx.db, Uuid::new_v4(), competition.id, solo("Awa"))
            .await
            .unwrap();

    let (_, outcome) = CompetitionService::review_registration(
        &ctx.db,
        &ctx.notifier,
        registration.id,
        CompetitionRegistrationStatus::Pending,
    )
    .await
    .unwrap();

    assert!(!outcome.is_applied());
    assert!(ctx.mailer.sent().is_empty());
}
