mod common;

use common::TestContext;
use database::ServiceError;
use database::services::{certificate::CertificateService, enrollment::EnrollmentService};
use models::status::CertificateStatus;
use storage::BlobStore;
use uuid::Uuid;

#[tokio::test]
async fn test_issue_only_after_last_module() {
    let ctx = TestContext::new().await;
    let student = ctx.student("Awa").await;
    let (formation, modules) = ctx.formation("Bureautique", 3).await;
    EnrollmentService::enroll(&ctx.db, student.id, formation.id).await.unwrap();

    for module in &modules[..2] {
        EnrollmentService::complete_module(&ctx.db, student.id, module.id)
            .await
            .unwrap();
    }
    assert!(!CertificateService::can_issue(&ctx.db, student.id, formation.id).await.unwrap());
    assert!(matches!(
        CertificateService::request(&ctx.db, student.id, formation.id).await,
        Err(ServiceError::StateConflict(_))
    ));

    EnrollmentService::complete_module(&ctx.db, student.id, modules[2].id)
        .await
        .unwrap();
    assert!(CertificateService::can_issue(&ctx.db, student.id, formation.id).await.unwrap());

    let requested = CertificateService::request(&ctx.db, student.id, formation.id)
        .await
        .unwrap();
    assert_eq!(requested.status, CertificateStatus::Pending);
    let again = CertificateService::request(&ctx.db, student.id, formation.id)
        .await
        .unwrap();
    assert_eq!(again.id, requested.id);

    let (issued, outcome) = CertificateService::issue(&ctx.db, ctx.issuer(), requested.id)
        .await
        .unwrap();
    assert!(outcome.is_applied());
    assert_eq!(issued.status, CertificateStatus::Generated);
    assert!(issued.issued_at.is_some());
    let path = issued.file_path.clone().unwrap();
    assert!(path.starts_with("private/certificates/"));
    assert!(ctx.storage.read(&path).await.unwrap().starts_with(b"%PDF-"));

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "awa@univ.test");
    assert!(sent[0].body.contains(&issued.verification_code));
}

#[tokio::test]
async fn test_formation_without_modules_never_completes() {
    let ctx = TestContext::new().await;
    let student = ctx.student("Awa").await;
    let (formation, _) = ctx.formation("Vide", 0).await;
    EnrollmentService::enroll(&ctx.db, student.id, formation.id).await.unwrap();

    assert!(!CertificateService::can_issue(&ctx.db, student.id, formation.id).await.unwrap());
}

#[tokio::test]
async fn test_issue_rechecks_eligibility() {
    let ctx = TestContext::new().await;
    let student = ctx.student("Awa").await;
    let (formation, modules) = ctx.formation("Bureautique", 1).await;
    EnrollmentService::enroll(&ctx.db, student.id, formation.id).await.unwrap();
    EnrollmentService::complete_module(&ctx.db, student.id, modules[0].id)
        .await
        .unwrap();
    let requested = CertificateService::request(&ctx.db, student.id, formation.id)
        .await
        .unwrap();

    EnrollmentService::uncomplete_module(&ctx.db, student.id, modules[0].id)
        .await
        .unwrap();

    assert!(matches!(
        CertificateService::issue(&ctx.db, ctx.issuer(), requested.id).await,
        Err(ServiceError::StateConflict(_))
    ));
}

#[tokio::test]
async fn test_verify_only_shows_generated_certificates() {
    let ctx = TestContext::new().await;
    let student = ctx.student("Awa").await;
    let (formation, modules) = ctx.formation("Bureautique", 1).await;
    EnrollmentService::enroll(&ctx.db, student.id, formation.id).await.unwrap();
    EnrollmentService::complete_module(&ctx.db, student.id, modules[0].id)
        .await
        .unwrap();
    let requested = CertificateService::request(&ctx.db, student.id, formation.id)
        .await
        .unwrap();

    assert!(matches!(
        CertificateService::verify(&ctx.db, &requested.verification_code).await,
        Err(ServiceError::NotFound(_))
    ));

    CertificateService::issue(&ctx.db, ctx.issuer(), requested.id)
        .await
        .unwrap();
    let verified = CertificateService::verify(
        &ctx.db,
        &format!(" {} ", requested.verification_code.to_lowercase()),
    )
    .await
    .unwrap();

    assert_eq!(verified.student_name, "Awa");
    assert_eq!(verified.formation_title, "Bureautique");
    assert_eq!(verified.verification_code, requested.verification_code);

    let typed_without_dashes = requested.verification_code.replace('-', "").to_lowercase();
    let verified = CertificateService::verify(&ctx.db, &typed_without_dashes)
        .await
        .unwrap();
    assert_eq!(verified.verification_code, requested.verification_code);
}

#[tokio::test]
async fn test_issuing_twice_keeps_the_first_document() {
    let ctx = TestContext::new().await;
    let student = ctx.student("Awa").await;
    let (formation, modules) = ctx.formation("Bureautique", 1).await;
    EnrollmentService::enroll(&ctx.db, student.id, formation.id).await.unwrap();
    EnrollmentService::complete_module(&ctx.db, student.id, modules[0].id)
        .await
        .unwrap();
    let requested = CertificateService::request(&ctx.db, student.id, formation.id)
        .await
        .unwrap();

    let (first, _) = CertificateService::issue(&ctx.db, ctx.issuer(), requested.id)
        .await
        .unwrap();
    let (second, outcome) = CertificateService::issue(&ctx.db, ctx.issuer(), requested.id)
        .await
        .unwrap();

    assert!(!outcome.is_applied());
    assert_eq!(outcome.status(), CertificateStatus::Generated);
    assert_eq!(second.issued_at, first.issued_at);
    assert_eq!(second.file_path, first.file_path);
    assert_eq!(ctx.mailer.sent().len(), 1);

    let report = CertificateService::issue_bulk(&ctx.db, ctx.issuer(), &[requested.id]).await;
    assert_eq!(report.issued, 0);
    assert_eq!(report.unchanged, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(ctx.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_issue_renders_again_when_the_file_is_gone() {
    let ctx = TestContext::new().await;
    let student = ctx.student("Awa").await;
    let (formation, modules) = ctx.formation("Bureautique", 1).await;
    EnrollmentService::enroll(&ctx.db, student.id, formation.id).await.unwrap();
    EnrollmentService::complete_module(&ctx.db, student.id, modules[0].id)
        .await
        .unwrap();
    let requested = CertificateService::request(&ctx.db, student.id, formation.id)
        .await
        .unwrap();
    let (first, _) = CertificateService::issue(&ctx.db, ctx.issuer(), requested.id)
        .await
        .unwrap();
    ctx.storage
        .delete(first.file_path.as_deref().unwrap())
        .await
        .unwrap();

    let (second, outcome) = CertificateService::issue(&ctx.db, ctx.issuer(), requested.id)
        .await
        .unwrap();

    assert!(outcome.is_applied());
    let path = second.file_path.unwrap();
    assert!(ctx.storage.exists(&path).await.unwrap());
}

#[tokio::test]
async fn test_bulk_issue_reports_failures() {
    let ctx = TestContext::new().await;
    let (formation, modules) = ctx.formation("Bureautique", 1).await;

    let mut ids = Vec::new();
    for name in ["Awa", "Koffi"] {
        let student = ctx.student(name).await;
        EnrollmentService::enroll(&ctx.db, student.id, formation.id).await.unwrap();
        EnrollmentService::complete_module(&ctx.db, student.id, modules[0].id)
            .await
            .unwrap();
        let requested = CertificateService::request(&ctx.db, student.id, formation.id)
            .await
            .unwrap();
        ids.push(requested.id);
    }
    let missing = Uuid::new_v4();
    ids.push(missing);

    let report = CertificateService::issue_bulk(&ctx.db, ctx.issuer(), &ids).await;

    assert_eq!(report.issued, 2);
    assert_eq!(report.unchanged, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].id, missing);
}

#[tokio::test]
async fn test_students_download_only_their_certificates() {
    let ctx = TestContext::new().await;
    let owner = ctx.student("Awa").await;
    let other = ctx.student("Koffi").await;
    let (formation, modules) = ctx.formation("Bureautique", 1).await;
    EnrollmentService::enroll(&ctx.db, owner.id, formation.id).await.unwrap();
    EnrollmentService::complete_module(&ctx.db, owner.id, modules[0].id)
        .await
        .unwrap();
    let requested = CertificateService::request(&ctx.db, owner.id, formation.id)
        .await
        .unwrap();

    assert!(matches!(
        CertificateService::student_file(&ctx.db, &ctx.storage, owner.id, requested.id).await,
        Err(ServiceError::StateConflict(_))
    ));

    CertificateService::issue(&ctx.db, ctx.issuer(), requested.id)
        .await
        .unwrap();
    assert!(matches!(
        CertificateService::student_file(&ctx.db, &ctx.storage, other.id, requested.id).await,
        Err(ServiceError::Authorization(_))
    ));
    let (_, bytes) = CertificateService::student_file(&ctx.db, &ctx.storage, owner.id, requested.id)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF-"));

    let listed = CertificateService::list_for_student(&ctx.db, owner.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].1.as_ref().map(|f| f.id), Some(formation.id));
}
