//! Certificate requests, issuance and public verification.

use super::{found, now, persist, release};
use crate::entities::{certificate, formation, user};
use crate::error::{ServiceError, ServiceResult};
use crate::services::enrollment::EnrollmentService;
use log::{info, warn};
use mailer::{Message, Notifier, Template};
use models::{
    certificate::{generate_verification_code, normalize_code},
    document::CertificateDocument,
    status::CertificateStatus,
    transition::TransitionOutcome,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use serde_json::json;
use storage::{BlobStore, Upload, Visibility};
use utoipa::ToSchema;
use uuid::Uuid;

/// Outcome of a bulk issuance; failures do not stop the batch
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct BulkIssueReport {
    pub issued: usize,
    /// Already generated, left untouched
    pub unchanged: usize,
    pub failed: usize,
    pub failures: Vec<IssueFailure>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssueFailure {
    pub id: Uuid,
    pub reason: String,
}

/// What the public verification page may reveal
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct VerifiedCertificate {
    pub student_name: String,
    pub formation_title: String,
    pub issued_on: chrono::NaiveDate,
    pub verification_code: String,
}

/// Storage, mail and base URL used while issuing
#[derive(Clone, Copy)]
pub struct Issuer<'a> {
    pub storage: &'a dyn BlobStore,
    pub notifier: &'a Notifier,
    pub public_url: &'a str,
}

impl Issuer<'_> {
    fn verification_url(&self, code: &str) -> String {
        format!(
            "{}/certificates/verify/{code}",
            self.public_url.trim_end_matches('/')
        )
    }
}

pub struct CertificateService;

impl CertificateService {
    const DIR: &'static str = "certificates";

    pub async fn can_issue(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<bool> {
        Ok(EnrollmentService::progress(db, student_id, formation_id)
            .await?
            .is_complete())
    }

    async fn ensure_eligible(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<()> {
        if Self::can_issue(db, student_id, formation_id).await? {
            Ok(())
        } else {
            Err(ServiceError::StateConflict(
                "Tous les modules de la formation doivent être terminés.".to_owned(),
            ))
        }
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<certificate::Model> {
        found(
            certificate::Entity::find_by_id(id).one(db).await?,
            "Certificat",
        )
    }

    async fn find_for(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<Option<certificate::Model>> {
        Ok(certificate::Entity::find()
            .filter(certificate::Column::StudentId.eq(student_id))
            .filter(certificate::Column::FormationId.eq(formation_id))
            .one(db)
            .await?)
    }

    /// A student asking for their certificate once every module is done.
    ///
    /// Asking twice returns the existing record.
    pub async fn request(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<certificate::Model> {
        EnrollmentService::ensure_access(db, student_id, formation_id).await?;
        Self::create(db, student_id, formation_id).await
    }

    /// Creates the pending record for an eligible student
    pub async fn create(
        db: &DatabaseConnection,
        student_id: Uuid,
        formation_id: Uuid,
    ) -> ServiceResult<certificate::Model> {
        if let Some(existing) = Self::find_for(db, student_id, formation_id).await? {
            return Ok(existing);
        }
        Self::ensure_eligible(db, student_id, formation_id).await?;

        let timestamp = now();
        let created = certificate::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            formation_id: Set(formation_id),
            verification_code: Set(generate_verification_code()),
            file_path: Set(None),
            status: Set(CertificateStatus::Pending),
            issued_at: Set(None),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(db)
        .await
        .map_err(|e| {
            ServiceError::conflict_on_duplicate(e, "Un certificat existe déjà pour cette formation.")
        })?;

        info!(
            "Certificate {} requested for student {student_id} in formation {formation_id}",
            created.id
        );
        Ok(created)
    }

    /// Renders and stores the PDF, then marks the certificate as generated.
    ///
    /// Eligibility is checked again since modules may have changed. A
    /// generated certificate whose PDF is still stored is left as is; one
    /// whose file went missing is rendered again.
    pub async fn issue(
        db: &DatabaseConnection,
        issuer: Issuer<'_>,
        id: Uuid,
    ) -> ServiceResult<(certificate::Model, TransitionOutcome<CertificateStatus>)> {
        let existing = Self::get(db, id).await?;
        if existing.status == CertificateStatus::Generated
            && let Some(path) = &existing.file_path
            && issuer.storage.exists(path).await?
        {
            return Ok((
                existing,
                TransitionOutcome::Unchanged {
                    status: CertificateStatus::Generated,
                },
            ));
        }
        let from = existing.status;
        Self::ensure_eligible(db, existing.student_id, existing.formation_id).await?;
        let student = found(
            user::Entity::find_by_id(existing.student_id).one(db).await?,
            "Étudiant",
        )?;
        let formation = found(
            formation::Entity::find_by_id(existing.formation_id)
                .one(db)
                .await?,
            "Formation",
        )?;

        let timestamp = now();
        let code = existing.verification_code.clone();
        let verification_url = issuer.verification_url(&code);
        let document = CertificateDocument {
            student_name: student.name.clone(),
            formation_title: formation.title.clone(),
            issued_on: timestamp.date(),
            verification_code: code.clone(),
            verification_url: Some(verification_url.clone()),
        };
        let upload = Upload {
            file_name: format!("{code}.pdf"),
            content_type: Some("application/pdf".to_owned()),
            bytes: document.render_pdf(),
        };
        let path = issuer
            .storage
            .put(Self::DIR, &upload, Visibility::Private)
            .await?;
        let previous = existing.file_path.clone();

        let mut active: certificate::ActiveModel = existing.into();
        active.file_path = Set(Some(path.clone()));
        active.status = Set(CertificateStatus::Generated);
        active.issued_at = Set(Some(timestamp));
        active.updated_at = Set(timestamp);
        let issued = persist(issuer.storage, Some(path.as_str()), active.update(db).await).await?;
        release(issuer.storage, true, previous.as_deref()).await;

        info!("Issued certificate {code} to student {}", student.id);
        issuer
            .notifier
            .dispatch(Message::new(
                Template::CertificateIssued,
                &student.email,
                &json!({
                    "name": student.name,
                    "formation": formation.title,
                    "code": code,
                    "verify_url": verification_url,
                }),
            ))
            .await;

        Ok((
            issued,
            TransitionOutcome::Applied {
                from,
                to: CertificateStatus::Generated,
            },
        ))
    }

    /// Issues each certificate independently and reports what failed
    pub async fn issue_bulk(
        db: &DatabaseConnection,
        issuer: Issuer<'_>,
        ids: &[Uuid],
    ) -> BulkIssueReport {
        let mut report = BulkIssueReport::default();

        for &id in ids {
            match Self::issue(db, issuer, id).await {
                Ok((_, outcome)) if outcome.is_applied() => report.issued += 1,
                Ok(_) => report.unchanged += 1,
                Err(e) => {
                    warn!("Could not issue certificate {id}: {e}");
                    report.failed += 1;
                    report.failures.push(IssueFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Bulk issuance done: {} issued, {} unchanged, {} failed",
            report.issued, report.unchanged, report.failed
        );
        report
    }

    /// Public lookup by code; pending certificates stay hidden
    pub async fn verify(db: &DatabaseConnection, code: &str) -> ServiceResult<VerifiedCertificate> {
        let code = normalize_code(code);
        let certificate = found(
            certificate::Entity::find()
                .filter(certificate::Column::VerificationCode.eq(code.as_str()))
                .filter(certificate::Column::Status.eq(CertificateStatus::Generated))
                .one(db)
                .await?,
            "Certificat",
        )?;
        let issued_at = found(certificate.issued_at, "Certificat")?;
        let student = found(
            user::Entity::find_by_id(certificate.student_id)
                .one(db)
                .await?,
            "Certificat",
        )?;
        let formation = found(
            formation::Entity::find_by_id(certificate.formation_id)
                .one(db)
                .await?,
            "Certificat",
        )?;

        Ok(VerifiedCertificate {
            student_name: student.name,
            formation_title: formation.title,
            issued_on: issued_at.date(),
            verification_code: certificate.verification_code,
        })
    }

    pub async fn list(
        db: &DatabaseConnection,
        status: Option<CertificateStatus>,
    ) -> ServiceResult<Vec<certificate::Model>> {
        let mut query = certificate::Entity::find().order_by_desc(certificate::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(certificate::Column::Status.eq(status));
        }
        Ok(query.all(db).await?)
    }

    pub async fn list_for_student(
        db: &DatabaseConnection,
        student_id: Uuid,
    ) -> ServiceResult<Vec<(certificate::Model, Option<formation::Model>)>> {
        Ok(certificate::Entity::find()
            .filter(certificate::Column::StudentId.eq(student_id))
            .order_by_desc(certificate::Column::CreatedAt)
            .find_also_related(formation::Entity)
            .all(db)
            .await?)
    }

    /// Reads the PDF of a generated certificate
    pub async fn file(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
    ) -> ServiceResult<(certificate::Model, Vec<u8>)> {
        let certificate = Self::get(db, id).await?;
        let path = match (&certificate.status, &certificate.file_path) {
            (CertificateStatus::Generated, Some(path)) => path.clone(),
            _ => {
                return Err(ServiceError::StateConflict(
                    "Ce certificat n'a pas encore été délivré.".to_owned(),
                ));
            }
        };
        let bytes = storage.read(&path).await?;
        Ok((certificate, bytes))
    }

    pub async fn student_file(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        student_id: Uuid,
        id: Uuid,
    ) -> ServiceResult<(certificate::Model, Vec<u8>)> {
        let certificate = Self::get(db, id).await?;
        if certificate.student_id != student_id {
            return Err(ServiceError::forbidden("Ce certificat ne vous appartient pas."));
        }
        Self::file(db, storage, id).await
    }

    pub async fn delete(
        db: &DatabaseConnection,
        storage: &dyn BlobStore,
        id: Uuid,
    ) -> ServiceResult<()> {
        let existing = Self::get(db, id).await?;
        certificate::Entity::delete_by_id(id).exec(db).await?;
        storage::discard(storage, existing.file_path.as_deref()).await;

        info!("Deleted certificate {id}");
        Ok(())
    }
}
