use crate::auth::Account;
use crate::dtos::{StatusChangeResponse, StatusFilter};
use crate::dtos::account::{BulkIssueRequest, CertificateRequest, CertificateResponse};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::utils::download::attachment;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use database::entities::certificate;
use database::services::certificate::{BulkIssueReport, CertificateService, VerifiedCertificate};
use models::status::CertificateStatus;
use uuid::Uuid;

fn pdf(certificate: &certificate::Model, bytes: Vec<u8>) -> Response {
    attachment(
        bytes,
        "application/pdf",
        &format!("certificat-{}.pdf", certificate.verification_code),
    )
}

/// Check a verification code printed on a certificate
#[utoipa::path(
    get,
    path = "/certificates/verify/{code}",
    params(("code" = String, Path, description = "Verification code, case and dashes ignored")),
    responses(
        (status = 200, description = "Certificate is genuine", body = VerifiedCertificate),
        (status = 404, description = "Unknown or not yet issued")
    ),
    tag = "Certificates"
)]
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<VerifiedCertificate>> {
    Ok(Json(CertificateService::verify(&state.db, &code).await?))
}

/// Ask for the certificate of a completed formation
#[utoipa::path(
    post,
    path = "/me/formations/{id}/certificate",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses(
        (status = 201, description = "Certificate requested, or the existing one", body = CertificateResponse),
        (status = 403, description = "Not enrolled"),
        (status = 409, description = "Modules left to complete")
    ),
    security(("jwt" = [])),
    tag = "Certificates"
)]
pub async fn request_certificate(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<CertificateResponse>)> {
    let certificate = CertificateService::request(&state.db, user.id, id).await?;
    Ok((StatusCode::CREATED, Json(certificate.into())))
}

#[utoipa::path(
    get,
    path = "/me/certificates",
    responses((status = 200, description = "The caller's certificates", body = Vec<CertificateResponse>)),
    security(("jwt" = [])),
    tag = "Certificates"
)]
pub async fn my_certificates(
    State(state): State<AppState>,
    Account(user): Account,
) -> ApiResult<Json<Vec<CertificateResponse>>> {
    let certificates = CertificateService::list_for_student(&state.db, user.id).await?;
    Ok(Json(
        certificates
            .into_iter()
            .map(|(certificate, formation)| CertificateResponse::with_formation(certificate, formation))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/me/certificates/{id}/file",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Certificate PDF", content_type = "application/pdf"),
        (status = 403, description = "Not the caller's certificate"),
        (status = 409, description = "Not issued yet")
    ),
    security(("jwt" = [])),
    tag = "Certificates"
)]
pub async fn my_certificate_file(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let (certificate, bytes) =
        CertificateService::student_file(&state.db, state.storage.as_ref(), user.id, id).await?;
    Ok(pdf(&certificate, bytes))
}

#[utoipa::path(
    get,
    path = "/admin/certificates",
    params(("status" = Option<CertificateStatus>, Query, description = "Only certificates with this status")),
    responses((status = 200, description = "Certificates, newest first", body = Vec<CertificateResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn list_certificates(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter<CertificateStatus>>,
) -> ApiResult<Json<Vec<CertificateResponse>>> {
    let certificates = CertificateService::list(&state.db, filter.status).await?;
    Ok(Json(certificates.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/admin/certificates",
    request_body = CertificateRequest,
    responses(
        (status = 201, description = "Pending certificate created", body = CertificateResponse),
        (status = 409, description = "Student has not completed the formation")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_certificate(
    State(state): State<AppState>,
    Json(request): Json<CertificateRequest>,
) -> ApiResult<(StatusCode, Json<CertificateResponse>)> {
    let certificate =
        CertificateService::create(&state.db, request.student_id, request.formation_id).await?;
    Ok((StatusCode::CREATED, Json(certificate.into())))
}

/// Render the PDF and mail the student; issuing twice is reported as unchanged
#[utoipa::path(
    post,
    path = "/admin/certificates/{id}/issue",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Certificate generated or already generated"),
        (status = 404, description = "Certificate not found"),
        (status = 409, description = "Student is no longer eligible")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn issue_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusChangeResponse<CertificateResponse>>> {
    let (certificate, outcome) = CertificateService::issue(&state.db, state.issuer(), id).await?;
    Ok(Json(StatusChangeResponse::new(certificate.into(), outcome)))
}

#[utoipa::path(
    post,
    path = "/admin/certificates/bulk-issue",
    request_body = BulkIssueRequest,
    responses((status = 200, description = "Per-certificate outcome", body = BulkIssueReport)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn bulk_issue_certificates(
    State(state): State<AppState>,
    Json(request): Json<BulkIssueRequest>,
) -> ApiResult<Json<BulkIssueReport>> {
    Ok(Json(
        CertificateService::issue_bulk(&state.db, state.issuer(), &request.ids).await,
    ))
}

#[utoipa::path(
    get,
    path = "/admin/certificates/{id}/file",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Certificate PDF", content_type = "application/pdf"),
        (status = 409, description = "Not issued yet")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn certificate_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let (certificate, bytes) =
        CertificateService::file(&state.db, state.storage.as_ref(), id).await?;
    Ok(pdf(&certificate, bytes))
}

#[utoipa::path(
    delete,
    path = "/admin/certificates/{id}",
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 204, description = "Certificate and its PDF deleted"),
        (status = 404, description = "Certificate not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    CertificateService::delete(&state.db, state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
