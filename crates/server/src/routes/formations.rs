use crate::auth::Account;
use crate::dtos::formation::{
    EnrollmentResponse, FormationDetailResponse, FormationResponse, ModuleOutline, ModuleResponse,
    ProgressResponse,
};
use crate::dtos::StatusChangeResponse;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::utils::{download::attachment, multipart::read_form};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Response,
};
use database::entities::module;
use database::services::{
    enrollment::EnrollmentService, formation::FormationService, module::ModuleService,
};
use models::forms::{FormationForm, ModuleForm};
use models::slug::slugify;
use uuid::Uuid;

fn module_download(module: &module::Model, bytes: Vec<u8>) -> Response {
    let extension = module
        .file_path
        .as_deref()
        .and_then(|path| path.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .unwrap_or("bin");
    attachment(
        bytes,
        module
            .file_mime
            .as_deref()
            .unwrap_or("application/octet-stream"),
        &format!("{}.{extension}", slugify(&module.title)),
    )
}

/// List published formations
#[utoipa::path(
    get,
    path = "/formations",
    responses(
        (status = 200, description = "Published formations", body = Vec<FormationResponse>)
    ),
    tag = "Formations"
)]
pub async fn list_formations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<FormationResponse>>> {
    let formations = FormationService::list(&state.db, true).await?;
    Ok(Json(
        formations
            .into_iter()
            .map(|f| FormationResponse::new(f, state.storage.as_ref()))
            .collect(),
    ))
}

/// Get a published formation and the outline of its modules
#[utoipa::path(
    get,
    path = "/formations/{slug}",
    params(("slug" = String, Path, description = "Formation slug")),
    responses(
        (status = 200, description = "Formation found", body = FormationDetailResponse),
        (status = 404, description = "Formation not found or not published")
    ),
    tag = "Formations"
)]
pub async fn show_formation(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<FormationDetailResponse>> {
    let formation = FormationService::get_published_by_slug(&state.db, &slug).await?;
    let modules = ModuleService::list(&state.db, formation.id).await?;

    Ok(Json(FormationDetailResponse {
        formation: FormationResponse::new(formation, state.storage.as_ref()),
        modules: modules.into_iter().map(ModuleOutline::from).collect(),
    }))
}

/// Formations the caller is enrolled in
#[utoipa::path(
    get,
    path = "/me/formations",
    responses((status = 200, description = "Success", body = Vec<FormationResponse>)),
    security(("jwt" = [])),
    tag = "Enrollment"
)]
pub async fn my_formations(
    State(state): State<AppState>,
    Account(user): Account,
) -> ApiResult<Json<Vec<FormationResponse>>> {
    let formations = EnrollmentService::enrolled_formations(&state.db, user.id).await?;
    Ok(Json(
        formations
            .into_iter()
            .map(|f| FormationResponse::new(f, state.storage.as_ref()))
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/me/formations/{id}/enrollment",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 404, description = "Formation not found"),
        (status = 409, description = "Already enrolled or formation not published")
    ),
    security(("jwt" = [])),
    tag = "Enrollment"
)]
pub async fn enroll(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<EnrollmentResponse>)> {
    let registration = EnrollmentService::enroll(&state.db, user.id, id).await?;
    Ok((StatusCode::CREATED, Json(registration.into())))
}

#[utoipa::path(
    delete,
    path = "/me/formations/{id}/enrollment",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses(
        (status = 204, description = "Enrollment removed"),
        (status = 404, description = "Not enrolled")
    ),
    security(("jwt" = [])),
    tag = "Enrollment"
)]
pub async fn unenroll(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    EnrollmentService::unenroll(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Modules of an enrolled formation, with the caller's completion marks
#[utoipa::path(
    get,
    path = "/me/formations/{id}/modules",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses(
        (status = 200, description = "Success", body = Vec<ModuleResponse>),
        (status = 403, description = "Not enrolled")
    ),
    security(("jwt" = [])),
    tag = "Enrollment"
)]
pub async fn my_modules(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ModuleResponse>>> {
    let modules = EnrollmentService::modules(&state.db, user.id, id).await?;
    let completed = EnrollmentService::completed_module_ids(&state.db, user.id, id).await?;

    Ok(Json(
        modules
            .into_iter()
            .map(|m| ModuleResponse::for_student(m, &completed))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/me/formations/{id}/progress",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses(
        (status = 200, description = "Success", body = ProgressResponse),
        (status = 403, description = "Not enrolled")
    ),
    security(("jwt" = [])),
    tag = "Enrollment"
)]
pub async fn my_progress(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProgressResponse>> {
    EnrollmentService::ensure_access(&state.db, user.id, id).await?;
    let progress = EnrollmentService::progress(&state.db, user.id, id).await?;
    Ok(Json(progress.into()))
}

/// Download the attachment of a module
#[utoipa::path(
    get,
    path = "/me/modules/{id}/file",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Module file", content_type = "application/octet-stream"),
        (status = 403, description = "Not enrolled"),
        (status = 404, description = "Module or file not found")
    ),
    security(("jwt" = [])),
    tag = "Enrollment"
)]
pub async fn my_module_file(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let (module, bytes) =
        EnrollmentService::module_file(&state.db, state.storage.as_ref(), user.id, id).await?;
    Ok(module_download(&module, bytes))
}

#[utoipa::path(
    post,
    path = "/me/modules/{id}/completion",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 204, description = "Module marked as completed"),
        (status = 403, description = "Not enrolled")
    ),
    security(("jwt" = [])),
    tag = "Enrollment"
)]
pub async fn complete_module(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    EnrollmentService::complete_module(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/me/modules/{id}/completion",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 204, description = "Completion removed"),
        (status = 403, description = "Not enrolled")
    ),
    security(("jwt" = [])),
    tag = "Enrollment"
)]
pub async fn uncomplete_module(
    State(state): State<AppState>,
    Account(user): Account,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    EnrollmentService::uncomplete_module(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List every formation, drafts included
#[utoipa::path(
    get,
    path = "/admin/formations",
    responses((status = 200, description = "Success", body = Vec<FormationResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_list_formations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<FormationResponse>>> {
    let formations = FormationService::list(&state.db, false).await?;
    Ok(Json(
        formations
            .into_iter()
            .map(|f| FormationResponse::new(f, state.storage.as_ref()))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/admin/formations/{id}",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses(
        (status = 200, description = "Success", body = FormationResponse),
        (status = 404, description = "Formation not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_show_formation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FormationResponse>> {
    let formation = FormationService::get(&state.db, id).await?;
    Ok(Json(FormationResponse::new(formation, state.storage.as_ref())))
}

/// Create a formation from a `data` JSON part and an optional `file` image
#[utoipa::path(
    post,
    path = "/admin/formations",
    request_body(content = FormationForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Success", body = FormationResponse),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_formation(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<FormationResponse>)> {
    let form = read_form::<FormationForm>(multipart).await?;
    let formation =
        FormationService::create(&state.db, state.storage.as_ref(), form.data, form.file).await?;
    Ok((
        StatusCode::CREATED,
        Json(FormationResponse::new(formation, state.storage.as_ref())),
    ))
}

#[utoipa::path(
    put,
    path = "/admin/formations/{id}",
    params(("id" = Uuid, Path, description = "Formation ID")),
    request_body(content = FormationForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Success", body = FormationResponse),
        (status = 404, description = "Formation not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn update_formation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<FormationResponse>> {
    let form = read_form::<FormationForm>(multipart).await?;
    let formation =
        FormationService::update(&state.db, state.storage.as_ref(), id, form.data, form.file)
            .await?;
    Ok(Json(FormationResponse::new(formation, state.storage.as_ref())))
}

/// Switch a formation between draft and published
#[utoipa::path(
    post,
    path = "/admin/formations/{id}/toggle-status",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses((status = 200, description = "New status"), (status = 404, description = "Not found")),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn toggle_formation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusChangeResponse<FormationResponse>>> {
    let (formation, outcome) = FormationService::toggle_status(&state.db, id).await?;
    Ok(Json(StatusChangeResponse::new(
        FormationResponse::new(formation, state.storage.as_ref()),
        outcome,
    )))
}

/// Delete a formation with its modules, enrollments and certificates
#[utoipa::path(
    delete,
    path = "/admin/formations/{id}",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found")),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_formation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    FormationService::delete(&state.db, state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/formations/{id}/enrollments",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses((status = 200, description = "Success", body = Vec<EnrollmentResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn formation_enrollments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<EnrollmentResponse>>> {
    FormationService::get(&state.db, id).await?;
    let registrations = EnrollmentService::registrations(&state.db, id).await?;
    Ok(Json(registrations.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/admin/formations/{id}/modules",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses((status = 200, description = "Success", body = Vec<ModuleResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_list_modules(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ModuleResponse>>> {
    let modules = ModuleService::list(&state.db, id).await?;
    Ok(Json(modules.into_iter().map(Into::into).collect()))
}

/// Add a module; the optional `file` part becomes its private attachment
#[utoipa::path(
    post,
    path = "/admin/formations/{id}/modules",
    params(("id" = Uuid, Path, description = "Formation ID")),
    request_body(content = ModuleForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Success", body = ModuleResponse),
        (status = 404, description = "Formation not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_module(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ModuleResponse>)> {
    let form = read_form::<ModuleForm>(multipart).await?;
    let module =
        ModuleService::create(&state.db, state.storage.as_ref(), id, form.data, form.file).await?;
    Ok((StatusCode::CREATED, Json(module.into())))
}

#[utoipa::path(
    put,
    path = "/admin/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body(content = ModuleForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Success", body = ModuleResponse),
        (status = 404, description = "Module not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn update_module(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<ModuleResponse>> {
    let form = read_form::<ModuleForm>(multipart).await?;
    let module =
        ModuleService::update(&state.db, state.storage.as_ref(), id, form.data, form.file).await?;
    Ok(Json(module.into()))
}

#[utoipa::path(
    delete,
    path = "/admin/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found")),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_module(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ModuleService::delete(&state.db, state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/modules/{id}/file",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Module file", content_type = "application/octet-stream"),
        (status = 404, description = "Module or file not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_module_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let module = ModuleService::get(&state.db, id).await?;
    let bytes = ModuleService::read_file(state.storage.as_ref(), &module).await?;
    Ok(module_download(&module, bytes))
}
