use crate::dtos::StatusChangeResponse;
use crate::dtos::content::{ArticleQuery, ArticleResponse};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::utils::multipart::read_form;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use database::services::article::ArticleService;
use models::forms::ArticleForm;
use uuid::Uuid;

/// List published articles, newest first
#[utoipa::path(
    get,
    path = "/articles",
    params(ArticleQuery),
    responses((status = 200, description = "Published articles", body = Vec<ArticleResponse>)),
    tag = "Articles"
)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticleQuery>,
) -> ApiResult<Json<Vec<ArticleResponse>>> {
    let articles = ArticleService::list(&state.db, true, query.category).await?;
    Ok(Json(
        articles
            .into_iter()
            .map(|a| ArticleResponse::new(a, Vec::new(), state.storage.as_ref()))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article with its gallery", body = ArticleResponse),
        (status = 404, description = "Article not found or not published")
    ),
    tag = "Articles"
)]
pub async fn show_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleResponse>> {
    let (article, images) = ArticleService::get_published_by_slug(&state.db, &slug).await?;
    Ok(Json(ArticleResponse::new(
        article,
        images,
        state.storage.as_ref(),
    )))
}

#[utoipa::path(
    get,
    path = "/admin/articles",
    params(ArticleQuery),
    responses((status = 200, description = "All articles, drafts included", body = Vec<ArticleResponse>)),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_list_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticleQuery>,
) -> ApiResult<Json<Vec<ArticleResponse>>> {
    let articles = ArticleService::list(&state.db, false, query.category).await?;
    Ok(Json(
        articles
            .into_iter()
            .map(|a| ArticleResponse::new(a, Vec::new(), state.storage.as_ref()))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/admin/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article with its gallery", body = ArticleResponse),
        (status = 404, description = "Article not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn admin_show_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ArticleResponse>> {
    let (article, images) = ArticleService::get(&state.db, id).await?;
    Ok(Json(ArticleResponse::new(
        article,
        images,
        state.storage.as_ref(),
    )))
}

/// Create an article; `file` is the cover, each `images` part joins the gallery
#[utoipa::path(
    post,
    path = "/admin/articles",
    request_body(content = ArticleForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn create_article(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ArticleResponse>)> {
    let form = read_form::<ArticleForm>(multipart).await?;
    let (article, images) = ArticleService::create(
        &state.db,
        state.storage.as_ref(),
        form.data,
        form.file,
        form.images,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ArticleResponse::new(
            article,
            images,
            state.storage.as_ref(),
        )),
    ))
}

/// Update an article; new `images` are appended to the gallery
#[utoipa::path(
    put,
    path = "/admin/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body(content = ArticleForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 404, description = "Article not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<ArticleResponse>> {
    let form = read_form::<ArticleForm>(multipart).await?;
    let (article, images) = ArticleService::update(
        &state.db,
        state.storage.as_ref(),
        id,
        form.data,
        form.file,
        form.images,
    )
    .await?;
    Ok(Json(ArticleResponse::new(
        article,
        images,
        state.storage.as_ref(),
    )))
}

#[utoipa::path(
    post,
    path = "/admin/articles/{id}/toggle-status",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Switched between draft and published"),
        (status = 404, description = "Article not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn toggle_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusChangeResponse<ArticleResponse>>> {
    let (article, outcome) = ArticleService::toggle_status(&state.db, id).await?;
    Ok(Json(StatusChangeResponse::new(
        ArticleResponse::new(article, Vec::new(), state.storage.as_ref()),
        outcome,
    )))
}

#[utoipa::path(
    delete,
    path = "/admin/articles/{id}/images/{image_id}",
    params(
        ("id" = Uuid, Path, description = "Article ID"),
        ("image_id" = Uuid, Path, description = "Gallery image ID")
    ),
    responses(
        (status = 204, description = "Image removed"),
        (status = 404, description = "Image not found on this article")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn remove_article_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    ArticleService::remove_image(&state.db, state.storage.as_ref(), id, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/admin/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 204, description = "Article and its files deleted"),
        (status = 404, description = "Article not found")
    ),
    security(("jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ArticleService::delete(&state.db, state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
