use super::public_url;
use chrono::NaiveDateTime;
use database::entities::{article, article_image, club, media};
use models::content::{ArticleCategory, ClubCategory, MediaKind};
use models::status::{ClubStatus, PublicationStatus};
use serde::{Deserialize, Serialize};
use storage::BlobStore;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleImageResponse {
    pub id: Uuid,
    pub url: Option<String>,
    pub position: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub category: ArticleCategory,
    pub status: PublicationStatus,
    pub cover_url: Option<String>,
    /// Gallery, only filled on single-article reads
    pub images: Vec<ArticleImageResponse>,
    pub published_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ArticleResponse {
    pub fn new(
        article: article::Model,
        images: Vec<article_image::Model>,
        storage: &dyn BlobStore,
    ) -> Self {
        Self {
            cover_url: public_url(storage, article.cover_path.as_deref()),
            images: images
                .into_iter()
                .map(|image| ArticleImageResponse {
                    url: storage.url(&image.path),
                    id: image.id,
                    position: image.position,
                })
                .collect(),
            id: article.id,
            title: article.title,
            slug: article.slug,
            excerpt: article.excerpt,
            body: article.body,
            category: article.category,
            status: article.status,
            published_at: article.published_at,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MediaResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: MediaKind,
    pub url: Option<String>,
    pub is_public: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl MediaResponse {
    pub fn new(media: media::Model, storage: &dyn BlobStore) -> Self {
        Self {
            url: storage.url(&media.file_path),
            id: media.id,
            title: media.title,
            description: media.description,
            kind: media.kind,
            is_public: media.is_public,
            created_at: media.created_at,
            updated_at: media.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClubResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: ClubCategory,
    pub logo_url: Option<String>,
    pub contact_email: String,
    pub status: ClubStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ClubResponse {
    pub fn new(club: club::Model, storage: &dyn BlobStore) -> Self {
        Self {
            logo_url: public_url(storage, club.logo_path.as_deref()),
            id: club.id,
            name: club.name,
            slug: club.slug,
            description: club.description,
            category: club.category,
            contact_email: club.contact_email,
            status: club.status,
            created_at: club.created_at,
            updated_at: club.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleQuery {
    pub category: Option<ArticleCategory>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MediaQuery {
    pub kind: Option<MediaKind>,
}
