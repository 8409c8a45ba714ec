pub mod account;
pub mod article;
pub mod certificate;
pub mod club;
pub mod competition;
pub mod enrollment;
pub mod event;
pub mod formation;
pub mod inquiry;
pub mod media;
pub mod module;
pub mod reservation;

use crate::error::{ServiceError, ServiceResult};
use chrono::{NaiveDateTime, Utc};
use models::slug::{slugify, with_suffix};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use storage::{BlobStore, Upload, Visibility};

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub(crate) fn found<T>(model: Option<T>, what: &'static str) -> ServiceResult<T> {
    model.ok_or(ServiceError::NotFound(what))
}

/// First free slug derived from `title` for the given column
pub(crate) async fn unique_slug<E, C>(db: &C, column: E::Column, title: &str) -> Result<String, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let base = slugify(title);
    let mut n = 1;

    loop {
        let candidate = with_suffix(&base, n);
        let taken = E::find()
            .filter(column.eq(candidate.as_str()))
            .one(db)
            .await?
            .is_some();
        if !taken {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Stores an optional upload, returning its path
pub(crate) async fn store(
    storage: &dyn BlobStore,
    dir: &str,
    upload: Option<&Upload>,
    visibility: Visibility,
) -> ServiceResult<Option<String>> {
    match upload {
        Some(upload) => Ok(Some(storage.put(dir, upload, visibility).await?)),
        None => Ok(None),
    }
}

/// Returns the write result, removing a freshly stored file if the write failed
pub(crate) async fn persist<T>(
    storage: &dyn BlobStore,
    stored: Option<&str>,
    result: Result<T, DbErr>,
) -> ServiceResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            storage::discard(storage, stored).await;
            Err(e.into())
        }
    }
}

/// Drops the previous file once its replacement is saved
pub(crate) async fn release(storage: &dyn BlobStore, replaced: bool, previous: Option<&str>) {
    if replaced {
        storage::discard(storage, previous).await;
    }
}
