use uuid::Uuid;

use crate::core::models::common::Versioned;
use crate::core::ports::repository::VersionedCommon;
use crate::error::Error;

const MSG_CONFLICT: &str = "The entity was modified concurrently. Please retry.";

async fn lock<S, E>(store: &mut S, id: Uuid) -> Result<E, Error>
where
    S: VersionedCommon<E>,
    E: Versioned,
{
    <S as VersionedCommon<E>>::lock(store, id).await?.ok_or_else(|| Error::NotFound(E::NOT_FOUND.into()))
}

/// Archives the live row under its current version, then writes the next
/// version produced by `change`.
async fn advance<S, E, F>(store: &mut S, mut current: E, change: F) -> Result<E, Error>
where
    S: VersionedCommon<E>,
    E: Versioned,
    F: FnOnce(&mut E),
{
    let expected = current.version();
    <S as VersionedCommon<E>>::archive(store, &current.snapshot()).await?;
    current.bump();
    change(&mut current);
    if !<S as VersionedCommon<E>>::replace(store, &current, expected).await? {
        return Err(Error::Conflict(MSG_CONFLICT.into()));
    }
    Ok(current)
}

pub async fn edit<S, E, F>(store: &mut S, id: Uuid, change: F) -> Result<E, Error>
where
    S: VersionedCommon<E>,
    E: Versioned,
    F: FnOnce(&mut E),
{
    let current = lock(store, id).await?;
    advance(store, current, change).await
}

/// Restores the fields of an archived version as a new version. The version
/// counter never goes back.
pub async fn rollback<S, E>(store: &mut S, id: Uuid, version: i32) -> Result<E, Error>
where
    S: VersionedCommon<E>,
    E: Versioned,
{
    let current = lock(store, id).await?;
    let target = <S as VersionedCommon<E>>::get_archived(store, id, version)
        .await?
        .ok_or_else(|| Error::NotFound(E::VERSION_NOT_FOUND.into()))?;
    advance(store, current, |e| e.restore(&target)).await
}
