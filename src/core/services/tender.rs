use log::info;
use uuid::Uuid;

use crate::core::models::{
    common::{Pagination, Status},
    tender::{Create, Patch, Query, ServiceType, Tender, TenderArchive},
};
use crate::core::ports::repository::{Store, TenderCommon, TxStore};
use crate::core::services::identity::{authorize_responsible, ensure_responsible, resolve_user};
use crate::core::services::versioning;
use crate::error::Error;

async fn get<S>(store: &mut S, id: Uuid) -> Result<Tender, Error>
where
    S: TenderCommon,
{
    TenderCommon::get(store, id).await?.ok_or_else(|| Error::NotFound("Tender not found".into()))
}

pub async fn create<T>(mut tx: T, body: Create) -> Result<Tender, Error>
where
    T: TxStore,
{
    let user = authorize_responsible(&mut tx, &body.creator_username, body.organization_id).await?;
    let tender = body.into_tender(user.id)?;
    TenderCommon::insert(&mut tx, &tender).await?;
    tx.commit().await?;
    info!("tender {} created by {}", tender.id, user.username);
    Ok(tender)
}

pub async fn list<S>(db: &mut S, service_type: Option<ServiceType>, pagination: Pagination) -> Result<Vec<Tender>, Error>
where
    S: Store,
{
    let query = Query {
        service_type,
        ..Default::default()
    };
    TenderCommon::query(db, &query, pagination).await
}

pub async fn list_by_author<S>(db: &mut S, username: &str, pagination: Pagination) -> Result<Vec<Tender>, Error>
where
    S: Store,
{
    let user = resolve_user(db, username).await?;
    let query = Query {
        author_id: Some(user.id),
        ..Default::default()
    };
    TenderCommon::query(db, &query, pagination).await
}

pub async fn list_archived<S>(db: &mut S, service_type: Option<ServiceType>, pagination: Pagination) -> Result<Vec<TenderArchive>, Error>
where
    S: Store,
{
    TenderCommon::query_archived(db, service_type, pagination).await
}

pub async fn get_status<S>(db: &mut S, id: Uuid, username: Option<&str>) -> Result<Status, Error>
where
    S: Store,
{
    if let Some(username) = username {
        resolve_user(db, username).await?;
    }
    Ok(get(db, id).await?.status)
}

pub async fn set_status<T>(mut tx: T, id: Uuid, username: &str, status: Status) -> Result<Tender, Error>
where
    T: TxStore,
{
    let user = resolve_user(&mut tx, username).await?;
    let tender = get(&mut tx, id).await?;
    ensure_responsible(&mut tx, &user, tender.organization_id).await?;
    let tender = TenderCommon::update_status(&mut tx, id, status)
        .await?
        .ok_or_else(|| Error::Server(format!("tender {} vanished during status update", id)))?;
    tx.commit().await?;
    info!("tender {} status set to {} by {}", id, status, user.username);
    Ok(tender)
}

pub async fn edit<T>(mut tx: T, id: Uuid, username: &str, patch: Patch) -> Result<Tender, Error>
where
    T: TxStore,
{
    let changes = patch.validate()?;
    let user = resolve_user(&mut tx, username).await?;
    let tender = get(&mut tx, id).await?;
    ensure_responsible(&mut tx, &user, tender.organization_id).await?;
    let tender: Tender = versioning::edit(&mut tx, id, |t: &mut Tender| changes.apply(t)).await?;
    tx.commit().await?;
    info!("tender {} edited by {}, now at version {}", id, user.username, tender.version);
    Ok(tender)
}

pub async fn rollback<T>(mut tx: T, id: Uuid, version: i32, username: &str) -> Result<Tender, Error>
where
    T: TxStore,
{
    let user = resolve_user(&mut tx, username).await?;
    let tender = get(&mut tx, id).await?;
    ensure_responsible(&mut tx, &user, tender.organization_id).await?;
    let tender: Tender = versioning::rollback(&mut tx, id, version).await?;
    tx.commit().await?;
    info!("tender {} rolled back to version {} by {}, now at version {}", id, version, user.username, tender.version);
    Ok(tender)
}
