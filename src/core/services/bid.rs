use log::info;
use uuid::Uuid;

use crate::core::models::{
    bid::{required_approvals, AuthorType, Bid, Create, Decision, Patch, Query},
    common::{Pagination, Status},
    tender::Tender,
    user::User,
};
use crate::core::ports::repository::{BidCommon, OrganizationCommon, Store, TenderCommon, TxStore, UserCommon, VersionedCommon};
use crate::core::services::identity::{authorize_tender_access, ensure_responsible, ensure_tender_access, resolve_user};
use crate::core::services::versioning;
use crate::error::Error;

fn bid_not_found() -> Error {
    Error::NotFound("Bid not found".into())
}

/// Bids are never deleted, so a row missing after a successful read is an
/// internal inconsistency rather than a client error.
fn bid_vanished(id: Uuid) -> Error {
    Error::Server(format!("bid {} vanished during update", id))
}

/// Resolves the caller and the bid, then checks the caller belongs to the
/// organization owning the bid's tender.
async fn authorize_bid<S>(store: &mut S, username: &str, bid_id: Uuid) -> Result<(User, Bid, Tender), Error>
where
    S: Store,
{
    let user = resolve_user(store, username).await?;
    let bid = BidCommon::get(store, bid_id).await?.ok_or_else(bid_not_found)?;
    let tender = ensure_tender_access(store, &user, bid.tender_id).await?;
    Ok((user, bid, tender))
}

pub async fn create<T>(mut tx: T, body: Create) -> Result<Bid, Error>
where
    T: TxStore,
{
    let bid = body.into_bid()?;
    let tender = TenderCommon::get(&mut tx, bid.tender_id)
        .await?
        .ok_or_else(|| Error::NotFound("Tender not found".into()))?;
    match bid.author_type {
        AuthorType::User => {
            let author = UserCommon::get(&mut tx, bid.author_id).await?.ok_or_else(Error::no_user)?;
            ensure_responsible(&mut tx, &author, tender.organization_id).await?;
        }
        AuthorType::Organization => {
            if !OrganizationCommon::exists(&mut tx, bid.author_id).await? {
                return Err(Error::NotFound("Organization not found".into()));
            }
        }
    }
    BidCommon::insert(&mut tx, &bid).await?;
    tx.commit().await?;
    info!("bid {} created on tender {}", bid.id, bid.tender_id);
    Ok(bid)
}

pub async fn list<S>(db: &mut S, pagination: Pagination) -> Result<Vec<Bid>, Error>
where
    S: Store,
{
    BidCommon::query(db, &Query::default(), pagination).await
}

pub async fn list_by_author<S>(db: &mut S, username: &str, pagination: Pagination) -> Result<Vec<Bid>, Error>
where
    S: Store,
{
    let user = resolve_user(db, username).await?;
    let query = Query {
        author_id: Some(user.id),
        ..Default::default()
    };
    BidCommon::query(db, &query, pagination).await
}

pub async fn list_by_tender<S>(db: &mut S, tender_id: Uuid, username: &str, pagination: Pagination) -> Result<Vec<Bid>, Error>
where
    S: Store,
{
    authorize_tender_access(db, username, tender_id).await?;
    let query = Query {
        tender_id: Some(tender_id),
        ..Default::default()
    };
    BidCommon::query(db, &query, pagination).await
}

pub async fn get_status<S>(db: &mut S, id: Uuid, username: &str) -> Result<Status, Error>
where
    S: Store,
{
    let (_, bid, _) = authorize_bid(db, username, id).await?;
    Ok(bid.status)
}

pub async fn set_status<T>(mut tx: T, id: Uuid, username: &str, status: Status) -> Result<Bid, Error>
where
    T: TxStore,
{
    let (user, _, _) = authorize_bid(&mut tx, username, id).await?;
    let bid = BidCommon::update_status(&mut tx, id, status).await?.ok_or_else(|| bid_vanished(id))?;
    tx.commit().await?;
    info!("bid {} status set to {} by {}", id, status, user.username);
    Ok(bid)
}

pub async fn edit<T>(mut tx: T, id: Uuid, username: &str, patch: Patch) -> Result<Bid, Error>
where
    T: TxStore,
{
    let changes = patch.validate()?;
    let (user, _, _) = authorize_bid(&mut tx, username, id).await?;
    let bid: Bid = versioning::edit(&mut tx, id, |b: &mut Bid| changes.apply(b)).await?;
    tx.commit().await?;
    info!("bid {} edited by {}, now at version {}", id, user.username, bid.version);
    Ok(bid)
}

pub async fn rollback<T>(mut tx: T, id: Uuid, version: i32, username: &str) -> Result<Bid, Error>
where
    T: TxStore,
{
    let (user, _, _) = authorize_bid(&mut tx, username, id).await?;
    let bid: Bid = versioning::rollback(&mut tx, id, version).await?;
    tx.commit().await?;
    info!("bid {} rolled back to version {} by {}, now at version {}", id, version, user.username, bid.version);
    Ok(bid)
}

/// Applies one approver's decision. A rejection closes the bid; an approval
/// bumps the counter and publishes the bid once the organization's quorum is
/// reached. With `dedupe` set, a second approval from the same user is
/// accepted without being counted.
pub async fn submit_decision<T>(mut tx: T, id: Uuid, username: &str, decision: Decision, dedupe: bool) -> Result<Bid, Error>
where
    T: TxStore,
{
    let user = resolve_user(&mut tx, username).await?;
    let bid = <T as VersionedCommon<Bid>>::lock(&mut tx, id).await?.ok_or_else(bid_not_found)?;
    let tender = ensure_tender_access(&mut tx, &user, bid.tender_id).await?;
    let bid = match decision {
        Decision::Rejected => {
            let bid = BidCommon::update_status(&mut tx, id, Status::Closed).await?.ok_or_else(|| bid_vanished(id))?;
            info!("bid {} rejected by {}", id, user.username);
            bid
        }
        Decision::Approved if bid.status == Status::Closed => bid,
        Decision::Approved => {
            let first = BidCommon::record_approval(&mut tx, id, user.id).await?;
            if dedupe && !first {
                info!("repeated approval of bid {} by {} ignored", id, user.username);
                bid
            } else {
                let approve_count = bid.approve_count + 1;
                let quorum = required_approvals(OrganizationCommon::count_responsibles(&mut tx, tender.organization_id).await?);
                let status = if i64::from(approve_count) >= quorum { Status::Published } else { bid.status };
                let bid = BidCommon::update_approval(&mut tx, id, approve_count, status).await?.ok_or_else(|| bid_vanished(id))?;
                info!("bid {} approved by {} ({}/{}), status {}", id, user.username, approve_count, quorum, bid.status);
                bid
            }
        }
    };
    tx.commit().await?;
    Ok(bid)
}
