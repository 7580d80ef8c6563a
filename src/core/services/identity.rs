use log::warn;
use uuid::Uuid;

use crate::core::models::{common::Pagination, tender::Tender, user::User};
use crate::core::ports::repository::{OrganizationCommon, TenderCommon, UserCommon};
use crate::error::Error;

pub async fn resolve_user<S>(store: &mut S, username: &str) -> Result<User, Error>
where
    S: UserCommon,
{
    match UserCommon::get_by_username(store, username).await? {
        Some(user) => Ok(user),
        None => {
            warn!("unknown user {:?}", username);
            Err(Error::no_user())
        }
    }
}

pub async fn ensure_responsible<S>(store: &mut S, user: &User, organization_id: Uuid) -> Result<(), Error>
where
    S: OrganizationCommon,
{
    if !OrganizationCommon::is_responsible(store, organization_id, user.id).await? {
        warn!("user {} is not responsible for organization {}", user.username, organization_id);
        return Err(Error::no_permission());
    }
    Ok(())
}

pub async fn ensure_member<S>(store: &mut S, user: &User, organization_id: Uuid) -> Result<(), Error>
where
    S: OrganizationCommon,
{
    if !OrganizationCommon::is_member(store, organization_id, user.id).await? {
        warn!("user {} is not a member of organization {}", user.username, organization_id);
        return Err(Error::no_permission());
    }
    Ok(())
}

pub async fn authorize_responsible<S>(store: &mut S, username: &str, organization_id: Uuid) -> Result<User, Error>
where
    S: UserCommon + OrganizationCommon,
{
    let user = resolve_user(store, username).await?;
    ensure_responsible(store, &user, organization_id).await?;
    Ok(user)
}

/// Bid-side operations are scoped to the organization owning the tender, so
/// plain membership is enough.
pub async fn ensure_tender_access<S>(store: &mut S, user: &User, tender_id: Uuid) -> Result<Tender, Error>
where
    S: TenderCommon + OrganizationCommon,
{
    let tender = TenderCommon::get(store, tender_id).await?.ok_or_else(|| Error::NotFound("Tender not found".into()))?;
    ensure_member(store, user, tender.organization_id).await?;
    Ok(tender)
}

pub async fn authorize_tender_access<S>(store: &mut S, username: &str, tender_id: Uuid) -> Result<(User, Tender), Error>
where
    S: UserCommon + TenderCommon + OrganizationCommon,
{
    let user = resolve_user(store, username).await?;
    let tender = ensure_tender_access(store, &user, tender_id).await?;
    Ok((user, tender))
}

pub async fn list_users<S>(store: &mut S, pagination: Pagination) -> Result<Vec<User>, Error>
where
    S: UserCommon,
{
    UserCommon::query(store, pagination).await
}
