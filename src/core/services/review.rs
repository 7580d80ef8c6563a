use log::{info, warn};
use uuid::Uuid;

use crate::core::models::{
    common::Pagination,
    review::{Query, Review},
};
use crate::core::ports::repository::{BidCommon, ReviewCommon, Store, TenderCommon, TxStore};
use crate::core::services::identity::{ensure_responsible, ensure_tender_access, resolve_user};
use crate::error::Error;

pub async fn submit_feedback<T>(mut tx: T, bid_id: Uuid, username: &str, feedback: String) -> Result<Review, Error>
where
    T: TxStore,
{
    let review = Review::new(bid_id, username.to_owned(), feedback)?;
    let user = resolve_user(&mut tx, username).await?;
    let bid = BidCommon::get(&mut tx, bid_id).await?.ok_or_else(|| Error::NotFound("Bid not found".into()))?;
    ensure_tender_access(&mut tx, &user, bid.tender_id).await?;
    ReviewCommon::insert(&mut tx, &review).await?;
    tx.commit().await?;
    info!("review {} left on bid {} by {}", review.id, bid_id, user.username);
    Ok(review)
}

/// Reviews on the tender's bids filed by `author_username`. Only the tender's
/// author, who must still be responsible for its organization, may read them.
pub async fn list_reviews<S>(db: &mut S, tender_id: Uuid, author_username: &str, requester_username: &str, pagination: Pagination) -> Result<Vec<Review>, Error>
where
    S: Store,
{
    let author = resolve_user(db, author_username).await?;
    let requester = resolve_user(db, requester_username).await?;
    let tender = TenderCommon::get(db, tender_id).await?.ok_or_else(|| Error::NotFound("Tender not found".into()))?;
    ensure_responsible(db, &requester, tender.organization_id).await?;
    if tender.author_id != requester.id {
        warn!("user {} is not the author of tender {}", requester.username, tender_id);
        return Err(Error::Forbidden("User is not tender author.".into()));
    }
    let query = Query {
        tender_id,
        bid_author_id: author.id,
    };
    ReviewCommon::query(db, &query, pagination).await
}
