use actix_web::web::{Data, Json, Path, Query};
use uuid::Uuid;

use crate::core::models::common::Pagination as Page;
use crate::core::models::review::Review;
use crate::core::ports::repository::Manager;
use crate::core::services::review as service;
use crate::error::Error;
use crate::request::{FeedbackParams, Pagination, ReviewsParams};

pub async fn feedback<M: Manager>(manager: Data<M>, bid_id: Path<(Uuid,)>, Query(FeedbackParams { username, bid_feedback }): Query<FeedbackParams>) -> Result<Json<Review>, Error> {
    let (bid_id,) = bid_id.into_inner();
    let review = service::submit_feedback(manager.tx().await?, bid_id, &username, bid_feedback).await?;
    Ok(Json(review))
}

pub async fn list<M: Manager>(manager: Data<M>, tender_id: Path<(Uuid,)>, Query(params): Query<ReviewsParams>, Query(page): Query<Pagination>) -> Result<Json<Vec<Review>>, Error> {
    let (tender_id,) = tender_id.into_inner();
    let page = Page::try_from(page)?;
    let mut db = manager.db().await?;
    let reviews = service::list_reviews(&mut db, tender_id, &params.author_username, &params.requester_username, page).await?;
    Ok(Json(reviews))
}
