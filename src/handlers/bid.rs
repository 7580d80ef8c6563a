use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;
use uuid::Uuid;

use crate::config::Config;
use crate::core::models::bid::{Bid, Create, Patch};
use crate::core::models::common::Pagination as Page;
use crate::core::ports::repository::Manager;
use crate::core::services::bid as service;
use crate::error::Error;
use crate::request::{DecisionParams, Pagination, StatusParams, UsernameParam};

pub async fn list<M: Manager>(manager: Data<M>, Query(page): Query<Pagination>) -> Result<Json<Vec<Bid>>, Error> {
    let page = Page::try_from(page)?;
    let mut db = manager.db().await?;
    let bids = service::list(&mut db, page).await?;
    Ok(Json(bids))
}

pub async fn create<M: Manager>(manager: Data<M>, Json(body): Json<Create>) -> Result<Json<Bid>, Error> {
    let bid = service::create(manager.tx().await?, body).await?;
    Ok(Json(bid))
}

pub async fn my<M: Manager>(manager: Data<M>, Query(UsernameParam { username }): Query<UsernameParam>, Query(page): Query<Pagination>) -> Result<Json<Vec<Bid>>, Error> {
    let page = Page::try_from(page)?;
    let mut db = manager.db().await?;
    let bids = service::list_by_author(&mut db, &username, page).await?;
    Ok(Json(bids))
}

pub async fn list_by_tender<M: Manager>(
    manager: Data<M>,
    tender_id: Path<(Uuid,)>,
    Query(UsernameParam { username }): Query<UsernameParam>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Bid>>, Error> {
    let (tender_id,) = tender_id.into_inner();
    let page = Page::try_from(page)?;
    let mut db = manager.db().await?;
    let bids = service::list_by_tender(&mut db, tender_id, &username, page).await?;
    Ok(Json(bids))
}

pub async fn status<M: Manager>(manager: Data<M>, bid_id: Path<(Uuid,)>, Query(UsernameParam { username }): Query<UsernameParam>) -> Result<HttpResponse, Error> {
    let (bid_id,) = bid_id.into_inner();
    let mut db = manager.db().await?;
    let status = service::get_status(&mut db, bid_id, &username).await?;
    Ok(HttpResponse::Ok().content_type("text/plain").body(status.as_str()))
}

pub async fn set_status<M: Manager>(manager: Data<M>, bid_id: Path<(Uuid,)>, Query(StatusParams { username, status }): Query<StatusParams>) -> Result<Json<Bid>, Error> {
    let (bid_id,) = bid_id.into_inner();
    let status = status.parse()?;
    let bid = service::set_status(manager.tx().await?, bid_id, &username, status).await?;
    Ok(Json(bid))
}

pub async fn edit<M: Manager>(manager: Data<M>, bid_id: Path<(Uuid,)>, Query(UsernameParam { username }): Query<UsernameParam>, Json(patch): Json<Patch>) -> Result<Json<Bid>, Error> {
    let (bid_id,) = bid_id.into_inner();
    let bid = service::edit(manager.tx().await?, bid_id, &username, patch).await?;
    Ok(Json(bid))
}

pub async fn rollback<M: Manager>(manager: Data<M>, path: Path<(Uuid, i32)>, Query(UsernameParam { username }): Query<UsernameParam>) -> Result<Json<Bid>, Error> {
    let (bid_id, version) = path.into_inner();
    let bid = service::rollback(manager.tx().await?, bid_id, version, &username).await?;
    Ok(Json(bid))
}

pub async fn submit_decision<M: Manager>(
    manager: Data<M>,
    config: Data<Config>,
    bid_id: Path<(Uuid,)>,
    Query(DecisionParams { username, decision }): Query<DecisionParams>,
) -> Result<Json<Bid>, Error> {
    let (bid_id,) = bid_id.into_inner();
    let decision = decision.parse()?;
    let bid = service::submit_decision(manager.tx().await?, bid_id, &username, decision, config.dedupe_approvals).await?;
    Ok(Json(bid))
}
