use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;
use uuid::Uuid;

use crate::core::models::common::{non_empty, Pagination as Page};
use crate::core::models::tender::{Create, Patch, ServiceType, Tender, TenderArchive};
use crate::core::ports::repository::Manager;
use crate::core::services::tender as service;
use crate::error::Error;
use crate::request::{OptionalUsernameParam, Pagination, ServiceTypeParam, StatusParams, UsernameParam};

fn service_type(param: ServiceTypeParam) -> Result<Option<ServiceType>, Error> {
    ServiceType::parse_optional(param.service_type.as_deref().unwrap_or_default())
}

pub async fn list<M: Manager>(manager: Data<M>, Query(filter): Query<ServiceTypeParam>, Query(page): Query<Pagination>) -> Result<Json<Vec<Tender>>, Error> {
    let page = Page::try_from(page)?;
    let mut db = manager.db().await?;
    let tenders = service::list(&mut db, service_type(filter)?, page).await?;
    Ok(Json(tenders))
}

pub async fn archived<M: Manager>(manager: Data<M>, Query(filter): Query<ServiceTypeParam>, Query(page): Query<Pagination>) -> Result<Json<Vec<TenderArchive>>, Error> {
    let page = Page::try_from(page)?;
    let mut db = manager.db().await?;
    let archives = service::list_archived(&mut db, service_type(filter)?, page).await?;
    Ok(Json(archives))
}

pub async fn create<M: Manager>(manager: Data<M>, Json(body): Json<Create>) -> Result<Json<Tender>, Error> {
    let tender = service::create(manager.tx().await?, body).await?;
    Ok(Json(tender))
}

pub async fn my<M: Manager>(manager: Data<M>, Query(UsernameParam { username }): Query<UsernameParam>, Query(page): Query<Pagination>) -> Result<Json<Vec<Tender>>, Error> {
    let page = Page::try_from(page)?;
    let mut db = manager.db().await?;
    let tenders = service::list_by_author(&mut db, &username, page).await?;
    Ok(Json(tenders))
}

pub async fn status<M: Manager>(manager: Data<M>, tender_id: Path<(Uuid,)>, Query(OptionalUsernameParam { username }): Query<OptionalUsernameParam>) -> Result<HttpResponse, Error> {
    let (tender_id,) = tender_id.into_inner();
    let mut db = manager.db().await?;
    let status = service::get_status(&mut db, tender_id, non_empty(username).as_deref()).await?;
    Ok(HttpResponse::Ok().content_type("text/plain").body(status.as_str()))
}

pub async fn set_status<M: Manager>(manager: Data<M>, tender_id: Path<(Uuid,)>, Query(StatusParams { username, status }): Query<StatusParams>) -> Result<Json<Tender>, Error> {
    let (tender_id,) = tender_id.into_inner();
    let status = status.parse()?;
    let tender = service::set_status(manager.tx().await?, tender_id, &username, status).await?;
    Ok(Json(tender))
}

pub async fn edit<M: Manager>(manager: Data<M>, tender_id: Path<(Uuid,)>, Query(UsernameParam { username }): Query<UsernameParam>, Json(patch): Json<Patch>) -> Result<Json<Tender>, Error> {
    let (tender_id,) = tender_id.into_inner();
    let tender = service::edit(manager.tx().await?, tender_id, &username, patch).await?;
    Ok(Json(tender))
}

pub async fn rollback<M: Manager>(manager: Data<M>, path: Path<(Uuid, i32)>, Query(UsernameParam { username }): Query<UsernameParam>) -> Result<Json<Tender>, Error> {
    let (tender_id, version) = path.into_inner();
    let tender = service::rollback(manager.tx().await?, tender_id, version, &username).await?;
    Ok(Json(tender))
}
