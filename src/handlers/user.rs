use actix_web::web::{Data, Json, Query};

use crate::core::models::common::Pagination as Page;
use crate::core::models::user::User;
use crate::core::ports::repository::Manager;
use crate::core::services::identity;
use crate::error::Error;
use crate::request::Pagination;

pub async fn list<M: Manager>(manager: Data<M>, Query(page): Query<Pagination>) -> Result<Json<Vec<User>>, Error> {
    let page = Page::try_from(page)?;
    let mut db = manager.db().await?;
    let users = identity::list_users(&mut db, page).await?;
    Ok(Json(users))
}
