pub mod bid;
pub mod review;
pub mod tender;
pub mod user;

use actix_web::web::{get, patch, post, put, scope, JsonConfig, PathConfig, QueryConfig, ServiceConfig};
use actix_web::HttpResponse;
use log::warn;

use crate::core::ports::repository::Manager;
use crate::error::Error;

pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}

fn extract_error(kind: &str, err: impl std::fmt::Display) -> actix_web::Error {
    warn!("malformed {}: {}", kind, err);
    Error::wrong_request().into()
}

pub fn configure<M: Manager>(cfg: &mut ServiceConfig) {
    cfg.app_data(QueryConfig::default().error_handler(|err, _| extract_error("query", err)))
        .app_data(PathConfig::default().error_handler(|err, _| extract_error("path", err)))
        .app_data(JsonConfig::default().error_handler(|err, _| extract_error("body", err)))
        .service(
            scope("/api")
                .route("/ping", get().to(ping))
                .route("/users", get().to(user::list::<M>))
                .service(
                    scope("/tenders")
                        .route("", get().to(tender::list::<M>))
                        .route("/new", post().to(tender::create::<M>))
                        .route("/my", get().to(tender::my::<M>))
                        .route("/archived", get().to(tender::archived::<M>))
                        .route("/{tender_id}/status", get().to(tender::status::<M>))
                        .route("/{tender_id}/status", put().to(tender::set_status::<M>))
                        .route("/{tender_id}/edit", patch().to(tender::edit::<M>))
                        .route("/{tender_id}/rollback/{version}", put().to(tender::rollback::<M>)),
                )
                .service(
                    scope("/bids")
                        .route("", get().to(bid::list::<M>))
                        .route("/new", post().to(bid::create::<M>))
                        .route("/my", get().to(bid::my::<M>))
                        .route("/{tender_id}/list", get().to(bid::list_by_tender::<M>))
                        .route("/{tender_id}/reviews", get().to(review::list::<M>))
                        .route("/{bid_id}/status", get().to(bid::status::<M>))
                        .route("/{bid_id}/status", put().to(bid::set_status::<M>))
                        .route("/{bid_id}/edit", patch().to(bid::edit::<M>))
                        .route("/{bid_id}/rollback/{version}", put().to(bid::rollback::<M>))
                        .route("/{bid_id}/feedback", put().to(review::feedback::<M>))
                        .route("/{bid_id}/submit_decision", put().to(bid::submit_decision::<M>)),
                ),
        );
}
