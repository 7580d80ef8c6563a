use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use thiserror::Error as ThisError;

use crate::response::ErrorBody;

pub const MSG_WRONG_REQUEST: &str = "The request format or parameters are incorrect.";
pub const MSG_NO_USER: &str = "User does not exist.";
pub const MSG_NO_PERMISSION: &str = "User does not have permission.";
pub const MSG_SERVER: &str = "Something went wrong. Please try again.";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),
}

impl Error {
    pub fn wrong_request() -> Self {
        Error::Validation(MSG_WRONG_REQUEST.into())
    }

    pub fn no_user() -> Self {
        Error::Unauthorized(MSG_NO_USER.into())
    }

    pub fn no_permission() -> Self {
        Error::Forbidden(MSG_NO_PERMISSION.into())
    }

    /// The message put on the wire. Internal failures are collapsed into one
    /// generic sentence.
    pub fn reason(&self) -> String {
        match self {
            Error::Validation(m) | Error::Unauthorized(m) | Error::Forbidden(m) | Error::NotFound(m) | Error::Conflict(m) => m.clone(),
            Error::Database(_) | Error::Config(_) | Error::Server(_) => MSG_SERVER.into(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Database(_) | Error::Config(_) | Error::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        }
        HttpResponse::build(status).json(ErrorBody::new(self.reason()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::wrong_request().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::no_user().status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::no_permission().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(Error::NotFound("Tender not found".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Conflict("stale".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(Error::Database(sqlx::Error::PoolTimedOut).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = Error::Server("archive insert failed on tender 42".into());
        assert_eq!(err.reason(), MSG_SERVER);
        let err = Error::Forbidden("User is not tender author.".into());
        assert_eq!(err.reason(), "User is not tender author.");
    }
}
