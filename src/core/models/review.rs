use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::models::common::{check_length, MAX_FEEDBACK_LEN};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub bid_id: Uuid,
    pub author_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(bid_id: Uuid, author_name: String, description: String) -> Result<Self, Error> {
        if description.is_empty() {
            return Err(Error::wrong_request());
        }
        check_length(&description, MAX_FEEDBACK_LEN)?;
        Ok(Self {
            id: Uuid::new_v4(),
            bid_id,
            author_name,
            description,
            created_at: Utc::now(),
        })
    }
}

/// Reviews left on bids of one tender, filed by one bid author.
#[derive(Debug, Clone)]
pub struct Query {
    pub tender_id: Uuid,
    pub bid_author_id: Uuid,
}
