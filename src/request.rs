use serde::Deserialize;

use crate::core::models::common::Pagination as Page;
use crate::error::Error;

/// `limit`/`offset` query parameters shared by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TryFrom<Pagination> for Page {
    type Error = Error;

    fn try_from(Pagination { limit, offset }: Pagination) -> Result<Self, Self::Error> {
        Page::new(limit.unwrap_or(Page::DEFAULT_LIMIT), offset.unwrap_or(0))
    }
}

#[derive(Debug, Deserialize)]
pub struct UsernameParam {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct OptionalUsernameParam {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub username: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct DecisionParams {
    pub username: String,
    pub decision: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackParams {
    pub username: String,
    pub bid_feedback: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsParams {
    pub author_username: String,
    pub requester_username: String,
}

#[derive(Debug, Deserialize)]
pub struct ServiceTypeParam {
    pub service_type: Option<String>,
}
