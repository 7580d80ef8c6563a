use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 100;
pub const MAX_FEEDBACK_LEN: usize = 1000;

/// Lifecycle status shared by tenders and bids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entity_status")]
pub enum Status {
    Created,
    Published,
    Closed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Created => "Created",
            Status::Published => "Published",
            Status::Closed => "Closed",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Status::Created),
            "Published" => Ok(Status::Published),
            "Closed" => Ok(Status::Closed),
            _ => Err(Error::wrong_request()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 5;

    pub fn new(limit: i64, offset: i64) -> Result<Self, Error> {
        if limit < 0 || offset < 0 {
            return Err(Error::Validation("Parameter must be a non-negative number.".into()));
        }
        Ok(Self { limit, offset })
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

pub fn check_length(value: &str, max: usize) -> Result<(), Error> {
    if value.chars().count() > max {
        return Err(Error::wrong_request());
    }
    Ok(())
}

/// Treats an empty string the same as an absent value.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// An entity whose editable fields are snapshotted into an archive row
/// before each change.
pub trait Versioned: Clone {
    type Archive: Clone;

    const NOT_FOUND: &'static str;
    const VERSION_NOT_FOUND: &'static str;

    fn id(&self) -> Uuid;
    fn version(&self) -> i32;
    fn snapshot(&self) -> Self::Archive;
    fn restore(&mut self, archive: &Self::Archive);

    fn bump(&mut self);
}
