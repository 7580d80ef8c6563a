use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::models::common::{check_length, non_empty, Status, Versioned, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use crate::error::Error;

/// Upper bound on the number of approvals a bid needs to be published.
pub const MAX_QUORUM: i64 = 3;

pub fn required_approvals(responsibles: i64) -> i64 {
    responsibles.min(MAX_QUORUM)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "bid_author_type")]
pub enum AuthorType {
    User,
    Organization,
}

impl FromStr for AuthorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(AuthorType::User),
            "Organization" => Ok(AuthorType::Organization),
            _ => Err(Error::wrong_request()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl FromStr for Decision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Approved" => Ok(Decision::Approved),
            "Rejected" => Ok(Decision::Rejected),
            _ => Err(Error::wrong_request()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Bid {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub author_type: AuthorType,
    pub author_id: Uuid,
    pub tender_id: Uuid,
    pub version: i32,
    pub approve_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct BidArchive {
    pub bid_id: Uuid,
    pub version: i32,
    pub name: String,
    pub description: String,
    pub archived_at: DateTime<Utc>,
}

impl Versioned for Bid {
    type Archive = BidArchive;

    const NOT_FOUND: &'static str = "Bid not found";
    const VERSION_NOT_FOUND: &'static str = "This version of bid does not exist.";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn snapshot(&self) -> BidArchive {
        BidArchive {
            bid_id: self.id,
            version: self.version,
            name: self.name.clone(),
            description: self.description.clone(),
            archived_at: Utc::now(),
        }
    }

    fn restore(&mut self, archive: &BidArchive) {
        self.name = archive.name.clone();
        self.description = archive.description.clone();
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

/// Body of `POST /bids/new`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub name: String,
    pub description: String,
    pub tender_id: Uuid,
    pub author_type: String,
    pub author_id: Uuid,
}

impl Create {
    pub fn into_bid(self) -> Result<Bid, Error> {
        check_length(&self.name, MAX_NAME_LEN)?;
        check_length(&self.description, MAX_DESCRIPTION_LEN)?;
        let author_type = self.author_type.parse()?;
        Ok(Bid {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            status: Status::Created,
            author_type,
            author_id: self.author_id,
            tender_id: self.tender_id,
            version: 1,
            approve_count: 0,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Patch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Changes {
    name: Option<String>,
    description: Option<String>,
}

impl Patch {
    pub fn validate(self) -> Result<Changes, Error> {
        let name = non_empty(self.name);
        let description = non_empty(self.description);
        if let Some(name) = &name {
            check_length(name, MAX_NAME_LEN)?;
        }
        if let Some(description) = &description {
            check_length(description, MAX_DESCRIPTION_LEN)?;
        }
        Ok(Changes { name, description })
    }
}

impl Changes {
    pub fn apply(self, bid: &mut Bid) {
        if let Some(name) = self.name {
            bid.name = name;
        }
        if let Some(description) = self.description {
            bid.description = description;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub tender_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}
