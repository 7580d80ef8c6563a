use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::models::common::{check_length, non_empty, Status, Versioned, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "service_type")]
pub enum ServiceType {
    Construction,
    Delivery,
    Manufacture,
}

impl ServiceType {
    /// An empty string stands for "no service type".
    pub fn parse_optional(s: &str) -> Result<Option<Self>, Error> {
        if s.is_empty() {
            return Ok(None);
        }
        s.parse().map(Some)
    }
}

impl FromStr for ServiceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Construction" => Ok(ServiceType::Construction),
            "Delivery" => Ok(ServiceType::Delivery),
            "Manufacture" => Ok(ServiceType::Manufacture),
            _ => Err(Error::wrong_request()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Tender {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub service_type: Option<ServiceType>,
    pub author_id: Uuid,
    pub organization_id: Uuid,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct TenderArchive {
    pub tender_id: Uuid,
    pub version: i32,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub service_type: Option<ServiceType>,
    pub archived_at: DateTime<Utc>,
}

impl Versioned for Tender {
    type Archive = TenderArchive;

    const NOT_FOUND: &'static str = "Tender not found";
    const VERSION_NOT_FOUND: &'static str = "This version of tender does not exist.";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn snapshot(&self) -> TenderArchive {
        TenderArchive {
            tender_id: self.id,
            version: self.version,
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            service_type: self.service_type,
            archived_at: Utc::now(),
        }
    }

    fn restore(&mut self, archive: &TenderArchive) {
        self.name = archive.name.clone();
        self.description = archive.description.clone();
        self.service_type = archive.service_type;
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

/// Body of `POST /tenders/new`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub name: String,
    pub description: String,
    pub service_type: Option<String>,
    /// Accepted for compatibility; a new tender always starts as `Created`.
    pub status: Option<String>,
    pub organization_id: Uuid,
    pub creator_username: String,
}

impl Create {
    pub fn into_tender(self, author_id: Uuid) -> Result<Tender, Error> {
        check_length(&self.name, MAX_NAME_LEN)?;
        check_length(&self.description, MAX_DESCRIPTION_LEN)?;
        let service_type = ServiceType::parse_optional(self.service_type.as_deref().unwrap_or_default())?;
        Ok(Tender {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            status: Status::Created,
            service_type,
            author_id,
            organization_id: self.organization_id,
            version: 1,
            created_at: Utc::now(),
        })
    }
}

/// Body of `PATCH /tenders/{id}/edit`. Missing, null and empty fields are left
/// unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Changes {
    name: Option<String>,
    description: Option<String>,
    service_type: Option<ServiceType>,
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
        let service_type = match non_empty(self.service_type) {
            Some(s) => Some(s.parse()?),
            None => None,
        };
        Ok(Changes {
            name,
            description,
            service_type,
        })
    }
}

impl Changes {
    pub fn apply(self, tender: &mut Tender) {
        if let Some(name) = self.name {
            tender.name = name;
        }
        if let Some(description) = self.description {
            tender.description = description;
        }
        if let Some(service_type) = self.service_type {
            tender.service_type = Some(service_type);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub service_type: Option<ServiceType>,
    pub author_id: Option<Uuid>,
}
