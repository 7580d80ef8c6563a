use uuid::Uuid;

use crate::core::models::{
    bid::{Bid, Query as BidQuery},
    common::{Pagination, Status, Versioned},
    review::{Query as ReviewQuery, Review},
    tender::{Query as TenderQuery, ServiceType, Tender, TenderArchive},
    user::User,
};
use crate::error::Error;

pub trait UserCommon {
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error>;
    async fn get(&mut self, id: Uuid) -> Result<Option<User>, Error>;
    async fn query(&mut self, pagination: Pagination) -> Result<Vec<User>, Error>;
}

pub trait OrganizationCommon {
    async fn exists(&mut self, id: Uuid) -> Result<bool, Error>;
    /// True for plain members and for responsibles.
    async fn is_member(&mut self, id: Uuid, uid: Uuid) -> Result<bool, Error>;
    async fn is_responsible(&mut self, id: Uuid, uid: Uuid) -> Result<bool, Error>;
    async fn count_responsibles(&mut self, id: Uuid) -> Result<i64, Error>;
}

pub trait TenderCommon {
    async fn insert(&mut self, tender: &Tender) -> Result<(), Error>;
    async fn get(&mut self, id: Uuid) -> Result<Option<Tender>, Error>;
    async fn query(&mut self, query: &TenderQuery, pagination: Pagination) -> Result<Vec<Tender>, Error>;
    async fn update_status(&mut self, id: Uuid, status: Status) -> Result<Option<Tender>, Error>;
    async fn query_archived(&mut self, service_type: Option<ServiceType>, pagination: Pagination) -> Result<Vec<TenderArchive>, Error>;
}

pub trait BidCommon {
    async fn insert(&mut self, bid: &Bid) -> Result<(), Error>;
    async fn get(&mut self, id: Uuid) -> Result<Option<Bid>, Error>;
    async fn query(&mut self, query: &BidQuery, pagination: Pagination) -> Result<Vec<Bid>, Error>;
    async fn update_status(&mut self, id: Uuid, status: Status) -> Result<Option<Bid>, Error>;
    async fn update_approval(&mut self, id: Uuid, approve_count: i32, status: Status) -> Result<Option<Bid>, Error>;
    /// Returns false when this approver was already recorded for the bid.
    async fn record_approval(&mut self, id: Uuid, uid: Uuid) -> Result<bool, Error>;
}

pub trait ReviewCommon {
    async fn insert(&mut self, review: &Review) -> Result<(), Error>;
    async fn query(&mut self, query: &ReviewQuery, pagination: Pagination) -> Result<Vec<Review>, Error>;
}

/// Archive-backed persistence of a versioned entity.
pub trait VersionedCommon<E: Versioned> {
    /// Fetches the live row and holds a write lock on it until the
    /// surrounding transaction ends.
    async fn lock(&mut self, id: Uuid) -> Result<Option<E>, Error>;
    /// Fails with `Error::Conflict` if this version is already archived.
    async fn archive(&mut self, archive: &E::Archive) -> Result<(), Error>;
    async fn get_archived(&mut self, id: Uuid, version: i32) -> Result<Option<E::Archive>, Error>;
    /// Overwrites the live row with `next` only if it is still at
    /// `expected_version`. Returns whether the row was written.
    async fn replace(&mut self, next: &E, expected_version: i32) -> Result<bool, Error>;
}

pub trait Common: UserCommon + OrganizationCommon + TenderCommon + BidCommon + ReviewCommon + VersionedCommon<Tender> + VersionedCommon<Bid> {}

pub trait Store: Common {}

pub trait TxStore: Store {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}

pub trait Manager: 'static {
    type Store: Store;
    type TxStore: TxStore;

    async fn db(&self) -> Result<Self::Store, Error>;
    async fn tx(&self) -> Result<Self::TxStore, Error>;
}
