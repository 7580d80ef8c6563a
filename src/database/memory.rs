//! In-process store used by the unit tests. A transaction works on a copy of
//! the shared state that is written back on commit and discarded on drop.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::core::models::{
    bid::{Bid, BidArchive, Query as BidQuery},
    common::{Pagination, Status},
    review::{Query as ReviewQuery, Review},
    tender::{Query as TenderQuery, ServiceType, Tender, TenderArchive},
    user::User,
};
use crate::core::ports::repository::{BidCommon, Common, Manager, OrganizationCommon, ReviewCommon, Store, TenderCommon, TxStore, UserCommon, VersionedCommon};
use crate::error::Error;

/// Failure modes `replace` can be told to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fault {
    #[default]
    None,
    ReplaceError,
    StaleVersion,
}

#[derive(Debug, Clone, Default)]
struct State {
    users: Vec<User>,
    organizations: HashSet<Uuid>,
    responsibles: HashSet<(Uuid, Uuid)>,
    members: HashSet<(Uuid, Uuid)>,
    tenders: Vec<Tender>,
    tender_archives: Vec<TenderArchive>,
    bids: Vec<Bid>,
    bid_archives: Vec<BidArchive>,
    approvals: HashSet<(Uuid, Uuid)>,
    reviews: Vec<Review>,
}

#[derive(Debug, Default)]
struct Inner {
    state: State,
    fault: Fault,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryManager {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn add_user(&self, username: &str) -> Uuid {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.into(),
            first_name: None,
            last_name: None,
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        self.inner().state.users.push(user);
        id
    }

    pub fn add_organization(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner().state.organizations.insert(id);
        id
    }

    pub fn add_responsible(&self, organization_id: Uuid, uid: Uuid) {
        self.inner().state.responsibles.insert((organization_id, uid));
    }

    pub fn add_member(&self, organization_id: Uuid, uid: Uuid) {
        self.inner().state.members.insert((organization_id, uid));
    }

    pub fn inject(&self, fault: Fault) {
        self.inner().fault = fault;
    }

    pub fn tender_archives(&self, id: Uuid) -> Vec<TenderArchive> {
        let mut archives: Vec<TenderArchive> = self.inner().state.tender_archives.iter().filter(|a| a.tender_id == id).cloned().collect();
        archives.sort_by_key(|a| a.version);
        archives
    }

    pub fn bid_archives(&self, id: Uuid) -> Vec<BidArchive> {
        let mut archives: Vec<BidArchive> = self.inner().state.bid_archives.iter().filter(|a| a.bid_id == id).cloned().collect();
        archives.sort_by_key(|a| a.version);
        archives
    }
}

impl Manager for MemoryManager {
    type Store = MemoryStore;
    type TxStore = MemoryStore;

    async fn db(&self) -> Result<MemoryStore, Error> {
        let fault = self.inner().fault;
        Ok(MemoryStore {
            inner: self.inner.clone(),
            local: None,
            fault,
        })
    }

    async fn tx(&self) -> Result<MemoryStore, Error> {
        let (state, fault) = {
            let inner = self.inner();
            (inner.state.clone(), inner.fault)
        };
        Ok(MemoryStore {
            inner: self.inner.clone(),
            local: Some(state),
            fault,
        })
    }
}

pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    local: Option<State>,
    fault: Fault,
}

impl MemoryStore {
    fn with<R>(&mut self, f: impl FnOnce(&mut State) -> R) -> Result<R, Error> {
        match &mut self.local {
            Some(state) => Ok(f(state)),
            None => {
                let mut inner = self.inner.lock().map_err(|e| Error::Server(e.to_string()))?;
                Ok(f(&mut inner.state))
            }
        }
    }

    fn check_fault(&self) -> Result<bool, Error> {
        match self.fault {
            Fault::None => Ok(true),
            Fault::ReplaceError => Err(Error::Server("injected replace failure".into())),
            Fault::StaleVersion => Ok(false),
        }
    }
}

fn window<T>(pagination: Pagination, items: Vec<T>) -> Vec<T> {
    items.into_iter().skip(pagination.offset as usize).take(pagination.limit as usize).collect()
}

fn already_archived() -> Error {
    Error::Conflict("This version has already been archived.".into())
}

impl UserCommon for MemoryStore {
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        self.with(|s| s.users.iter().find(|u| u.username == username).cloned())
    }

    async fn get(&mut self, id: Uuid) -> Result<Option<User>, Error> {
        self.with(|s| s.users.iter().find(|u| u.id == id).cloned())
    }

    async fn query(&mut self, pagination: Pagination) -> Result<Vec<User>, Error> {
        self.with(|s| {
            let mut users = s.users.clone();
            users.sort_by(|a, b| a.username.cmp(&b.username));
            window(pagination, users)
        })
    }
}

impl OrganizationCommon for MemoryStore {
    async fn exists(&mut self, id: Uuid) -> Result<bool, Error> {
        self.with(|s| s.organizations.contains(&id))
    }

    async fn is_member(&mut self, id: Uuid, uid: Uuid) -> Result<bool, Error> {
        self.with(|s| s.members.contains(&(id, uid)) || s.responsibles.contains(&(id, uid)))
    }

    async fn is_responsible(&mut self, id: Uuid, uid: Uuid) -> Result<bool, Error> {
        self.with(|s| s.responsibles.contains(&(id, uid)))
    }

    async fn count_responsibles(&mut self, id: Uuid) -> Result<i64, Error> {
        self.with(|s| s.responsibles.iter().filter(|(org, _)| *org == id).count() as i64)
    }
}

impl TenderCommon for MemoryStore {
    async fn insert(&mut self, tender: &Tender) -> Result<(), Error> {
        self.with(|s| s.tenders.push(tender.clone()))
    }

    async fn get(&mut self, id: Uuid) -> Result<Option<Tender>, Error> {
        self.with(|s| s.tenders.iter().find(|t| t.id == id).cloned())
    }

    async fn query(&mut self, query: &TenderQuery, pagination: Pagination) -> Result<Vec<Tender>, Error> {
        self.with(|s| {
            let mut tenders: Vec<Tender> = s
                .tenders
                .iter()
                .filter(|t| query.service_type.map_or(true, |st| t.service_type == Some(st)))
                .filter(|t| query.author_id.map_or(true, |a| t.author_id == a))
                .cloned()
                .collect();
            tenders.sort_by(|a, b| a.name.cmp(&b.name));
            window(pagination, tenders)
        })
    }

    async fn update_status(&mut self, id: Uuid, status: Status) -> Result<Option<Tender>, Error> {
        self.with(|s| {
            s.tenders.iter_mut().find(|t| t.id == id).map(|t| {
                t.status = status;
                t.clone()
            })
        })
    }

    async fn query_archived(&mut self, service_type: Option<ServiceType>, pagination: Pagination) -> Result<Vec<TenderArchive>, Error> {
        self.with(|s| {
            let mut archives: Vec<TenderArchive> = s
                .tender_archives
                .iter()
                .filter(|a| service_type.map_or(true, |st| a.service_type == Some(st)))
                .cloned()
                .collect();
            archives.sort_by(|a, b| a.name.cmp(&b.name).then(a.version.cmp(&b.version)));
            window(pagination, archives)
        })
    }
}

impl BidCommon for MemoryStore {
    async fn insert(&mut self, bid: &Bid) -> Result<(), Error> {
        self.with(|s| s.bids.push(bid.clone()))
    }

    async fn get(&mut self, id: Uuid) -> Result<Option<Bid>, Error> {
        self.with(|s| s.bids.iter().find(|b| b.id == id).cloned())
    }

    async fn query(&mut self, query: &BidQuery, pagination: Pagination) -> Result<Vec<Bid>, Error> {
        self.with(|s| {
            let mut bids: Vec<Bid> = s
                .bids
                .iter()
                .filter(|b| query.tender_id.map_or(true, |t| b.tender_id == t))
                .filter(|b| query.author_id.map_or(true, |a| b.author_id == a))
                .cloned()
                .collect();
            bids.sort_by(|a, b| a.name.cmp(&b.name));
            window(pagination, bids)
        })
    }

    async fn update_status(&mut self, id: Uuid, status: Status) -> Result<Option<Bid>, Error> {
        self.with(|s| {
            s.bids.iter_mut().find(|b| b.id == id).map(|b| {
                b.status = status;
                b.clone()
            })
        })
    }

    async fn update_approval(&mut self, id: Uuid, approve_count: i32, status: Status) -> Result<Option<Bid>, Error> {
        self.with(|s| {
            s.bids.iter_mut().find(|b| b.id == id).map(|b| {
                b.approve_count = approve_count;
                b.status = status;
                b.clone()
            })
        })
    }

    async fn record_approval(&mut self, id: Uuid, uid: Uuid) -> Result<bool, Error> {
        self.with(|s| s.approvals.insert((id, uid)))
    }
}

impl ReviewCommon for MemoryStore {
    async fn insert(&mut self, review: &Review) -> Result<(), Error> {
        self.with(|s| s.reviews.push(review.clone()))
    }

    async fn query(&mut self, query: &ReviewQuery, pagination: Pagination) -> Result<Vec<Review>, Error> {
        self.with(|s| {
            let bids: HashSet<Uuid> = s
                .bids
                .iter()
                .filter(|b| b.tender_id == query.tender_id && b.author_id == query.bid_author_id)
                .map(|b| b.id)
                .collect();
            let reviews = s.reviews.iter().filter(|r| bids.contains(&r.bid_id)).cloned().collect();
            window(pagination, reviews)
        })
    }
}

impl VersionedCommon<Tender> for MemoryStore {
    async fn lock(&mut self, id: Uuid) -> Result<Option<Tender>, Error> {
        TenderCommon::get(self, id).await
    }

    async fn archive(&mut self, archive: &TenderArchive) -> Result<(), Error> {
        self.with(|s| {
            if s.tender_archives.iter().any(|a| a.tender_id == archive.tender_id && a.version == archive.version) {
                return Err(already_archived());
            }
            s.tender_archives.push(archive.clone());
            Ok(())
        })?
    }

    async fn get_archived(&mut self, id: Uuid, version: i32) -> Result<Option<TenderArchive>, Error> {
        self.with(|s| s.tender_archives.iter().find(|a| a.tender_id == id && a.version == version).cloned())
    }

    async fn replace(&mut self, next: &Tender, expected_version: i32) -> Result<bool, Error> {
        if !self.check_fault()? {
            return Ok(false);
        }
        self.with(|s| match s.tenders.iter_mut().find(|t| t.id == next.id && t.version == expected_version) {
            Some(t) => {
                *t = next.clone();
                true
            }
            None => false,
        })
    }
}

impl VersionedCommon<Bid> for MemoryStore {
    async fn lock(&mut self, id: Uuid) -> Result<Option<Bid>, Error> {
        BidCommon::get(self, id).await
    }

    async fn archive(&mut self, archive: &BidArchive) -> Result<(), Error> {
        self.with(|s| {
            if s.bid_archives.iter().any(|a| a.bid_id == archive.bid_id && a.version == archive.version) {
                return Err(already_archived());
            }
            s.bid_archives.push(archive.clone());
            Ok(())
        })?
    }

    async fn get_archived(&mut self, id: Uuid, version: i32) -> Result<Option<BidArchive>, Error> {
        self.with(|s| s.bid_archives.iter().find(|a| a.bid_id == id && a.version == version).cloned())
    }

    async fn replace(&mut self, next: &Bid, expected_version: i32) -> Result<bool, Error> {
        if !self.check_fault()? {
            return Ok(false);
        }
        self.with(|s| match s.bids.iter_mut().find(|b| b.id == next.id && b.version == expected_version) {
            Some(b) => {
                *b = next.clone();
                true
            }
            None => false,
        })
    }
}

impl Common for MemoryStore {}

impl Store for MemoryStore {}

impl TxStore for MemoryStore {
    async fn commit(mut self) -> Result<(), Error> {
        if let Some(state) = self.local.take() {
            let mut inner = self.inner.lock().map_err(|e| Error::Server(e.to_string()))?;
            inner.state = state;
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_window() {
        assert_eq!(window(Pagination::new(2, 1).unwrap(), vec![1, 2, 3, 4]), vec![2, 3]);
        assert!(window(Pagination::new(0, 0).unwrap(), vec![1, 2]).is_empty());
        assert_eq!(window(Pagination::default(), vec![1, 2]).len(), 2);
    }

    #[tokio::test]
    async fn test_uncommitted_work_is_discarded() {
        let manager = MemoryManager::new();
        let mut tx = manager.tx().await.unwrap();
        let uid = Uuid::new_v4();
        let org = manager.add_organization();
        assert!(BidCommon::record_approval(&mut tx, org, uid).await.unwrap());
        tx.rollback().await.unwrap();

        let mut tx = manager.tx().await.unwrap();
        assert!(BidCommon::record_approval(&mut tx, org, uid).await.unwrap());
        tx.commit().await.unwrap();
        let mut db = manager.db().await.unwrap();
        assert!(!BidCommon::record_approval(&mut db, org, uid).await.unwrap());
    }
}
