use std::ops::DerefMut;

use sqlx::pool::PoolConnection;
use sqlx::{query, query_as, query_scalar, PgConnection, PgPool, Postgres, Transaction};
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

const UNIQUE_VIOLATION: &str = "23505";

/// A second archive of the same (entity, version) means another writer got
/// there first.
fn archive_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return Error::Conflict("This version has already been archived.".into());
        }
    }
    Error::Database(err)
}

/// Store over a single Postgres connection, either a pooled connection or an
/// open transaction.
pub struct PgSqlx<C> {
    conn: C,
}

impl<C> PgSqlx<C>
where
    C: DerefMut<Target = PgConnection>,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

impl<C> UserCommon for PgSqlx<C>
where
    C: DerefMut<Target = PgConnection>,
{
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT id, username, first_name, last_name, created_at, updated_at FROM employee WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(user)
    }

    async fn get(&mut self, id: Uuid) -> Result<Option<User>, Error> {
        let user = query_as("SELECT id, username, first_name, last_name, created_at, updated_at FROM employee WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(user)
    }

    async fn query(&mut self, pagination: Pagination) -> Result<Vec<User>, Error> {
        let users = query_as(
            "
        SELECT id, username, first_name, last_name, created_at, updated_at
        FROM employee
        ORDER BY username
        LIMIT $1
        OFFSET $2",
        )
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(users)
    }
}

impl<C> OrganizationCommon for PgSqlx<C>
where
    C: DerefMut<Target = PgConnection>,
{
    async fn exists(&mut self, id: Uuid) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT 1 FROM organization WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(exists)
    }

    async fn is_member(&mut self, id: Uuid, uid: Uuid) -> Result<bool, Error> {
        let is_member = query_scalar(
            "
        SELECT EXISTS(SELECT 1 FROM organization_member WHERE organization_id = $1 AND user_id = $2)
            OR EXISTS(SELECT 1 FROM organization_responsible WHERE organization_id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(uid)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(is_member)
    }

    async fn is_responsible(&mut self, id: Uuid, uid: Uuid) -> Result<bool, Error> {
        let is_responsible = query_scalar("SELECT EXISTS(SELECT 1 FROM organization_responsible WHERE organization_id = $1 AND user_id = $2)")
            .bind(id)
            .bind(uid)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(is_responsible)
    }

    async fn count_responsibles(&mut self, id: Uuid) -> Result<i64, Error> {
        let count = query_scalar("SELECT COUNT(*) FROM organization_responsible WHERE organization_id = $1")
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }
}

impl<C> TenderCommon for PgSqlx<C>
where
    C: DerefMut<Target = PgConnection>,
{
    async fn insert(&mut self, tender: &Tender) -> Result<(), Error> {
        query(
            "
        INSERT INTO tenders (id, name, description, status, service_type, author_id, organization_id, version, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(tender.id)
        .bind(&tender.name)
        .bind(&tender.description)
        .bind(tender.status)
        .bind(tender.service_type)
        .bind(tender.author_id)
        .bind(tender.organization_id)
        .bind(tender.version)
        .bind(tender.created_at)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    async fn get(&mut self, id: Uuid) -> Result<Option<Tender>, Error> {
        let tender = query_as("SELECT * FROM tenders WHERE id = $1").bind(id).fetch_optional(&mut *self.conn).await?;
        Ok(tender)
    }

    async fn query(&mut self, query: &TenderQuery, pagination: Pagination) -> Result<Vec<Tender>, Error> {
        let tenders = query_as(
            "
        SELECT *
        FROM tenders
        WHERE ($1::service_type IS NULL OR service_type = $1)
            AND ($2::uuid IS NULL OR author_id = $2)
        ORDER BY name
        LIMIT $3
        OFFSET $4",
        )
        .bind(query.service_type)
        .bind(query.author_id)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(tenders)
    }

    async fn update_status(&mut self, id: Uuid, status: Status) -> Result<Option<Tender>, Error> {
        let tender = query_as("UPDATE tenders SET status = $1 WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(tender)
    }

    async fn query_archived(&mut self, service_type: Option<ServiceType>, pagination: Pagination) -> Result<Vec<TenderArchive>, Error> {
        let archives = query_as(
            "
        SELECT *
        FROM tender_archives
        WHERE ($1::service_type IS NULL OR service_type = $1)
        ORDER BY name, version
        LIMIT $2
        OFFSET $3",
        )
        .bind(service_type)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(archives)
    }
}

impl<C> BidCommon for PgSqlx<C>
where
    C: DerefMut<Target = PgConnection>,
{
    async fn insert(&mut self, bid: &Bid) -> Result<(), Error> {
        query(
            "
        INSERT INTO bids (id, name, description, status, author_type, author_id, tender_id, version, approve_count, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(bid.id)
        .bind(&bid.name)
        .bind(&bid.description)
        .bind(bid.status)
        .bind(bid.author_type)
        .bind(bid.author_id)
        .bind(bid.tender_id)
        .bind(bid.version)
        .bind(bid.approve_count)
        .bind(bid.created_at)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    async fn get(&mut self, id: Uuid) -> Result<Option<Bid>, Error> {
        let bid = query_as("SELECT * FROM bids WHERE id = $1").bind(id).fetch_optional(&mut *self.conn).await?;
        Ok(bid)
    }

    async fn query(&mut self, query: &BidQuery, pagination: Pagination) -> Result<Vec<Bid>, Error> {
        let bids = query_as(
            "
        SELECT *
        FROM bids
        WHERE ($1::uuid IS NULL OR tender_id = $1)
            AND ($2::uuid IS NULL OR author_id = $2)
        ORDER BY name
        LIMIT $3
        OFFSET $4",
        )
        .bind(query.tender_id)
        .bind(query.author_id)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(bids)
    }

    async fn update_status(&mut self, id: Uuid, status: Status) -> Result<Option<Bid>, Error> {
        let bid = query_as("UPDATE bids SET status = $1 WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(bid)
    }

    async fn update_approval(&mut self, id: Uuid, approve_count: i32, status: Status) -> Result<Option<Bid>, Error> {
        let bid = query_as("UPDATE bids SET approve_count = $1, status = $2 WHERE id = $3 RETURNING *")
            .bind(approve_count)
            .bind(status)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(bid)
    }

    async fn record_approval(&mut self, id: Uuid, uid: Uuid) -> Result<bool, Error> {
        let res = query("INSERT INTO bid_approvals (bid_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(id)
            .bind(uid)
            .execute(&mut *self.conn)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}

impl<C> ReviewCommon for PgSqlx<C>
where
    C: DerefMut<Target = PgConnection>,
{
    async fn insert(&mut self, review: &Review) -> Result<(), Error> {
        query("INSERT INTO bid_reviews (id, bid_id, author_name, description, created_at) VALUES ($1, $2, $3, $4, $5)")
            .bind(review.id)
            .bind(review.bid_id)
            .bind(&review.author_name)
            .bind(&review.description)
            .bind(review.created_at)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    async fn query(&mut self, query: &ReviewQuery, pagination: Pagination) -> Result<Vec<Review>, Error> {
        let reviews = query_as(
            "
        SELECT r.id, r.bid_id, r.author_name, r.description, r.created_at
        FROM bid_reviews AS r
        JOIN bids AS b ON r.bid_id = b.id
        WHERE b.tender_id = $1 AND b.author_id = $2
        ORDER BY r.created_at
        LIMIT $3
        OFFSET $4",
        )
        .bind(query.tender_id)
        .bind(query.bid_author_id)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(reviews)
    }
}

impl<C> VersionedCommon<Tender> for PgSqlx<C>
where
    C: DerefMut<Target = PgConnection>,
{
    async fn lock(&mut self, id: Uuid) -> Result<Option<Tender>, Error> {
        let tender = query_as("SELECT * FROM tenders WHERE id = $1 FOR UPDATE").bind(id).fetch_optional(&mut *self.conn).await?;
        Ok(tender)
    }

    async fn archive(&mut self, archive: &TenderArchive) -> Result<(), Error> {
        query(
            "
        INSERT INTO tender_archives (tender_id, version, name, description, status, service_type, archived_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(archive.tender_id)
        .bind(archive.version)
        .bind(&archive.name)
        .bind(&archive.description)
        .bind(archive.status)
        .bind(archive.service_type)
        .bind(archive.archived_at)
        .execute(&mut *self.conn)
        .await
        .map_err(archive_error)?;
        Ok(())
    }

    async fn get_archived(&mut self, id: Uuid, version: i32) -> Result<Option<TenderArchive>, Error> {
        let archive = query_as("SELECT * FROM tender_archives WHERE tender_id = $1 AND version = $2")
            .bind(id)
            .bind(version)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(archive)
    }

    async fn replace(&mut self, next: &Tender, expected_version: i32) -> Result<bool, Error> {
        let res = query("UPDATE tenders SET name = $1, description = $2, service_type = $3, version = $4 WHERE id = $5 AND version = $6")
            .bind(&next.name)
            .bind(&next.description)
            .bind(next.service_type)
            .bind(next.version)
            .bind(next.id)
            .bind(expected_version)
            .execute(&mut *self.conn)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}

impl<C> VersionedCommon<Bid> for PgSqlx<C>
where
    C: DerefMut<Target = PgConnection>,
{
    async fn lock(&mut self, id: Uuid) -> Result<Option<Bid>, Error> {
        let bid = query_as("SELECT * FROM bids WHERE id = $1 FOR UPDATE").bind(id).fetch_optional(&mut *self.conn).await?;
        Ok(bid)
    }

    async fn archive(&mut self, archive: &BidArchive) -> Result<(), Error> {
        query("INSERT INTO bid_archives (bid_id, version, name, description, archived_at) VALUES ($1, $2, $3, $4, $5)")
            .bind(archive.bid_id)
            .bind(archive.version)
            .bind(&archive.name)
            .bind(&archive.description)
            .bind(archive.archived_at)
            .execute(&mut *self.conn)
            .await
            .map_err(archive_error)?;
        Ok(())
    }

    async fn get_archived(&mut self, id: Uuid, version: i32) -> Result<Option<BidArchive>, Error> {
        let archive = query_as("SELECT * FROM bid_archives WHERE bid_id = $1 AND version = $2")
            .bind(id)
            .bind(version)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(archive)
    }

    async fn replace(&mut self, next: &Bid, expected_version: i32) -> Result<bool, Error> {
        let res = query("UPDATE bids SET name = $1, description = $2, version = $3 WHERE id = $4 AND version = $5")
            .bind(&next.name)
            .bind(&next.description)
            .bind(next.version)
            .bind(next.id)
            .bind(expected_version)
            .execute(&mut *self.conn)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}

impl<C> Common for PgSqlx<C> where C: DerefMut<Target = PgConnection> {}

impl<C> Store for PgSqlx<C> where C: DerefMut<Target = PgConnection> {}

impl TxStore for PgSqlx<Transaction<'static, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.conn.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.conn.rollback().await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgSqlxManager {
    pool: PgPool,
}

impl PgSqlxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Manager for PgSqlxManager {
    type Store = PgSqlx<PoolConnection<Postgres>>;
    type TxStore = PgSqlx<Transaction<'static, Postgres>>;

    async fn db(&self) -> Result<Self::Store, Error> {
        Ok(PgSqlx::new(self.pool.acquire().await?))
    }

    async fn tx(&self) -> Result<Self::TxStore, Error> {
        Ok(PgSqlx::new(self.pool.begin().await?))
    }
}
