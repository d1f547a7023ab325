//! PostgreSQL unit of work for the expiry resolver.
//!
//! One sqlx transaction per sweep. Dropping the unit of work without commit
//! rolls it back, which gives the resolver its all-or-nothing guarantee.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::error;
use uuid::Uuid;

use rental_core::domain::{Contract, Room, RoomStatus};
use rental_core::error::DomainError;
use rental_core::repositories::{ExpirySweepStore, ExpirySweepUow};

use rental_shared::types::AuditFields;

use super::contract_repo_impl::ContractRow;

pub struct PgExpirySweepStore {
    pool: PgPool,
}

impl PgExpirySweepStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

struct PgExpirySweepUow {
    tx: Transaction<'static, Postgres>,
}

#[derive(Debug, FromRow)]
struct RoomRow {
    id: Uuid,
    house_id: Uuid,
    room_number: String,
    capacity: i32,
    base_price: i64,
    status: String,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    modified_at: Option<DateTime<Utc>>,
    modified_by: Option<Uuid>,
    removed_at: Option<DateTime<Utc>>,
    removed_by: Option<Uuid>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            house_id: row.house_id,
            room_number: row.room_number,
            capacity: row.capacity,
            base_price: row.base_price,
            status: RoomStatus::from_str(&row.status).unwrap_or_default(),
            audit: AuditFields {
                created_at: row.created_at,
                created_by: row.created_by,
                modified_at: row.modified_at,
                modified_by: row.modified_by,
                removed_at: row.removed_at,
                removed_by: row.removed_by,
            },
        }
    }
}

fn db_err(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl ExpirySweepStore for PgExpirySweepStore {
    async fn begin(&self) -> Result<Box<dyn ExpirySweepUow>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("beginning expiry sweep transaction", e))?;
        Ok(Box::new(PgExpirySweepUow { tx }))
    }
}

#[async_trait]
impl ExpirySweepUow for PgExpirySweepUow {
    async fn contracts_past_due(
        &mut self,
        today: NaiveDate,
    ) -> Result<Vec<Contract>, DomainError> {
        let rows: Vec<ContractRow> = sqlx::query_as(
            r#"
            SELECT
                id, room_id, start_date, end_date,
                monthly_price, deposit_amount, notice_period_days,
                deposit_status, status, auto_renew, time_renew,
                termination_reason,
                created_at, created_by, modified_at, modified_by,
                removed_at, removed_by
            FROM contracts
            WHERE status = 'active'
              AND end_date < $1
              AND removed_at IS NULL
            ORDER BY end_date, id
            "#,
        )
        .bind(today)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| db_err("selecting past-due contracts", e))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn update_contract(&mut self, contract: &Contract) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE contracts
            SET
                end_date = $2,
                status = $3,
                time_renew = $4,
                termination_reason = $5,
                modified_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(contract.id)
        .bind(contract.end_date)
        .bind(contract.status.as_str())
        .bind(contract.time_renew)
        .bind(&contract.termination_reason)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_err("updating contract", e))?;

        Ok(())
    }

    async fn find_room(&mut self, room_id: &Uuid) -> Result<Option<Room>, DomainError> {
        let row: Option<RoomRow> = sqlx::query_as(
            r#"
            SELECT
                id, house_id, room_number, capacity, base_price, status,
                created_at, created_by, modified_at, modified_by,
                removed_at, removed_by
            FROM rooms
            WHERE id = $1 AND removed_at IS NULL
            "#,
        )
        .bind(room_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_err("finding room", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn room_has_other_active_contract(
        &mut self,
        room_id: &Uuid,
        except_contract: &Uuid,
    ) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM contracts
                WHERE room_id = $1
                  AND id <> $2
                  AND status = 'active'
                  AND removed_at IS NULL
            )
            "#,
        )
        .bind(room_id)
        .bind(except_contract)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_err("checking room occupancy", e))?;

        Ok(exists)
    }

    async fn update_room_status(
        &mut self,
        room_id: &Uuid,
        status: RoomStatus,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE rooms
            SET status = $2, modified_at = NOW()
            WHERE id = $1 AND removed_at IS NULL
            "#,
        )
        .bind(room_id)
        .bind(status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_err("updating room status", e))?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| db_err("committing expiry sweep transaction", e))
    }
}
