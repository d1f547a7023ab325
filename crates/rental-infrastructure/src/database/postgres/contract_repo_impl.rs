//! PostgreSQL contract repository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use rental_core::domain::{
    Contract, ContractStatus, DepositStatus, ExpiringContract, TenantRef,
};
use rental_core::error::DomainError;
use rental_core::repositories::ContractRepository;

use rental_shared::types::AuditFields;

pub struct PgContractRepository {
    pool: PgPool,
}

impl PgContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
pub(crate) struct ContractRow {
    pub id: Uuid,
    pub room_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_price: i64,
    pub deposit_amount: i64,
    pub notice_period_days: i32,
    pub deposit_status: String,
    pub status: String,
    pub auto_renew: bool,
    pub time_renew: Option<i32>,
    pub termination_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<ContractRow> for Contract {
    fn from(row: ContractRow) -> Self {
        Contract {
            id: row.id,
            room_id: row.room_id,
            start_date: row.start_date,
            end_date: row.end_date,
            monthly_price: row.monthly_price,
            deposit_amount: row.deposit_amount,
            notice_period_days: row.notice_period_days,
            deposit_status: DepositStatus::from_str(&row.deposit_status).unwrap_or_default(),
            status: ContractStatus::from_str(&row.status).unwrap_or(ContractStatus::Active),
            auto_renew: row.auto_renew,
            time_renew: row.time_renew,
            termination_reason: row.termination_reason,
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

#[derive(Debug, FromRow)]
struct ExpiringContractRow {
    #[sqlx(flatten)]
    contract: ContractRow,
    room_number: String,
    manager_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct TenantRow {
    user_id: Uuid,
    name: String,
}

#[async_trait]
impl ContractRepository for PgContractRepository {
    async fn find_active_ending_on(
        &self,
        end_date: NaiveDate,
    ) -> Result<Vec<ExpiringContract>, DomainError> {
        let rows: Vec<ExpiringContractRow> = sqlx::query_as(
            r#"
            SELECT
                c.id, c.room_id, c.start_date, c.end_date,
                c.monthly_price, c.deposit_amount, c.notice_period_days,
                c.deposit_status, c.status, c.auto_renew, c.time_renew,
                c.termination_reason,
                c.created_at, c.created_by, c.modified_at, c.modified_by,
                c.removed_at, c.removed_by,
                r.room_number,
                m.id AS manager_id
            FROM contracts c
            JOIN rooms r ON r.id = c.room_id AND r.removed_at IS NULL
            LEFT JOIN houses h ON h.id = r.house_id AND h.removed_at IS NULL
            LEFT JOIN users m ON m.id = h.manager_id AND m.removed_at IS NULL
            WHERE c.status = 'active'
              AND c.end_date = $1
              AND c.removed_at IS NULL
            ORDER BY c.end_date, c.id
            "#,
        )
        .bind(end_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding contracts ending on {}: {}", end_date, e);
            DomainError::DatabaseError(e.to_string())
        })?;

        let mut expiring = Vec::with_capacity(rows.len());
        for row in rows {
            let tenants: Vec<TenantRow> = sqlx::query_as(
                r#"
                SELECT u.id AS user_id, u.name
                FROM contract_tenants ct
                JOIN users u ON u.id = ct.user_id AND u.removed_at IS NULL
                WHERE ct.contract_id = $1 AND ct.removed_at IS NULL
                ORDER BY u.name
                "#,
            )
            .bind(row.contract.id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error loading tenants for contract {}: {}", row.contract.id, e);
                DomainError::DatabaseError(e.to_string())
            })?;

            expiring.push(ExpiringContract {
                contract: row.contract.into(),
                room_number: row.room_number,
                manager_id: row.manager_id,
                tenants: tenants
                    .into_iter()
                    .map(|t| TenantRef {
                        user_id: t.user_id,
                        name: t.name,
                    })
                    .collect(),
            });
        }

        Ok(expiring)
    }
}
