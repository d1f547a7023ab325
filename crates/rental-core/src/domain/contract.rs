//! Contract domain entity

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rental_shared::types::AuditFields;

use crate::error::DomainError;

/// Contract lifecycle state. Contracts never resurrect: the only legal
/// transitions are active -> expired and active -> terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Active,
    Expired,
    Terminated,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "active",
            ContractStatus::Expired => "expired",
            ContractStatus::Terminated => "terminated",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(ContractStatus::Active),
            "expired" => Some(ContractStatus::Expired),
            "terminated" => Some(ContractStatus::Terminated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Pending,
    Paid,
    Refunded,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Paid => "paid",
            DepositStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(DepositStatus::Pending),
            "paid" => Some(DepositStatus::Paid),
            "refunded" => Some(DepositStatus::Refunded),
            _ => None,
        }
    }
}

impl Default for DepositStatus {
    fn default() -> Self {
        DepositStatus::Pending
    }
}

/// Tenancy agreement binding tenant users to a room for a date range.
/// Monetary amounts are stored in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: Uuid,
    pub room_id: Uuid,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    pub monthly_price: i64,
    pub deposit_amount: i64,
    pub notice_period_days: i32,
    pub deposit_status: DepositStatus,

    pub status: ContractStatus,
    pub auto_renew: bool,
    /// Renewal period in months applied by the resolver when the contract
    /// rolls over. Backfilled to the default when unusable.
    pub time_renew: Option<i32>,
    pub termination_reason: Option<String>,

    pub audit: AuditFields,
}

impl Contract {
    pub fn new(
        room_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        monthly_price: i64,
        deposit_amount: i64,
        notice_period_days: i32,
        auto_renew: bool,
        time_renew: Option<i32>,
        created_by: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        if end_date <= start_date {
            return Err(DomainError::ValidationError(format!(
                "end_date {} must be after start_date {}",
                end_date, start_date
            )));
        }
        if monthly_price < 0 || deposit_amount < 0 {
            return Err(DomainError::ValidationError(
                "prices must not be negative".into(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            room_id,
            start_date,
            end_date,
            monthly_price,
            deposit_amount,
            notice_period_days,
            deposit_status: DepositStatus::default(),
            status: ContractStatus::Active,
            auto_renew,
            time_renew,
            termination_reason: None,
            audit: AuditFields {
                created_by,
                ..Default::default()
            },
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == ContractStatus::Active
    }

    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.is_active() && self.end_date < today
    }

    /// Whole months covered by the original start..end window.
    pub fn span_months(&self) -> i32 {
        whole_months_between(self.start_date, self.end_date)
    }

    /// Slide the expiry window forward by `months`. The start date is left
    /// untouched; only the end date moves.
    pub fn renew(&mut self, months: i32) -> Result<(), DomainError> {
        if self.status != ContractStatus::Active {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.as_str().into(),
                to: ContractStatus::Active.as_str().into(),
            });
        }
        self.end_date = self
            .end_date
            .checked_add_months(Months::new(months.max(0) as u32))
            .ok_or(DomainError::RenewalOutOfRange(self.id))?;
        self.audit.touch(None);
        Ok(())
    }

    pub fn expire(&mut self, reason: &str) -> Result<(), DomainError> {
        if self.status != ContractStatus::Active {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.as_str().into(),
                to: ContractStatus::Expired.as_str().into(),
            });
        }
        self.status = ContractStatus::Expired;
        self.termination_reason = Some(reason.to_string());
        self.audit.touch(None);
        Ok(())
    }

    pub fn terminate(&mut self, reason: &str) -> Result<(), DomainError> {
        if self.status != ContractStatus::Active {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.as_str().into(),
                to: ContractStatus::Terminated.as_str().into(),
            });
        }
        self.status = ContractStatus::Terminated;
        self.termination_reason = Some(reason.to_string());
        self.audit.touch(None);
        Ok(())
    }
}

/// Whole months from `start` to `end`, rounded down. Returns 0 when the
/// dates are in the same month or `end` precedes `start` by less than one.
pub fn whole_months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let mut months =
        (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    if end.day() < start.day() {
        months -= 1;
    }
    months
}

/// Tenant reference attached to an expiring contract, resolved through the
/// contract-tenant link table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantRef {
    pub user_id: Uuid,
    pub name: String,
}

/// Read model produced by the contract store for the threshold scanner: a
/// contract with its room, manager, and tenants already resolved.
#[derive(Debug, Clone)]
pub struct ExpiringContract {
    pub contract: Contract,
    pub room_number: String,
    pub manager_id: Option<Uuid>,
    pub tenants: Vec<TenantRef>,
}
