//! Contract repository trait (port)

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::ExpiringContract;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Active contracts whose end date matches `end_date` exactly, hydrated
    /// with room number, house manager, and tenant users.
    async fn find_active_ending_on(
        &self,
        end_date: NaiveDate,
    ) -> Result<Vec<ExpiringContract>, DomainError>;
}
