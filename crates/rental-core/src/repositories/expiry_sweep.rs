//! Transactional port for the expiry resolver sweep.
//!
//! The resolver mutates billing-relevant state (contract status, room
//! availability), so the whole sweep runs through one unit of work:
//! either every mutation of a run commits, or none do.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Contract, Room, RoomStatus};
use crate::error::DomainError;

/// Unit of work over one resolver sweep. Dropping the handle without calling
/// [`ExpirySweepUow::commit`] rolls every pending mutation back.
#[async_trait]
pub trait ExpirySweepUow: Send {
    /// Active contracts with `end_date < today`.
    async fn contracts_past_due(&mut self, today: NaiveDate)
        -> Result<Vec<Contract>, DomainError>;

    async fn update_contract(&mut self, contract: &Contract) -> Result<(), DomainError>;

    async fn find_room(&mut self, room_id: &Uuid) -> Result<Option<Room>, DomainError>;

    /// Whether any active contract other than `except_contract` still
    /// references the room.
    async fn room_has_other_active_contract(
        &mut self,
        room_id: &Uuid,
        except_contract: &Uuid,
    ) -> Result<bool, DomainError>;

    async fn update_room_status(
        &mut self,
        room_id: &Uuid,
        status: RoomStatus,
    ) -> Result<(), DomainError>;

    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}

#[async_trait]
pub trait ExpirySweepStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn ExpirySweepUow>, DomainError>;
}
