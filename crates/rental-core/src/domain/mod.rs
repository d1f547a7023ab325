//! Domain entities for the rental contract lifecycle engine.
//!
//! Only the types the engine reads or mutates as values live here. Houses,
//! users, roles, and the cascade child records (invoice items, service
//! usages, equipment, comments, tenant links) are addressed by id through
//! the repository ports.

pub mod contract;
pub mod notification;
pub mod room;

pub use contract::{
    whole_months_between, Contract, ContractStatus, DepositStatus, ExpiringContract, TenantRef,
};
pub use notification::{NewNotification, Notification};
pub use room::{Room, RoomStatus};
