//! Repository traits (ports)

pub mod cascade_store;
pub mod contract_repository;
pub mod expiry_sweep;
pub mod notification_repository;

pub use cascade_store::CascadeStore;
pub use contract_repository::ContractRepository;
pub use expiry_sweep::{ExpirySweepStore, ExpirySweepUow};
pub use notification_repository::NotificationRepository;
