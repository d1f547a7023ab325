//! PostgreSQL adapters for the core ports.

pub mod cascade_store_impl;
pub mod contract_repo_impl;
pub mod expiry_sweep_impl;
pub mod notification_repo_impl;

pub use cascade_store_impl::PgCascadeStore;
pub use contract_repo_impl::PgContractRepository;
pub use expiry_sweep_impl::PgExpirySweepStore;
pub use notification_repo_impl::PgNotificationRepository;
