//! # Rental Infrastructure
//!
//! PostgreSQL implementations (adapters) of the core ports.

pub mod database;

pub use database::{
    create_pool, PgCascadeStore, PgContractRepository, PgExpirySweepStore,
    PgNotificationRepository,
};
