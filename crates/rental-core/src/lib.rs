//! # Rental Core
//!
//! Domain entities, services, and repository traits for the contract
//! lifecycle engine: expiry notification scanning, renew-vs-expire
//! resolution, and cascading soft-deletes.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

pub use domain::*;
pub use error::DomainError;
