//! Domain services (business logic)

pub mod cascade;
pub mod expiry_notifier;
pub mod expiry_resolver;

pub use cascade::{CascadeEngine, CascadeReport, DeleteMode};
pub use expiry_notifier::{ExpiryNotifier, NotifyReport};
pub use expiry_resolver::{ExpiryResolver, SweepReport};
