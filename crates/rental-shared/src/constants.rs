//! Application-wide constants

/// Days before contract expiry at which tenants and managers are notified.
/// Scanned in this order, one exact-date sweep per threshold.
pub const EXPIRY_NOTICE_THRESHOLDS: [i64; 3] = [30, 15, 7];

/// Renewal period applied when a contract has no usable `time_renew` and its
/// own start/end span computes to zero months.
pub const DEFAULT_RENEW_MONTHS: i32 = 6;

/// Notification category tag for expiry notices.
pub const NOTIFICATION_KIND_CONTRACT_EXPIRING: &str = "contract_expiring";

/// Role code used to look up the fallback admin account when a user is
/// deleted and their houses/requests need a new owner.
pub const FALLBACK_ADMIN_ROLE_CODE: &str = "admin";
