//! Date-threshold scanner and notification dispatcher.
//!
//! One sweep per threshold in [`EXPIRY_NOTICE_THRESHOLDS`]: contracts whose
//! end date lands exactly `d` days from `today` get one notification per
//! tenant, plus one for the house manager when resolvable. Re-running the
//! scan for the same day produces duplicates; no idempotency key exists.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{error, info};

use rental_shared::constants::{EXPIRY_NOTICE_THRESHOLDS, NOTIFICATION_KIND_CONTRACT_EXPIRING};

use crate::domain::{ExpiringContract, NewNotification};
use crate::error::DomainError;
use crate::repositories::{ContractRepository, NotificationRepository};

/// Outcome of one scan run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub contracts_matched: usize,
    pub notifications_created: usize,
    pub failed_contracts: usize,
}

pub struct ExpiryNotifier<C: ContractRepository, N: NotificationRepository> {
    contracts: Arc<C>,
    notifications: Arc<N>,
}

impl<C: ContractRepository, N: NotificationRepository> ExpiryNotifier<C, N> {
    pub fn new(contracts: Arc<C>, notifications: Arc<N>) -> Self {
        Self {
            contracts,
            notifications,
        }
    }

    /// Scan-and-notify for `today`. A failed threshold fetch aborts the run;
    /// a failure on a single contract is logged, counted, and skipped so the
    /// rest of the batch still gets notified.
    pub async fn run(&self, today: NaiveDate) -> Result<NotifyReport, DomainError> {
        let mut report = NotifyReport::default();

        for days in EXPIRY_NOTICE_THRESHOLDS {
            let target = today + Duration::days(days);
            let batch = self.contracts.find_active_ending_on(target).await?;

            info!(
                threshold_days = days,
                target = %target,
                matched = batch.len(),
                "expiry notice sweep"
            );

            for expiring in batch {
                report.contracts_matched += 1;
                match self.notify_contract(&expiring, days).await {
                    Ok(created) => report.notifications_created += created,
                    Err(e) => {
                        error!(
                            contract_id = %expiring.contract.id,
                            threshold_days = days,
                            error = %e,
                            "failed to notify contract, continuing sweep"
                        );
                        report.failed_contracts += 1;
                    }
                }
            }
        }

        info!(
            matched = report.contracts_matched,
            created = report.notifications_created,
            failed = report.failed_contracts,
            "expiry notification run finished"
        );
        Ok(report)
    }

    async fn notify_contract(
        &self,
        expiring: &ExpiringContract,
        days_left: i64,
    ) -> Result<usize, DomainError> {
        let url = format!("/contracts/{}", expiring.contract.id);
        let label = timeframe_label(days_left);
        let mut created = 0;

        for tenant in &expiring.tenants {
            let notification = NewNotification::new(
                tenant.user_id,
                NOTIFICATION_KIND_CONTRACT_EXPIRING,
                tenant_message(expiring, &label),
                url.clone(),
            );
            self.notifications.create(&notification).await?;
            created += 1;
        }

        // Missing manager is not an error: the tenant notices stand alone.
        if let Some(manager_id) = expiring.manager_id {
            let notification = NewNotification::new(
                manager_id,
                NOTIFICATION_KIND_CONTRACT_EXPIRING,
                manager_message(expiring, &label),
                url,
            );
            self.notifications.create(&notification).await?;
            created += 1;
        }

        Ok(created)
    }
}

fn timeframe_label(days: i64) -> String {
    match days {
        30 => "1 month".to_string(),
        15 => "15 days".to_string(),
        7 => "1 week".to_string(),
        d => format!("{} days", d),
    }
}

fn tenant_message(expiring: &ExpiringContract, label: &str) -> String {
    if expiring.contract.auto_renew {
        format!(
            "Your contract for room {} expires in {} (on {}) and will renew automatically.",
            expiring.room_number, label, expiring.contract.end_date
        )
    } else {
        format!(
            "Your contract for room {} expires in {} (on {}). Please contact management to renew or move out.",
            expiring.room_number, label, expiring.contract.end_date
        )
    }
}

fn manager_message(expiring: &ExpiringContract, label: &str) -> String {
    let names: Vec<&str> = expiring.tenants.iter().map(|t| t.name.as_str()).collect();
    if expiring.contract.auto_renew {
        format!(
            "The contract of {} for room {} expires in {} (on {}) and will renew automatically.",
            names.join(", "),
            expiring.room_number,
            label,
            expiring.contract.end_date
        )
    } else {
        format!(
            "The contract of {} for room {} expires in {} (on {}). Tenant action is required.",
            names.join(", "),
            expiring.room_number,
            label,
            expiring.contract.end_date
        )
    }
}
