//! Daily renew-vs-expire sweep over past-due contracts.
//!
//! The whole batch runs in one unit of work: a failure on any contract rolls
//! back every mutation of the run. A renewed contract whose new end date is
//! still in the past is not re-processed within the run; the next daily
//! sweep picks it up again.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use rental_shared::constants::DEFAULT_RENEW_MONTHS;

use crate::domain::{Contract, RoomStatus};
use crate::error::DomainError;
use crate::repositories::{ExpirySweepStore, ExpirySweepUow};

/// Outcome of one resolver sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub renewed: usize,
    pub expired: usize,
}

pub struct ExpiryResolver<S: ExpirySweepStore> {
    store: Arc<S>,
}

impl<S: ExpirySweepStore> ExpiryResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolve every active contract with `end_date < today`. All-or-nothing:
    /// an early return drops the unit of work, rolling the run back.
    pub async fn run(&self, today: NaiveDate) -> Result<SweepReport, DomainError> {
        let mut uow = self.store.begin().await?;
        let contracts = uow.contracts_past_due(today).await?;

        info!(past_due = contracts.len(), %today, "expiry resolver sweep");

        let mut report = SweepReport::default();
        for mut contract in contracts {
            if contract.auto_renew {
                self.renew_contract(&mut *uow, &mut contract).await?;
                report.renewed += 1;
            } else {
                self.expire_contract(&mut *uow, &mut contract).await?;
                report.expired += 1;
            }
        }

        uow.commit().await?;

        info!(
            renewed = report.renewed,
            expired = report.expired,
            "expiry resolver run finished"
        );
        Ok(report)
    }

    async fn renew_contract(
        &self,
        uow: &mut (dyn ExpirySweepUow + '_),
        contract: &mut Contract,
    ) -> Result<(), DomainError> {
        let months = match contract.time_renew {
            Some(m) if m > 0 => m,
            _ => {
                let span = contract.span_months();
                if span > 0 {
                    span
                } else {
                    // Degenerate window: fall back and persist the default
                    // so future runs skip the recomputation.
                    contract.time_renew = Some(DEFAULT_RENEW_MONTHS);
                    DEFAULT_RENEW_MONTHS
                }
            }
        };

        contract.renew(months)?;
        uow.update_contract(contract).await?;

        info!(
            contract_id = %contract.id,
            renew_months = months,
            new_end_date = %contract.end_date,
            "contract auto-renewed"
        );
        Ok(())
    }

    async fn expire_contract(
        &self,
        uow: &mut (dyn ExpirySweepUow + '_),
        contract: &mut Contract,
    ) -> Result<(), DomainError> {
        contract.expire("contract expired")?;
        uow.update_contract(contract).await?;

        // Release the room only when this was its last active contract.
        match uow.find_room(&contract.room_id).await? {
            Some(room) => {
                let still_occupied = uow
                    .room_has_other_active_contract(&room.id, &contract.id)
                    .await?;
                if !still_occupied {
                    uow.update_room_status(&room.id, RoomStatus::Available).await?;
                }
            }
            None => {
                warn!(
                    contract_id = %contract.id,
                    room_id = %contract.room_id,
                    "room missing, skipping availability update"
                );
            }
        }

        info!(
            contract_id = %contract.id,
            end_date = %contract.end_date,
            "contract expired"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    use rental_shared::types::AuditFields;

    use crate::domain::{ContractStatus, DepositStatus, Room};

    use super::*;

    #[derive(Default)]
    struct MemState {
        contracts: HashMap<Uuid, Contract>,
        rooms: HashMap<Uuid, Room>,
        committed: bool,
    }

    /// In-memory sweep store. Mutations apply to the shared state directly;
    /// `committed` records whether the sweep finished.
    #[derive(Clone, Default)]
    struct MemSweepStore {
        state: Arc<Mutex<MemState>>,
    }

    struct MemUow {
        state: Arc<Mutex<MemState>>,
    }

    #[async_trait]
    impl ExpirySweepStore for MemSweepStore {
        async fn begin(&self) -> Result<Box<dyn ExpirySweepUow>, DomainError> {
            Ok(Box::new(MemUow {
                state: self.state.clone(),
            }))
        }
    }

    #[async_trait]
    impl ExpirySweepUow for MemUow {
        async fn contracts_past_due(
            &mut self,
            today: NaiveDate,
        ) -> Result<Vec<Contract>, DomainError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .contracts
                .values()
                .filter(|c| c.is_past_due(today))
                .cloned()
                .collect())
        }

        async fn update_contract(&mut self, contract: &Contract) -> Result<(), DomainError> {
            let mut state = self.state.lock().unwrap();
            state.contracts.insert(contract.id, contract.clone());
            Ok(())
        }

        async fn find_room(&mut self, room_id: &Uuid) -> Result<Option<Room>, DomainError> {
            let state = self.state.lock().unwrap();
            Ok(state.rooms.get(room_id).cloned())
        }

        async fn room_has_other_active_contract(
            &mut self,
            room_id: &Uuid,
            except_contract: &Uuid,
        ) -> Result<bool, DomainError> {
            let state = self.state.lock().unwrap();
            Ok(state.contracts.values().any(|c| {
                c.room_id == *room_id && c.id != *except_contract && c.is_active()
            }))
        }

        async fn update_room_status(
            &mut self,
            room_id: &Uuid,
            status: RoomStatus,
        ) -> Result<(), DomainError> {
            let mut state = self.state.lock().unwrap();
            if let Some(room) = state.rooms.get_mut(room_id) {
                room.status = status;
            }
            Ok(())
        }

        async fn commit(self: Box<Self>) -> Result<(), DomainError> {
            self.state.lock().unwrap().committed = true;
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(
        room_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        auto_renew: bool,
        time_renew: Option<i32>,
    ) -> Contract {
        Contract {
            id: Uuid::new_v4(),
            room_id,
            start_date: start,
            end_date: end,
            monthly_price: 5_000_00,
            deposit_amount: 10_000_00,
            notice_period_days: 30,
            deposit_status: DepositStatus::Pending,
            status: ContractStatus::Active,
            auto_renew,
            time_renew,
            termination_reason: None,
            audit: AuditFields::default(),
        }
    }

    fn used_room() -> Room {
        let mut room = Room::new(Uuid::new_v4(), "B202".into(), 2, 4_000_00);
        room.status = RoomStatus::Used;
        room
    }

    fn store_with(contracts: Vec<Contract>, rooms: Vec<Room>) -> MemSweepStore {
        let store = MemSweepStore::default();
        {
            let mut state = store.state.lock().unwrap();
            for c in contracts {
                state.contracts.insert(c.id, c);
            }
            for r in rooms {
                state.rooms.insert(r.id, r);
            }
        }
        store
    }

    #[tokio::test]
    async fn test_auto_renew_with_time_renew() {
        let room = used_room();
        let c = contract(room.id, date(2024, 6, 1), date(2024, 12, 1), true, Some(6));
        let id = c.id;
        let store = store_with(vec![c], vec![room]);

        let resolver = ExpiryResolver::new(Arc::new(store.clone()));
        let report = resolver.run(date(2025, 1, 10)).await.unwrap();

        assert_eq!(report, SweepReport { renewed: 1, expired: 0 });
        let state = store.state.lock().unwrap();
        let renewed = &state.contracts[&id];
        assert_eq!(renewed.end_date, date(2025, 6, 1));
        assert_eq!(renewed.start_date, date(2024, 6, 1));
        assert_eq!(renewed.status, ContractStatus::Active);
        assert!(state.committed);
    }

    #[tokio::test]
    async fn test_auto_renew_falls_back_to_span() {
        let room = used_room();
        // No time_renew; 2024-01-01..2024-04-01 spans 3 whole months.
        let c = contract(room.id, date(2024, 1, 1), date(2024, 4, 1), true, None);
        let id = c.id;
        let store = store_with(vec![c], vec![room]);

        let resolver = ExpiryResolver::new(Arc::new(store.clone()));
        resolver.run(date(2024, 4, 15)).await.unwrap();

        let state = store.state.lock().unwrap();
        let renewed = &state.contracts[&id];
        assert_eq!(renewed.end_date, date(2024, 7, 1));
        assert_eq!(renewed.time_renew, None);
    }

    #[tokio::test]
    async fn test_zero_span_persists_default_renew_months() {
        let room = used_room();
        // Degenerate zero-month window, as the source data allows.
        let c = contract(room.id, date(2024, 1, 1), date(2024, 1, 1), true, None);
        let id = c.id;
        let store = store_with(vec![c], vec![room]);

        let resolver = ExpiryResolver::new(Arc::new(store.clone()));
        resolver.run(date(2024, 3, 1)).await.unwrap();

        let state = store.state.lock().unwrap();
        let renewed = &state.contracts[&id];
        assert_eq!(renewed.time_renew, Some(6));
        assert_eq!(renewed.end_date, date(2024, 7, 1));
        assert_eq!(renewed.status, ContractStatus::Active);
    }

    #[tokio::test]
    async fn test_expire_releases_sole_room() {
        let room = used_room();
        let room_id = room.id;
        let c = contract(room_id, date(2024, 1, 1), date(2024, 7, 1), false, None);
        let id = c.id;
        let store = store_with(vec![c], vec![room]);

        let resolver = ExpiryResolver::new(Arc::new(store.clone()));
        let report = resolver.run(date(2024, 8, 1)).await.unwrap();

        assert_eq!(report, SweepReport { renewed: 0, expired: 1 });
        let state = store.state.lock().unwrap();
        let expired = &state.contracts[&id];
        assert_eq!(expired.status, ContractStatus::Expired);
        assert_eq!(expired.termination_reason.as_deref(), Some("contract expired"));
        assert_eq!(state.rooms[&room_id].status, RoomStatus::Available);
    }

    #[tokio::test]
    async fn test_expire_keeps_room_used_while_other_contract_active() {
        let room = used_room();
        let room_id = room.id;
        let past_due = contract(room_id, date(2024, 1, 1), date(2024, 7, 1), false, None);
        let still_active = contract(room_id, date(2024, 6, 1), date(2025, 6, 1), false, None);
        let store = store_with(vec![past_due, still_active], vec![room]);

        let resolver = ExpiryResolver::new(Arc::new(store.clone()));
        resolver.run(date(2024, 8, 1)).await.unwrap();

        let state = store.state.lock().unwrap();
        assert_eq!(state.rooms[&room_id].status, RoomStatus::Used);
    }

    #[tokio::test]
    async fn test_missing_room_does_not_fail_expiry() {
        let c = contract(Uuid::new_v4(), date(2024, 1, 1), date(2024, 7, 1), false, None);
        let id = c.id;
        let store = store_with(vec![c], vec![]);

        let resolver = ExpiryResolver::new(Arc::new(store.clone()));
        let report = resolver.run(date(2024, 8, 1)).await.unwrap();

        assert_eq!(report.expired, 1);
        let state = store.state.lock().unwrap();
        assert_eq!(state.contracts[&id].status, ContractStatus::Expired);
    }

    #[tokio::test]
    async fn test_sweep_ignores_future_and_inactive_contracts() {
        let room = used_room();
        let future = contract(room.id, date(2024, 1, 1), date(2099, 1, 1), false, None);
        let mut already_expired =
            contract(room.id, date(2023, 1, 1), date(2023, 7, 1), false, None);
        already_expired.status = ContractStatus::Expired;
        let store = store_with(vec![future, already_expired], vec![room]);

        let resolver = ExpiryResolver::new(Arc::new(store.clone()));
        let report = resolver.run(date(2024, 8, 1)).await.unwrap();

        assert_eq!(report, SweepReport::default());
    }
}
