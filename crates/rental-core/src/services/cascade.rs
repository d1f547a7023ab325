//! Cascading soft-delete engine.
//!
//! One explicit traversal function per root entity type, so cascade order is
//! deterministic and testable in isolation. Cascades only run for soft
//! deletes; a force delete issues the root hard delete alone and leaves
//! referential integrity to the storage layer.
//!
//! Graph: House -> Room -> {Contract, RoomEquipment, RoomService ->
//! ServiceUsage}; House -> {HouseSetting, EquipmentStorage}; Contract ->
//! {tenant links, RecurringInvoice}; Invoice -> {InvoiceItem, Transaction};
//! Request/MaintenanceRequest -> Comments. Deleting a room alone does NOT
//! cascade its contracts; only house deletion does (source asymmetry,
//! preserved).

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use rental_shared::constants::FALLBACK_ADMIN_ROLE_CODE;

use crate::error::DomainError;
use crate::repositories::cascade_store::EntityKind;
use crate::repositories::CascadeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    Soft,
    Force,
}

/// Rows touched by one cascade invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub tombstoned: u64,
}

impl CascadeReport {
    fn add(&mut self, rows: u64) {
        self.tombstoned += rows;
    }

    fn one(&mut self) {
        self.tombstoned += 1;
    }
}

pub struct CascadeEngine<S: CascadeStore> {
    store: Arc<S>,
}

impl<S: CascadeStore> CascadeEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn delete_house(
        &self,
        house_id: &Uuid,
        mode: DeleteMode,
    ) -> Result<CascadeReport, DomainError> {
        if mode == DeleteMode::Force {
            self.store.hard_delete(EntityKind::House, house_id).await?;
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        for room_id in self.store.room_ids_of_house(house_id).await? {
            for contract_id in self.store.contract_ids_of_room(&room_id).await? {
                self.cascade_contract(&contract_id, &mut report).await?;
            }
            report.add(self.store.soft_delete_room_equipment(&room_id).await?);
            for service_id in self.store.room_service_ids_of_room(&room_id).await? {
                report.add(self.store.soft_delete_service_usages(&service_id).await?);
                self.store.soft_delete_room_service(&service_id).await?;
                report.one();
            }
            self.store.soft_delete_room(&room_id).await?;
            report.one();
        }
        report.add(self.store.soft_delete_house_settings(house_id).await?);
        report.add(self.store.soft_delete_equipment_storages(house_id).await?);
        self.store.soft_delete_house(house_id).await?;
        report.one();

        info!(house_id = %house_id, tombstoned = report.tombstoned, "house cascade delete");
        Ok(report)
    }

    /// Room deletion cascades price history and equipment only; contracts on
    /// the room are left alone.
    pub async fn delete_room(
        &self,
        room_id: &Uuid,
        mode: DeleteMode,
    ) -> Result<CascadeReport, DomainError> {
        if mode == DeleteMode::Force {
            self.store.hard_delete(EntityKind::Room, room_id).await?;
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        report.add(self.store.soft_delete_room_price_history(room_id).await?);
        report.add(self.store.soft_delete_room_equipment(room_id).await?);
        self.store.soft_delete_room(room_id).await?;
        report.one();

        info!(room_id = %room_id, tombstoned = report.tombstoned, "room cascade delete");
        Ok(report)
    }

    pub async fn delete_contract(
        &self,
        contract_id: &Uuid,
        mode: DeleteMode,
    ) -> Result<CascadeReport, DomainError> {
        if mode == DeleteMode::Force {
            self.store
                .hard_delete(EntityKind::Contract, contract_id)
                .await?;
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        self.cascade_contract(contract_id, &mut report).await?;

        info!(contract_id = %contract_id, tombstoned = report.tombstoned, "contract cascade delete");
        Ok(report)
    }

    pub async fn delete_invoice(
        &self,
        invoice_id: &Uuid,
        mode: DeleteMode,
    ) -> Result<CascadeReport, DomainError> {
        if mode == DeleteMode::Force {
            self.store
                .hard_delete(EntityKind::Invoice, invoice_id)
                .await?;
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        report.add(self.store.soft_delete_invoice_items(invoice_id).await?);
        report.add(self.store.soft_delete_invoice_transactions(invoice_id).await?);
        self.store.soft_delete_invoice(invoice_id).await?;
        report.one();
        Ok(report)
    }

    pub async fn delete_room_service(
        &self,
        service_id: &Uuid,
        mode: DeleteMode,
    ) -> Result<CascadeReport, DomainError> {
        if mode == DeleteMode::Force {
            self.store
                .hard_delete(EntityKind::RoomService, service_id)
                .await?;
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        report.add(self.store.soft_delete_service_usages(service_id).await?);
        self.store.soft_delete_room_service(service_id).await?;
        report.one();
        Ok(report)
    }

    pub async fn delete_request(
        &self,
        request_id: &Uuid,
        mode: DeleteMode,
    ) -> Result<CascadeReport, DomainError> {
        if mode == DeleteMode::Force {
            self.store
                .hard_delete(EntityKind::Request, request_id)
                .await?;
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        report.add(self.store.soft_delete_request_comments(request_id).await?);
        self.store.soft_delete_request(request_id).await?;
        report.one();
        Ok(report)
    }

    pub async fn delete_maintenance_request(
        &self,
        request_id: &Uuid,
        mode: DeleteMode,
    ) -> Result<CascadeReport, DomainError> {
        if mode == DeleteMode::Force {
            self.store
                .hard_delete(EntityKind::MaintenanceRequest, request_id)
                .await?;
            return Ok(CascadeReport::default());
        }

        let mut report = CascadeReport::default();
        report.add(
            self.store
                .soft_delete_maintenance_request_comments(request_id)
                .await?,
        );
        self.store.soft_delete_maintenance_request(request_id).await?;
        report.one();
        Ok(report)
    }

    /// Role deletion never deletes users; it nulls their role reference.
    pub async fn delete_role(
        &self,
        role_id: &Uuid,
        mode: DeleteMode,
    ) -> Result<CascadeReport, DomainError> {
        if mode == DeleteMode::Force {
            self.store.hard_delete(EntityKind::Role, role_id).await?;
            return Ok(CascadeReport::default());
        }

        let cleared = self.store.clear_role_from_users(role_id).await?;
        self.store.soft_delete_role(role_id).await?;

        info!(role_id = %role_id, users_cleared = cleared, "role deleted, user refs nulled");
        Ok(CascadeReport { tombstoned: 1 })
    }

    /// User deletion reassigns ownership instead of cascading: created and
    /// managed houses plus pending maintenance requests go to the fallback
    /// admin, and the user's own notifications are hard-deleted.
    pub async fn delete_user(
        &self,
        user_id: &Uuid,
        mode: DeleteMode,
    ) -> Result<CascadeReport, DomainError> {
        if mode == DeleteMode::Force {
            self.store.hard_delete(EntityKind::User, user_id).await?;
            return Ok(CascadeReport::default());
        }

        let admin_id = self
            .store
            .find_fallback_admin_id(FALLBACK_ADMIN_ROLE_CODE)
            .await?
            .ok_or_else(|| {
                DomainError::FallbackAdminMissing(FALLBACK_ADMIN_ROLE_CODE.to_string())
            })?;

        let created = self
            .store
            .reassign_houses_created_by(user_id, &admin_id)
            .await?;
        let managed = self
            .store
            .reassign_houses_managed_by(user_id, &admin_id)
            .await?;
        let requests = self
            .store
            .reassign_pending_maintenance_requests(user_id, &admin_id)
            .await?;
        let notifications = self.store.hard_delete_notifications_of_user(user_id).await?;
        self.store.soft_delete_user(user_id).await?;

        info!(
            user_id = %user_id,
            fallback_admin = %admin_id,
            houses_reassigned = created + managed,
            requests_reassigned = requests,
            notifications_dropped = notifications,
            "user deleted with ownership reassignment"
        );
        Ok(CascadeReport { tombstoned: 1 })
    }

    async fn cascade_contract(
        &self,
        contract_id: &Uuid,
        report: &mut CascadeReport,
    ) -> Result<(), DomainError> {
        report.add(
            self.store
                .soft_delete_contract_tenant_links(contract_id)
                .await?,
        );
        report.add(self.store.soft_delete_recurring_invoices(contract_id).await?);
        self.store.soft_delete_contract(contract_id).await?;
        report.one();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Records every store call as (operation, id) so tests can assert both
    /// the closure of a cascade and its exactly-once property.
    #[derive(Default)]
    struct RecordingStore {
        rooms_by_house: HashMap<Uuid, Vec<Uuid>>,
        contracts_by_room: HashMap<Uuid, Vec<Uuid>>,
        services_by_room: HashMap<Uuid, Vec<Uuid>>,
        fallback_admin: Option<Uuid>,
        ops: Mutex<Vec<(String, Uuid)>>,
    }

    impl RecordingStore {
        fn record(&self, op: &str, id: &Uuid) {
            self.ops.lock().unwrap().push((op.to_string(), *id));
        }

        fn ops(&self) -> Vec<(String, Uuid)> {
            self.ops.lock().unwrap().clone()
        }

        fn count(&self, op: &str, id: &Uuid) -> usize {
            self.ops()
                .iter()
                .filter(|(o, i)| o == op && i == id)
                .count()
        }
    }

    #[async_trait]
    impl CascadeStore for RecordingStore {
        async fn room_ids_of_house(&self, house_id: &Uuid) -> Result<Vec<Uuid>, DomainError> {
            Ok(self.rooms_by_house.get(house_id).cloned().unwrap_or_default())
        }

        async fn contract_ids_of_room(&self, room_id: &Uuid) -> Result<Vec<Uuid>, DomainError> {
            Ok(self.contracts_by_room.get(room_id).cloned().unwrap_or_default())
        }

        async fn room_service_ids_of_room(
            &self,
            room_id: &Uuid,
        ) -> Result<Vec<Uuid>, DomainError> {
            Ok(self.services_by_room.get(room_id).cloned().unwrap_or_default())
        }

        async fn soft_delete_house(&self, id: &Uuid) -> Result<(), DomainError> {
            self.record("house", id);
            Ok(())
        }

        async fn soft_delete_room(&self, id: &Uuid) -> Result<(), DomainError> {
            self.record("room", id);
            Ok(())
        }

        async fn soft_delete_contract(&self, id: &Uuid) -> Result<(), DomainError> {
            self.record("contract", id);
            Ok(())
        }

        async fn soft_delete_invoice(&self, id: &Uuid) -> Result<(), DomainError> {
            self.record("invoice", id);
            Ok(())
        }

        async fn soft_delete_room_service(&self, id: &Uuid) -> Result<(), DomainError> {
            self.record("room_service", id);
            Ok(())
        }

        async fn soft_delete_request(&self, id: &Uuid) -> Result<(), DomainError> {
            self.record("request", id);
            Ok(())
        }

        async fn soft_delete_maintenance_request(&self, id: &Uuid) -> Result<(), DomainError> {
            self.record("maintenance_request", id);
            Ok(())
        }

        async fn soft_delete_role(&self, id: &Uuid) -> Result<(), DomainError> {
            self.record("role", id);
            Ok(())
        }

        async fn soft_delete_user(&self, id: &Uuid) -> Result<(), DomainError> {
            self.record("user", id);
            Ok(())
        }

        async fn soft_delete_contract_tenant_links(
            &self,
            contract_id: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("contract_tenant_links", contract_id);
            Ok(1)
        }

        async fn soft_delete_recurring_invoices(
            &self,
            contract_id: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("recurring_invoices", contract_id);
            Ok(1)
        }

        async fn soft_delete_room_equipment(&self, room_id: &Uuid) -> Result<u64, DomainError> {
            self.record("room_equipment", room_id);
            Ok(1)
        }

        async fn soft_delete_room_price_history(
            &self,
            room_id: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("room_price_history", room_id);
            Ok(1)
        }

        async fn soft_delete_service_usages(
            &self,
            room_service_id: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("service_usages", room_service_id);
            Ok(1)
        }

        async fn soft_delete_house_settings(&self, house_id: &Uuid) -> Result<u64, DomainError> {
            self.record("house_settings", house_id);
            Ok(1)
        }

        async fn soft_delete_equipment_storages(
            &self,
            house_id: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("equipment_storages", house_id);
            Ok(1)
        }

        async fn soft_delete_invoice_items(&self, invoice_id: &Uuid) -> Result<u64, DomainError> {
            self.record("invoice_items", invoice_id);
            Ok(1)
        }

        async fn soft_delete_invoice_transactions(
            &self,
            invoice_id: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("invoice_transactions", invoice_id);
            Ok(1)
        }

        async fn soft_delete_request_comments(
            &self,
            request_id: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("request_comments", request_id);
            Ok(1)
        }

        async fn soft_delete_maintenance_request_comments(
            &self,
            request_id: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("maintenance_request_comments", request_id);
            Ok(1)
        }

        async fn clear_role_from_users(&self, role_id: &Uuid) -> Result<u64, DomainError> {
            self.record("clear_role_from_users", role_id);
            Ok(3)
        }

        async fn find_fallback_admin_id(
            &self,
            _role_code: &str,
        ) -> Result<Option<Uuid>, DomainError> {
            Ok(self.fallback_admin)
        }

        async fn reassign_houses_created_by(
            &self,
            from_user: &Uuid,
            _to_user: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("reassign_houses_created_by", from_user);
            Ok(2)
        }

        async fn reassign_houses_managed_by(
            &self,
            from_user: &Uuid,
            _to_user: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("reassign_houses_managed_by", from_user);
            Ok(1)
        }

        async fn reassign_pending_maintenance_requests(
            &self,
            from_user: &Uuid,
            _to_user: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("reassign_pending_maintenance_requests", from_user);
            Ok(1)
        }

        async fn hard_delete_notifications_of_user(
            &self,
            user_id: &Uuid,
        ) -> Result<u64, DomainError> {
            self.record("hard_delete_notifications", user_id);
            Ok(5)
        }

        async fn hard_delete(&self, kind: EntityKind, id: &Uuid) -> Result<(), DomainError> {
            self.record(&format!("hard_delete_{}", kind.as_str()), id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_house_delete_cascades_full_closure_exactly_once() {
        let house = Uuid::new_v4();
        let room_a = Uuid::new_v4();
        let room_b = Uuid::new_v4();
        let contract_a = Uuid::new_v4();
        let contract_b = Uuid::new_v4();
        let service_a = Uuid::new_v4();

        let store = Arc::new(RecordingStore {
            rooms_by_house: HashMap::from([(house, vec![room_a, room_b])]),
            contracts_by_room: HashMap::from([(room_a, vec![contract_a, contract_b])]),
            services_by_room: HashMap::from([(room_a, vec![service_a])]),
            ..Default::default()
        });

        let engine = CascadeEngine::new(store.clone());
        engine.delete_house(&house, DeleteMode::Soft).await.unwrap();

        for (op, id) in [
            ("house", &house),
            ("room", &room_a),
            ("room", &room_b),
            ("contract", &contract_a),
            ("contract", &contract_b),
            ("contract_tenant_links", &contract_a),
            ("recurring_invoices", &contract_a),
            ("room_equipment", &room_a),
            ("room_equipment", &room_b),
            ("service_usages", &service_a),
            ("room_service", &service_a),
            ("house_settings", &house),
            ("equipment_storages", &house),
        ] {
            assert_eq!(store.count(op, id), 1, "op {} for {} not exactly once", op, id);
        }

        // Children are tombstoned before their parent room, rooms before the house.
        let ops = store.ops();
        let pos = |op: &str, id: &Uuid| {
            ops.iter()
                .position(|(o, i)| o == op && i == id)
                .unwrap_or_else(|| panic!("missing op {}", op))
        };
        assert!(pos("contract", &contract_a) < pos("room", &room_a));
        assert!(pos("service_usages", &service_a) < pos("room_service", &service_a));
        assert!(pos("room_service", &service_a) < pos("room", &room_a));
        assert!(pos("room", &room_b) < pos("house", &house));
    }

    #[tokio::test]
    async fn test_room_delete_does_not_cascade_contracts() {
        let room = Uuid::new_v4();
        let contract = Uuid::new_v4();
        let store = Arc::new(RecordingStore {
            contracts_by_room: HashMap::from([(room, vec![contract])]),
            ..Default::default()
        });

        let engine = CascadeEngine::new(store.clone());
        engine.delete_room(&room, DeleteMode::Soft).await.unwrap();

        assert_eq!(store.count("room", &room), 1);
        assert_eq!(store.count("room_price_history", &room), 1);
        assert_eq!(store.count("room_equipment", &room), 1);
        assert_eq!(store.count("contract", &contract), 0);
    }

    #[tokio::test]
    async fn test_force_delete_skips_cascade() {
        let house = Uuid::new_v4();
        let room = Uuid::new_v4();
        let store = Arc::new(RecordingStore {
            rooms_by_house: HashMap::from([(house, vec![room])]),
            ..Default::default()
        });

        let engine = CascadeEngine::new(store.clone());
        engine.delete_house(&house, DeleteMode::Force).await.unwrap();

        let ops = store.ops();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0], ("hard_delete_house".to_string(), house));
    }

    #[tokio::test]
    async fn test_role_delete_nulls_user_refs() {
        let role = Uuid::new_v4();
        let store = Arc::new(RecordingStore::default());

        let engine = CascadeEngine::new(store.clone());
        engine.delete_role(&role, DeleteMode::Soft).await.unwrap();

        assert_eq!(store.count("clear_role_from_users", &role), 1);
        assert_eq!(store.count("role", &role), 1);
        assert_eq!(store.count("user", &role), 0);
    }

    #[tokio::test]
    async fn test_user_delete_reassigns_to_fallback_admin() {
        let user = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let store = Arc::new(RecordingStore {
            fallback_admin: Some(admin),
            ..Default::default()
        });

        let engine = CascadeEngine::new(store.clone());
        engine.delete_user(&user, DeleteMode::Soft).await.unwrap();

        assert_eq!(store.count("reassign_houses_created_by", &user), 1);
        assert_eq!(store.count("reassign_houses_managed_by", &user), 1);
        assert_eq!(store.count("reassign_pending_maintenance_requests", &user), 1);
        assert_eq!(store.count("hard_delete_notifications", &user), 1);
        assert_eq!(store.count("user", &user), 1);
    }

    #[tokio::test]
    async fn test_user_delete_fails_without_fallback_admin() {
        let user = Uuid::new_v4();
        let store = Arc::new(RecordingStore::default());

        let engine = CascadeEngine::new(store.clone());
        let err = engine.delete_user(&user, DeleteMode::Soft).await.unwrap_err();

        assert!(matches!(err, DomainError::FallbackAdminMissing(_)));
        assert!(store.ops().is_empty());
    }

    #[tokio::test]
    async fn test_invoice_delete_cascades_items_and_transactions() {
        let invoice = Uuid::new_v4();
        let store = Arc::new(RecordingStore::default());

        let engine = CascadeEngine::new(store.clone());
        let report = engine
            .delete_invoice(&invoice, DeleteMode::Soft)
            .await
            .unwrap();

        assert_eq!(store.count("invoice_items", &invoice), 1);
        assert_eq!(store.count("invoice_transactions", &invoice), 1);
        assert_eq!(store.count("invoice", &invoice), 1);
        assert_eq!(report.tombstoned, 3);
    }
}
