//! Storage port for the cascading soft-delete engine.
//!
//! Every `soft_delete_*` method stamps a tombstone on rows that are not
//! already tombstoned and returns how many rows it touched, so the engine
//! can report and so repeated cascades stay exactly-once per entity.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;

/// Root entity kinds the engine can force-delete. A force delete bypasses
/// all cascade logic; the storage layer's own referential integrity applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    House,
    Room,
    Contract,
    Invoice,
    RoomService,
    Request,
    MaintenanceRequest,
    Role,
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::House => "house",
            EntityKind::Room => "room",
            EntityKind::Contract => "contract",
            EntityKind::Invoice => "invoice",
            EntityKind::RoomService => "room_service",
            EntityKind::Request => "request",
            EntityKind::MaintenanceRequest => "maintenance_request",
            EntityKind::Role => "role",
            EntityKind::User => "user",
        }
    }
}

#[async_trait]
pub trait CascadeStore: Send + Sync {
    // Graph traversal
    async fn room_ids_of_house(&self, house_id: &Uuid) -> Result<Vec<Uuid>, DomainError>;
    async fn contract_ids_of_room(&self, room_id: &Uuid) -> Result<Vec<Uuid>, DomainError>;
    async fn room_service_ids_of_room(&self, room_id: &Uuid) -> Result<Vec<Uuid>, DomainError>;

    // Root tombstones
    async fn soft_delete_house(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn soft_delete_room(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn soft_delete_contract(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn soft_delete_invoice(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn soft_delete_room_service(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn soft_delete_request(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn soft_delete_maintenance_request(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn soft_delete_role(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn soft_delete_user(&self, id: &Uuid) -> Result<(), DomainError>;

    // Dependent tombstones, addressed by parent id
    async fn soft_delete_contract_tenant_links(
        &self,
        contract_id: &Uuid,
    ) -> Result<u64, DomainError>;
    async fn soft_delete_recurring_invoices(&self, contract_id: &Uuid)
        -> Result<u64, DomainError>;
    async fn soft_delete_room_equipment(&self, room_id: &Uuid) -> Result<u64, DomainError>;
    async fn soft_delete_room_price_history(&self, room_id: &Uuid) -> Result<u64, DomainError>;
    async fn soft_delete_service_usages(&self, room_service_id: &Uuid)
        -> Result<u64, DomainError>;
    async fn soft_delete_house_settings(&self, house_id: &Uuid) -> Result<u64, DomainError>;
    async fn soft_delete_equipment_storages(&self, house_id: &Uuid) -> Result<u64, DomainError>;
    async fn soft_delete_invoice_items(&self, invoice_id: &Uuid) -> Result<u64, DomainError>;
    async fn soft_delete_invoice_transactions(
        &self,
        invoice_id: &Uuid,
    ) -> Result<u64, DomainError>;
    async fn soft_delete_request_comments(&self, request_id: &Uuid) -> Result<u64, DomainError>;
    async fn soft_delete_maintenance_request_comments(
        &self,
        request_id: &Uuid,
    ) -> Result<u64, DomainError>;

    // Non-cascading special cases
    async fn clear_role_from_users(&self, role_id: &Uuid) -> Result<u64, DomainError>;
    async fn find_fallback_admin_id(&self, role_code: &str) -> Result<Option<Uuid>, DomainError>;
    async fn reassign_houses_created_by(
        &self,
        from_user: &Uuid,
        to_user: &Uuid,
    ) -> Result<u64, DomainError>;
    async fn reassign_houses_managed_by(
        &self,
        from_user: &Uuid,
        to_user: &Uuid,
    ) -> Result<u64, DomainError>;
    async fn reassign_pending_maintenance_requests(
        &self,
        from_user: &Uuid,
        to_user: &Uuid,
    ) -> Result<u64, DomainError>;
    async fn hard_delete_notifications_of_user(&self, user_id: &Uuid)
        -> Result<u64, DomainError>;

    /// Physical delete of a root row, used only for force deletes.
    async fn hard_delete(&self, kind: EntityKind, id: &Uuid) -> Result<(), DomainError>;
}
