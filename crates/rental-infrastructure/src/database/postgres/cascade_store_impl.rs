//! PostgreSQL cascade store.
//!
//! Tombstone queries always filter `removed_at IS NULL` so a repeated
//! cascade pass touches nothing twice.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use rental_core::error::DomainError;
use rental_core::repositories::cascade_store::EntityKind;
use rental_core::repositories::CascadeStore;

pub struct PgCascadeStore {
    pool: PgPool,
}

impl PgCascadeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ids(&self, sql: &str, parent: &Uuid) -> Result<Vec<Uuid>, DomainError> {
        sqlx::query_scalar(sql)
            .bind(parent)
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error listing cascade children: {}", e);
                DomainError::DatabaseError(e.to_string())
            })
    }

    async fn tombstone(&self, sql: &str, id: &Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query(sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error soft-deleting cascade rows: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CascadeStore for PgCascadeStore {
    async fn room_ids_of_house(&self, house_id: &Uuid) -> Result<Vec<Uuid>, DomainError> {
        self.ids(
            "SELECT id FROM rooms WHERE house_id = $1 AND removed_at IS NULL ORDER BY id",
            house_id,
        )
        .await
    }

    async fn contract_ids_of_room(&self, room_id: &Uuid) -> Result<Vec<Uuid>, DomainError> {
        self.ids(
            "SELECT id FROM contracts WHERE room_id = $1 AND removed_at IS NULL ORDER BY id",
            room_id,
        )
        .await
    }

    async fn room_service_ids_of_room(&self, room_id: &Uuid) -> Result<Vec<Uuid>, DomainError> {
        self.ids(
            "SELECT id FROM room_services WHERE room_id = $1 AND removed_at IS NULL ORDER BY id",
            room_id,
        )
        .await
    }

    async fn soft_delete_house(&self, id: &Uuid) -> Result<(), DomainError> {
        self.tombstone(
            "UPDATE houses SET removed_at = NOW() WHERE id = $1 AND removed_at IS NULL",
            id,
        )
        .await?;
        Ok(())
    }

    async fn soft_delete_room(&self, id: &Uuid) -> Result<(), DomainError> {
        self.tombstone(
            "UPDATE rooms SET removed_at = NOW() WHERE id = $1 AND removed_at IS NULL",
            id,
        )
        .await?;
        Ok(())
    }

    async fn soft_delete_contract(&self, id: &Uuid) -> Result<(), DomainError> {
        self.tombstone(
            "UPDATE contracts SET removed_at = NOW() WHERE id = $1 AND removed_at IS NULL",
            id,
        )
        .await?;
        Ok(())
    }

    async fn soft_delete_invoice(&self, id: &Uuid) -> Result<(), DomainError> {
        self.tombstone(
            "UPDATE invoices SET removed_at = NOW() WHERE id = $1 AND removed_at IS NULL",
            id,
        )
        .await?;
        Ok(())
    }

    async fn soft_delete_room_service(&self, id: &Uuid) -> Result<(), DomainError> {
        self.tombstone(
            "UPDATE room_services SET removed_at = NOW() WHERE id = $1 AND removed_at IS NULL",
            id,
        )
        .await?;
        Ok(())
    }

    async fn soft_delete_request(&self, id: &Uuid) -> Result<(), DomainError> {
        self.tombstone(
            "UPDATE requests SET removed_at = NOW() WHERE id = $1 AND removed_at IS NULL",
            id,
        )
        .await?;
        Ok(())
    }

    async fn soft_delete_maintenance_request(&self, id: &Uuid) -> Result<(), DomainError> {
        self.tombstone(
            "UPDATE maintenance_requests SET removed_at = NOW() WHERE id = $1 AND removed_at IS NULL",
            id,
        )
        .await?;
        Ok(())
    }

    async fn soft_delete_role(&self, id: &Uuid) -> Result<(), DomainError> {
        self.tombstone(
            "UPDATE roles SET removed_at = NOW() WHERE id = $1 AND removed_at IS NULL",
            id,
        )
        .await?;
        Ok(())
    }

    async fn soft_delete_user(&self, id: &Uuid) -> Result<(), DomainError> {
        self.tombstone(
            "UPDATE users SET removed_at = NOW(), is_active = false WHERE id = $1 AND removed_at IS NULL",
            id,
        )
        .await?;
        Ok(())
    }

    async fn soft_delete_contract_tenant_links(
        &self,
        contract_id: &Uuid,
    ) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE contract_tenants SET removed_at = NOW() WHERE contract_id = $1 AND removed_at IS NULL",
            contract_id,
        )
        .await
    }

    async fn soft_delete_recurring_invoices(
        &self,
        contract_id: &Uuid,
    ) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE recurring_invoices SET removed_at = NOW() WHERE contract_id = $1 AND removed_at IS NULL",
            contract_id,
        )
        .await
    }

    async fn soft_delete_room_equipment(&self, room_id: &Uuid) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE room_equipment SET removed_at = NOW() WHERE room_id = $1 AND removed_at IS NULL",
            room_id,
        )
        .await
    }

    async fn soft_delete_room_price_history(&self, room_id: &Uuid) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE room_price_histories SET removed_at = NOW() WHERE room_id = $1 AND removed_at IS NULL",
            room_id,
        )
        .await
    }

    async fn soft_delete_service_usages(
        &self,
        room_service_id: &Uuid,
    ) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE service_usages SET removed_at = NOW() WHERE room_service_id = $1 AND removed_at IS NULL",
            room_service_id,
        )
        .await
    }

    async fn soft_delete_house_settings(&self, house_id: &Uuid) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE house_settings SET removed_at = NOW() WHERE house_id = $1 AND removed_at IS NULL",
            house_id,
        )
        .await
    }

    async fn soft_delete_equipment_storages(&self, house_id: &Uuid) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE equipment_storages SET removed_at = NOW() WHERE house_id = $1 AND removed_at IS NULL",
            house_id,
        )
        .await
    }

    async fn soft_delete_invoice_items(&self, invoice_id: &Uuid) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE invoice_items SET removed_at = NOW() WHERE invoice_id = $1 AND removed_at IS NULL",
            invoice_id,
        )
        .await
    }

    async fn soft_delete_invoice_transactions(
        &self,
        invoice_id: &Uuid,
    ) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE transactions SET removed_at = NOW() WHERE invoice_id = $1 AND removed_at IS NULL",
            invoice_id,
        )
        .await
    }

    async fn soft_delete_request_comments(&self, request_id: &Uuid) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE request_comments SET removed_at = NOW() WHERE request_id = $1 AND removed_at IS NULL",
            request_id,
        )
        .await
    }

    async fn soft_delete_maintenance_request_comments(
        &self,
        request_id: &Uuid,
    ) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE maintenance_request_comments SET removed_at = NOW() WHERE request_id = $1 AND removed_at IS NULL",
            request_id,
        )
        .await
    }

    async fn clear_role_from_users(&self, role_id: &Uuid) -> Result<u64, DomainError> {
        self.tombstone(
            "UPDATE users SET role_id = NULL, modified_at = NOW() WHERE role_id = $1 AND removed_at IS NULL",
            role_id,
        )
        .await
    }

    async fn find_fallback_admin_id(&self, role_code: &str) -> Result<Option<Uuid>, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT u.id
            FROM users u
            JOIN roles r ON r.id = u.role_id AND r.removed_at IS NULL
            WHERE r.code = $1 AND u.removed_at IS NULL
            ORDER BY u.created_at
            LIMIT 1
            "#,
        )
        .bind(role_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error looking up fallback admin: {}", e);
            DomainError::DatabaseError(e.to_string())
        })
    }

    async fn reassign_houses_created_by(
        &self,
        from_user: &Uuid,
        to_user: &Uuid,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE houses SET created_by = $2, modified_at = NOW() WHERE created_by = $1 AND removed_at IS NULL",
        )
        .bind(from_user)
        .bind(to_user)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error reassigning created houses: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        Ok(result.rows_affected())
    }

    async fn reassign_houses_managed_by(
        &self,
        from_user: &Uuid,
        to_user: &Uuid,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE houses SET manager_id = $2, modified_at = NOW() WHERE manager_id = $1 AND removed_at IS NULL",
        )
        .bind(from_user)
        .bind(to_user)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error reassigning managed houses: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        Ok(result.rows_affected())
    }

    async fn reassign_pending_maintenance_requests(
        &self,
        from_user: &Uuid,
        to_user: &Uuid,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE maintenance_requests
            SET assigned_to = $2, modified_at = NOW()
            WHERE assigned_to = $1 AND status = 'pending' AND removed_at IS NULL
            "#,
        )
        .bind(from_user)
        .bind(to_user)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error reassigning maintenance requests: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        Ok(result.rows_affected())
    }

    async fn hard_delete_notifications_of_user(
        &self,
        user_id: &Uuid,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error deleting user notifications: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;
        Ok(result.rows_affected())
    }

    async fn hard_delete(&self, kind: EntityKind, id: &Uuid) -> Result<(), DomainError> {
        let table = match kind {
            EntityKind::House => "houses",
            EntityKind::Room => "rooms",
            EntityKind::Contract => "contracts",
            EntityKind::Invoice => "invoices",
            EntityKind::RoomService => "room_services",
            EntityKind::Request => "requests",
            EntityKind::MaintenanceRequest => "maintenance_requests",
            EntityKind::Role => "roles",
            EntityKind::User => "users",
        };
        sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error force-deleting {}: {}", kind.as_str(), e);
                DomainError::DatabaseError(e.to_string())
            })?;
        Ok(())
    }
}
