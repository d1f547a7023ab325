//! Room domain entity

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rental_shared::types::AuditFields;

/// Occupancy state of a room. "used" while at least one active contract
/// references the room; flips back to "available" only when none remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Used,
    Maintain,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Used => "used",
            RoomStatus::Maintain => "maintain",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(RoomStatus::Available),
            "used" => Some(RoomStatus::Used),
            "maintain" => Some(RoomStatus::Maintain),
            _ => None,
        }
    }
}

impl Default for RoomStatus {
    fn default() -> Self {
        RoomStatus::Available
    }
}

/// Physical rentable unit. `room_number` is unique within its house.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub house_id: Uuid,
    pub room_number: String,
    pub capacity: i32,
    pub base_price: i64,
    pub status: RoomStatus,
    pub audit: AuditFields,
}

impl Room {
    pub fn new(house_id: Uuid, room_number: String, capacity: i32, base_price: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            house_id,
            room_number,
            capacity,
            base_price,
            status: RoomStatus::default(),
            audit: AuditFields::default(),
        }
    }
}
