//! Database entities

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Availability category advertised on a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotCategory {
    GroupClass,
    PrivateSession,
    Workshop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateUnit {
    Hour,
    Session,
}

/// Per-slot metadata carried as one embedded JSON document rather than
/// relational columns, so heterogeneous slots coexist without schema churn.
/// Typed and validated at the API boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSidecar {
    pub category: SlotCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    pub hourly_rate: f64,
    pub rate_unit: RateUnit,
    pub location: Option<String>,
}

/// A single bookable time window offered by an instructor.
///
/// `start_time`/`end_time` are naive wall-clock values (single-region
/// convention). A consumed slot is flagged unavailable, never deleted.
#[derive(Debug, Clone, FromRow)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub instructor: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_available: bool,
    pub sidecar: Json<SlotSidecar>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Initial state, the only one this pipeline writes.
    Scheduled,
    /// Terminal states owned by downstream fulfillment logic.
    Completed,
    Cancelled,
}

/// A confirmed reservation of a slot, with billing data snapshotted at
/// creation time. `total_amount` is never recomputed, even if the
/// instructor's rate later changes.
#[derive(Debug, Clone, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub studio: Uuid,
    pub instructor: Uuid,
    pub slot_id: Option<Uuid>,
    pub title: String,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: Option<String>,
    pub instructor_rate: f64,
    pub hours_worked: f64,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// The unique message thread between two parties. Participants are stored
/// byte-wise smallest UUID first; at most one row exists per unordered pair.
#[derive(Debug, Clone, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_a: Uuid,
    pub participant_b: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub link: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
