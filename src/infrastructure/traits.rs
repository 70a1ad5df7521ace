//! Infrastructure traits, used for DI on higher levels

use crate::core::error::BookingError;
use crate::infrastructure::entities;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn insert_slots(
        &self,
        slots: Vec<entities::AvailabilitySlot>,
    ) -> Result<Vec<entities::AvailabilitySlot>, sqlx::Error>;

    async fn get_slot(
        &self,
        slot_id: Uuid,
    ) -> Result<Option<entities::AvailabilitySlot>, sqlx::Error>;

    /// Open slots for an instructor, starting at `from`, ascending.
    async fn list_available(
        &self,
        instructor: Uuid,
        from: NaiveDateTime,
    ) -> Result<Vec<entities::AvailabilitySlot>, sqlx::Error>;

    /// Owner-scoped delete. Returns false when no matching slot exists.
    async fn delete_slot(&self, owner: Uuid, slot_id: Uuid) -> Result<bool, sqlx::Error>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Writes a booking request atomically: consumes the source slot, inserts
    /// the booking, appends the request message and the owner's notification.
    /// Either all four writes commit or none do; a slot already consumed by a
    /// concurrent booking fails with `SlotUnavailable`.
    async fn create_scheduled(
        &self,
        booking: entities::Booking,
        message: entities::Message,
        notification: entities::Notification,
    ) -> Result<entities::Booking, BookingError>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Returns the unique conversation between the pair, creating it on first
    /// contact. Symmetric: `(a, b)` and `(b, a)` resolve to the same row. A
    /// concurrent create racing on the pair's unique index is recovered by
    /// re-querying.
    async fn find_or_create(
        &self,
        a: Uuid,
        b: Uuid,
    ) -> Result<entities::Conversation, sqlx::Error>;

    async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<entities::Conversation>, sqlx::Error>;

    /// Looks up a conversation only if `user_id` participates in it.
    async fn get_for_user(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<entities::Conversation>, sqlx::Error>;

    async fn list_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<entities::Message>, sqlx::Error>;

    async fn append_message(
        &self,
        message: entities::Message,
    ) -> Result<entities::Message, sqlx::Error>;
}

/// Read-only view of the account/profile store. Writes belong to the
/// identity subsystem, which is an external collaborator.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn rate(&self, user_id: Uuid) -> Result<Option<f64>, sqlx::Error>;

    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>, sqlx::Error>;
}
