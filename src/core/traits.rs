//! DI "Interfaces"

use crate::core::error::{BookingError, MessagingError, ScheduleError};
use crate::core::schedule::AvailabilityRequest;
use crate::infrastructure::entities;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

#[async_trait]
pub trait AvailabilityService: Send + Sync {
    /// Expands a recurring availability description and persists the
    /// resulting slots for the instructor. Validation failures (inverted
    /// range, cross-midnight window, empty expansion) perform no writes.
    async fn publish_slots(
        &self,
        instructor: Uuid,
        request: AvailabilityRequest,
    ) -> Result<Vec<entities::AvailabilitySlot>, ScheduleError>;

    /// Lists an instructor's open slots starting at `from` (defaults to now).
    async fn list_open_slots(
        &self,
        instructor: Uuid,
        from: Option<NaiveDateTime>,
    ) -> Result<Vec<entities::AvailabilitySlot>, ScheduleError>;

    /// Removes a slot. Only its owner may delete it.
    async fn remove_slot(&self, owner: Uuid, slot_id: Uuid) -> Result<(), ScheduleError>;
}

#[async_trait]
pub trait BookingService: Send + Sync {
    /// Turns a studio's request for one slot into a durable booking plus its
    /// side effects: the slot is consumed, a message lands in the pairwise
    /// conversation, the instructor gets a notification, and a best-effort
    /// push is dispatched. Everything except the push is atomic.
    async fn request_booking(
        &self,
        requester: Uuid,
        slot_id: Uuid,
        note: Option<String>,
    ) -> Result<entities::Booking, BookingError>;
}

#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Returns the single conversation between the two parties, creating it
    /// on first contact. Symmetric and idempotent.
    async fn resolve_conversation(
        &self,
        user_id: Uuid,
        peer: Uuid,
    ) -> Result<entities::Conversation, MessagingError>;

    async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<entities::Conversation>, MessagingError>;

    /// Lists all messages in a conversation the user participates in.
    async fn list_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Vec<entities::Message>, MessagingError>;

    /// Appends a message to a conversation the sender participates in.
    async fn send_message(
        &self,
        sender: Uuid,
        conversation_id: Uuid,
        content: String,
    ) -> Result<entities::Message, MessagingError>;
}
