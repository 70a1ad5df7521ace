//! Implementations for the services the app needs.
//!

use crate::core::billing;
use crate::core::error::{BookingError, MessagingError, ScheduleError};
use crate::core::push;
use crate::core::schedule::{self, AvailabilityRequest};
use crate::core::traits::{AvailabilityService, BookingService, MessagingService};
use crate::infrastructure::entities::{
    AvailabilitySlot, Booking, BookingStatus, Conversation, Message, Notification,
};
use crate::infrastructure::traits::{
    AvailabilityRepository, BookingRepository, ConversationRepository, ProfileRepository,
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use di::{Ref, injectable};
use log::error;
use sqlx::types::Json;
use uuid::Uuid;

#[injectable(AvailabilityService)]
pub struct MyAvailabilityService {
    repo: Ref<dyn AvailabilityRepository>,
}

#[async_trait]
impl AvailabilityService for MyAvailabilityService {
    async fn publish_slots(
        &self,
        instructor: Uuid,
        request: AvailabilityRequest,
    ) -> Result<Vec<AvailabilitySlot>, ScheduleError> {
        let drafts = schedule::expand(&request)?;
        let now = Utc::now();

        let slots = drafts
            .into_iter()
            .map(|draft| AvailabilitySlot {
                id: Uuid::new_v4(),
                instructor,
                start_time: draft.start_time,
                end_time: draft.end_time,
                is_available: true,
                sidecar: Json(request.sidecar.clone()),
                created_at: now,
            })
            .collect();

        let inserted = self.repo.insert_slots(slots).await.map_err(|e| {
            error!("failed to persist availability slots: {e}");
            ScheduleError::Storage(e)
        })?;

        Ok(inserted)
    }

    async fn list_open_slots(
        &self,
        instructor: Uuid,
        from: Option<NaiveDateTime>,
    ) -> Result<Vec<AvailabilitySlot>, ScheduleError> {
        // Single-region convention with the service clock pinned to UTC:
        // naive slot times are read against the UTC wall clock.
        let from = from.unwrap_or_else(|| Utc::now().naive_utc());

        Ok(self.repo.list_available(instructor, from).await?)
    }

    async fn remove_slot(&self, owner: Uuid, slot_id: Uuid) -> Result<(), ScheduleError> {
        if self.repo.delete_slot(owner, slot_id).await? {
            Ok(())
        } else {
            Err(ScheduleError::SlotNotFound)
        }
    }
}

#[injectable(BookingService)]
pub struct MyBookingService {
    slots: Ref<dyn AvailabilityRepository>,
    bookings: Ref<dyn BookingRepository>,
    conversations: Ref<dyn ConversationRepository>,
    profiles: Ref<dyn ProfileRepository>,
}

#[async_trait]
impl BookingService for MyBookingService {
    async fn request_booking(
        &self,
        requester: Uuid,
        slot_id: Uuid,
        note: Option<String>,
    ) -> Result<Booking, BookingError> {
        let slot = self
            .slots
            .get_slot(slot_id)
            .await?
            .ok_or(BookingError::SlotNotFound)?;

        if !slot.is_available {
            return Err(BookingError::SlotUnavailable);
        }
        if slot.instructor == requester {
            return Err(BookingError::OwnSlot);
        }

        // Point-in-time snapshot: the booking keeps this rate even if the
        // instructor changes it later.
        let rate = self
            .profiles
            .rate(slot.instructor)
            .await?
            .ok_or(BookingError::UnknownInstructor)?;

        let estimate = billing::estimate(slot.start_time, slot.end_time, rate)?;

        // Idempotent first-contact resolution. A conversation left behind by
        // a failed booking below is harmless: it is exactly the row any later
        // contact between the pair would create.
        let conversation = self
            .conversations
            .find_or_create(requester, slot.instructor)
            .await?;

        let studio_name = self
            .profiles
            .display_name(requester)
            .await?
            .unwrap_or_else(|| "A studio".to_owned());

        let date = slot.start_time.date();
        let window = format!(
            "from {} to {}",
            slot.start_time.format("%H:%M"),
            slot.end_time.format("%H:%M")
        );
        let now = Utc::now();

        let booking = Booking {
            id: Uuid::new_v4(),
            studio: requester,
            instructor: slot.instructor,
            slot_id: Some(slot.id),
            title: format!("Session on {date}"),
            booking_date: date,
            start_time: slot.start_time.time(),
            end_time: slot.end_time.time(),
            location: slot.sidecar.location.clone(),
            instructor_rate: rate,
            hours_worked: estimate.hours,
            total_amount: estimate.amount,
            status: BookingStatus::Scheduled,
            created_at: now,
        };

        let content = note.unwrap_or_else(|| {
            format!("{studio_name} would like to book your {date} session {window}.")
        });
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: conversation.id,
            sender: requester,
            content,
            read: false,
            created_at: now,
        };

        let notification = Notification {
            id: Uuid::new_v4(),
            recipient: slot.instructor,
            kind: "booking_request".to_owned(),
            title: "New booking request".to_owned(),
            body: format!("{studio_name} requested your {date} slot {window}."),
            link: format!("/bookings/{}", booking.id),
            read: false,
            created_at: now,
        };

        let booking = self
            .bookings
            .create_scheduled(booking, message, notification)
            .await
            .map_err(|e| {
                error!("booking request for slot {slot_id} failed: {e}");
                e
            })?;

        // Outside the success/failure contract of the booking itself.
        push::dispatch(
            slot.instructor,
            "New booking request".to_owned(),
            format!("{studio_name} requested your {date} slot {window}."),
        );

        Ok(booking)
    }
}

#[injectable(MessagingService)]
pub struct MyMessagingService {
    repo: Ref<dyn ConversationRepository>,
}

#[async_trait]
impl MessagingService for MyMessagingService {
    async fn resolve_conversation(
        &self,
        user_id: Uuid,
        peer: Uuid,
    ) -> Result<Conversation, MessagingError> {
        if user_id == peer {
            return Err(MessagingError::SelfConversation);
        }

        Ok(self.repo.find_or_create(user_id, peer).await?)
    }

    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, MessagingError> {
        Ok(self.repo.list_for_user(user_id).await?)
    }

    async fn list_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, MessagingError> {
        self.repo
            .get_for_user(conversation_id, user_id)
            .await?
            .ok_or(MessagingError::NotParticipant)?;

        Ok(self.repo.list_messages(conversation_id).await?)
    }

    async fn send_message(
        &self,
        sender: Uuid,
        conversation_id: Uuid,
        content: String,
    ) -> Result<Message, MessagingError> {
        self.repo
            .get_for_user(conversation_id, sender)
            .await?
            .ok_or(MessagingError::NotParticipant)?;

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender,
            content,
            read: false,
            created_at: Utc::now(),
        };

        Ok(self.repo.append_message(message).await?)
    }
}
