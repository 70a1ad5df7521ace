//! DB Repository abstractions

use crate::core::error::BookingError;
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{
    AvailabilitySlot, Booking, Conversation, Message, Notification,
};
use crate::infrastructure::traits::{
    AvailabilityRepository, BookingRepository, ConversationRepository, ProfileRepository,
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use di::{Ref, injectable};
use log::error;
use sqlx::sqlite::SqliteExecutor;
use uuid::Uuid;

/// Fixed storage order for a conversation pair: byte-wise smallest UUID
/// first. Makes the unique index on (participant_a, participant_b) cover the
/// unordered pair.
fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a.as_bytes() <= b.as_bytes() { (a, b) } else { (b, a) }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Queries shared between the standalone repositories and the booking
/// transaction. Each takes an executor so it runs against the pool or
/// against an open transaction alike.
mod queries {
    use super::*;

    pub async fn find_conversation(
        executor: impl SqliteExecutor<'_>,
        a: Uuid,
        b: Uuid,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM conversations \
             WHERE (participant_a = ? AND participant_b = ?) \
                OR (participant_a = ? AND participant_b = ?)",
        )
        .bind(a)
        .bind(b)
        .bind(b)
        .bind(a)
        .fetch_optional(executor)
        .await
    }

    pub async fn insert_conversation(
        executor: impl SqliteExecutor<'_>,
        a: Uuid,
        b: Uuid,
    ) -> Result<Conversation, sqlx::Error> {
        let (first, second) = ordered_pair(a, b);

        sqlx::query_as(
            "INSERT INTO conversations (id, participant_a, participant_b, created_at) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(first)
        .bind(second)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    pub async fn insert_message(
        executor: impl SqliteExecutor<'_>,
        message: Message,
    ) -> Result<Message, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO messages (id, conversation_id, sender, content, read, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(message.sender)
        .bind(message.content)
        .bind(message.read)
        .bind(message.created_at)
        .fetch_one(executor)
        .await
    }

    pub async fn insert_notification(
        executor: impl SqliteExecutor<'_>,
        notification: Notification,
    ) -> Result<Notification, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO notifications (id, recipient, kind, title, body, link, read, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(notification.id)
        .bind(notification.recipient)
        .bind(notification.kind)
        .bind(notification.title)
        .bind(notification.body)
        .bind(notification.link)
        .bind(notification.read)
        .bind(notification.created_at)
        .fetch_one(executor)
        .await
    }
}

#[injectable(AvailabilityRepository)]
pub struct DbAvailabilityRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl AvailabilityRepository for DbAvailabilityRepository {
    async fn insert_slots(
        &self,
        slots: Vec<AvailabilitySlot>,
    ) -> Result<Vec<AvailabilitySlot>, sqlx::Error> {
        let mut tx = self.connection.begin().await?;
        let mut inserted = Vec::with_capacity(slots.len());

        for slot in slots {
            let row: AvailabilitySlot = sqlx::query_as(
                "INSERT INTO availability_slots \
                 (id, instructor, start_time, end_time, is_available, sidecar, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
            )
            .bind(slot.id)
            .bind(slot.instructor)
            .bind(slot.start_time)
            .bind(slot.end_time)
            .bind(slot.is_available)
            .bind(slot.sidecar)
            .bind(slot.created_at)
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn get_slot(&self, slot_id: Uuid) -> Result<Option<AvailabilitySlot>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM availability_slots WHERE id = ?")
            .bind(slot_id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn list_available(
        &self,
        instructor: Uuid,
        from: NaiveDateTime,
    ) -> Result<Vec<AvailabilitySlot>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM availability_slots \
             WHERE instructor = ? AND is_available = 1 AND start_time >= ? \
             ORDER BY start_time ASC",
        )
        .bind(instructor)
        .bind(from)
        .fetch_all(&**self.connection)
        .await
    }

    async fn delete_slot(&self, owner: Uuid, slot_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM availability_slots WHERE id = ? AND instructor = ?")
            .bind(slot_id)
            .bind(owner)
            .execute(&**self.connection)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[injectable(BookingRepository)]
pub struct DbBookingRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl BookingRepository for DbBookingRepository {
    async fn create_scheduled(
        &self,
        booking: Booking,
        message: Message,
        notification: Notification,
    ) -> Result<Booking, BookingError> {
        let mut tx = self.connection.begin().await?;

        if let Some(slot_id) = booking.slot_id {
            // The guard on is_available makes two racing bookings of the same
            // slot commute: the loser sees zero updated rows and rolls back.
            let consumed = sqlx::query(
                "UPDATE availability_slots SET is_available = 0 \
                 WHERE id = ? AND is_available = 1",
            )
            .bind(slot_id)
            .execute(&mut *tx)
            .await?;

            if consumed.rows_affected() == 0 {
                return Err(BookingError::SlotUnavailable);
            }
        }

        let booking: Booking = sqlx::query_as(
            "INSERT INTO bookings \
             (id, studio, instructor, slot_id, title, booking_date, start_time, end_time, \
              location, instructor_rate, hours_worked, total_amount, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(booking.id)
        .bind(booking.studio)
        .bind(booking.instructor)
        .bind(booking.slot_id)
        .bind(booking.title)
        .bind(booking.booking_date)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.location)
        .bind(booking.instructor_rate)
        .bind(booking.hours_worked)
        .bind(booking.total_amount)
        .bind(booking.status)
        .bind(booking.created_at)
        .fetch_one(&mut *tx)
        .await?;

        queries::insert_message(&mut *tx, message).await?;
        queries::insert_notification(&mut *tx, notification).await?;

        tx.commit().await?;
        Ok(booking)
    }
}

#[injectable(ConversationRepository)]
pub struct DbConversationRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl ConversationRepository for DbConversationRepository {
    async fn find_or_create(&self, a: Uuid, b: Uuid) -> Result<Conversation, sqlx::Error> {
        if let Some(existing) = queries::find_conversation(&**self.connection, a, b).await? {
            return Ok(existing);
        }

        match queries::insert_conversation(&**self.connection, a, b).await {
            Ok(created) => Ok(created),
            Err(insert_error) if is_unique_violation(&insert_error) => {
                // Lost a first-contact race; the winner's row is the one.
                queries::find_conversation(&**self.connection, a, b)
                    .await?
                    .ok_or(insert_error)
            }
            Err(other) => {
                error!("failed to create conversation: {other}");
                Err(other)
            }
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM conversations \
             WHERE participant_a = ? OR participant_b = ? \
             ORDER BY datetime(created_at) ASC",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&**self.connection)
        .await
    }

    async fn get_for_user(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM conversations \
             WHERE id = ? AND (participant_a = ? OR participant_b = ?)",
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_optional(&**self.connection)
        .await
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM messages WHERE conversation_id = ? \
             ORDER BY datetime(created_at) ASC, id ASC",
        )
        .bind(conversation_id)
        .fetch_all(&**self.connection)
        .await
    }

    async fn append_message(&self, message: Message) -> Result<Message, sqlx::Error> {
        queries::insert_message(&**self.connection, message).await
    }
}

#[injectable(ProfileRepository)]
pub struct DbProfileRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl ProfileRepository for DbProfileRepository {
    async fn rate(&self, user_id: Uuid) -> Result<Option<f64>, sqlx::Error> {
        let row: Option<(f64,)> = sqlx::query_as("SELECT hourly_rate FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&**self.connection)
            .await?;

        Ok(row.map(|(rate,)| rate))
    }

    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT display_name FROM profiles WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&**self.connection)
                .await?;

        Ok(row.map(|(name,)| name))
    }
}
