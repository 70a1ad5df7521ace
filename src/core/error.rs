//! Domain error types.
//!
//! Validation errors are rejected before any write. Storage errors wrap the
//! underlying sqlx failure and surface as an operation failure to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("availability range ends before it starts")]
    InvertedDateRange,

    /// Also covers cross-midnight windows, which are rejected rather than
    /// miscomputed.
    #[error("end time must be later than start time within the same day")]
    EmptyTimeWindow,

    #[error("no slots generated for the requested range")]
    NoSlotsGenerated,

    #[error("hourly rate must be positive")]
    InvalidRate,

    #[error("slot not found")]
    SlotNotFound,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("slot not found")]
    SlotNotFound,

    #[error("slot is no longer available")]
    SlotUnavailable,

    #[error("cannot book your own availability slot")]
    OwnSlot,

    #[error("slot owner has no published rate")]
    UnknownInstructor,

    #[error("booking window must end after it starts")]
    InvalidDuration,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("cannot open a conversation with yourself")]
    SelfConversation,

    #[error("conversation not found for this user")]
    NotParticipant,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push dispatcher is not running")]
    DispatcherUnavailable,

    #[error("push queue is full")]
    QueueFull,

    #[error("push delivery timed out")]
    Timeout,

    #[error("push gateway rejected the notification: {0}")]
    Gateway(String),
}
