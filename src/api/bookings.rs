//! Booking request endpoint

use crate::api::{ErrorBody, ExtractUser};
use crate::core::error::BookingError;
use crate::core::traits::BookingService;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new().route("/", post(request_booking))
}

async fn request_booking(
    Inject(booking_service): Inject<dyn BookingService>,
    ExtractUser(current_user): ExtractUser,
    Json(request): Json<schemas::CreateBooking>,
) -> Response {
    match booking_service
        .request_booking(current_user, request.slot_id, request.message)
        .await
    {
        Ok(booking) => (
            StatusCode::CREATED,
            Json(schemas::Booking::from(booking)),
        )
            .into_response(),
        Err(e) => booking_error_response(e),
    }
}

fn booking_error_response(error: BookingError) -> Response {
    let status = match &error {
        BookingError::SlotNotFound => StatusCode::NOT_FOUND,
        BookingError::SlotUnavailable => StatusCode::CONFLICT,
        BookingError::OwnSlot
        | BookingError::UnknownInstructor
        | BookingError::InvalidDuration => StatusCode::UNPROCESSABLE_ENTITY,
        BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ErrorBody::new(error))).into_response()
}

pub mod schemas {
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::BookingStatus;
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    pub struct CreateBooking {
        pub slot_id: Uuid,
        pub message: Option<String>,
    }

    #[derive(Serialize, Debug)]
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

    impl From<entities::Booking> for Booking {
        fn from(booking: entities::Booking) -> Self {
            Booking {
                id: booking.id,
                studio: booking.studio,
                instructor: booking.instructor,
                slot_id: booking.slot_id,
                title: booking.title,
                booking_date: booking.booking_date,
                start_time: booking.start_time,
                end_time: booking.end_time,
                location: booking.location,
                instructor_rate: booking.instructor_rate,
                hours_worked: booking.hours_worked,
                total_amount: booking.total_amount,
                status: booking.status,
                created_at: booking.created_at,
            }
        }
    }
}
