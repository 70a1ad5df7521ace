//! Availability endpoints

use crate::api::{ErrorBody, ExtractUser};
use crate::core::error::ScheduleError;
use crate::core::traits::AvailabilityService;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", post(publish_availability))
        .route("/:instructor_id", get(list_instructor_slots))
        .route("/slots/:slot_id", axum::routing::delete(delete_slot))
}

async fn publish_availability(
    Inject(availability_service): Inject<dyn AvailabilityService>,
    ExtractUser(current_user): ExtractUser,
    Json(request): Json<schemas::PostAvailability>,
) -> Response {
    match availability_service
        .publish_slots(current_user, request.into())
        .await
    {
        Ok(slots) => (
            StatusCode::CREATED,
            Json(schemas::SlotList {
                count: slots.len(),
                slots: slots.into_iter().map(schemas::Slot::from).collect(),
            }),
        )
            .into_response(),
        Err(e) => schedule_error_response(e),
    }
}

async fn list_instructor_slots(
    Inject(availability_service): Inject<dyn AvailabilityService>,
    ExtractUser(_current_user): ExtractUser,
    Path(instructor_id): Path<Uuid>,
    Query(params): Query<schemas::ListParams>,
) -> Response {
    match availability_service
        .list_open_slots(instructor_id, params.from)
        .await
    {
        Ok(slots) => (
            StatusCode::OK,
            Json(schemas::SlotList {
                count: slots.len(),
                slots: slots.into_iter().map(schemas::Slot::from).collect(),
            }),
        )
            .into_response(),
        Err(e) => schedule_error_response(e),
    }
}

async fn delete_slot(
    Inject(availability_service): Inject<dyn AvailabilityService>,
    ExtractUser(current_user): ExtractUser,
    Path(slot_id): Path<Uuid>,
) -> Response {
    match availability_service.remove_slot(current_user, slot_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => schedule_error_response(e),
    }
}

fn schedule_error_response(error: ScheduleError) -> Response {
    let status = match &error {
        ScheduleError::InvertedDateRange
        | ScheduleError::EmptyTimeWindow
        | ScheduleError::NoSlotsGenerated
        | ScheduleError::InvalidRate => StatusCode::UNPROCESSABLE_ENTITY,
        ScheduleError::SlotNotFound => StatusCode::NOT_FOUND,
        ScheduleError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ErrorBody::new(error))).into_response()
}

pub mod schemas {
    use crate::core::schedule::{AvailabilityRequest, RepeatDay};
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::SlotSidecar;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    pub struct PostAvailability {
        pub date_from: NaiveDate,
        pub date_to: Option<NaiveDate>,
        #[serde(default)]
        pub repeat_days: Vec<RepeatDay>,
        pub start_time: NaiveTime,
        pub end_time: NaiveTime,
        pub sidecar: SlotSidecar,
    }

    impl From<PostAvailability> for AvailabilityRequest {
        fn from(body: PostAvailability) -> Self {
            AvailabilityRequest {
                date_from: body.date_from,
                date_to: body.date_to,
                repeat_days: body.repeat_days,
                start_time: body.start_time,
                end_time: body.end_time,
                sidecar: body.sidecar,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct ListParams {
        pub from: Option<NaiveDateTime>,
    }

    #[derive(Serialize, Debug)]
    pub struct Slot {
        pub id: Uuid,
        pub instructor: Uuid,
        pub start_time: NaiveDateTime,
        pub end_time: NaiveDateTime,
        pub is_available: bool,
        pub sidecar: SlotSidecar,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::AvailabilitySlot> for Slot {
        fn from(slot: entities::AvailabilitySlot) -> Self {
            Slot {
                id: slot.id,
                instructor: slot.instructor,
                start_time: slot.start_time,
                end_time: slot.end_time,
                is_available: slot.is_available,
                sidecar: slot.sidecar.0,
                created_at: slot.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct SlotList {
        pub count: usize,
        pub slots: Vec<Slot>,
    }
}
