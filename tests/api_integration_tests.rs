//! API Integration Tests
//!
//! Tests the HTTP API endpoints with a real database.
//!
//! Tests are serialized because they share a global test pool.
//!
//! Note: The `more-di` DI framework doesn't support injecting custom pools.
//! We work around this by using `DatabaseConnection::set_test_pool()` to set
//! a global pool that the DI-created DatabaseConnection will use.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use serde_json::{Value, json};
use serial_test::serial;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU32, Ordering};
use studio_booking_api::{
    api,
    core::services::{MyAvailabilityService, MyBookingService, MyMessagingService},
    infrastructure::database::DatabaseConnection,
    infrastructure::repositories::{
        DbAvailabilityRepository, DbBookingRepository, DbConversationRepository,
        DbProfileRepository,
    },
};
use tower::ServiceExt;
use uuid::Uuid;

/// Counter for unique test database URIs
static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Setup test database with migrations and returns pool
/// Uses in-memory SQLite for test isolation
async fn setup_test_db() -> SqlitePool {
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    // Use file URI format with shared cache - each test gets a unique DB
    let db_url = format!("sqlite:file:apitestdb{}?mode=memory&cache=shared", db_num);

    let pool = SqlitePool::connect(&db_url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    // Set this pool as the global test pool so DI uses it
    DatabaseConnection::set_test_pool(pool.clone());

    pool
}

/// Clean up after test
fn cleanup_test_db() {
    DatabaseConnection::clear_test_pool();
}

/// Create test app - uses the global test pool set by setup_test_db()
fn create_test_app() -> axum::Router {
    let provider = ServiceCollection::new()
        .add(DatabaseConnection::transient())
        .add(DbAvailabilityRepository::scoped())
        .add(DbBookingRepository::scoped())
        .add(DbConversationRepository::scoped())
        .add(DbProfileRepository::scoped())
        .add(MyAvailabilityService::scoped())
        .add(MyBookingService::scoped())
        .add(MyMessagingService::scoped())
        .build_provider()
        .unwrap();

    axum::Router::new()
        .nest("/availability", api::availability::router())
        .nest("/bookings", api::bookings::router())
        .nest("/conversations", api::conversations::router())
        .with_provider(provider)
}

async fn seed_profile(pool: &SqlitePool, id: Uuid, name: &str, rate: f64) {
    sqlx::query("INSERT INTO profiles (id, display_name, hourly_rate) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(rate)
        .execute(pool)
        .await
        .unwrap();
}

fn post_json(uri: &str, user: Uuid, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-User-ID", user.to_string())
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, user: Uuid) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-User-ID", user.to_string())
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn availability_body() -> Value {
    json!({
        "date_from": "2024-03-04",
        "date_to": "2024-03-10",
        "repeat_days": ["mon", "wed"],
        "start_time": "09:00:00",
        "end_time": "10:00:00",
        "sidecar": {
            "category": "group_class",
            "tags": ["yoga"],
            "hourly_rate": 80.0,
            "rate_unit": "hour",
            "location": "Studio North"
        }
    })
}

#[tokio::test]
#[serial]
async fn test_publish_availability_expands_slots() {
    let _pool = setup_test_db().await;
    let app = create_test_app();

    let instructor = Uuid::new_v4();
    let response = app
        .oneshot(post_json("/availability", instructor, availability_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["count"], 2);
    let slots = json["slots"].as_array().unwrap();
    assert_eq!(slots[0]["start_time"], "2024-03-04T09:00:00");
    assert_eq!(slots[1]["start_time"], "2024-03-06T09:00:00");

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_publish_availability_rejects_inverted_range() {
    let pool = setup_test_db().await;
    let app = create_test_app();

    let mut body = availability_body();
    body["date_from"] = json!("2024-03-10");
    body["date_to"] = json!("2024-03-04");

    let response = app
        .oneshot(post_json("/availability", Uuid::new_v4(), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Validation failures perform no writes.
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM availability_slots")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_list_instructor_open_slots() {
    let _pool = setup_test_db().await;
    let app = create_test_app();

    let instructor = Uuid::new_v4();
    let studio = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(post_json("/availability", instructor, availability_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get(
            &format!("/availability/{instructor}?from=2024-03-01T00:00:00"),
            studio,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 2);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_requests_require_auth_header() {
    let _pool = setup_test_db().await;
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/conversations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_booking_flow_over_http() {
    let pool = setup_test_db().await;
    let app = create_test_app();

    let instructor = Uuid::new_v4();
    let studio = Uuid::new_v4();
    seed_profile(&pool, instructor, "Alex Instructor", 80.0).await;
    seed_profile(&pool, studio, "Studio North", 50.0).await;

    let response = app
        .clone()
        .oneshot(post_json("/availability", instructor, availability_body()))
        .await
        .unwrap();
    let slots = body_json(response).await;
    let slot_id = slots["slots"][0]["id"].as_str().unwrap().to_owned();

    let response = app
        .clone()
        .oneshot(post_json(
            "/bookings",
            studio,
            json!({ "slot_id": slot_id, "message": "Can you cover our 9am class?" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let booking = body_json(response).await;
    assert_eq!(booking["status"], "scheduled");
    assert_eq!(booking["hours_worked"], 1.0);
    assert_eq!(booking["total_amount"], 80.0);

    // Booking the same slot again conflicts.
    let response = app
        .clone()
        .oneshot(post_json(
            "/bookings",
            studio,
            json!({ "slot_id": slot_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The instructor sees the conversation and the request message.
    let response = app
        .clone()
        .oneshot(get("/conversations", instructor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let conversations = body_json(response).await;
    let list = conversations["conversations"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    let conversation_id = list[0]["id"].as_str().unwrap().to_owned();

    let response = app
        .clone()
        .oneshot(get(
            &format!("/conversations/{conversation_id}/messages"),
            instructor,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let messages = body_json(response).await;
    assert_eq!(messages["messages"].as_array().unwrap().len(), 1);
    assert_eq!(
        messages["messages"][0]["content"],
        "Can you cover our 9am class?"
    );

    // A third party cannot read the thread.
    let response = app
        .oneshot(get(
            &format!("/conversations/{conversation_id}/messages"),
            Uuid::new_v4(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_booking_missing_slot_is_not_found() {
    let pool = setup_test_db().await;
    let app = create_test_app();

    let studio = Uuid::new_v4();
    seed_profile(&pool, studio, "Studio North", 50.0).await;

    let response = app
        .oneshot(post_json(
            "/bookings",
            studio,
            json!({ "slot_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_open_conversation_is_idempotent_over_http() {
    let _pool = setup_test_db().await;
    let app = create_test_app();

    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    let first = app
        .clone()
        .oneshot(post_json("/conversations", a, json!({ "participant": b })))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_json(first).await;

    // Resolving from the other side returns the same conversation.
    let second = app
        .clone()
        .oneshot(post_json("/conversations", b, json!({ "participant": a })))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second = body_json(second).await;

    assert_eq!(first["id"], second["id"]);

    let response = app
        .oneshot(post_json("/conversations", a, json!({ "participant": a })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_delete_slot_owner_only() {
    let _pool = setup_test_db().await;
    let app = create_test_app();

    let instructor = Uuid::new_v4();
    let response = app
        .clone()
        .oneshot(post_json("/availability", instructor, availability_body()))
        .await
        .unwrap();
    let slots = body_json(response).await;
    let slot_id = slots["slots"][0]["id"].as_str().unwrap().to_owned();

    // Someone else cannot delete it.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/availability/slots/{slot_id}"))
                .header("X-User-ID", Uuid::new_v4().to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner can.
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/availability/slots/{slot_id}"))
                .header("X-User-ID", instructor.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    cleanup_test_db();
}
