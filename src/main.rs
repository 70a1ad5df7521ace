//! Marketplace scheduling and booking API server

use studio_booking_api::PUSH_SENDER;
use studio_booking_api::api;
use studio_booking_api::core;
use studio_booking_api::core::push::LogPushGateway;
use studio_booking_api::core::services::{
    MyAvailabilityService, MyBookingService, MyMessagingService,
};
use studio_booking_api::infrastructure::database::DatabaseConnection;
use studio_booking_api::infrastructure::repositories::{
    DbAvailabilityRepository, DbBookingRepository, DbConversationRepository, DbProfileRepository,
};

use axum::Router;
use axum::http::{HeaderValue, Method};
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::info;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    // background task for best-effort push delivery
    let (push_sender, push_receiver) = mpsc::channel(64);
    let push_join_handle = runtime.spawn(core::push::background_task(
        push_receiver,
        LogPushGateway::default(),
    ));
    PUSH_SENDER
        .set(push_sender)
        .expect("push sender should not be set");

    let web_task_handle = runtime.spawn(web_server_task());

    runtime.block_on(async {
        web_task_handle
            .await
            .expect("failed to join web_task_handle");
        push_join_handle
            .await
            .expect("failed to join push_join_handle");
    });

    Ok(())
}

async fn web_server_task() {
    let provider = ServiceCollection::new()
        .add(DatabaseConnection::singleton())
        .add(DbAvailabilityRepository::scoped())
        .add(DbBookingRepository::scoped())
        .add(DbConversationRepository::scoped())
        .add(DbProfileRepository::scoped())
        .add(MyAvailabilityService::scoped())
        .add(MyBookingService::scoped())
        .add(MyMessagingService::scoped())
        .build_provider()
        .unwrap();

    let database = provider.get_required::<DatabaseConnection>();
    sqlx::migrate!()
        .run(&**database)
        .await
        .expect("failed to run database migrations");

    // build our application with a route
    let app = Router::new()
        .nest("/availability", api::availability::router())
        .nest("/bookings", api::bookings::router())
        .nest("/conversations", api::conversations::router())
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_origin([
                    "http://localhost:3000".parse::<HeaderValue>().unwrap(),
                    "http://localhost:5173".parse::<HeaderValue>().unwrap(),
                ]),
        )
        .with_provider(provider);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
    info!("Shutting down...");
}
