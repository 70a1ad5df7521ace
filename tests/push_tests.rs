//! Tests for the background push dispatcher.

use async_trait::async_trait;
use studio_booking_api::core::error::PushError;
use studio_booking_api::core::push::{LogPushGateway, PushGateway, PushTask, background_task};
use tokio::sync::mpsc;
use uuid::Uuid;

struct FailingGateway;

#[async_trait]
impl PushGateway for FailingGateway {
    async fn deliver(&self, _user_id: Uuid, _title: &str, _body: &str) -> Result<(), PushError> {
        Err(PushError::Gateway("provider rejected the token".to_owned()))
    }
}

#[tokio::test]
async fn test_dispatcher_acks_successful_delivery() {
    let (sender, receiver) = mpsc::channel(4);
    let worker = tokio::spawn(background_task(receiver, LogPushGateway::default()));

    let (task, ack) = PushTask::new(
        Uuid::new_v4(),
        "New booking request".to_owned(),
        "Studio North requested your slot".to_owned(),
    );
    sender.send(task).await.unwrap();

    assert!(ack.await.unwrap().is_ok());

    drop(sender);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_dispatcher_reports_gateway_failure_on_ack_only() {
    let (sender, receiver) = mpsc::channel(4);
    let worker = tokio::spawn(background_task(receiver, FailingGateway));

    let (task, ack) = PushTask::new(Uuid::new_v4(), "title".to_owned(), "body".to_owned());
    sender.send(task).await.unwrap();

    // Failure is reported on the ack channel and nowhere else; the worker
    // keeps running for the next task.
    assert!(matches!(ack.await.unwrap(), Err(PushError::Gateway(_))));

    let (task, ack) = PushTask::new(Uuid::new_v4(), "title".to_owned(), "body".to_owned());
    sender.send(task).await.unwrap();
    assert!(ack.await.unwrap().is_err());

    drop(sender);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_dispatcher_shuts_down_when_channel_closes() {
    let (sender, receiver) = mpsc::channel::<PushTask>(1);
    let worker = tokio::spawn(background_task(receiver, LogPushGateway::default()));

    drop(sender);
    worker.await.unwrap();
}
