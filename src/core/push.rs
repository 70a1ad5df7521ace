//! Best-effort push notification dispatch.
//!
//! The orchestrator hands tasks to a background task through a bounded
//! channel and never waits on the outcome; a detached task logs the delivery
//! ack. Push failures are logged and never affect the booking result.

use crate::PUSH_SENDER;
use crate::core::error::PushError;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Upper bound on a single delivery attempt. There are no retries.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct PushTask {
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    ack: oneshot::Sender<Result<(), PushError>>,
}

impl PushTask {
    pub fn new(
        user_id: Uuid,
        title: String,
        body: String,
    ) -> (PushTask, oneshot::Receiver<Result<(), PushError>>) {
        let (sender, receiver) = oneshot::channel();

        (
            PushTask {
                user_id,
                title,
                body,
                ack: sender,
            },
            receiver,
        )
    }
}

/// Delivery channel to the external push provider.
#[async_trait]
pub trait PushGateway: Send + Sync + 'static {
    async fn deliver(&self, user_id: Uuid, title: &str, body: &str) -> Result<(), PushError>;
}

/// Gateway used when no external provider is wired up: logs the dispatch and
/// reports success.
#[derive(Default)]
pub struct LogPushGateway;

#[async_trait]
impl PushGateway for LogPushGateway {
    async fn deliver(&self, user_id: Uuid, title: &str, body: &str) -> Result<(), PushError> {
        info!("push to {user_id}: {title} - {body}");
        Ok(())
    }
}

/// Consumes push tasks until the channel closes. Each delivery runs under a
/// bounded timeout; the outcome is reported back on the task's ack channel.
pub async fn background_task<G: PushGateway>(mut receiver: mpsc::Receiver<PushTask>, gateway: G) {
    while let Some(task) = receiver.recv().await {
        let outcome = match tokio::time::timeout(
            DELIVERY_TIMEOUT,
            gateway.deliver(task.user_id, &task.title, &task.body),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PushError::Timeout),
        };

        if let Err(error) = &outcome {
            warn!("push delivery to {} failed: {error}", task.user_id);
        }

        // Ack receiver may already be gone; that is fine.
        let _ = task.ack.send(outcome);
    }

    info!("push dispatcher shutting down");
}

/// Fire-and-forget dispatch used by the booking orchestrator. Never blocks
/// and never fails the caller: a missing dispatcher, a full queue, or a
/// failed delivery are all logged and swallowed.
pub fn dispatch(user_id: Uuid, title: String, body: String) {
    let Some(sender) = PUSH_SENDER.get() else {
        warn!("push dispatcher not running, dropping push for {user_id}");
        return;
    };

    let (task, ack) = PushTask::new(user_id, title, body);

    if let Err(error) = sender.try_send(task) {
        warn!("push queue rejected notification for {user_id}: {error}");
        return;
    }

    tokio::spawn(async move {
        match ack.await {
            Ok(Ok(())) => debug!("push delivered to {user_id}"),
            Ok(Err(error)) => warn!("push delivery to {user_id} failed: {error}"),
            Err(_) => warn!("push dispatcher dropped the ack for {user_id}"),
        }
    });
}
