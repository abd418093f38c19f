use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Domain events published after successful writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Category events
    CategoryCreated(Uuid),
    CategoryUpdated(Uuid),
    CategoryDeleted(Uuid),

    // Product events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),

    // Stock events
    StockMovementRecorded {
        movement_id: Uuid,
        product_id: Uuid,
        variant_id: Option<Uuid>,
        quantity_delta: i32,
    },
}

/// Cloneable handle for publishing events onto the processing channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, failing if the channel is closed or full.
    pub async fn send(&self, event: Event) -> Result<(), ServiceError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))
    }

    /// Sends an event, logging instead of failing the caller. Event delivery
    /// is best-effort and must never break a completed write.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            warn!("event delivery failed: {}", err);
        }
    }
}

/// Background consumer for the event channel. Currently events are only
/// logged; the channel boundary keeps publishers decoupled from whatever
/// sink is attached later.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(event = ?event, "domain event");
    }
    info!("event channel closed, processor shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let id = Uuid::new_v4();
        sender.send(Event::ProductCreated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::ProductCreated(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_on_closed_channel_is_an_event_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let err = sender.send(Event::CategoryDeleted(Uuid::new_v4())).await;
        assert!(matches!(err, Err(ServiceError::EventError(_))));
    }

    #[tokio::test]
    async fn send_or_log_never_fails_the_caller() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or propagate.
        sender.send_or_log(Event::ProductDeleted(Uuid::new_v4())).await;
    }
}
