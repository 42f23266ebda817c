//! Delivery of fired alert events.

use async_trait::async_trait;
use fuelcast_core::alerts::AlertEvent;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::info;

/// Failure reported by an [`AlertPublisher`].
#[derive(Debug, Error)]
#[error("Alert delivery failed: {0}")]
pub struct PublishError(pub String);

/// Notification channel for alert events.
///
/// Delivery guarantees belong to the implementation. The engine logs a
/// failed publish and keeps the stored event.
#[async_trait]
pub trait AlertPublisher: Send + Sync {
    /// Delivers one event.
    async fn publish(&self, event: &AlertEvent) -> Result<(), PublishError>;
}

/// Writes every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

#[async_trait]
impl AlertPublisher for TracingPublisher {
    async fn publish(&self, event: &AlertEvent) -> Result<(), PublishError> {
        info!(
            event_id = %event.id,
            rule_id = %event.rule_id,
            site_id = %event.site_id,
            fuel_type_id = %event.fuel_type_id,
            severity = event.severity.as_str(),
            "{}",
            event.message
        );
        Ok(())
    }
}

/// Fans events out to in-process subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<AlertEvent>,
}

impl BroadcastPublisher {
    /// Creates a publisher whose subscribers may lag by up to `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl AlertPublisher for BroadcastPublisher {
    async fn publish(&self, event: &AlertEvent) -> Result<(), PublishError> {
        // No subscribers is not a failure.
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}
