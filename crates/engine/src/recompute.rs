//! Scoped forecast recomputation.
//!
//! Writes never recalculate inline. A successful refill, usage or hours log
//! sends a [`RecomputeCommand`] for its own (site, fuel) key; the
//! [`RecomputeWorker`] collects commands for a short window, coalesces them
//! per key, recalculates those keys only and then evaluates alerts for them.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use fuelcast_core::alerts::AlertTrigger;
use fuelcast_shared::types::StockKey;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::ForecastEngine;

/// Request to recalculate one key as of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeCommand {
    /// Position to recalculate.
    pub key: StockKey,
    /// As-of date for the forecast.
    pub asof: NaiveDate,
}

impl RecomputeCommand {
    /// Creates a command.
    #[must_use]
    pub const fn new(key: StockKey, asof: NaiveDate) -> Self {
        Self { key, asof }
    }
}

/// Sending half of the bounded recompute channel.
#[derive(Debug, Clone)]
pub struct RecomputeQueue {
    sender: mpsc::Sender<RecomputeCommand>,
}

impl RecomputeQueue {
    /// Creates a queue and the receiver to hand to a [`RecomputeWorker`].
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<RecomputeCommand>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueues without waiting.
    ///
    /// # Errors
    ///
    /// Returns the command back when the channel is full or the worker is gone.
    pub fn send(&self, command: RecomputeCommand) -> Result<(), TrySendError<RecomputeCommand>> {
        self.sender.try_send(command)
    }
}

/// Consumes recompute commands for one engine.
pub struct RecomputeWorker {
    engine: Arc<ForecastEngine>,
    receiver: mpsc::Receiver<RecomputeCommand>,
    debounce: Duration,
}

impl RecomputeWorker {
    /// Creates a worker that coalesces commands arriving within `debounce`.
    #[must_use]
    pub fn new(
        engine: Arc<ForecastEngine>,
        receiver: mpsc::Receiver<RecomputeCommand>,
        debounce: Duration,
    ) -> Self {
        Self {
            engine,
            receiver,
            debounce,
        }
    }

    /// Runs until `cancel` fires or every queue handle is dropped.
    ///
    /// The window opens with the first pending command and does not extend,
    /// so a steady stream of writes still gets processed.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(debounce_ms = self.debounce.as_millis(), "Recompute worker started");
        let mut pending: BTreeMap<StockKey, NaiveDate> = BTreeMap::new();
        let mut deadline = Instant::now();

        loop {
            if pending.is_empty() {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    command = self.receiver.recv() => match command {
                        Some(command) => {
                            coalesce(&mut pending, command);
                            deadline = Instant::now() + self.debounce;
                        }
                        None => break,
                    },
                }
            } else {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    command = self.receiver.recv() => match command {
                        Some(command) => coalesce(&mut pending, command),
                        None => {
                            self.process(std::mem::take(&mut pending)).await;
                            break;
                        }
                    },
                    () = tokio::time::sleep_until(deadline) => {
                        self.process(std::mem::take(&mut pending)).await;
                    }
                }
            }
        }

        if !pending.is_empty() {
            debug!(dropped = pending.len(), "Pending recomputes left for the next batch");
        }
        info!("Recompute worker stopped");
    }

    /// Processes whatever is queued right now, without waiting.
    ///
    /// Returns the number of distinct keys recalculated.
    pub async fn process_pending(&mut self) -> usize {
        let mut pending = BTreeMap::new();
        while let Ok(command) = self.receiver.try_recv() {
            coalesce(&mut pending, command);
        }
        let count = pending.len();
        self.process(pending).await;
        count
    }

    async fn process(&self, batch: BTreeMap<StockKey, NaiveDate>) {
        if batch.is_empty() {
            return;
        }
        let keys: Vec<StockKey> = batch.keys().copied().collect();

        for (key, asof) in batch {
            if let Err(err) = self.engine.calculate(key, asof, None).await {
                warn!(
                    site_id = %key.site_id,
                    fuel_type_id = %key.fuel_type_id,
                    code = err.error_code(),
                    error = %err,
                    "Scoped recompute failed"
                );
            }
        }

        if let Err(err) = self
            .engine
            .evaluate_keys(AlertTrigger::OnTransaction, Some(&keys))
            .await
        {
            warn!(error = %err, "Alert evaluation after recompute failed");
        }
        debug!(keys = keys.len(), "Recompute batch processed");
    }
}

/// Keeps one command per key, at the latest as-of date.
fn coalesce(pending: &mut BTreeMap<StockKey, NaiveDate>, command: RecomputeCommand) {
    pending
        .entry(command.key)
        .and_modify(|asof| *asof = (*asof).max(command.asof))
        .or_insert(command.asof);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelcast_shared::types::{FuelTypeId, SiteId};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn test_coalesce_keeps_latest_date_per_key() {
        let a = StockKey::new(SiteId::new(), FuelTypeId::new());
        let b = StockKey::new(SiteId::new(), FuelTypeId::new());
        let mut pending = BTreeMap::new();

        coalesce(&mut pending, RecomputeCommand::new(a, date(5)));
        coalesce(&mut pending, RecomputeCommand::new(a, date(3)));
        coalesce(&mut pending, RecomputeCommand::new(b, date(1)));
        coalesce(&mut pending, RecomputeCommand::new(a, date(7)));

        assert_eq!(pending.len(), 2);
        assert_eq!(pending[&a], date(7));
        assert_eq!(pending[&b], date(1));
    }

    #[test]
    fn test_full_queue_returns_command() {
        let (queue, _receiver) = RecomputeQueue::channel(1);
        let command = RecomputeCommand::new(StockKey::new(SiteId::new(), FuelTypeId::new()), date(1));

        queue.send(command).unwrap();
        assert!(matches!(queue.send(command), Err(TrySendError::Full(c)) if c == command));
    }
}
