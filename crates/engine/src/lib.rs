//! Async orchestration for the Fuelcast stock ledger and forecasting engine.
//!
//! This crate wires the pure domain logic of `fuelcast-core` to a durable
//! store and provides:
//! - [`ForecastEngine`], the operation surface used by outer layers
//! - [`StockStore`], the storage collaborator, and [`MemoryStore`]
//! - Per-(site, fuel) serialization with bounded waits
//! - The scoped [`RecomputeWorker`] and the periodic [`Scheduler`]
//! - [`AlertPublisher`] implementations for alert delivery

pub mod engine;
pub mod error;
pub mod locks;
pub mod publisher;
pub mod recompute;
pub mod scheduler;
pub mod settings;
pub mod store;
pub mod views;

pub use engine::ForecastEngine;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use publisher::{AlertPublisher, BroadcastPublisher, PublishError, TracingPublisher};
pub use recompute::{RecomputeCommand, RecomputeQueue, RecomputeWorker};
pub use scheduler::Scheduler;
pub use settings::EngineSettings;
pub use store::{HoursFilter, MemoryStore, StockStore, StoreError, TransactionFilter};
pub use views::{BalanceView, BatchSummary, FailedKey, TransactionReceipt};
