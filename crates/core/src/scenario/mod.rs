//! What-if scenarios over an existing forecast.
//!
//! A scenario substitutes an adjusted rate and/or safety factor and
//! re-projects from the baseline's available quantity and as-of date.
//! Scenarios are never persisted and never touch the baseline.

pub mod cache;
pub mod engine;
pub mod error;
pub mod types;

pub use cache::ScenarioCache;
pub use engine::ScenarioEngine;
pub use error::ScenarioError;
pub use types::{ForecastScenario, ScenarioInput};
