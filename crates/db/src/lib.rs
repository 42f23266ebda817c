//! PostgreSQL storage for the Fuelcast engine.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - [`PgStockStore`], the `StockStore` implementation used in production
//! - Connection setup from [`DatabaseConfig`]
//!
//! Schema management lives outside this workspace; tests derive tables
//! from the entities.

pub mod entities;
pub mod error;
mod mapping;
pub mod store;

pub use error::MappingError;
pub use store::PgStockStore;

use fuelcast_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
