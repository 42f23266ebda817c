//! PostgreSQL implementation of [`StockStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fuelcast_core::alerts::{AlertEvent, AlertRule};
use fuelcast_core::forecast::ConsumptionForecast;
use fuelcast_core::ledger::{OperationalHoursEntry, StockBalance, StockTransaction};
use fuelcast_core::reference::{Equipment, FuelType, Site};
use fuelcast_engine::{HoursFilter, StockStore, StoreError, TransactionFilter};
use fuelcast_shared::types::{AlertEventId, AlertRuleId, EquipmentId, ForecastId, FuelTypeId, SiteId, StockKey};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, Iterable,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{debug, warn};

use crate::entities::{
    alert_events, alert_rules, consumption_forecasts, equipment, fuel_types, operational_hours, sites,
    stock_balances, stock_transactions,
};
use crate::error::{MappingError, store_error};

/// [`StockStore`] backed by a `SeaORM` connection pool.
///
/// Balance writes are guarded by `version`: the update only matches the
/// row when the stored version equals the caller's expected version.
#[derive(Debug, Clone)]
pub struct PgStockStore {
    db: DatabaseConnection,
}

impl PgStockStore {
    /// Creates a store on an existing connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn key_condition(key: StockKey) -> Condition {
    Condition::all()
        .add(stock_balances::Column::SiteId.eq(key.site_id.into_inner()))
        .add(stock_balances::Column::FuelTypeId.eq(key.fuel_type_id.into_inner()))
}

fn convert_all<M, T>(models: Vec<M>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<M, Error = MappingError>,
{
    models
        .into_iter()
        .map(|m| T::try_from(m).map_err(StoreError::from))
        .collect()
}

/// Applies `balance` if the stored version still equals `expected_version`.
async fn guarded_balance_update<C: ConnectionTrait>(
    conn: &C,
    balance: &StockBalance,
    expected_version: i64,
) -> Result<(), StoreError> {
    let key = balance.key();
    let result = stock_balances::Entity::update_many()
        .set(stock_balances::ActiveModel::from(balance))
        .filter(key_condition(key))
        .filter(stock_balances::Column::Version.eq(expected_version))
        .exec(conn)
        .await
        .map_err(store_error)?;

    if result.rows_affected == 1 {
        return Ok(());
    }

    let exists = stock_balances::Entity::find_by_id((key.site_id.into_inner(), key.fuel_type_id.into_inner()))
        .one(conn)
        .await
        .map_err(store_error)?
        .is_some();
    if exists {
        warn!(site_id = %key.site_id, fuel_type_id = %key.fuel_type_id, expected_version, "Stock balance version conflict");
        Err(StoreError::VersionConflict(key))
    } else {
        Err(StoreError::Missing(format!("stock balance {key}")))
    }
}

#[async_trait]
impl StockStore for PgStockStore {
    // ========== Reference data ==========

    async fn insert_site(&self, site: &Site) -> Result<(), StoreError> {
        sites::Entity::insert(sites::ActiveModel::from(site))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update_site(&self, site: &Site) -> Result<(), StoreError> {
        sites::ActiveModel::from(site)
            .update(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn get_site(&self, id: SiteId) -> Result<Option<Site>, StoreError> {
        let model = sites::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(Site::try_from).transpose()?)
    }

    async fn list_sites(&self) -> Result<Vec<Site>, StoreError> {
        let models = sites::Entity::find().all(&self.db).await.map_err(store_error)?;
        convert_all(models)
    }

    async fn insert_fuel_type(&self, fuel: &FuelType) -> Result<(), StoreError> {
        fuel_types::Entity::insert(fuel_types::ActiveModel::from(fuel))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update_fuel_type(&self, fuel: &FuelType) -> Result<(), StoreError> {
        fuel_types::ActiveModel::from(fuel)
            .update(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn get_fuel_type(&self, id: FuelTypeId) -> Result<Option<FuelType>, StoreError> {
        let model = fuel_types::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(FuelType::from))
    }

    async fn list_fuel_types(&self) -> Result<Vec<FuelType>, StoreError> {
        let models = fuel_types::Entity::find().all(&self.db).await.map_err(store_error)?;
        Ok(models.into_iter().map(FuelType::from).collect())
    }

    async fn insert_equipment(&self, item: &Equipment) -> Result<(), StoreError> {
        equipment::Entity::insert(equipment::ActiveModel::from(item))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update_equipment(&self, item: &Equipment) -> Result<(), StoreError> {
        equipment::ActiveModel::from(item)
            .update(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn get_equipment(&self, id: EquipmentId) -> Result<Option<Equipment>, StoreError> {
        let model = equipment::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(Equipment::from))
    }

    async fn list_equipment(&self, site_id: Option<SiteId>) -> Result<Vec<Equipment>, StoreError> {
        let models = equipment::Entity::find()
            .filter(Condition::all().add_option(site_id.map(|s| equipment::Column::SiteId.eq(s.into_inner()))))
            .all(&self.db)
            .await
            .map_err(store_error)?;
        Ok(models.into_iter().map(Equipment::from).collect())
    }

    // ========== Ledger ==========

    async fn insert_balance(&self, balance: &StockBalance) -> Result<(), StoreError> {
        stock_balances::Entity::insert(stock_balances::ActiveModel::from(balance))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn get_balance(&self, key: StockKey) -> Result<Option<StockBalance>, StoreError> {
        let model = stock_balances::Entity::find_by_id((key.site_id.into_inner(), key.fuel_type_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(StockBalance::from))
    }

    async fn list_balances(&self) -> Result<Vec<StockBalance>, StoreError> {
        let models = stock_balances::Entity::find().all(&self.db).await.map_err(store_error)?;
        Ok(models.into_iter().map(StockBalance::from).collect())
    }

    async fn update_balance(&self, balance: &StockBalance, expected_version: i64) -> Result<(), StoreError> {
        guarded_balance_update(&self.db, balance, expected_version).await
    }

    async fn find_by_idempotency_key(
        &self,
        key: StockKey,
        idempotency_key: &str,
    ) -> Result<Option<StockTransaction>, StoreError> {
        let model = stock_transactions::Entity::find()
            .filter(stock_transactions::Column::SiteId.eq(key.site_id.into_inner()))
            .filter(stock_transactions::Column::FuelTypeId.eq(key.fuel_type_id.into_inner()))
            .filter(stock_transactions::Column::IdempotencyKey.eq(idempotency_key))
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(StockTransaction::try_from).transpose()?)
    }

    async fn commit_transaction(
        &self,
        transaction: &StockTransaction,
        balance: &StockBalance,
        expected_version: i64,
    ) -> Result<(), StoreError> {
        let key = transaction.key();
        let row = stock_transactions::ActiveModel::try_from(transaction)?;
        let txn = self.db.begin().await.map_err(store_error)?;

        if let Some(token) = &transaction.idempotency_key {
            let taken = stock_transactions::Entity::find()
                .filter(stock_transactions::Column::SiteId.eq(key.site_id.into_inner()))
                .filter(stock_transactions::Column::FuelTypeId.eq(key.fuel_type_id.into_inner()))
                .filter(stock_transactions::Column::IdempotencyKey.eq(token.as_str()))
                .one(&txn)
                .await
                .map_err(store_error)?;
            if taken.is_some() {
                return Err(StoreError::Duplicate(format!("idempotency key {token}")));
            }
        }

        // Dropping `txn` on any early return rolls back.
        guarded_balance_update(&txn, balance, expected_version).await?;
        stock_transactions::Entity::insert(row)
            .exec(&txn)
            .await
            .map_err(store_error)?;
        txn.commit().await.map_err(store_error)?;

        debug!(
            transaction_id = %transaction.id,
            site_id = %key.site_id,
            fuel_type_id = %key.fuel_type_id,
            version = balance.version,
            "Transaction committed"
        );
        Ok(())
    }

    async fn list_transactions(&self, filter: TransactionFilter) -> Result<Vec<StockTransaction>, StoreError> {
        use stock_transactions::Column;

        let condition = Condition::all()
            .add_option(filter.site_id.map(|s| Column::SiteId.eq(s.into_inner())))
            .add_option(filter.fuel_type_id.map(|f| Column::FuelTypeId.eq(f.into_inner())))
            .add_option(filter.kind.map(|k| Column::Kind.eq(k.as_str())))
            .add_option(filter.equipment_id.map(|e| Column::EquipmentId.eq(e.into_inner())))
            .add_option(filter.from.map(|d| Column::TransactionDate.gte(d)))
            .add_option(filter.to.map(|d| Column::TransactionDate.lte(d)));

        let models = stock_transactions::Entity::find()
            .filter(condition)
            .order_by_desc(Column::TransactionDate)
            .order_by_desc(Column::RecordedAt)
            .all(&self.db)
            .await
            .map_err(store_error)?;
        convert_all(models)
    }

    async fn insert_hours(&self, entry: &OperationalHoursEntry) -> Result<(), StoreError> {
        operational_hours::Entity::insert(operational_hours::ActiveModel::from(entry))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn list_hours(&self, filter: HoursFilter) -> Result<Vec<OperationalHoursEntry>, StoreError> {
        use operational_hours::Column;

        let condition = Condition::all()
            .add_option(filter.site_id.map(|s| Column::SiteId.eq(s.into_inner())))
            .add_option(filter.fuel_type_id.map(|f| Column::FuelTypeId.eq(f.into_inner())))
            .add_option(filter.equipment_id.map(|e| Column::EquipmentId.eq(e.into_inner())))
            .add_option(filter.from.map(|d| Column::LogDate.gte(d)))
            .add_option(filter.to.map(|d| Column::LogDate.lte(d)));

        let models = operational_hours::Entity::find()
            .filter(condition)
            .order_by_desc(Column::LogDate)
            .order_by_desc(Column::RecordedAt)
            .all(&self.db)
            .await
            .map_err(store_error)?;
        Ok(models.into_iter().map(OperationalHoursEntry::from).collect())
    }

    // ========== Forecasts ==========

    async fn upsert_forecast(&self, forecast: &ConsumptionForecast) -> Result<(), StoreError> {
        use consumption_forecasts::Column;

        let on_conflict = OnConflict::column(Column::Id)
            .update_columns(Column::iter().filter(|c| !matches!(c, Column::Id)))
            .to_owned();
        consumption_forecasts::Entity::insert(consumption_forecasts::ActiveModel::from(forecast))
            .on_conflict(on_conflict)
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn get_forecast(&self, id: ForecastId) -> Result<Option<ConsumptionForecast>, StoreError> {
        let model = consumption_forecasts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(ConsumptionForecast::try_from).transpose()?)
    }

    async fn forecast_history(&self, key: StockKey) -> Result<Vec<ConsumptionForecast>, StoreError> {
        use consumption_forecasts::Column;

        let models = consumption_forecasts::Entity::find()
            .filter(Column::SiteId.eq(key.site_id.into_inner()))
            .filter(Column::FuelTypeId.eq(key.fuel_type_id.into_inner()))
            .order_by_desc(Column::AsofDate)
            .all(&self.db)
            .await
            .map_err(store_error)?;
        convert_all(models)
    }

    // ========== Alerts ==========

    async fn insert_alert_rule(&self, rule: &AlertRule) -> Result<(), StoreError> {
        alert_rules::Entity::insert(alert_rules::ActiveModel::from(rule))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update_alert_rule(&self, rule: &AlertRule) -> Result<(), StoreError> {
        alert_rules::ActiveModel::from(rule)
            .update(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn get_alert_rule(&self, id: AlertRuleId) -> Result<Option<AlertRule>, StoreError> {
        let model = alert_rules::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(AlertRule::try_from).transpose()?)
    }

    async fn list_alert_rules(&self) -> Result<Vec<AlertRule>, StoreError> {
        let models = alert_rules::Entity::find()
            .order_by_asc(alert_rules::Column::CreatedAt)
            .order_by_asc(alert_rules::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?;
        convert_all(models)
    }

    async fn insert_alert_events(&self, events: &[AlertEvent]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }
        alert_events::Entity::insert_many(events.iter().map(alert_events::ActiveModel::from))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update_alert_event(&self, event: &AlertEvent) -> Result<(), StoreError> {
        alert_events::ActiveModel::from(event)
            .update(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn get_alert_event(&self, id: AlertEventId) -> Result<Option<AlertEvent>, StoreError> {
        let model = alert_events::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(AlertEvent::try_from).transpose()?)
    }

    async fn list_alert_events(&self, since: DateTime<Utc>) -> Result<Vec<AlertEvent>, StoreError> {
        // Event ids are time-ordered, so the id breaks ties within one evaluation.
        let models = alert_events::Entity::find()
            .filter(alert_events::Column::TriggeredAt.gte(since))
            .order_by_desc(alert_events::Column::TriggeredAt)
            .order_by_desc(alert_events::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?;
        convert_all(models)
    }
}
