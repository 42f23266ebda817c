//! Balance provisioning, refills, usage and operational hours.

use chrono::Utc;
use fuelcast_core::ledger::{
    BalanceSettings, LedgerError, LedgerService, NewHoursEntry, NewTransaction,
    OperationalHoursEntry, RefillInput, StockBalance, StockTransaction, UsageInput,
};
use fuelcast_core::reference::ReferenceError;
use fuelcast_shared::types::{FuelTypeId, SiteId, StockKey};
use tracing::{info, warn};

use super::ForecastEngine;
use crate::error::EngineResult;
use crate::recompute::RecomputeCommand;
use crate::store::{HoursFilter, TransactionFilter};
use crate::views::{BalanceView, TransactionReceipt};

impl ForecastEngine {
    // ========== Balances ==========

    /// Opens the zero balance for a (site, fuel) pair.
    ///
    /// # Errors
    ///
    /// `NotFound`/validation for unknown or inactive references or bad
    /// settings, `Conflict` if the balance is already open.
    pub async fn open_balance(&self, key: StockKey, settings: BalanceSettings) -> EngineResult<BalanceView> {
        let site = self.site(key.site_id).await?;
        site.ensure_active()?;
        let fuel = self.fuel_type(key.fuel_type_id).await?;
        fuel.ensure_active()?;
        let balance = StockBalance::open(key, settings, Utc::now())?;

        let _guard = self
            .balance_locks
            .acquire(key, "open_balance", self.settings.storage_timeout)
            .await?;
        if self.call("get_balance", self.store.get_balance(key)).await?.is_some() {
            return Err(LedgerError::BalanceAlreadyOpen(key).into());
        }
        self.call("insert_balance", self.store.insert_balance(&balance))
            .await?;

        info!(
            site_id = %key.site_id,
            fuel_type_id = %key.fuel_type_id,
            capacity = %settings.maximum_capacity,
            "Stock balance opened"
        );
        Ok(BalanceView::new(balance, &site, &fuel))
    }

    /// Changes capacity and thresholds; current quantity is re-derived from
    /// the ledger total.
    ///
    /// # Errors
    ///
    /// `NotFound` if the balance is not open, validation on bad settings.
    pub async fn update_balance_settings(
        &self,
        key: StockKey,
        settings: BalanceSettings,
    ) -> EngineResult<BalanceView> {
        let site = self.site(key.site_id).await?;
        let fuel = self.fuel_type(key.fuel_type_id).await?;

        let updated = {
            let _guard = self
                .balance_locks
                .acquire(key, "update_balance_settings", self.settings.storage_timeout)
                .await?;
            let current = self.stored_balance(key).await?;
            let updated = current.with_settings(settings, Utc::now())?;
            self.call(
                "update_balance",
                self.store.update_balance(&updated, current.version),
            )
            .await?;
            updated
        };

        self.enqueue(RecomputeCommand::new(key, Utc::now().date_naive()));
        Ok(BalanceView::new(updated, &site, &fuel))
    }

    /// Balances, optionally filtered, ordered by (site name, fuel name).
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn get_balance(
        &self,
        site_id: Option<SiteId>,
        fuel_type_id: Option<FuelTypeId>,
    ) -> EngineResult<Vec<BalanceView>> {
        let names = self.names().await?;
        let mut balances = self.call("list_balances", self.store.list_balances()).await?;
        balances.retain(|b| {
            site_id.is_none_or(|s| s == b.site_id) && fuel_type_id.is_none_or(|f| f == b.fuel_type_id)
        });
        balances.sort_by(|a, b| names.compare(a.key(), b.key()));

        Ok(balances
            .into_iter()
            .filter_map(|balance| {
                let site = names.site(balance.site_id)?;
                let fuel = names.fuel(balance.fuel_type_id)?;
                Some(BalanceView::new(balance, site, fuel))
            })
            .collect())
    }

    /// The balance of one key.
    ///
    /// # Errors
    ///
    /// `NotFound` if the balance is not open.
    pub async fn balance(&self, key: StockKey) -> EngineResult<BalanceView> {
        let balance = self.stored_balance(key).await?;
        let site = self.site(key.site_id).await?;
        let fuel = self.fuel_type(key.fuel_type_id).await?;
        Ok(BalanceView::new(balance, &site, &fuel))
    }

    pub(super) async fn stored_balance(&self, key: StockKey) -> EngineResult<StockBalance> {
        self.call("get_balance", self.store.get_balance(key))
            .await?
            .ok_or_else(|| LedgerError::BalanceNotFound(key).into())
    }

    // ========== Transactions ==========

    /// Records a delivery into storage.
    ///
    /// # Errors
    ///
    /// See [`Self::append`].
    pub async fn record_refill(&self, input: RefillInput) -> EngineResult<TransactionReceipt> {
        self.append(input.into()).await
    }

    /// Records fuel drawn from storage.
    ///
    /// # Errors
    ///
    /// See [`Self::append`].
    pub async fn record_usage(&self, input: UsageInput) -> EngineResult<TransactionReceipt> {
        self.append(input.into()).await
    }

    /// Appends a transaction and applies its delta as one atomic commit.
    ///
    /// A repeated idempotency key for the same (site, fuel) returns the
    /// original transaction with `replayed` set and applies nothing. The
    /// replay lookup runs before validation so a retry still gets its
    /// receipt after the site or fuel has been deactivated.
    ///
    /// # Errors
    ///
    /// Validation or `NotFound` for bad input or a date after today,
    /// `Overdraft` under the reject policy, `Conflict` on a concurrent
    /// version change, `Timeout` when a storage call or the key lock exceeds
    /// its bound.
    pub async fn append(&self, input: NewTransaction) -> EngineResult<TransactionReceipt> {
        let key = input.key();
        if let Some(token) = input.idempotency_key.as_deref()
            && let Some(receipt) = self.replay(key, token).await?
        {
            return Ok(receipt);
        }

        let site = self.call("get_site", self.store.get_site(input.site_id)).await?;
        let fuel = self
            .call("get_fuel_type", self.store.get_fuel_type(input.fuel_type_id))
            .await?;
        let equipment = match input.equipment_id {
            Some(id) => self.call("get_equipment", self.store.get_equipment(id)).await?,
            None => None,
        };
        LedgerService::validate_transaction(&input, site.as_ref(), fuel.as_ref(), equipment.as_ref())?;
        let today = Utc::now().date_naive();
        LedgerService::validate_record_date(input.transaction_date, today)?;

        let receipt = {
            let _guard = self
                .balance_locks
                .acquire(key, "append_transaction", self.settings.storage_timeout)
                .await?;

            // A concurrent first attempt may have committed since the check above.
            if let Some(token) = input.idempotency_key.as_deref()
                && let Some(receipt) = self.replay(key, token).await?
            {
                return Ok(receipt);
            }

            let current = self.stored_balance(key).await?;
            let now = Utc::now();
            let change = current.apply_delta(input.signed_quantity(), self.settings.overdraft_policy, now)?;
            let transaction = input.into_transaction(now, change.warning.clone());
            self.call(
                "commit_transaction",
                self.store
                    .commit_transaction(&transaction, &change.balance, current.version),
            )
            .await?;

            TransactionReceipt {
                transaction,
                balance: change.balance,
                warning: change.warning,
                replayed: false,
            }
        };

        log_commit(&receipt);
        self.enqueue(RecomputeCommand::new(key, today));
        Ok(receipt)
    }

    /// The receipt of an already committed transaction carrying `token`.
    async fn replay(&self, key: StockKey, token: &str) -> EngineResult<Option<TransactionReceipt>> {
        let Some(original) = self
            .call(
                "find_by_idempotency_key",
                self.store.find_by_idempotency_key(key, token),
            )
            .await?
        else {
            return Ok(None);
        };

        let balance = self.stored_balance(key).await?;
        info!(
            transaction_id = %original.id,
            idempotency_key = token,
            "Idempotent replay, nothing applied"
        );
        Ok(Some(TransactionReceipt {
            warning: original.warning.clone(),
            transaction: original,
            balance,
            replayed: true,
        }))
    }

    /// Transactions matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_transactions(&self, filter: TransactionFilter) -> EngineResult<Vec<StockTransaction>> {
        self.call("list_transactions", self.store.list_transactions(filter))
            .await
    }

    // ========== Operational hours ==========

    /// Logs a day of running time and requests a recompute of the
    /// equipment's (site, fuel) key.
    ///
    /// # Errors
    ///
    /// Validation or `NotFound` for bad input or a log date after today.
    pub async fn log_operational_hours(&self, input: NewHoursEntry) -> EngineResult<OperationalHoursEntry> {
        let site = self.call("get_site", self.store.get_site(input.site_id)).await?;
        let equipment = self
            .call("get_equipment", self.store.get_equipment(input.equipment_id))
            .await?;
        LedgerService::validate_hours(&input, site.as_ref(), equipment.as_ref())?;
        let today = Utc::now().date_naive();
        LedgerService::validate_record_date(input.log_date, today)?;
        let Some(equipment) = equipment else {
            return Err(ReferenceError::EquipmentNotFound(input.equipment_id).into());
        };

        let entry = input.into_entry(&equipment, Utc::now());
        self.call("insert_hours", self.store.insert_hours(&entry)).await?;

        info!(
            entry_id = %entry.id,
            equipment_id = %entry.equipment_id,
            log_date = %entry.log_date,
            running_hours = %entry.running_hours,
            "Operational hours logged"
        );
        self.enqueue(RecomputeCommand::new(entry.key(), today));
        Ok(entry)
    }

    /// Hours entries matching `filter`, newest date first.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_operational_hours(&self, filter: HoursFilter) -> EngineResult<Vec<OperationalHoursEntry>> {
        self.call("list_hours", self.store.list_hours(filter)).await
    }
}

fn log_commit(receipt: &TransactionReceipt) {
    let transaction = &receipt.transaction;
    info!(
        transaction_id = %transaction.id,
        reference = %transaction.reference_number,
        kind = transaction.kind.as_str(),
        site_id = %transaction.site_id,
        fuel_type_id = %transaction.fuel_type_id,
        quantity = %transaction.quantity,
        current_quantity = %receipt.balance.current_quantity,
        version = receipt.balance.version,
        "Transaction committed"
    );
    if let Some(warning) = &receipt.warning {
        warn!(
            transaction_id = %transaction.id,
            warning = warning.code(),
            "Transaction committed with warning"
        );
    }
}
