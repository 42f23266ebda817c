//! Business rule validation for ledger writes.
//!
//! The engine resolves the referenced entities and hands them in; `None`
//! means the lookup found nothing.

use chrono::{Days, NaiveDate};
use fuelcast_shared::types::MAX_RECORD_QUANTITY;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::hours::NewHoursEntry;
use super::types::{NewTransaction, TransactionKind};
use crate::reference::{Equipment, FuelType, ReferenceError, Site};

/// Days past the UTC date a record may carry, for clocks east of UTC.
const FUTURE_DATE_TOLERANCE: Days = Days::new(1);

/// Hours in a day; the upper bound for a single log entry.
const HOURS_PER_DAY: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

/// Ledger service for validating writes before they are committed.
///
/// This service contains pure business logic with no storage dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validates a transaction against its resolved references.
    ///
    /// Checks, in order: quantity, unit cost, idempotency key, site, fuel
    /// and (for usage) equipment. Quantity and unit cost are capped at
    /// [`MAX_RECORD_QUANTITY`].
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` describing the first rule violated.
    pub fn validate_transaction(
        input: &NewTransaction,
        site: Option<&Site>,
        fuel: Option<&FuelType>,
        equipment: Option<&Equipment>,
    ) -> Result<(), LedgerError> {
        if input.quantity <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveQuantity(input.quantity));
        }
        if input.quantity > MAX_RECORD_QUANTITY {
            return Err(LedgerError::QuantityTooLarge(input.quantity));
        }
        if let Some(cost) = input.details.unit_cost {
            if cost.is_sign_negative() {
                return Err(LedgerError::NegativeUnitCost);
            }
            if cost > MAX_RECORD_QUANTITY {
                return Err(LedgerError::UnitCostTooLarge(cost));
            }
        }
        if input
            .idempotency_key
            .as_deref()
            .is_some_and(|k| k.trim().is_empty())
        {
            return Err(LedgerError::BlankIdempotencyKey);
        }

        site.ok_or(ReferenceError::SiteNotFound(input.site_id))?
            .ensure_active()?;
        fuel.ok_or(ReferenceError::FuelTypeNotFound(input.fuel_type_id))?
            .ensure_active()?;

        if let Some(equipment_id) = input.equipment_id {
            let equipment = equipment.ok_or(ReferenceError::EquipmentNotFound(equipment_id))?;
            equipment.ensure_usable_at(input.site_id)?;
            if input.kind == TransactionKind::Usage && equipment.fuel_type_id != input.fuel_type_id {
                return Err(LedgerError::EquipmentFuelMismatch {
                    equipment_id,
                    fuel_type_id: input.fuel_type_id,
                });
            }
        }

        Ok(())
    }

    /// Rejects transaction and log dates later than tomorrow relative to `today`.
    ///
    /// # Errors
    ///
    /// Returns `FutureDate` for a date past the tolerance.
    pub fn validate_record_date(date: NaiveDate, today: NaiveDate) -> Result<(), LedgerError> {
        let horizon = today.checked_add_days(FUTURE_DATE_TOLERANCE).unwrap_or(today);
        if date > horizon {
            return Err(LedgerError::FutureDate { date, today });
        }
        Ok(())
    }

    /// Validates an operational hours entry against its resolved references.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` describing the first rule violated.
    pub fn validate_hours(
        input: &NewHoursEntry,
        site: Option<&Site>,
        equipment: Option<&Equipment>,
    ) -> Result<(), LedgerError> {
        if input.running_hours.is_sign_negative() || input.running_hours > HOURS_PER_DAY {
            return Err(LedgerError::InvalidRunningHours(input.running_hours));
        }
        if let Some(consumed) = input.fuel_consumed {
            if consumed.is_sign_negative() {
                return Err(LedgerError::NegativeFuelConsumed);
            }
            if consumed > MAX_RECORD_QUANTITY {
                return Err(LedgerError::QuantityTooLarge(consumed));
            }
        }

        site.ok_or(ReferenceError::SiteNotFound(input.site_id))?
            .ensure_active()?;
        equipment
            .ok_or(ReferenceError::EquipmentNotFound(input.equipment_id))?
            .ensure_usable_at(input.site_id)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{RefillInput, UsageInput};
    use crate::reference::{NewEquipment, NewFuelType, NewSite};
    use chrono::Utc;
    use fuelcast_shared::types::{FuelTypeId, SiteId};
    use rust_decimal_macros::dec;

    struct Fixture {
        site: Site,
        fuel: FuelType,
        equipment: Equipment,
    }

    fn fixture() -> Fixture {
        let now = Utc::now();
        let site = NewSite {
            name: "Main Warehouse".to_string(),
            code: "MW".to_string(),
            site_type: "warehouse".to_string(),
            storage_capacity: dec!(500000),
            ..Default::default()
        }
        .into_site(now)
        .unwrap();
        let fuel = NewFuelType {
            name: "Diesel".to_string(),
            code: "DSL".to_string(),
            ..Default::default()
        }
        .into_fuel_type(now)
        .unwrap();
        let equipment = NewEquipment {
            site_id: site.id,
            fuel_type_id: fuel.id,
            name: "Generator".to_string(),
            code: "GEN".to_string(),
            nominal_consumption_rate: dec!(25),
            equipment_type: None,
            manufacturer: None,
            model: None,
        }
        .into_equipment(now)
        .unwrap();
        Fixture { site, fuel, equipment }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
    }

    fn refill(f: &Fixture, quantity: Decimal) -> NewTransaction {
        RefillInput {
            site_id: f.site.id,
            fuel_type_id: f.fuel.id,
            supplier: None,
            quantity,
            unit_cost: None,
            date: date(),
            actor: None,
            idempotency_key: None,
        }
        .into()
    }

    fn usage(f: &Fixture, fuel_type_id: FuelTypeId) -> NewTransaction {
        UsageInput {
            site_id: f.site.id,
            fuel_type_id,
            equipment_id: Some(f.equipment.id),
            department: None,
            quantity: dec!(100),
            date: date(),
            purpose: None,
            actor: None,
            idempotency_key: None,
        }
        .into()
    }

    #[test]
    fn test_valid_refill() {
        let f = fixture();
        assert!(LedgerService::validate_transaction(&refill(&f, dec!(1000)), Some(&f.site), Some(&f.fuel), None).is_ok());
    }

    #[test]
    fn test_zero_and_negative_quantity_rejected() {
        let f = fixture();
        for quantity in [dec!(0), dec!(-5)] {
            assert!(matches!(
                LedgerService::validate_transaction(&refill(&f, quantity), Some(&f.site), Some(&f.fuel), None),
                Err(LedgerError::NonPositiveQuantity(_))
            ));
        }
    }

    #[test]
    fn test_oversized_values_rejected() {
        let f = fixture();
        let huge = MAX_RECORD_QUANTITY + dec!(1);
        assert!(matches!(
            LedgerService::validate_transaction(&refill(&f, huge), Some(&f.site), Some(&f.fuel), None),
            Err(LedgerError::QuantityTooLarge(q)) if q == huge
        ));
        assert!(LedgerService::validate_transaction(&refill(&f, MAX_RECORD_QUANTITY), Some(&f.site), Some(&f.fuel), None).is_ok());

        let mut priced = refill(&f, dec!(1000));
        priced.details.unit_cost = Some(huge);
        assert!(matches!(
            LedgerService::validate_transaction(&priced, Some(&f.site), Some(&f.fuel), None),
            Err(LedgerError::UnitCostTooLarge(_))
        ));
    }

    #[test]
    fn test_unknown_site_is_not_found() {
        let f = fixture();
        let err = LedgerService::validate_transaction(&refill(&f, dec!(10)), None, Some(&f.fuel), None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_inactive_fuel_rejected() {
        let mut f = fixture();
        f.fuel.is_active = false;
        assert!(matches!(
            LedgerService::validate_transaction(&refill(&f, dec!(10)), Some(&f.site), Some(&f.fuel), None),
            Err(LedgerError::Reference(ReferenceError::FuelTypeInactive(_)))
        ));
    }

    #[test]
    fn test_blank_idempotency_key_rejected() {
        let f = fixture();
        let mut input = refill(&f, dec!(10));
        input.idempotency_key = Some("  ".to_string());
        assert!(matches!(
            LedgerService::validate_transaction(&input, Some(&f.site), Some(&f.fuel), None),
            Err(LedgerError::BlankIdempotencyKey)
        ));
    }

    #[test]
    fn test_usage_equipment_checks() {
        let f = fixture();
        let ok = usage(&f, f.fuel.id);
        assert!(LedgerService::validate_transaction(&ok, Some(&f.site), Some(&f.fuel), Some(&f.equipment)).is_ok());

        assert!(matches!(
            LedgerService::validate_transaction(&ok, Some(&f.site), Some(&f.fuel), None),
            Err(LedgerError::Reference(ReferenceError::EquipmentNotFound(_)))
        ));

        let mut other_fuel = f.fuel.clone();
        other_fuel.id = FuelTypeId::new();
        let mismatch = usage(&f, other_fuel.id);
        assert!(matches!(
            LedgerService::validate_transaction(&mismatch, Some(&f.site), Some(&other_fuel), Some(&f.equipment)),
            Err(LedgerError::EquipmentFuelMismatch { .. })
        ));
    }

    #[test]
    fn test_record_date_horizon() {
        let today = date();
        assert!(LedgerService::validate_record_date(today - Days::new(400), today).is_ok());
        assert!(LedgerService::validate_record_date(today, today).is_ok());
        assert!(LedgerService::validate_record_date(today + Days::new(1), today).is_ok());
        assert!(matches!(
            LedgerService::validate_record_date(today + Days::new(2), today),
            Err(LedgerError::FutureDate { .. })
        ));
        assert!(matches!(
            LedgerService::validate_record_date(today + Days::new(3650), today),
            Err(LedgerError::FutureDate { .. })
        ));
    }

    #[test]
    fn test_hours_validation() {
        let f = fixture();
        let mut input = NewHoursEntry {
            site_id: f.site.id,
            equipment_id: f.equipment.id,
            log_date: date(),
            running_hours: dec!(8),
            fuel_consumed: Some(dec!(200)),
            recorded_by: None,
            notes: None,
        };
        assert!(LedgerService::validate_hours(&input, Some(&f.site), Some(&f.equipment)).is_ok());

        input.running_hours = dec!(25);
        assert!(matches!(
            LedgerService::validate_hours(&input, Some(&f.site), Some(&f.equipment)),
            Err(LedgerError::InvalidRunningHours(_))
        ));

        input.running_hours = dec!(8);
        input.fuel_consumed = Some(dec!(1000000000000000));
        assert!(matches!(
            LedgerService::validate_hours(&input, Some(&f.site), Some(&f.equipment)),
            Err(LedgerError::QuantityTooLarge(_))
        ));

        input.fuel_consumed = Some(dec!(200));
        input.site_id = SiteId::new();
        assert!(matches!(
            LedgerService::validate_hours(&input, Some(&f.site), Some(&f.equipment)),
            Err(LedgerError::Reference(ReferenceError::EquipmentSiteMismatch { .. }))
        ));
    }
}
