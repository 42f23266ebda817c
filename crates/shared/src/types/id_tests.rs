use super::*;
use chrono::NaiveDate;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_creation() {
    let id = SiteId::new();
    assert!(!id.to_string().is_empty());
}

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = FuelTypeId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_display() {
    let uuid = Uuid::new_v4();
    let id = TransactionId::from_uuid(uuid);
    assert_eq!(format!("{}", id), uuid.to_string());
}

#[test]
fn test_typed_id_from_str() {
    let uuid = Uuid::new_v4();
    let id = AlertRuleId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_from_str_error() {
    assert!(SiteId::from_str("invalid").is_err());
}

#[test]
fn test_forecast_id_is_deterministic() {
    let site = SiteId::new();
    let fuel = FuelTypeId::new();
    let date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();

    assert_eq!(ForecastId::for_key(site, fuel, date), ForecastId::for_key(site, fuel, date));
}

#[test]
fn test_forecast_id_differs_per_date() {
    let site = SiteId::new();
    let fuel = FuelTypeId::new();
    let d1 = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2025, 1, 4).unwrap();

    assert_ne!(ForecastId::for_key(site, fuel, d1), ForecastId::for_key(site, fuel, d2));
}
