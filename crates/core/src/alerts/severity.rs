//! Severity step function.

use fuelcast_shared::config::SeverityBands;
use rust_decimal::Decimal;

use super::types::Severity;

/// Maps a breaching metric to a severity. Lower metric, higher severity.
///
/// Below `critical` is Critical, below `high` is High, below `medium` is
/// Medium, anything else is Low.
#[must_use]
pub fn classify(metric: Decimal, bands: &SeverityBands) -> Severity {
    if metric < bands.critical {
        Severity::Critical
    } else if metric < bands.high {
        Severity::High
    } else if metric < bands.medium {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(6.67), Severity::Critical)]
    #[case(dec!(0), Severity::Critical)]
    #[case(dec!(7), Severity::High)]
    #[case(dec!(13.99), Severity::High)]
    #[case(dec!(14), Severity::Medium)]
    #[case(dec!(30), Severity::Low)]
    #[case(dec!(58.33), Severity::Low)]
    fn test_days_bands(#[case] days: Decimal, #[case] expected: Severity) {
        assert_eq!(classify(days, &SeverityBands::days()), expected);
    }

    #[rstest]
    #[case(dec!(16), Severity::Critical)]
    #[case(dec!(22.5), Severity::High)]
    #[case(dec!(35), Severity::Medium)]
    #[case(dec!(45), Severity::Low)]
    fn test_fill_bands(#[case] fill: Decimal, #[case] expected: Severity) {
        assert_eq!(classify(fill, &SeverityBands::fill()), expected);
    }
}
