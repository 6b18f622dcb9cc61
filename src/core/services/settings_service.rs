use crate::errors::LedgerError;
use crate::ledger::{Currency, LedgerSnapshot, MAX_MONTHLY_CAP};

use super::ServiceResult;

pub struct SettingsService;

impl SettingsService {
    pub fn set_base_currency(snapshot: &mut LedgerSnapshot, currency: Currency) {
        snapshot.settings.base_currency = currency;
    }

    /// Sets the monthly cap, clamped to the maximum. Returns the stored value.
    pub fn set_monthly_cap(snapshot: &mut LedgerSnapshot, cap: f64) -> ServiceResult<f64> {
        if !cap.is_finite() || cap <= 0.0 {
            return Err(LedgerError::InvalidInput(format!(
                "monthly cap must be a positive number (got {cap})"
            )));
        }
        let cap = cap.min(MAX_MONTHLY_CAP);
        snapshot.settings.monthly_cap = cap;
        Ok(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_is_clamped_and_validated() {
        let mut snapshot = LedgerSnapshot::default();
        assert_eq!(
            SettingsService::set_monthly_cap(&mut snapshot, 5_000_000.0).unwrap(),
            MAX_MONTHLY_CAP
        );
        assert!(SettingsService::set_monthly_cap(&mut snapshot, 0.0).is_err());
        assert!(SettingsService::set_monthly_cap(&mut snapshot, f64::NAN).is_err());
        assert_eq!(snapshot.settings.monthly_cap, MAX_MONTHLY_CAP);
    }

    #[test]
    fn currency_change_is_applied() {
        let mut snapshot = LedgerSnapshot::default();
        SettingsService::set_base_currency(&mut snapshot, Currency::RWF);
        assert_eq!(snapshot.settings.base_currency, Currency::RWF);
    }
}
