use chrono::NaiveDate;

use crate::core::stats::{self, Stats};
use crate::ledger::LedgerSnapshot;

pub struct SummaryService;

impl SummaryService {
    pub fn stats(snapshot: &LedgerSnapshot, today: NaiveDate) -> Stats {
        stats::summarize(&snapshot.records, &snapshot.settings, today)
    }

    /// Whole-ledger total in the base currency, e.g. `USD 12.50`.
    pub fn formatted_total(snapshot: &LedgerSnapshot, today: NaiveDate) -> String {
        snapshot
            .settings
            .format_money(Self::stats(snapshot, today).total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionRecord;
    use chrono::Utc;

    #[test]
    fn totals_use_base_currency() {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.records.push(TransactionRecord::new(
            "Tea",
            2.5,
            "Food",
            "2024-01-01",
            Utc::now(),
        ));
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(SummaryService::formatted_total(&snapshot, today), "USD 2.50");
        assert_eq!(SummaryService::stats(&snapshot, today).recent_count, 1);
    }
}
