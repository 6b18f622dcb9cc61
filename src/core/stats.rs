use chrono::NaiveDate;
use serde::Serialize;

use crate::ledger::{Settings, TransactionRecord};

/// Length of the "recent" window, in days before the evaluation date.
pub const RECENT_WINDOW_DAYS: i64 = 7;

pub const NO_CATEGORY: &str = "N/A";

/// Aggregate figures over the whole ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: f64,
    pub count: usize,
    pub recent_count: usize,
    pub recent_total: f64,
    pub top_category: (String, f64),
    pub budget_percent: f64,
    pub over_budget: bool,
}

/// Recomputes every figure from scratch.
///
/// A record is recent when its date parses and lies between `today - 7 days`
/// and `today`, inclusive. Totals are rounded to cents so budget comparisons
/// are not thrown off by binary fractions.
pub fn summarize(records: &[TransactionRecord], settings: &Settings, today: NaiveDate) -> Stats {
    let total = round_cents(records.iter().map(|r| r.amount).sum());

    let recent: Vec<&TransactionRecord> = records
        .iter()
        .filter(|record| {
            record.parsed_date().is_some_and(|date| {
                let age = (today - date).num_days();
                (0..=RECENT_WINDOW_DAYS).contains(&age)
            })
        })
        .collect();
    let recent_total = round_cents(recent.iter().map(|r| r.amount).sum());

    let cap = settings.monthly_cap;
    let budget_percent = if cap > 0.0 {
        (total / cap * 100.0).min(100.0)
    } else if total > 0.0 {
        100.0
    } else {
        0.0
    };

    Stats {
        total,
        count: records.len(),
        recent_count: recent.len(),
        recent_total,
        top_category: top_category(records),
        budget_percent,
        over_budget: total > cap,
    }
}

/// Category with the largest summed amount; the first one seen wins ties.
fn top_category(records: &[TransactionRecord]) -> (String, f64) {
    let mut totals: Vec<(&str, f64)> = Vec::new();
    for record in records.iter().filter(|r| !r.category.is_empty()) {
        match totals.iter_mut().find(|(name, _)| *name == record.category) {
            Some((_, sum)) => *sum += record.amount,
            None => totals.push((&record.category, record.amount)),
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (name, sum) in totals {
        if best.map_or(true, |(_, top)| sum > top) {
            best = Some((name, sum));
        }
    }
    best.map(|(name, sum)| (name.to_string(), round_cents(sum)))
        .unwrap_or_else(|| (NO_CATEGORY.to_string(), 0.0))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
