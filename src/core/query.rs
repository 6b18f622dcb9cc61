//! Filtered, ordered view of the ledger for display.

use std::ops::Range;

use feruca::Collator;

use crate::core::pattern::{self, Matcher};
use crate::ledger::{SortDirection, SortField, SortSpec, TransactionRecord, UiPreferences};

/// Byte ranges matched by the active search, per displayed field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSpans {
    pub description: Vec<Range<usize>>,
    pub amount: Vec<Range<usize>>,
}

impl MatchSpans {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.amount.is_empty()
    }
}

/// One displayed row. Borrows the record; nothing here mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow<'a> {
    pub record: &'a TransactionRecord,
    pub spans: MatchSpans,
}

/// Builds the view list for `records` under the given preferences.
///
/// A search that does not compile is treated as no search at all.
pub fn view<'a>(records: &'a [TransactionRecord], prefs: &UiPreferences) -> Vec<ViewRow<'a>> {
    let matcher = pattern::compile(prefs.search.as_deref(), prefs.case_sensitive);

    let mut rows: Vec<&TransactionRecord> = match matcher.as_ref() {
        Some(matcher) => records
            .iter()
            .filter(|record| matches_record(matcher, record))
            .collect(),
        None => records.iter().collect(),
    };
    sort_records(&mut rows, prefs.sort);

    rows.into_iter()
        .map(|record| ViewRow {
            record,
            spans: matcher
                .as_ref()
                .map(|matcher| MatchSpans {
                    description: matcher.spans(&record.description),
                    amount: matcher.spans(&record.amount_text()),
                })
                .unwrap_or_default(),
        })
        .collect()
}

fn matches_record(matcher: &Matcher, record: &TransactionRecord) -> bool {
    matcher.is_match(&record.description)
        || matcher.is_match(&record.amount_text())
        || matcher.is_match(&record.category)
}

/// Stable sort; equal keys keep their ledger order in both directions.
///
/// Descriptions are ordered with the Unicode Collation Algorithm (root
/// locale), so accents and case are secondary to the base letters.
pub fn sort_records(rows: &mut [&TransactionRecord], spec: SortSpec) {
    let mut collator = Collator::default();
    rows.sort_by(|a, b| {
        let ordering = match spec.field {
            SortField::Amount => a.amount.total_cmp(&b.amount),
            // unparseable dates order before every real date
            SortField::Date => a.parsed_date().cmp(&b.parsed_date()),
            SortField::Description => {
                collator.collate(a.description.as_str(), b.description.as_str())
            }
        };
        match spec.dir {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Wraps each span of `text` in `open`/`close` markers.
pub fn highlight(text: &str, spans: &[Range<usize>], open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * (open.len() + close.len()));
    let mut cursor = 0;
    for span in spans {
        if span.start < cursor || span.end > text.len() {
            continue;
        }
        out.push_str(&text[cursor..span.start]);
        out.push_str(open);
        out.push_str(&text[span.clone()]);
        out.push_str(close);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}
