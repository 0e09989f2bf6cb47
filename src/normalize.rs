// Parse-and-coerce boundary.
//
// Raw rows come from spreadsheets that may hold numbers as text, floats where
// integers are expected, or junk. This is the only place where bad values are
// turned into safe defaults: amounts become 0, periods become `None`.
use crate::period::Period;
use crate::types::{RawRow, Transaction};
use crate::util::{non_blank, parse_f64_safe, parse_whole_number};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Amount cells that were present but not numeric.
    pub coerced_amounts: usize,
    /// Rows whose year/month did not form a calendar month.
    pub invalid_periods: usize,
}

/// Convert one raw row into a typed transaction. Never fails.
pub fn normalize_row(row: &RawRow) -> Transaction {
    let year = parse_whole_number(row.year.as_deref());
    let month = parse_whole_number(row.month.as_deref());
    let period = match (year, month) {
        (Some(y), Some(m)) => Period::from_year_month(y, m),
        _ => None,
    };
    Transaction {
        site: non_blank(row.site.clone()),
        customer: non_blank(row.customer.clone()),
        year: year.and_then(|y| i32::try_from(y).ok()),
        month: month.and_then(|m| u32::try_from(m).ok()),
        period,
        amount: parse_f64_safe(row.amount.as_deref()).unwrap_or(0.0),
    }
}

pub fn normalize_rows(rows: &[RawRow]) -> (Vec<Transaction>, NormalizeStats) {
    let mut stats = NormalizeStats::default();
    let records: Vec<Transaction> = rows
        .iter()
        .map(|row| {
            let rec = normalize_row(row);
            let amount_present = row.amount.as_deref().map_or(false, |s| !s.trim().is_empty());
            if amount_present && parse_f64_safe(row.amount.as_deref()).is_none() {
                stats.coerced_amounts += 1;
            }
            if rec.period.is_none() {
                stats.invalid_periods += 1;
            }
            rec
        })
        .collect();
    debug!(
        rows = records.len(),
        coerced_amounts = stats.coerced_amounts,
        invalid_periods = stats.invalid_periods,
        "normalized rows"
    );
    (records, stats)
}
