// Long-format tables behind the monthly line chart and yearly bar chart.
use crate::period::Period;
use crate::types::{LinePoint, Transaction, YearTotal};
use std::collections::BTreeMap;

fn selected_customer(r: &Transaction, selected: &[String]) -> Option<String> {
    let customer = r.customer.as_deref()?;
    selected
        .iter()
        .any(|s| s == customer)
        .then(|| customer.to_string())
}

/// Sum of amounts per (customer, period), sorted by customer then period.
pub fn monthly_series(rows: &[&Transaction], selected: &[String]) -> Vec<LinePoint> {
    let mut sums: BTreeMap<(String, Period), f64> = BTreeMap::new();
    for r in rows {
        let (Some(customer), Some(period)) = (selected_customer(r, selected), r.period) else {
            continue;
        };
        *sums.entry((customer, period)).or_insert(0.0) += r.amount;
    }
    sums.into_iter()
        .map(|((customer, period), amount)| LinePoint {
            customer,
            period,
            amount,
        })
        .collect()
}

/// Sum of amounts per (customer, year), sorted by customer then year.
///
/// Keyed on the record's year alone, so rows with a bad month still count.
pub fn yearly_totals(rows: &[&Transaction], selected: &[String]) -> Vec<YearTotal> {
    let mut sums: BTreeMap<(String, i32), f64> = BTreeMap::new();
    for r in rows {
        let (Some(customer), Some(year)) = (selected_customer(r, selected), r.year) else {
            continue;
        };
        *sums.entry((customer, year)).or_insert(0.0) += r.amount;
    }
    sums.into_iter()
        .map(|((customer, year), amount)| YearTotal {
            customer,
            year,
            amount,
        })
        .collect()
}
