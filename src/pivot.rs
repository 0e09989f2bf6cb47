// Rolling revenue table: per selected customer, monthly amounts and
// month-over-month differences over a window anchored at the latest data.
use crate::error::DashboardError;
use crate::period::Period;
use crate::types::Transaction;
use crate::util::format_truncated_abs;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

pub const PIVOT_WINDOW_MONTHS: u32 = 24;

/// Amounts are shown in thousands.
pub const DISPLAY_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Amount,
    Diff,
}

/// Presentational intent of a Diff cell, from its sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Increase,
    Decrease,
    Neutral,
}

impl Tone {
    pub fn of(v: f64) -> Self {
        if v > 0.0 {
            Tone::Increase
        } else if v < 0.0 {
            Tone::Decrease
        } else {
            Tone::Neutral
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Tone::Increase => "green",
            Tone::Decrease => "red",
            Tone::Neutral => "black",
        }
    }

    pub fn sign(&self) -> &'static str {
        match self {
            Tone::Increase => "+",
            Tone::Decrease => "-",
            Tone::Neutral => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub customer: String,
    pub kind: RowKind,
    /// One cell per period column, `None` when blank.
    pub cells: Vec<Option<f64>>,
}

impl PivotRow {
    pub fn label(&self) -> String {
        match self.kind {
            RowKind::Amount => format!("{} (KB)", self.customer),
            RowKind::Diff => "Diff (KB)".to_string(),
        }
    }

    /// Display text for each cell: whole thousands, Diff cells signed.
    pub fn display_cells(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|cell| match (cell, self.kind) {
                (None, _) => String::new(),
                (Some(v), RowKind::Amount) => format_truncated_abs(*v),
                (Some(v), RowKind::Diff) => {
                    format!("{}{}", Tone::of(*v).sign(), format_truncated_abs(*v))
                }
            })
            .collect()
    }

    pub fn tones(&self) -> Vec<Option<Tone>> {
        self.cells
            .iter()
            .map(|cell| match self.kind {
                RowKind::Diff => cell.map(Tone::of),
                RowKind::Amount => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub periods: Vec<Period>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn header(&self) -> Vec<String> {
        std::iter::once("Customer / Type".to_string())
            .chain(self.periods.iter().map(Period::short_label))
            .collect()
    }

    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                std::iter::once(row.label())
                    .chain(row.display_cells())
                    .collect()
            })
            .collect()
    }
}

/// Build the rolling table for `selected` customers, in selection order.
pub fn build_pivot(
    rows: &[&Transaction],
    selected: &[String],
) -> Result<PivotTable, DashboardError> {
    if selected.is_empty() {
        return Err(DashboardError::NoCustomersSelected);
    }

    let mut sums: HashMap<(&str, Period), f64> = HashMap::new();
    for r in rows {
        let (Some(customer), Some(period)) = (r.customer.as_deref(), r.period) else {
            continue;
        };
        if !selected.iter().any(|s| s == customer) {
            continue;
        }
        *sums.entry((customer, period)).or_insert(0.0) += r.amount;
    }

    let max_period = sums
        .keys()
        .map(|(_, p)| *p)
        .max()
        .ok_or(DashboardError::NoRevenueData)?;
    let window_start = max_period
        .months_back(PIVOT_WINDOW_MONTHS - 1)
        .unwrap_or(max_period);

    let periods: Vec<Period> = sums
        .keys()
        .map(|(_, p)| *p)
        .filter(|p| *p >= window_start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    debug!(
        window_start = %window_start,
        max_period = %max_period,
        columns = periods.len(),
        "pivot window"
    );

    let mut table_rows = Vec::with_capacity(selected.len() * 2);
    for customer in selected {
        let amounts: Vec<Option<f64>> = periods
            .iter()
            .map(|p| {
                sums.get(&(customer.as_str(), *p))
                    .map(|v| v / DISPLAY_SCALE)
            })
            .collect();
        let diffs: Vec<Option<f64>> = amounts
            .iter()
            .enumerate()
            .map(|(i, cur)| match (i.checked_sub(1).and_then(|j| amounts[j]), cur) {
                (Some(prev), Some(cur)) => Some(cur - prev),
                _ => None,
            })
            .collect();
        table_rows.push(PivotRow {
            customer: customer.clone(),
            kind: RowKind::Amount,
            cells: amounts,
        });
        table_rows.push(PivotRow {
            customer: customer.clone(),
            kind: RowKind::Diff,
            cells: diffs,
        });
    }

    Ok(PivotTable {
        periods,
        rows: table_rows,
    })
}
