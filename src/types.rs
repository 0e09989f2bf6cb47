use crate::period::Period;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One row as it appears in the source file, before any coercion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRow {
    #[serde(rename = "Site")]
    pub site: Option<String>,
    #[serde(rename = "Customer")]
    pub customer: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Amount")]
    pub amount: Option<String>,
}

impl RawRow {
    pub fn is_blank(&self) -> bool {
        [&self.site, &self.customer, &self.year, &self.month, &self.amount]
            .iter()
            .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

/// A normalized transaction record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub site: Option<String>,
    pub customer: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub period: Option<Period>,
    pub amount: f64,
}

/// Card-style rendering of one comparison slot.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComparisonCardRow {
    #[serde(rename = "Customer")]
    #[tabled(rename = "Customer")]
    pub customer: String,
    #[serde(rename = "Rating")]
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Month2")]
    #[tabled(rename = "Previous Month")]
    pub previous_month: String,
    #[serde(rename = "Previous")]
    #[tabled(rename = "Previous")]
    pub previous: String,
    #[serde(rename = "Month1")]
    #[tabled(rename = "Current Month")]
    pub current_month: String,
    #[serde(rename = "Current")]
    #[tabled(rename = "Current")]
    pub current: String,
    #[serde(rename = "Arrow")]
    #[tabled(rename = "")]
    pub arrow: String,
    #[serde(rename = "Pct")]
    #[tabled(rename = "Pct")]
    pub pct: String,
    #[serde(rename = "Diff")]
    #[tabled(rename = "Diff")]
    pub diff: String,
    #[serde(rename = "Color")]
    #[tabled(skip)]
    pub color: String,
}

/// Long-format point for the monthly line chart.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct LinePoint {
    #[serde(rename = "Customer")]
    #[tabled(rename = "Customer")]
    pub customer: String,
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: Period,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: f64,
}

/// Long-format bar for the yearly totals chart.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct YearTotal {
    #[serde(rename = "Customer")]
    #[tabled(rename = "Customer")]
    pub customer: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub site: String,
    pub latest_period: String,
    pub prior_period: String,
    pub total_customers: usize,
    pub top_customer: Option<String>,
    pub selected_customers: Vec<String>,
    pub pivot_columns: usize,
}
