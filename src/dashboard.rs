// One dashboard request: site partition, comparison panel, charts and pivot,
// computed from the read-only dataset and the session's selection.
use crate::charts::{monthly_series, yearly_totals};
use crate::comparison::{compare_top_customers, TopCustomers};
use crate::error::DashboardError;
use crate::pivot::{build_pivot, PivotTable};
use crate::site::{customers_for_site, select_site};
use crate::types::{LinePoint, SummaryStats, Transaction, YearTotal};
use tracing::{debug, info};

/// Everything shown for a site before any customer is picked.
#[derive(Debug)]
pub struct SiteOverview<'a> {
    pub site: String,
    pub rows: Vec<&'a Transaction>,
    pub customers: Vec<String>,
    pub top: TopCustomers,
}

/// Charts and rolling table for the selected customers.
#[derive(Debug)]
pub struct CustomerDetail {
    pub selected: Vec<String>,
    pub line: Vec<LinePoint>,
    pub bars: Vec<YearTotal>,
    /// The charts still render when the table has nothing to show.
    pub pivot: Result<PivotTable, DashboardError>,
}

pub fn site_overview<'a>(
    data: &'a [Transaction],
    site: &str,
) -> Result<SiteOverview<'a>, DashboardError> {
    let rows = select_site(data, site)?;
    let top = compare_top_customers(&rows)?;
    let customers = customers_for_site(&rows);
    info!(
        site,
        rows = rows.len(),
        customers = customers.len(),
        latest = %top.latest,
        "site overview"
    );
    Ok(SiteOverview {
        site: site.to_string(),
        rows,
        customers,
        top,
    })
}

pub fn customer_detail(
    overview: &SiteOverview<'_>,
    selected: &[String],
) -> Result<CustomerDetail, DashboardError> {
    if selected.is_empty() {
        return Err(DashboardError::NoCustomersSelected);
    }
    let line = monthly_series(&overview.rows, selected);
    let bars = yearly_totals(&overview.rows, selected);
    let pivot = build_pivot(&overview.rows, selected);
    debug!(
        points = line.len(),
        bars = bars.len(),
        pivot_ok = pivot.is_ok(),
        "customer detail"
    );
    Ok(CustomerDetail {
        selected: selected.to_vec(),
        line,
        bars,
        pivot,
    })
}

pub fn summarize(overview: &SiteOverview<'_>, detail: Option<&CustomerDetail>) -> SummaryStats {
    SummaryStats {
        site: overview.site.clone(),
        latest_period: overview.top.latest.key(),
        prior_period: overview.top.prior.key(),
        total_customers: overview.customers.len(),
        top_customer: overview.top.ranked().next().map(|c| c.customer.clone()),
        selected_customers: detail.map(|d| d.selected.clone()).unwrap_or_default(),
        pivot_columns: detail
            .and_then(|d| d.pivot.as_ref().ok())
            .map_or(0, |p| p.periods.len()),
    }
}
