use thiserror::Error;

/// How loudly a notice should be shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Conditions that stop the current request but leave the session usable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("No data found. Please load the data file first.")]
    NoData,

    #[error("No sites found in the current data.")]
    NoSites,

    #[error("No data for selected site: {0}")]
    NoDataForSite(String),

    #[error("No valid Period values in data.")]
    NoValidPeriods,

    #[error("Select at least one customer.")]
    NoCustomersSelected,

    #[error("No revenue data available for the selected customers at this site.")]
    NoRevenueData,
}

impl DashboardError {
    pub fn severity(&self) -> Severity {
        match self {
            DashboardError::NoData => Severity::Warning,
            DashboardError::NoSites => Severity::Error,
            _ => Severity::Info,
        }
    }
}

/// Failures while reading the source file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file format: {0} (expected .csv, .xlsx, .xls, .xlsb or .ods)")]
    UnsupportedFormat(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Workbook has no worksheets: {0}")]
    EmptyWorkbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error(transparent)]
    Dashboard(#[from] DashboardError),
}

/// Failures while exporting generated tables.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_follow_notice_kind() {
        assert_eq!(DashboardError::NoData.severity(), Severity::Warning);
        assert_eq!(DashboardError::NoSites.severity(), Severity::Error);
        assert_eq!(
            DashboardError::NoDataForSite("A".into()).severity(),
            Severity::Info
        );
        assert_eq!(DashboardError::NoRevenueData.severity(), Severity::Info);
    }

    #[test]
    fn messages_name_the_site() {
        let err = DashboardError::NoDataForSite("BKK".into());
        assert_eq!(err.to_string(), "No data for selected site: BKK");
    }
}
