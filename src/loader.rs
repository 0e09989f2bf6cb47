use crate::error::{DashboardError, LoadError};
use crate::normalize::normalize_rows;
use crate::types::{RawRow, Transaction};
use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const REQUIRED_COLUMNS: [&str; 5] = ["Site", "Customer", "Year", "Month", "Amount"];

/// Which file the dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Primary(PathBuf),
    Fallback(PathBuf),
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub skipped_blank_rows: usize,
    pub coerced_amounts: usize,
    pub invalid_periods: usize,
}

/// The loaded, normalized dataset. Read-only for the rest of the session.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: DataSource,
    pub records: Vec<Transaction>,
}

fn check_headers(headers: &[String]) -> Result<(), LoadError> {
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(LoadError::MissingColumn(col.to_string()));
        }
    }
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Vec<RawRow>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    check_headers(&headers)?;

    // Empty CSV fields deserialize to `None`, like blank spreadsheet cells.
    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        other => Some(other.to_string()),
    }
}

/// Read the first worksheet; the first row holds the headers.
pub fn read_spreadsheet(path: &Path) -> Result<Vec<RawRow>, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::EmptyWorkbook(path.display().to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;
    rows_from_range(&range)
}

/// Map a worksheet range to raw rows, locating columns by header name.
fn rows_from_range(range: &Range<Data>) -> Result<Vec<RawRow>, LoadError> {
    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .map(|r| r.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    check_headers(&headers)?;
    let col = |name: &str| headers.iter().position(|h| h == name);
    let (site, customer, year, month, amount) = (
        col("Site"),
        col("Customer"),
        col("Year"),
        col("Month"),
        col("Amount"),
    );

    let rows = rows_iter
        .map(|cells| {
            let get = |idx: Option<usize>| idx.and_then(|i| cells.get(i)).and_then(cell_text);
            RawRow {
                site: get(site),
                customer: get(customer),
                year: get(year),
                month: get(month),
                amount: get(amount),
            }
        })
        .collect();
    Ok(rows)
}

/// Read a file into raw rows, choosing the parser by extension.
pub fn read_raw_rows(path: &Path) -> Result<Vec<RawRow>, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_spreadsheet(path),
        _ => Err(LoadError::UnsupportedFormat(ext)),
    }
}

pub fn load_file(path: &Path, source: DataSource) -> Result<(Dataset, LoadReport), LoadError> {
    let raw = read_raw_rows(path)?;
    let total_rows = raw.len();
    let raw: Vec<RawRow> = raw.into_iter().filter(|r| !r.is_blank()).collect();
    let skipped_blank_rows = total_rows - raw.len();
    let (records, stats) = normalize_rows(&raw);

    info!(
        path = %path.display(),
        rows = records.len(),
        skipped = skipped_blank_rows,
        "loaded dataset"
    );
    if stats.coerced_amounts > 0 || stats.invalid_periods > 0 {
        warn!(
            coerced_amounts = stats.coerced_amounts,
            invalid_periods = stats.invalid_periods,
            "dataset contains values that were degraded to defaults"
        );
    }

    let report = LoadReport {
        total_rows,
        skipped_blank_rows,
        coerced_amounts: stats.coerced_amounts,
        invalid_periods: stats.invalid_periods,
    };
    Ok((Dataset { source, records }, report))
}

/// Load the primary file, or the fallback when the primary does not exist.
pub fn load_dataset(
    primary: &Path,
    fallback: Option<&Path>,
) -> Result<(Dataset, LoadReport), LoadError> {
    if primary.exists() {
        return load_file(primary, DataSource::Primary(primary.to_path_buf()));
    }
    match fallback {
        Some(fb) if fb.exists() => {
            warn!(
                primary = %primary.display(),
                fallback = %fb.display(),
                "primary data file missing, using fallback"
            );
            load_file(fb, DataSource::Fallback(fb.to_path_buf()))
        }
        _ => Err(LoadError::Dashboard(DashboardError::NoData)),
    }
}
