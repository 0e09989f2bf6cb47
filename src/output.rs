use crate::error::OutputError;
use crate::pivot::{PivotTable, RowKind};
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// The pivot has one column per month, so it is written record by record.
/// Cells hold the thousands-scaled values; blanks stay empty.
pub fn write_pivot_csv(path: &Path, pivot: &PivotTable) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec!["Customer".to_string(), "Type".to_string()];
    header.extend(pivot.periods.iter().map(|p| p.short_label()));
    wtr.write_record(&header)?;
    for row in &pivot.rows {
        let kind = match row.kind {
            RowKind::Amount => "Amount",
            RowKind::Diff => "Diff",
        };
        let mut record = vec![row.customer.clone(), kind.to_string()];
        record.extend(
            row.cells
                .iter()
                .map(|c| c.map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Display-ready pivot row: right-aligned cell text plus a color per cell.
#[derive(Debug, Serialize)]
pub struct PivotDisplayRow {
    pub label: String,
    pub bold: bool,
    pub cells: Vec<String>,
    pub colors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PivotDisplay {
    pub columns: Vec<String>,
    pub rows: Vec<PivotDisplayRow>,
}

pub fn pivot_display(pivot: &PivotTable) -> PivotDisplay {
    let rows = pivot
        .rows
        .iter()
        .map(|row| PivotDisplayRow {
            label: row.label(),
            bold: row.kind == RowKind::Diff,
            cells: row.display_cells(),
            colors: row
                .tones()
                .iter()
                .map(|t| t.map_or("black", |t| t.color()).to_string())
                .collect(),
        })
        .collect();
    PivotDisplay {
        columns: pivot.header(),
        rows,
    }
}

pub fn render_rows<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_rows(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

pub fn render_pivot(pivot: &PivotTable) -> String {
    let mut builder = Builder::default();
    builder.push_record(pivot.header());
    for row in pivot.display_rows() {
        builder.push_record(row);
    }
    builder.build().with(Style::markdown()).to_string()
}
