//! Local table files: CSV and XLSX

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::Workbook;

use crate::convert::Table;
use crate::error::{CxSheetError, Result};

const DEFAULT_TAB: &str = "Sheet1";

pub fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CxSheetError::table(format!("failed to open {}: {}", path.display(), e)))?;

    let mut values = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            CxSheetError::table(format!("{} line {}: {}", path.display(), line + 1, e))
        })?;
        values.push(record.iter().map(str::to_string).collect());
    }

    strip_bom(&mut values);
    Ok(Table::from_values(values))
}

pub fn write_csv(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| CxSheetError::table(format!("failed to create {}: {}", path.display(), e)))?;

    for row in table.to_values() {
        writer
            .write_record(&row)
            .map_err(|e| CxSheetError::table(format!("failed to write {}: {}", path.display(), e)))?;
    }
    writer
        .flush()
        .map_err(|e| CxSheetError::io(path, e))?;

    log::info!("Wrote {} row(s) to {}", table.len(), path.display());
    Ok(())
}

/// Read one tab, or the first tab when none is named
pub fn read_xlsx(path: &Path, tab: Option<&str>) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| CxSheetError::table(format!("failed to open {}: {}", path.display(), e)))?;

    let sheet_name = match tab {
        Some(tab) => tab.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| CxSheetError::table(format!("{} has no sheets", path.display())))?,
    };

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        CxSheetError::table(format!(
            "failed to read sheet '{}' of {}: {}",
            sheet_name,
            path.display(),
            e
        ))
    })?;

    let values = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    Ok(Table::from_values(values))
}

/// Write the table as text cells into a single-tab workbook
pub fn write_xlsx(path: &Path, tab: Option<&str>, table: &Table) -> Result<()> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| {
        CxSheetError::table(format!("failed to write {}: {}", path.display(), e))
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(tab.unwrap_or(DEFAULT_TAB)).map_err(xlsx_err)?;

    for (row_idx, row) in table.to_values().iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                worksheet
                    .write_string(row_idx as u32, col_idx as u16, cell)
                    .map_err(xlsx_err)?;
            }
        }
    }

    workbook.save(path).map_err(xlsx_err)?;
    log::info!("Wrote {} row(s) to {}", table.len(), path.display());
    Ok(())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

fn strip_bom(values: &mut [Vec<String>]) {
    if let Some(first) = values.first_mut().and_then(|row| row.first_mut()) {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
}
