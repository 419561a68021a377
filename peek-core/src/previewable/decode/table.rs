use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use log::debug;
use tokio::task;

use crate::previewable::{CellValue, DecodeError};

/// Parses the bytes as a workbook and returns the rows of its first sheet.
///
/// The grid covers the sheet's used range, so every row is as wide as the range. The first row is
/// ordinary data.
pub async fn first_sheet_rows(name: &str, bytes: Vec<u8>) -> Result<Vec<Vec<CellValue>>, DecodeError> {
    let rows = task::spawn_blocking(move || -> Result<Option<Vec<Vec<CellValue>>>, anyhow::Error> {
        // the format is sniffed from the content, not taken from the declared type
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let Some(first_sheet) = workbook.sheet_names().first().cloned() else {
            return Ok(None);
        };

        debug!("Reading sheet {:?}", first_sheet);
        let range = workbook.worksheet_range(&first_sheet)?;

        let rows: Vec<Vec<CellValue>> = range.rows()
            .map(|row| row.iter().map(cell_value).collect())
            .collect();

        Ok(Some(rows))
    }).await
    .map_err(|e| DecodeError::Task { name: name.to_string(), source: e })?
    .map_err(|e| DecodeError::Parse { name: name.to_string(), source: e })?;

    rows.ok_or_else(|| DecodeError::EmptyWorkbook { name: name.to_string() })
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        // dates keep their serial number
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}
