use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use serde_json::Value;

use crate::error::AppError;
use crate::models::Record;

use super::sheet::number_value;

/// Read the first sheet of the workbook at `path` into records keyed by the
/// header row.
pub async fn import(path: &Path) -> Result<Vec<Record>, AppError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Parse(format!("reading {}: {e}", path.display())))?;
    let records = read_workbook(bytes)?;
    tracing::info!("Imported {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn read_workbook(bytes: Vec<u8>) -> Result<Vec<Record>, AppError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Parse("workbook has no sheets".to_string()))?;

    let range = workbook.worksheet_range(&first)?;
    let mut rows = range.rows();

    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };

    // Columns without a header have no key to land under.
    let headers: Vec<Option<String>> = header_row
        .iter()
        .map(|cell| match cell_value(cell) {
            None => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
        .collect();

    let mut records = Vec::new();
    for row in rows {
        let mut record = Record::new();
        for (header, cell) in headers.iter().zip(row) {
            let Some(header) = header else { continue };
            if let Some(value) = cell_value(cell) {
                record.insert(header.clone(), value);
            }
        }
        records.push(record);
    }

    Ok(records)
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => Some(number_value(*f)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => Some(number_value(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Error(e) => Some(Value::String(e.to_string())),
    }
}
