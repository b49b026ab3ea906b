pub mod import;
pub mod sheet;

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Record, Submission};
use crate::store::Ledger;

use sheet::Cell;

pub use import::{import, read_workbook};

pub const DEFAULT_SHEET_NAME: &str = "Form Submissions";
pub const DEFAULT_FILE_NAME: &str = "data-innovation-app.xlsx";

/// Largest row index a worksheet accepts.
const MAX_ROW: u32 = 1_048_575;

/// The writer drops empty string cells, so `""` is stored as a formula whose
/// cached result reads back as an empty string.
const EMPTY_TEXT_FORMULA: &str = r#"="""#;

/// Writes submission records to single-sheet `.xlsx` workbooks.
#[derive(Debug, Clone)]
pub struct Exporter {
    sheet_name: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Exporter::new(DEFAULT_SHEET_NAME)
    }
}

impl Exporter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Exporter {
            sheet_name: sheet_name.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Exporter::new(config.sheet_name.clone())
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Serialize `records` into workbook bytes. An empty list yields an empty
    /// sheet.
    pub fn write_workbook(&self, records: &[Record]) -> Result<Vec<u8>, AppError> {
        let headers = sheet::collect_headers(records);
        if records.len() > MAX_ROW as usize {
            return Err(AppError::Export(format!(
                "{} records exceed the worksheet row limit",
                records.len()
            )));
        }
        if headers.len() > u16::MAX as usize {
            return Err(AppError::Export(format!(
                "{} columns exceed the worksheet column limit",
                headers.len()
            )));
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;
        worksheet.set_formula_result_default("");

        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, header.as_str())?;
        }

        for (idx, record) in records.iter().enumerate() {
            let row = idx as u32 + 1;
            for (col, header) in headers.iter().enumerate() {
                if let Some(value) = record.get(header) {
                    write_cell(worksheet, row, col as u16, Cell::from(value))?;
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }

    pub async fn try_export(&self, records: &[Record], path: &Path) -> Result<(), AppError> {
        let bytes = self.write_workbook(records)?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| AppError::Export(format!("writing {}: {e}", path.display())))?;
        Ok(())
    }

    /// Snapshot export. Reports failure through the return value.
    pub async fn export(&self, records: &[Record], path: &Path) -> bool {
        match self.try_export(records, path).await {
            Ok(()) => {
                tracing::info!("Exported {} records to {}", records.len(), path.display());
                true
            }
            Err(e) => {
                tracing::error!("Failed to export to {}: {e}", path.display());
                false
            }
        }
    }

    pub async fn export_submissions(&self, submissions: &[Submission], path: &Path) -> bool {
        let records: Vec<Record> = submissions.iter().map(Submission::to_record).collect();
        self.export(&records, path).await
    }

    /// Append `records` to `ledger`, persist it, then export the whole ledger.
    /// Returns the merged list that was written.
    pub async fn try_export_accumulated(
        &self,
        ledger: &Ledger,
        records: &[Record],
        path: &Path,
    ) -> Result<Vec<Record>, AppError> {
        let merged = ledger.append(records).await?;
        self.try_export(&merged, path).await?;
        Ok(merged)
    }

    /// Ledger export. Reports failure through the return value.
    pub async fn export_accumulated(&self, ledger: &Ledger, records: &[Record], path: &Path) -> bool {
        match self.try_export_accumulated(ledger, records, path).await {
            Ok(merged) => {
                tracing::info!(
                    "Exported ledger '{}' ({} records, {} new) to {}",
                    ledger.key(),
                    merged.len(),
                    records.len(),
                    path.display()
                );
                true
            }
            Err(e) => {
                tracing::error!("Failed to export ledger '{}': {e}", ledger.key());
                false
            }
        }
    }
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: Cell<'_>) -> Result<(), AppError> {
    match cell {
        Cell::Blank => {}
        Cell::Text("") => {
            worksheet.write_formula(row, col, EMPTY_TEXT_FORMULA)?;
        }
        Cell::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Cell::Number(n) => {
            worksheet.write_number(row, col, n)?;
        }
        Cell::Bool(b) => {
            worksheet.write_boolean(row, col, b)?;
        }
        Cell::Json(s) => {
            worksheet.write_string(row, col, s)?;
        }
    }
    Ok(())
}
