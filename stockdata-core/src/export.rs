//! Export — XLSX and CSV encoders for the aggregate table.
//!
//! Each format is an independent `TableEncoder` taking the same table, so a
//! format can be added or dropped without touching fetching or aggregation.
//! Both produce a header row (`Symbol, Date, Open, High, Low, Close, Volume`)
//! and no index column.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::AggregateTable;
use crate::domain::bar::COLUMNS;

pub const DEFAULT_FILE_PREFIX: &str = "StockData";
pub const DEFAULT_SHEET_NAME: &str = "StockData";

/// Days between 1899-12-30 (Excel's day zero) and 1970-01-01.
const EXCEL_UNIX_EPOCH_DAYS: f64 = 25_569.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX encoding failed: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn encoder(self, sheet_name: &str) -> Box<dyn TableEncoder> {
        match self {
            ExportFormat::Xlsx => Box::new(XlsxEncoder::new(sheet_name)),
            ExportFormat::Csv => Box::new(CsvEncoder),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown format '{other}' (expected xlsx or csv)")),
        }
    }
}

/// Serializes a table into one downloadable byte stream.
pub trait TableEncoder {
    fn format(&self) -> ExportFormat;

    fn encode(&self, table: &AggregateTable) -> Result<Vec<u8>, ExportError>;
}

/// Comma-delimited text with a header row.
pub struct CsvEncoder;

impl TableEncoder for CsvEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn encode(&self, table: &AggregateTable) -> Result<Vec<u8>, ExportError> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for row in table.rows() {
            wtr.serialize(row)?;
        }
        wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
    }
}

/// Single-sheet workbook. Dates are real Excel date-times.
pub struct XlsxEncoder {
    sheet_name: String,
}

impl XlsxEncoder {
    pub fn new(sheet_name: &str) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
        }
    }
}

impl TableEncoder for XlsxEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn encode(&self, table: &AggregateTable) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let datetime = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        let sheet = workbook.add_worksheet();
        sheet.set_name(self.sheet_name.as_str())?;

        for (col, name) in COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, &header)?;
        }

        for (i, row) in table.rows().iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_string(r, 0, row.symbol.as_str())?;
            sheet.write_number_with_format(r, 1, excel_serial(row.date), &datetime)?;
            sheet.write_number(r, 2, row.open)?;
            sheet.write_number(r, 3, row.high)?;
            sheet.write_number(r, 4, row.low)?;
            sheet.write_number(r, 5, row.close)?;
            sheet.write_number(r, 6, row.volume)?;
        }
        sheet.set_column_width(1, 20)?;

        Ok(workbook.save_to_buffer()?)
    }
}

/// Excel serial date-time (fractional days since 1899-12-30).
pub fn excel_serial(dt: NaiveDateTime) -> f64 {
    dt.and_utc().timestamp() as f64 / SECONDS_PER_DAY + EXCEL_UNIX_EPOCH_DAYS
}

/// `<prefix>_<YYYY-MM-DD>.<ext>`
pub fn export_filename(prefix: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!("{prefix}_{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// One encoded file, ready to be written or offered for download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Run every encoder over the table, in order.
pub fn encode_all(
    table: &AggregateTable,
    encoders: &[Box<dyn TableEncoder>],
    prefix: &str,
    date: NaiveDate,
) -> Result<Vec<ExportArtifact>, ExportError> {
    encoders
        .iter()
        .map(|enc| {
            let bytes = enc.encode(table)?;
            let filename = export_filename(prefix, date, enc.format());
            tracing::info!(%filename, bytes = bytes.len(), rows = table.len(), "encoded");
            Ok(ExportArtifact {
                format: enc.format(),
                filename,
                bytes,
            })
        })
        .collect()
}

/// Write artifacts into `dir` (created if missing), returning their paths.
pub fn write_artifacts(
    dir: &Path,
    artifacts: &[ExportArtifact],
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir)?;
    artifacts
        .iter()
        .map(|a| {
            let path = dir.join(&a.filename);
            std::fs::write(&path, &a.bytes)?;
            Ok(path)
        })
        .collect()
}
