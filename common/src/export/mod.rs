//! Export core modules shared across CLI and WASM wrappers.
//!
//! Both writers take the search-filtered records in filter order and return
//! the complete file as bytes; writing or downloading is up to the caller.

pub mod csv_core;

#[cfg(feature = "excel")]
pub mod excel_core;

use crate::error::Result;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
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

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            _ => Err(format!("Unknown format: {}. Use csv or xlsx", s)),
        }
    }
}

/// Timestamped artifact name, e.g. `matches_1705651200000.csv`.
pub fn export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("matches_{}.{}", timestamp_ms, format.extension())
}

/// Serialize records in the requested format.
pub fn export_records(records: &[&Record], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => csv_core::write_csv(records),
        #[cfg(feature = "excel")]
        ExportFormat::Xlsx => excel_core::write_xlsx(records),
        #[cfg(not(feature = "excel"))]
        ExportFormat::Xlsx => Err(crate::error::Error::Export(
            "xlsx export is not available in this build".into(),
        )),
    }
}

/// Header row shared by both formats.
pub(crate) fn header() -> Vec<&'static str> {
    crate::record::RecordField::ALL.iter().map(|f| f.as_str()).collect()
}
