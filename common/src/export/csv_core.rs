//! CSV export

use crate::error::{Error, Result};
use crate::record::{Record, RecordField};

/// Write records as CSV. Absent fields become empty cells.
pub fn write_csv(records: &[&Record]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(super::header())
        .map_err(|e| Error::Export(format!("CSV header: {}", e)))?;

    for record in records {
        let row = RecordField::ALL.iter().map(|&f| record.get(f).unwrap_or(""));
        writer
            .write_record(row)
            .map_err(|e| Error::Export(format!("CSV row: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Export(format!("CSV flush: {}", e)))
}
