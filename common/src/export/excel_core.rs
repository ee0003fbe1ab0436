//! Excel export (shared library)
//!
//! One worksheet, one header row, one row per record. Absent values are left
//! as empty cells so they stay distinguishable from real text on re-import.

use crate::error::{Error, Result};
use crate::record::{Record, RecordField};
use rust_xlsxwriter::*;

const SHEET_NAME: &str = "Matches";

fn column_width(field: RecordField) -> f64 {
    match field {
        RecordField::Id => 8.0,
        RecordField::NameOfDeceased => 36.0,
        RecordField::CourtStation | RecordField::StatusAtGp => 20.0,
        _ => 16.0,
    }
}

fn xlsx_err(context: &str, e: XlsxError) -> Error {
    Error::Export(format!("{}: {}", context, e))
}

/// Build the workbook in memory.
pub fn write_xlsx(records: &[&Record]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x2563EB))
        .set_align(FormatAlign::Left)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_align(FormatAlign::Left)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| xlsx_err("sheet name", e))?;

    for (col, field) in RecordField::ALL.iter().enumerate() {
        let col = col as u16;
        worksheet
            .set_column_width(col, column_width(*field))
            .map_err(|e| xlsx_err("column width", e))?;
        worksheet
            .write_string_with_format(0, col, field.as_str(), &header_format)
            .map_err(|e| xlsx_err("header", e))?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, field) in RecordField::ALL.iter().enumerate() {
            if let Some(value) = record.get(*field) {
                worksheet
                    .write_string_with_format(row, col as u16, value, &value_format)
                    .map_err(|e| xlsx_err("cell", e))?;
            }
        }
    }

    let last_col = RecordField::ALL.len() as u16 - 1;
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| xlsx_err("freeze panes", e))?;
    worksheet
        .autofilter(0, 0, records.len() as u32, last_col)
        .map_err(|e| xlsx_err("autofilter", e))?;

    workbook
        .save_to_buffer()
        .map_err(|e| xlsx_err("save", e))
}
