//! Spreadsheet export of the final table.

use rust_xlsxwriter::Workbook;

use crate::error::ExportError;
use crate::table::ExtractedTable;

const WORKSHEET_NAME: &str = "Sheet1";

/// Serialize the table into xlsx bytes: one worksheet, header row first,
/// columns in table order.
pub fn write_workbook(table: &ExtractedTable) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WORKSHEET_NAME)?;

    for (col, header) in table.headers().iter().enumerate() {
        worksheet.write_string(0, col as u16, header)?;
    }
    for (row_index, row) in table.rows().iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            worksheet.write_string(row_index as u32 + 1, col as u16, cell)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    Ok(bytes)
}

/// Derive the download name from the uploaded file's name: the final
/// extension is replaced with `.xlsx`.
pub fn output_filename(original: &str) -> String {
    match original.rsplit_once('.') {
        Some((base, _ext)) if !base.is_empty() => format!("{base}.xlsx"),
        _ => format!("{original}.xlsx"),
    }
}
