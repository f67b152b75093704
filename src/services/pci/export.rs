use super::types::SummaryRow;
use rust_xlsxwriter::{Workbook, XlsxError};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXPORT_HEADERS: [&str; 5] = ["File Name", "Average", "Max", "Min", "Median"];

/// Writes the summary table to an in-memory workbook with a single sheet:
/// one header row, then one row per file. No index column.
pub fn serialize(table: &[SummaryRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (idx, row) in table.iter().enumerate() {
        let row_num = u32::try_from(idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        worksheet.write_string(row_num, 0, &row.file_name)?;
        worksheet.write_number(row_num, 1, row.average)?;
        worksheet.write_number(row_num, 2, row.max)?;
        worksheet.write_number(row_num, 3, row.min)?;
        worksheet.write_number(row_num, 4, row.median)?;
    }

    tracing::debug!("Serialized {} summary rows", table.len());
    workbook.save_to_buffer()
}
