use super::types::{ColumnSelector, RawColumn, SheetLayout, UploadedFile};
use crate::error::SheetError;
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx, XlsxError};
use std::io::Cursor;

/// Reads the PCI column of one workbook.
///
/// Rows are addressed from A1 regardless of where the used range starts, so
/// `skip_rows` always drops the same physical rows of the sheet. Every row
/// after the skipped block is returned, through the last used row.
pub fn read_column(file: &UploadedFile, layout: &SheetLayout) -> Result<RawColumn, SheetError> {
    let cursor = Cursor::new(file.bytes.clone());
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
        .map_err(|e: XlsxError| SheetError::FileParse {
            file_name: file.name.clone(),
            reason: e.to_string(),
        })?;

    if !workbook.sheet_names().iter().any(|name| name == &layout.sheet_name) {
        return Err(SheetError::SheetNotFound {
            file_name: file.name.clone(),
            sheet_name: layout.sheet_name.clone(),
        });
    }

    let range = workbook
        .worksheet_range(&layout.sheet_name)
        .map_err(|e| SheetError::FileParse {
            file_name: file.name.clone(),
            reason: e.to_string(),
        })?;

    let (start, end) = match (range.start(), range.end()) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            tracing::debug!("Sheet {} of {} is empty", layout.sheet_name, file.name);
            return Ok(Vec::new());
        }
    };

    let column_not_found = || SheetError::ColumnNotFound {
        file_name: file.name.clone(),
        sheet_name: layout.sheet_name.clone(),
        column: layout.column.to_string(),
    };

    let (column, first_data_row) = match &layout.column {
        ColumnSelector::Index(idx) => (*idx, layout.skip_rows),
        ColumnSelector::Header(label) => {
            let idx = find_header(&range, layout.skip_rows, label).ok_or_else(column_not_found)?;
            (idx, layout.skip_rows + 1)
        }
    };

    let first = first_data_row.max(start.0 as usize);
    let last = end.0 as usize;
    if first > last {
        tracing::debug!("No rows below the skipped block in {}", file.name);
        return Ok(Vec::new());
    }

    // A positional column must exist among the data rows themselves; a wide
    // title block does not count.
    if let ColumnSelector::Index(_) = layout.column {
        match last_used_column(&range, first, last) {
            Some(last_column) if column <= last_column => {}
            _ => return Err(column_not_found()),
        }
    }

    Ok((first..=last).map(|row| cell_at(&range, row, column)).collect())
}

fn last_used_column(range: &Range<Data>, first_row: usize, last_row: usize) -> Option<usize> {
    let (start, end) = (range.start()?, range.end()?);
    (first_row..=last_row)
        .filter_map(|row| {
            (start.1 as usize..=end.1 as usize).rev().find(|&column| {
                range
                    .get_value((row as u32, column as u32))
                    .map_or(false, |cell| !matches!(cell, Data::Empty))
            })
        })
        .max()
}

fn cell_at(range: &Range<Data>, row: usize, column: usize) -> Data {
    range
        .get_value((row as u32, column as u32))
        .cloned()
        .unwrap_or(Data::Empty)
}

fn find_header(range: &Range<Data>, header_row: usize, label: &str) -> Option<usize> {
    let (start, end) = (range.start()?, range.end()?);
    let wanted = label.trim();
    (start.1 as usize..=end.1 as usize).find(|&column| {
        cell_at(range, header_row, column)
            .to_string()
            .trim()
            .eq_ignore_ascii_case(wanted)
    })
}
