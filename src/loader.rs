use crate::error::AppError;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::collections::HashSet;
use std::io::Cursor;

/// Header of the column holding procedure names
pub const NAME_COLUMN: &str = "NAME";

/// Extract the procedure names listed in an uploaded spreadsheet
///
/// The workbook format is detected from the bytes. The first row of the
/// first sheet is the header row; the column titled `NAME` (compared after
/// trimming, case-insensitively) supplies the names.
///
/// # Arguments
/// * `bytes` - Raw content of the uploaded file
///
/// # Returns
/// * `Result<Vec<String>, AppError>` - Trimmed, non-empty names in first-seen order
///
/// # Errors
/// * `Parse` if the bytes are not a readable workbook
/// * `Validation` if no `NAME` column exists
pub fn extract_names(bytes: &[u8]) -> Result<Vec<String>, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(AppError::parse("Failed to read spreadsheet: workbook has no sheets")),
    };

    let mut rows = range.rows();
    let header = rows.next().unwrap_or(&[]);
    let col = find_name_column(header)
        .ok_or_else(|| AppError::validation(format!("Column '{}' not found", NAME_COLUMN)))?;

    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for row in rows {
        let Some(value) = row.get(col).and_then(cell_text) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.to_string()) {
            names.push(value.to_string());
        }
    }

    Ok(names)
}

fn find_name_column(header: &[Data]) -> Option<usize> {
    // exact match first
    header
        .iter()
        .position(|cell| matches!(cell, Data::String(s) if s == NAME_COLUMN))
        .or_else(|| {
            header.iter().position(|cell| {
                cell_text(cell).is_some_and(|s| s.trim().to_uppercase() == NAME_COLUMN)
            })
        })
}

/// Text form of a cell; `None` for blanks and error values
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
