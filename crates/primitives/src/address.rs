//! Helpers for spreadsheet-style A1 references with sheet prefixes.

use crate::{AddressError, CellAddress, CellRange};

pub const MAX_ROW_COUNT: u32 = 1_048_576;
pub const MAX_COLUMN_COUNT: u32 = 16_384;

/// Convert column index to letter (0 -> A, 1 -> B, 25 -> Z, 26 -> AA, etc.).
pub fn column_index_to_letter(index: u32) -> String {
    let mut n = index;
    let mut out = String::new();
    loop {
        let rem = (n % 26) as u8;
        out.push((b'A' + rem) as char);
        n /= 26;
        if n == 0 {
            break;
        }
        n -= 1;
    }
    out.chars().rev().collect()
}

/// Convert column letter to index (A -> 0, B -> 1, Z -> 25, AA -> 26, etc.).
pub fn column_letter_to_index(s: &str) -> Result<u32, AddressError> {
    if s.is_empty() {
        return Err(AddressError::InvalidColumn(s.to_string()));
    }
    let mut result = 0u32;
    for c in s.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(AddressError::InvalidColumn(s.to_string()));
        }
        let value = u32::from(c.to_ascii_uppercase() as u8 - b'A' + 1);
        result = result
            .checked_mul(26)
            .and_then(|v| v.checked_add(value))
            .ok_or_else(|| AddressError::InvalidColumn(s.to_string()))?;
    }
    Ok(result - 1)
}

/// Convert a cell address to A1 notation with an optional sheet prefix.
pub fn cell_to_address(sheet_name: Option<&str>, cell: CellAddress) -> String {
    format!("{}{}", sheet_prefix(sheet_name), cell.to_a1())
}

/// Convert a cell range to address.
pub fn cell_range_to_address(sheet_name: Option<&str>, range: CellRange) -> String {
    format!("{}{}:{}", sheet_prefix(sheet_name), range.start, range.end)
}

/// Split "Sheet1!B2" or "'Sales Data'!B2" into the sheet name and the cell part.
pub fn split_sheet_reference(reference: &str) -> (Option<String>, &str) {
    match reference.rsplit_once('!') {
        Some((sheet, cell)) => (desanitize_sheet_name(Some(sheet)), cell),
        None => (None, reference),
    }
}

/// Sanitize sheet names with special characters.
pub fn sanitize_sheet_name(name: Option<&str>) -> Option<String> {
    let name = name?;
    if name
        .chars()
        .any(|c| c.is_whitespace() || !c.is_ascii_alphanumeric())
    {
        let escaped = name.replace('\'', "''");
        return Some(format!("'{}'", escaped));
    }
    Some(name.to_string())
}

/// Remove single quotes from sheet name.
pub fn desanitize_sheet_name(name: Option<&str>) -> Option<String> {
    let name = name?;
    let trimmed = name.strip_prefix('\'').unwrap_or(name);
    let trimmed = trimmed.strip_suffix('\'').unwrap_or(trimmed);
    Some(trimmed.replace("''", "'"))
}

fn sheet_prefix(sheet_name: Option<&str>) -> String {
    sheet_name
        .map(|name| format!("{}!", sanitize_sheet_name(Some(name)).unwrap_or_default()))
        .unwrap_or_default()
}
