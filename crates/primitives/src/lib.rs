//! # Sheetplate Primitives
//!
//! Cell addresses and rectangular ranges shared by the sheet model and the
//! template transformation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod address;

/// A cell address in the spreadsheet (e.g., A1, B2, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse from A1 notation (e.g., "A1", "B2", "$C$3").
    ///
    /// Rows past 1048576 and columns past `XFD` are rejected.
    pub fn from_a1(s: &str) -> Result<Self, AddressError> {
        let reference = s.trim();
        if reference.is_empty() {
            return Err(AddressError::InvalidRange("Empty A1 reference".to_string()));
        }

        let body = reference.strip_prefix('$').unwrap_or(reference);
        let letters_end = body
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(body.len());
        let (letters, rest) = body.split_at(letters_end);
        let digits = rest.strip_prefix('$').unwrap_or(rest);

        if letters.is_empty() {
            return Err(AddressError::InvalidColumn(reference.to_string()));
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressError::InvalidRow(reference.to_string()));
        }

        let row = digits
            .parse::<u32>()
            .ok()
            .filter(|row| (1..=address::MAX_ROW_COUNT).contains(row))
            .ok_or_else(|| AddressError::InvalidRow(reference.to_string()))?;
        let col = address::column_letter_to_index(letters)
            .ok()
            .filter(|col| *col < address::MAX_COLUMN_COUNT)
            .ok_or_else(|| AddressError::InvalidColumn(reference.to_string()))?;
        Ok(Self::new(row - 1, col))
    }

    /// Convert to A1 notation
    pub fn to_a1(&self) -> String {
        format!("{}{}", address::column_index_to_letter(self.col), self.row + 1)
    }
}

/// A rectangular range of cells (e.g., A1:B10), inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self { start, end }
    }

    /// Create a range from first/last row and column indices.
    pub fn from_bounds(first_row: u32, last_row: u32, first_col: u32, last_col: u32) -> Self {
        Self::new(
            CellAddress::new(first_row, first_col),
            CellAddress::new(last_row, last_col),
        )
    }

    /// A range covering exactly one cell.
    pub fn single(addr: CellAddress) -> Self {
        Self::new(addr, addr)
    }

    /// Parse "A1:B2" or a single "A1" reference.
    pub fn from_a1(s: &str) -> Result<Self, AddressError> {
        match s.split_once(':') {
            Some((start, end)) => Ok(Self::new(
                CellAddress::from_a1(start)?,
                CellAddress::from_a1(end)?,
            )),
            None => CellAddress::from_a1(s).map(Self::single),
        }
    }

    /// Return a normalized range where start <= end
    pub fn normalized(&self) -> Self {
        let start_row = self.start.row.min(self.end.row);
        let end_row = self.start.row.max(self.end.row);
        let start_col = self.start.col.min(self.end.col);
        let end_col = self.start.col.max(self.end.col);
        Self {
            start: CellAddress::new(start_row, start_col),
            end: CellAddress::new(end_row, end_col),
        }
    }

    pub fn first_row(&self) -> u32 {
        self.start.row.min(self.end.row)
    }

    pub fn last_row(&self) -> u32 {
        self.start.row.max(self.end.row)
    }

    pub fn first_col(&self) -> u32 {
        self.start.col.min(self.end.col)
    }

    pub fn last_col(&self) -> u32 {
        self.start.col.max(self.end.col)
    }

    /// Number of rows in the range
    pub fn rows(&self) -> u32 {
        self.last_row() - self.first_row() + 1
    }

    /// Number of columns in the range
    pub fn cols(&self) -> u32 {
        self.last_col() - self.first_col() + 1
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        self.contains_cell(addr.row, addr.col)
    }

    /// Check if the given row/column lies within this range (inclusive).
    pub fn contains_cell(&self, row: u32, col: u32) -> bool {
        row >= self.first_row()
            && row <= self.last_row()
            && col >= self.first_col()
            && col <= self.last_col()
    }

    /// Check whether two ranges share at least one cell.
    pub fn intersects(&self, other: &CellRange) -> bool {
        self.first_row() <= other.last_row()
            && other.first_row() <= self.last_row()
            && self.first_col() <= other.last_col()
            && other.first_col() <= self.last_col()
    }

    /// Whether this range covers exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Get total number of cells in range
    pub fn size(&self) -> usize {
        self.rows() as usize * self.cols() as usize
    }

    /// Iterate over all addresses in row-major order
    pub fn iter(&self) -> CellRangeIter {
        let range = self.normalized();
        CellRangeIter {
            range,
            next: Some(range.start),
        }
    }
}

/// Errors that can occur when parsing addresses
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid column: {0}")]
    InvalidColumn(String),
    #[error("Invalid row: {0}")]
    InvalidRow(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Iterator over a cell range in row-major order
pub struct CellRangeIter {
    range: CellRange,
    next: Option<CellAddress>,
}

impl Iterator for CellRangeIter {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current.col < self.range.end.col {
            Some(CellAddress::new(current.row, current.col + 1))
        } else if current.row < self.range.end.row {
            Some(CellAddress::new(current.row + 1, self.range.start.col))
        } else {
            None
        };
        Some(current)
    }
}
