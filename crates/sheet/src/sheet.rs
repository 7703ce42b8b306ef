use crate::cell::CellValue;
use crate::conditional_formatting::SheetConditionalFormatting;
use crate::error::{Result, SheetError};
use crate::row::Row;
use sheetplate_primitives::address::{MAX_COLUMN_COUNT, MAX_ROW_COUNT};
use sheetplate_primitives::{CellAddress, CellRange};
use std::collections::BTreeMap;

/// Default column width in 1/256 character units (8 characters).
pub const DEFAULT_COLUMN_WIDTH: u32 = 8 * 256;

/// Widest column Excel accepts, in 1/256 character units.
pub const MAX_COLUMN_WIDTH: u32 = 255 * 256;

/// A sheet: sparse rows plus the layout metadata a template carries
/// (merged regions, column widths and conditional formatting).
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, Row>,
    merged_regions: Vec<CellRange>,
    column_widths: BTreeMap<u32, u32>,
    default_column_width: u32,
    conditional_formatting: SheetConditionalFormatting,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            rows: BTreeMap::new(),
            merged_regions: Vec::new(),
            column_widths: BTreeMap::new(),
            default_column_width: DEFAULT_COLUMN_WIDTH,
            conditional_formatting: SheetConditionalFormatting::default(),
        }
    }

    /// Create a sheet from a 2D vector of values, one `Row` per inner vector.
    /// `CellValue::Null` entries are skipped so rows stay sparse.
    pub fn from_data<T: Into<CellValue>>(name: &str, data: Vec<Vec<T>>) -> Result<Self> {
        let mut sheet = Self::with_name(name);
        for (row_idx, values) in (0u32..).zip(data) {
            sheet.create_row(row_idx)?;
            for (col_idx, value) in (0u32..).zip(values) {
                let value = value.into();
                if !value.is_null() {
                    sheet.set_cell_value(CellAddress::new(row_idx, col_idx), value)?;
                }
            }
        }
        Ok(sheet)
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    // ===== Rows and cells =====

    /// Index of the last row that exists, or `None` for a sheet without rows.
    #[must_use]
    pub fn last_row_num(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Number of rows that physically exist.
    #[must_use]
    pub fn physical_row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn row(&self, index: u32) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// Return the row at `index`, creating an empty one if needed.
    pub fn create_row(&mut self, index: u32) -> Result<&mut Row> {
        check_row(index)?;
        Ok(self.rows.entry(index).or_default())
    }

    /// Iterate existing rows in index order.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &Row)> {
        self.rows.iter().map(|(idx, row)| (*idx, row))
    }

    #[must_use]
    pub fn cell(&self, addr: CellAddress) -> Option<&CellValue> {
        self.rows.get(&addr.row).and_then(|row| row.cell(addr.col))
    }

    /// Store a value, creating the row if it does not exist yet.
    pub fn set_cell_value(&mut self, addr: CellAddress, value: impl Into<CellValue>) -> Result<()> {
        check_column(addr.col)?;
        self.create_row(addr.row)?.set_cell(addr.col, value);
        Ok(())
    }

    /// Remove a cell, leaving the row in place.
    pub fn clear_cell(&mut self, addr: CellAddress) -> Option<CellValue> {
        self.rows
            .get_mut(&addr.row)
            .and_then(|row| row.remove_cell(addr.col))
    }

    /// Get a cell using A1 notation
    pub fn get_a1(&self, notation: &str) -> Result<Option<&CellValue>> {
        let addr = CellAddress::from_a1(notation)?;
        Ok(self.cell(addr))
    }

    /// Set a cell using A1 notation
    pub fn set_a1(&mut self, notation: &str, value: impl Into<CellValue>) -> Result<()> {
        let addr = CellAddress::from_a1(notation)?;
        self.set_cell_value(addr, value)
    }

    // ===== Merged regions =====

    /// Merge a range. Returns the index of the new region.
    pub fn add_merged_region(&mut self, range: CellRange) -> Result<usize> {
        let range = range.normalized();
        if range.is_single_cell() {
            return Err(SheetError::MergedRegionTooSmall { range });
        }
        check_row(range.end.row)?;
        check_column(range.end.col)?;
        if let Some(existing) = self.merged_regions.iter().find(|r| r.intersects(&range)) {
            return Err(SheetError::MergedRegionOverlap {
                range,
                existing: *existing,
            });
        }
        self.merged_regions.push(range);
        Ok(self.merged_regions.len() - 1)
    }

    #[must_use]
    pub fn num_merged_regions(&self) -> usize {
        self.merged_regions.len()
    }

    #[must_use]
    pub fn merged_region(&self, index: usize) -> Option<CellRange> {
        self.merged_regions.get(index).copied()
    }

    #[must_use]
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    pub fn remove_merged_region(&mut self, index: usize) -> Result<CellRange> {
        if index >= self.merged_regions.len() {
            return Err(SheetError::MergedRegionIndexOutOfBounds {
                index,
                count: self.merged_regions.len(),
            });
        }
        Ok(self.merged_regions.remove(index))
    }

    // ===== Column widths =====

    /// Width of a column in 1/256 character units.
    #[must_use]
    pub fn column_width(&self, col: u32) -> u32 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(self.default_column_width)
    }

    pub fn set_column_width(&mut self, col: u32, width: u32) -> Result<()> {
        check_column(col)?;
        if width > MAX_COLUMN_WIDTH {
            return Err(SheetError::ColumnWidthTooLarge {
                col,
                width,
                max: MAX_COLUMN_WIDTH,
            });
        }
        self.column_widths.insert(col, width);
        Ok(())
    }

    /// Columns whose width differs from the default, in column order.
    pub fn custom_column_widths(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.column_widths.iter().map(|(col, width)| (*col, *width))
    }

    #[must_use]
    pub fn default_column_width(&self) -> u32 {
        self.default_column_width
    }

    /// Width used by columns without an explicit width, capped at the maximum.
    pub fn set_default_column_width(&mut self, width: u32) {
        self.default_column_width = width.min(MAX_COLUMN_WIDTH);
    }

    // ===== Conditional formatting =====

    #[must_use]
    pub fn conditional_formatting(&self) -> &SheetConditionalFormatting {
        &self.conditional_formatting
    }

    pub fn conditional_formatting_mut(&mut self) -> &mut SheetConditionalFormatting {
        &mut self.conditional_formatting
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

fn check_row(row: u32) -> Result<()> {
    if row >= MAX_ROW_COUNT {
        return Err(SheetError::RowIndexOutOfBounds {
            index: row,
            max: MAX_ROW_COUNT - 1,
        });
    }
    Ok(())
}

fn check_column(col: u32) -> Result<()> {
    if col >= MAX_COLUMN_COUNT {
        return Err(SheetError::ColumnIndexOutOfBounds {
            index: col,
            max: MAX_COLUMN_COUNT - 1,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_skips_nulls() {
        let sheet = Sheet::from_data(
            "Data",
            vec![vec![CellValue::Int(1), CellValue::Null, CellValue::Int(3)]],
        )
        .unwrap();
        let row = sheet.row(0).unwrap();
        assert_eq!(row.physical_cell_count(), 2);
        assert_eq!(row.last_cell_num(), 3);
    }

    #[test]
    fn test_last_row_num() {
        let mut sheet = Sheet::new();
        assert_eq!(sheet.last_row_num(), None);

        sheet.set_a1("C7", "x").unwrap();
        assert_eq!(sheet.last_row_num(), Some(6));
        assert_eq!(sheet.physical_row_count(), 1);
        assert!(sheet.row(3).is_none());
    }

    #[test]
    fn test_set_cell_out_of_bounds() {
        let mut sheet = Sheet::new();
        let result = sheet.set_cell_value(CellAddress::new(MAX_ROW_COUNT, 0), 1);
        assert!(matches!(result, Err(SheetError::RowIndexOutOfBounds { .. })));
        let result = sheet.set_cell_value(CellAddress::new(0, MAX_COLUMN_COUNT), 1);
        assert!(matches!(result, Err(SheetError::ColumnIndexOutOfBounds { .. })));
        assert_eq!(sheet.physical_row_count(), 0);
    }

    #[test]
    fn test_create_row_bounds() {
        let mut sheet = Sheet::new();
        sheet.create_row(MAX_ROW_COUNT - 1).unwrap().set_height(Some(12.0));
        assert_eq!(sheet.last_row_num(), Some(MAX_ROW_COUNT - 1));

        assert!(matches!(
            sheet.create_row(MAX_ROW_COUNT),
            Err(SheetError::RowIndexOutOfBounds { index, .. }) if index == MAX_ROW_COUNT
        ));
        assert!(matches!(
            sheet.create_row(u32::MAX),
            Err(SheetError::RowIndexOutOfBounds { .. })
        ));
        assert_eq!(sheet.physical_row_count(), 1);
    }

    #[test]
    fn test_merged_region_validation() {
        let mut sheet = Sheet::new();
        assert_eq!(sheet.add_merged_region(CellRange::from_a1("A1:B2").unwrap()).unwrap(), 0);

        let overlap = sheet.add_merged_region(CellRange::from_a1("B2:C3").unwrap());
        assert!(matches!(overlap, Err(SheetError::MergedRegionOverlap { .. })));

        let single = sheet.add_merged_region(CellRange::from_a1("D4").unwrap());
        assert!(matches!(single, Err(SheetError::MergedRegionTooSmall { .. })));

        assert_eq!(sheet.num_merged_regions(), 1);
        assert_eq!(sheet.remove_merged_region(0).unwrap(), CellRange::from_a1("A1:B2").unwrap());
        assert!(sheet.remove_merged_region(0).is_err());
    }

    #[test]
    fn test_column_width_defaults() {
        let mut sheet = Sheet::new();
        assert_eq!(sheet.column_width(3), DEFAULT_COLUMN_WIDTH);

        sheet.set_column_width(3, 4000).unwrap();
        assert_eq!(sheet.column_width(3), 4000);
        assert_eq!(sheet.custom_column_widths().collect::<Vec<_>>(), vec![(3, 4000)]);

        let too_wide = sheet.set_column_width(1, MAX_COLUMN_WIDTH + 1);
        assert!(matches!(too_wide, Err(SheetError::ColumnWidthTooLarge { .. })));

        sheet.set_default_column_width(3000);
        assert_eq!(sheet.column_width(0), 3000);
        assert_eq!(sheet.column_width(3), 4000);
        sheet.set_default_column_width(u32::MAX);
        assert_eq!(sheet.default_column_width(), MAX_COLUMN_WIDTH);
    }
}
