use crate::options::TransformOptions;
use serde::{Deserialize, Serialize};
use sheetplate_primitives::address::{cell_to_address, split_sheet_reference};
use sheetplate_primitives::{AddressError, CellAddress};
use sheetplate_sheet::CellValue;
use std::fmt;

/// A cell position qualified by its sheet name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub sheet_name: String,
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(sheet_name: impl Into<String>, row: u32, col: u32) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            row,
            col,
        }
    }

    pub fn from_address(sheet_name: impl Into<String>, addr: CellAddress) -> Self {
        Self::new(sheet_name, addr.row, addr.col)
    }

    /// Parse `Sheet1!B2`, `'My Sheet'!B2` or a bare `B2` resolved against `default_sheet`.
    pub fn parse(reference: &str, default_sheet: &str) -> Result<Self, AddressError> {
        let (sheet, cell) = split_sheet_reference(reference.trim());
        let addr = CellAddress::from_a1(cell)?;
        Ok(Self::from_address(
            sheet.unwrap_or_else(|| default_sheet.to_string()),
            addr,
        ))
    }

    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cell_to_address(Some(&self.sheet_name), self.address()))
    }
}

/// Library-agnostic copy of one template cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellData {
    cell_ref: CellRef,
    value: CellValue,
}

impl CellData {
    /// Build cell data from a model cell. Missing cells become blank data.
    pub fn new(cell_ref: CellRef, value: Option<&CellValue>, options: &TransformOptions) -> Self {
        let value = match value {
            Some(value) if options.ignore_formulas => value.cached_or_self().clone(),
            Some(value) => value.clone(),
            None => CellValue::Null,
        };
        // A formula without a cached value has nothing to fall back to.
        let value = if options.ignore_formulas && value.is_formula() {
            CellValue::Null
        } else {
            value
        };
        Self { cell_ref, value }
    }

    pub fn cell_ref(&self) -> &CellRef {
        &self.cell_ref
    }

    pub fn row(&self) -> u32 {
        self.cell_ref.row
    }

    pub fn col(&self) -> u32 {
        self.cell_ref.col
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn formula(&self) -> Option<&str> {
        self.value.formula_source()
    }

    pub fn is_formula(&self) -> bool {
        self.value.is_formula()
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.value, CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_ref_parse_and_display() {
        let cell = CellRef::parse("'Sales Data'!C3", "Sheet1").unwrap();
        assert_eq!(cell, CellRef::new("Sales Data", 2, 2));
        assert_eq!(cell.to_string(), "'Sales Data'!C3");

        let bare = CellRef::parse("B2", "Template").unwrap();
        assert_eq!(bare, CellRef::new("Template", 1, 1));
        assert!(CellRef::parse("Sheet1!", "Sheet1").is_err());
    }

    #[test]
    fn test_ignore_formulas_uses_cached_value() {
        let formula = CellValue::formula_with_cached("=A1+1", CellValue::Int(2));
        let cell_ref = CellRef::new("S", 0, 1);

        let kept = CellData::new(cell_ref.clone(), Some(&formula), &TransformOptions::default());
        assert_eq!(kept.formula(), Some("=A1+1"));

        let options = TransformOptions::default().with_ignore_formulas(true);
        let cached = CellData::new(cell_ref.clone(), Some(&formula), &options);
        assert_eq!(cached.value(), &CellValue::Int(2));

        let uncached = CellData::new(cell_ref, Some(&CellValue::formula("=A1")), &options);
        assert!(uncached.is_blank());
    }
}
