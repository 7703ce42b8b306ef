use crate::cell::CellValue;
use std::collections::BTreeMap;

/// One physical row of a sheet. Cells are stored sparsely by column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    height: Option<f64>,
    cells: BTreeMap<u32, CellValue>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Row height in points, `None` when the sheet default applies.
    #[must_use]
    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn set_height(&mut self, height: Option<f64>) {
        self.height = height;
    }

    #[must_use]
    pub fn cell(&self, col: u32) -> Option<&CellValue> {
        self.cells.get(&col)
    }

    /// Store a value, returning the previous one.
    pub fn set_cell(&mut self, col: u32, value: impl Into<CellValue>) -> Option<CellValue> {
        self.cells.insert(col, value.into())
    }

    pub fn remove_cell(&mut self, col: u32) -> Option<CellValue> {
        self.cells.remove(&col)
    }

    /// Index of the last defined cell plus one, or 0 when the row has no cells.
    #[must_use]
    pub fn last_cell_num(&self) -> u32 {
        self.cells.keys().next_back().map_or(0, |col| col + 1)
    }

    /// Number of cells actually stored (gaps are not counted).
    #[must_use]
    pub fn physical_cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate stored cells in column order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, &CellValue)> {
        self.cells.iter().map(|(col, value)| (*col, value))
    }
}
