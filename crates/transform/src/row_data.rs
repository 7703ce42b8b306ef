use crate::cell_data::{CellData, CellRef};
use crate::options::TransformOptions;
use sheetplate_sheet::Row;

/// One template row: its height and a dense list of cells.
///
/// Cells are indexed by column. Gaps in the source row are filled with
/// blank cell data up to the row's last physical cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RowData {
    height: Option<f64>,
    cells: Vec<CellData>,
}

impl RowData {
    /// Adapt a model row. Returns `None` when the row does not exist.
    pub fn from_row(
        sheet_name: &str,
        row_index: u32,
        row: Option<&Row>,
        options: &TransformOptions,
    ) -> Option<Self> {
        let row = row?;
        let cells = (0..row.last_cell_num())
            .map(|col| {
                CellData::new(
                    CellRef::new(sheet_name, row_index, col),
                    row.cell(col),
                    options,
                )
            })
            .collect();
        Some(Self {
            height: row.height(),
            cells,
        })
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_data(&self, col: u32) -> Option<&CellData> {
        self.cells.get(col as usize)
    }

    pub fn cells(&self) -> &[CellData] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetplate_sheet::CellValue;

    #[test]
    fn test_missing_row() {
        assert!(RowData::from_row("S", 3, None, &TransformOptions::default()).is_none());
    }

    #[test]
    fn test_gaps_are_blank() {
        let mut row = Row::new();
        row.set_cell(0, "a");
        row.set_cell(3, 7);
        row.set_height(Some(18.0));

        let data = RowData::from_row("S", 4, Some(&row), &TransformOptions::default()).unwrap();
        assert_eq!(data.number_of_cells(), 4);
        assert_eq!(data.height(), Some(18.0));
        assert!(data.cell_data(1).unwrap().is_blank());
        assert_eq!(data.cell_data(3).unwrap().value(), &CellValue::Int(7));
        assert_eq!(data.cell_data(3).unwrap().cell_ref(), &CellRef::new("S", 4, 3));
        assert!(data.cell_data(4).is_none());
    }

    #[test]
    fn test_empty_row_has_no_cells() {
        let row = Row::new();
        let data = RowData::from_row("S", 0, Some(&row), &TransformOptions::default()).unwrap();
        assert_eq!(data.number_of_cells(), 0);
    }
}
