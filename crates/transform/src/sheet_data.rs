//! Library-agnostic view of a template sheet.
//!
//! [`SheetData`] is what the transformation layer reads: rows of cell data,
//! merged regions, column widths, and a hook that mirrors conditional
//! formatting onto generated cells. [`GridSheetData`] implements it on top of
//! the sheetplate sheet model.

use crate::cell_data::CellData;
use crate::conditional_formatting::ConditionalFormattingEntry;
use crate::error::Result;
use crate::options::TransformOptions;
use crate::row_data::RowData;
use sheetplate_primitives::{CellAddress, CellRange};
use sheetplate_sheet::Sheet;
use tracing::{debug, trace};

/// Read access to an adapted template sheet.
pub trait SheetData {
    /// Sheet type generated cells are written to.
    type Target;

    fn sheet_name(&self) -> &str;

    /// One slot per row index up to the last row; missing rows are `None`.
    fn rows(&self) -> &[Option<RowData>];

    fn merged_regions(&self) -> &[CellRange];

    /// Width per column, or `None` when no row holds any cell.
    fn column_widths(&self) -> Option<&[u32]>;

    /// Register on `target` every conditional formatting rule whose range
    /// contains `src`, scoped to the single cell `dest`. Returns the number
    /// of blocks added.
    fn update_conditional_formatting(
        &self,
        src: &CellData,
        target: &mut Self::Target,
        dest: CellAddress,
    ) -> Result<usize>;

    fn number_of_rows(&self) -> usize {
        self.rows().len()
    }

    fn row_data(&self, row: u32) -> Option<&RowData> {
        self.rows().get(row as usize).and_then(Option::as_ref)
    }

    fn cell_data(&self, row: u32, col: u32) -> Option<&CellData> {
        self.row_data(row).and_then(|data| data.cell_data(col))
    }

    fn column_width(&self, col: u32) -> Option<u32> {
        self.column_widths()
            .and_then(|widths| widths.get(col as usize).copied())
    }
}

/// Sheet data copied out of a [`Sheet`].
#[derive(Debug, Clone)]
pub struct GridSheetData {
    sheet_name: String,
    rows: Vec<Option<RowData>>,
    merged_regions: Vec<CellRange>,
    column_widths: Option<Vec<u32>>,
    conditional_formattings: Vec<ConditionalFormattingEntry>,
    options: TransformOptions,
}

impl GridSheetData {
    /// Copy rows, merged regions, column widths and conditional formatting
    /// from `sheet` in a single pass.
    pub fn adapt(sheet: &Sheet, options: &TransformOptions) -> Self {
        let sheet_name = sheet.name().to_string();

        let mut rows = Vec::new();
        let mut max_cell_count = 0;
        if let Some(last_row) = sheet.last_row_num() {
            rows.reserve(last_row as usize + 1);
            for index in 0..=last_row {
                let row = RowData::from_row(&sheet_name, index, sheet.row(index), options);
                if let Some(row) = &row {
                    max_cell_count = max_cell_count.max(row.number_of_cells());
                }
                rows.push(row);
            }
        }

        let merged_regions = sheet.merged_regions().to_vec();

        let column_widths = (max_cell_count > 0).then(|| {
            (0..max_cell_count)
                .map(|col| sheet.column_width(col as u32))
                .collect::<Vec<_>>()
        });

        let conditional_formattings: Vec<_> = sheet
            .conditional_formatting()
            .iter()
            .map(ConditionalFormattingEntry::from)
            .collect();

        debug!(
            sheet = %sheet_name,
            rows = rows.len(),
            columns = max_cell_count,
            merged_regions = merged_regions.len(),
            conditional_formattings = conditional_formattings.len(),
            "Adapted sheet"
        );

        Self {
            sheet_name,
            rows,
            merged_regions,
            column_widths,
            conditional_formattings,
            options: options.clone(),
        }
    }

    pub fn conditional_formattings(&self) -> &[ConditionalFormattingEntry] {
        &self.conditional_formattings
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }
}

impl SheetData for GridSheetData {
    type Target = Sheet;

    fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn rows(&self) -> &[Option<RowData>] {
        &self.rows
    }

    fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    fn column_widths(&self) -> Option<&[u32]> {
        self.column_widths.as_deref()
    }

    fn update_conditional_formatting(
        &self,
        src: &CellData,
        target: &mut Sheet,
        dest: CellAddress,
    ) -> Result<usize> {
        let dest_range = [CellRange::single(dest)];
        let mut added = 0;
        for entry in &self.conditional_formattings {
            for _ in entry.matching_ranges(src.row(), src.col()) {
                for rule in entry.rules() {
                    target
                        .conditional_formatting_mut()
                        .add_conditional_formatting(&dest_range, rule.clone())?;
                    added += 1;
                }
            }
        }
        if added > 0 {
            trace!(
                src = %src.cell_ref(),
                dest = %dest,
                added,
                "Copied conditional formatting"
            );
        }
        Ok(added)
    }
}
