use crate::cell_data::CellRef;
use crate::error::{Result, TransformError};
use crate::options::TransformOptions;
use crate::sheet_data::{GridSheetData, SheetData};
use indexmap::IndexMap;
use sheetplate_primitives::address::{MAX_COLUMN_COUNT, MAX_ROW_COUNT};
use sheetplate_primitives::CellRange;
use sheetplate_sheet::Book;
use tracing::{debug, trace, warn};

/// Copies template cells into result cells within one book.
///
/// Every sheet is adapted once when the transformer is built, so reads
/// always see the template as it was before any transformation ran.
#[derive(Debug)]
pub struct Transformer {
    book: Book,
    options: TransformOptions,
    sheet_data: IndexMap<String, GridSheetData>,
}

impl Transformer {
    pub fn new(book: Book) -> Self {
        Self::with_options(book, TransformOptions::default())
    }

    pub fn with_options(book: Book, options: TransformOptions) -> Self {
        let sheet_data = book
            .sheets()
            .map(|sheet| {
                (
                    sheet.name().to_string(),
                    GridSheetData::adapt(sheet, &options),
                )
            })
            .collect();
        Self {
            book,
            options,
            sheet_data,
        }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn sheet_data(&self, name: &str) -> Result<&GridSheetData> {
        self.sheet_data
            .get(name)
            .ok_or_else(|| TransformError::SheetNotFound {
                name: name.to_string(),
            })
    }

    pub fn sheet_data_iter(&self) -> impl Iterator<Item = &GridSheetData> {
        self.sheet_data.values()
    }

    /// Copy the template cell at `src` to `target`.
    ///
    /// The value (or formula) is written, the row height copied, and any
    /// conditional formatting covering `src` is registered on `target`.
    /// The target sheet is created when missing. A source cell outside the
    /// adapted rows is a no-op.
    pub fn transform(&mut self, src: &CellRef, target: &CellRef) -> Result<()> {
        let sheet_data =
            self.sheet_data
                .get(&src.sheet_name)
                .ok_or_else(|| TransformError::SheetNotFound {
                    name: src.sheet_name.clone(),
                })?;
        let Some(row_data) = sheet_data.row_data(src.row) else {
            trace!(src = %src, "No template row");
            return Ok(());
        };
        let Some(cell_data) = row_data.cell_data(src.col) else {
            trace!(src = %src, "No template cell");
            return Ok(());
        };

        if !self.book.has_sheet(&target.sheet_name) {
            debug!(sheet = %target.sheet_name, "Creating target sheet");
            self.book.create_sheet(&target.sheet_name)?;
        }
        let target_sheet = self.book.sheet_mut(&target.sheet_name)?;
        let dest = target.address();

        target_sheet.set_cell_value(dest, cell_data.value().clone())?;
        if self.options.copy_row_heights {
            if let Some(height) = row_data.height() {
                target_sheet.create_row(dest.row)?.set_height(Some(height));
            }
        }
        if self.options.copy_conditional_formatting {
            sheet_data.update_conditional_formatting(cell_data, target_sheet, dest)?;
        }
        trace!(src = %src, target = %target, "Transformed cell");
        Ok(())
    }

    /// Copy every cell of `area` on `src_sheet` so that its top-left corner
    /// lands on `target`. Merged regions lying fully inside the area move
    /// along; those that would overlap an existing region are skipped.
    /// Returns the number of cells visited.
    pub fn transform_area(
        &mut self,
        src_sheet: &str,
        area: CellRange,
        target: &CellRef,
    ) -> Result<usize> {
        let area = area.normalized();
        let last_row = u64::from(target.row) + u64::from(area.rows()) - 1;
        let last_col = u64::from(target.col) + u64::from(area.cols()) - 1;
        if last_row >= u64::from(MAX_ROW_COUNT) || last_col >= u64::from(MAX_COLUMN_COUNT) {
            return Err(TransformError::TargetOutOfBounds {
                area,
                target: target.clone(),
            });
        }
        // in range: every shifted cell lies between target and (last_row, last_col)
        let shift = |row: u32, col: u32| {
            (
                target.row + (row - area.first_row()),
                target.col + (col - area.first_col()),
            )
        };

        let mut count = 0;
        for addr in area.iter() {
            let (row, col) = shift(addr.row, addr.col);
            self.transform(
                &CellRef::new(src_sheet, addr.row, addr.col),
                &CellRef::new(target.sheet_name.as_str(), row, col),
            )?;
            count += 1;
        }

        let regions: Vec<CellRange> = self
            .sheet_data(src_sheet)?
            .merged_regions()
            .iter()
            .filter(|region| area.contains(&region.start) && area.contains(&region.end))
            .copied()
            .collect();
        if !regions.is_empty() && !self.book.has_sheet(&target.sheet_name) {
            self.book.create_sheet(&target.sheet_name)?;
        }
        for region in regions {
            let (first_row, first_col) = shift(region.first_row(), region.first_col());
            let (last_row, last_col) = shift(region.last_row(), region.last_col());
            let moved = CellRange::from_bounds(first_row, last_row, first_col, last_col);
            let sheet = self.book.sheet_mut(&target.sheet_name)?;
            if let Err(e) = sheet.add_merged_region(moved) {
                warn!(region = %moved, error = %e, "Skipping merged region");
            }
        }

        debug!(
            src_sheet,
            area = %area,
            target = %target,
            cells = count,
            "Transformed area"
        );
        Ok(count)
    }

    /// Remove the cell at `cell`. Clearing a cell on a missing sheet is an error.
    pub fn clear_cell(&mut self, cell: &CellRef) -> Result<()> {
        self.book
            .sheet_mut(&cell.sheet_name)?
            .clear_cell(cell.address());
        Ok(())
    }

    /// Apply the template widths of `src_sheet` to the columns of `target_sheet`.
    pub fn copy_column_widths(&mut self, src_sheet: &str, target_sheet: &str) -> Result<()> {
        let Some(widths) = self.sheet_data(src_sheet)?.column_widths() else {
            return Ok(());
        };
        let widths = widths.to_vec();
        let sheet = self.book.sheet_mut(target_sheet)?;
        for (col, width) in (0u32..).zip(widths) {
            sheet.set_column_width(col, width)?;
        }
        Ok(())
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut Book {
        &mut self.book
    }

    pub fn into_book(self) -> Book {
        self.book
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetplate_sheet::{CellValue, ConditionalFormattingRule, Sheet};

    fn template() -> Book {
        let mut book = Book::new();
        let sheet = book.create_sheet("Template").unwrap();
        sheet.set_a1("A1", "Name").unwrap();
        sheet.set_a1("B1", CellValue::formula_with_cached("=1+1", CellValue::Int(2))).unwrap();
        sheet.create_row(0).unwrap().set_height(Some(24.0));
        sheet
            .conditional_formatting_mut()
            .add_conditional_formatting(
                &[CellRange::from_a1("B1").unwrap()],
                ConditionalFormattingRule::expression("=B1>1"),
            )
            .unwrap();
        book
    }

    #[test]
    fn test_transform_creates_target_sheet() {
        let mut transformer = Transformer::new(template());
        transformer
            .transform(&CellRef::new("Template", 0, 1), &CellRef::new("Result", 3, 2))
            .unwrap();

        let result = transformer.book().sheet("Result").unwrap();
        assert_eq!(
            result.get_a1("C4").unwrap().and_then(CellValue::formula_source),
            Some("=1+1")
        );
        assert_eq!(result.row(3).unwrap().height(), Some(24.0));
        let cf = result.conditional_formatting();
        assert_eq!(cf.num_conditional_formattings(), 1);
        assert_eq!(
            cf.conditional_formatting_at(0).unwrap().ranges(),
            &[CellRange::from_a1("C4").unwrap()]
        );
    }

    #[test]
    fn test_options_turn_off_copies() {
        let options = TransformOptions::default()
            .with_ignore_formulas(true)
            .with_conditional_formatting(false)
            .with_row_heights(false);
        let mut transformer = Transformer::with_options(template(), options);
        transformer
            .transform(&CellRef::new("Template", 0, 1), &CellRef::new("Template", 5, 1))
            .unwrap();

        let sheet = transformer.book().sheet("Template").unwrap();
        assert_eq!(sheet.get_a1("B6").unwrap(), Some(&CellValue::Int(2)));
        assert_eq!(sheet.row(5).unwrap().height(), None);
        assert_eq!(sheet.conditional_formatting().num_conditional_formattings(), 1);
    }

    #[test]
    fn test_missing_source() {
        let mut transformer = Transformer::new(template());
        assert!(matches!(
            transformer.transform(&CellRef::new("Nope", 0, 0), &CellRef::new("Out", 0, 0)),
            Err(TransformError::SheetNotFound { .. })
        ));
        transformer
            .transform(&CellRef::new("Template", 40, 0), &CellRef::new("Out", 0, 0))
            .unwrap();
        assert!(!transformer.book().has_sheet("Out"));
    }

    #[test]
    fn test_reads_see_template_snapshot() {
        let mut transformer = Transformer::new(template());
        transformer
            .transform(&CellRef::new("Template", 0, 1), &CellRef::new("Template", 0, 0))
            .unwrap();
        transformer
            .transform(&CellRef::new("Template", 0, 0), &CellRef::new("Template", 2, 0))
            .unwrap();
        let sheet = transformer.book().sheet("Template").unwrap();
        assert_eq!(sheet.get_a1("A3").unwrap(), Some(&CellValue::from("Name")));
    }

    #[test]
    fn test_clear_and_widths() {
        let mut book = template();
        book.sheet_mut("Template").unwrap().set_column_width(1, 5000).unwrap();
        book.add_sheet(Sheet::with_name("Out")).unwrap();
        let mut transformer = Transformer::new(book);

        transformer.clear_cell(&CellRef::new("Template", 0, 0)).unwrap();
        assert!(transformer.book().sheet("Template").unwrap().get_a1("A1").unwrap().is_none());
        assert!(transformer.clear_cell(&CellRef::new("Missing", 0, 0)).is_err());

        transformer.copy_column_widths("Template", "Out").unwrap();
        assert_eq!(transformer.book().sheet("Out").unwrap().column_width(1), 5000);
    }

    #[test]
    fn test_area_past_sheet_edge_writes_nothing() {
        let mut transformer = Transformer::new(template());
        let area = CellRange::from_a1("A1:B1").unwrap();

        let err = transformer
            .transform_area("Template", area, &CellRef::new("Out", u32::MAX, 0))
            .unwrap_err();
        assert!(matches!(err, TransformError::TargetOutOfBounds { .. }));

        // one column short of the edge
        let err = transformer
            .transform_area("Template", area, &CellRef::new("Out", 0, MAX_COLUMN_COUNT - 1))
            .unwrap_err();
        assert!(matches!(err, TransformError::TargetOutOfBounds { .. }));
        assert!(!transformer.book().has_sheet("Out"));

        let count = transformer
            .transform_area("Template", area, &CellRef::new("Out", MAX_ROW_COUNT - 1, MAX_COLUMN_COUNT - 2))
            .unwrap();
        assert_eq!(count, 2);
        let out = transformer.book().sheet("Out").unwrap();
        assert_eq!(out.last_row_num(), Some(MAX_ROW_COUNT - 1));
        assert_eq!(
            out.cell(sheetplate_primitives::CellAddress::new(MAX_ROW_COUNT - 1, MAX_COLUMN_COUNT - 2)),
            Some(&CellValue::from("Name"))
        );
    }
}
