use crate::book::Book;
use crate::cell::CellValue;
use crate::conditional_formatting::{
    CellIsOperator, ConditionalFormattingRule, DifferentialFormat, RuleKind,
};
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use crate::xlsx_layout::{SheetLayout, XlsxPackage};
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{
    Color, ConditionalFormat3ColorScale, ConditionalFormatCell, ConditionalFormatCellRule,
    ConditionalFormatDataBar, ConditionalFormatFormula, Format, FormatPattern, Formula, Workbook,
    Worksheet,
};
use sheetplate_primitives::address::MAX_COLUMN_COUNT;
use sheetplate_primitives::{CellAddress, CellRange};
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Options for reading Excel files
#[derive(Debug, Clone)]
pub struct XlsxReadOptions {
    /// Keep formula sources (with their cached values) instead of plain values
    pub formulas: bool,
    /// Load `<mergeCell>` regions
    pub merged_regions: bool,
    /// Load `<col>` widths and the sheet default width
    pub column_widths: bool,
    /// Load `<conditionalFormatting>` blocks and their dxf formats
    pub conditional_formatting: bool,
}

impl Default for XlsxReadOptions {
    fn default() -> Self {
        Self {
            formulas: true,
            merged_regions: true,
            column_widths: true,
            conditional_formatting: true,
        }
    }
}

impl XlsxReadOptions {
    #[must_use]
    pub fn with_formulas(mut self, formulas: bool) -> Self {
        self.formulas = formulas;
        self
    }

    #[must_use]
    pub fn with_merged_regions(mut self, merged_regions: bool) -> Self {
        self.merged_regions = merged_regions;
        self
    }

    #[must_use]
    pub fn with_column_widths(mut self, column_widths: bool) -> Self {
        self.column_widths = column_widths;
        self
    }

    #[must_use]
    pub fn with_conditional_formatting(mut self, conditional_formatting: bool) -> Self {
        self.conditional_formatting = conditional_formatting;
        self
    }

    fn reads_layout(&self) -> bool {
        self.column_widths || self.conditional_formatting
    }
}

fn xlsx_error(e: impl Display) -> SheetError {
    SheetError::Xlsx(e.to_string())
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel serial date (days since 1899-12-30)
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// Address of the cell at `(row, col)` relative to a range starting at `start`.
fn offset_address(start: (u32, u32), row: usize, col: usize) -> Result<CellAddress> {
    let offset = |base: u32, delta: usize| u32::try_from(delta).ok().and_then(|d| base.checked_add(d));
    match (offset(start.0, row), offset(start.1, col)) {
        (Some(row), Some(col)) => Ok(CellAddress::new(row, col)),
        _ => Err(xlsx_error(format!(
            "cell offset ({row}, {col}) from ({}, {}) is past the sheet limits",
            start.0, start.1
        ))),
    }
}

fn apply_layout(sheet: &mut Sheet, layout: SheetLayout, options: &XlsxReadOptions) -> Result<()> {
    if options.column_widths {
        if let Some(width) = layout.default_column_width {
            sheet.set_default_column_width(width);
        }
        for (col, width) in layout.column_widths {
            sheet.set_column_width(col, width)?;
        }
    }
    if options.conditional_formatting {
        for (ranges, rules) in layout.conditional_formatting {
            sheet
                .conditional_formatting_mut()
                .add_conditional_formatting_rules(&ranges, rules)?;
        }
    }
    Ok(())
}

fn column_number(col: u32) -> Result<u16> {
    u16::try_from(col).map_err(|_| SheetError::ColumnIndexOutOfBounds {
        index: col,
        max: MAX_COLUMN_COUNT - 1,
    })
}

impl Book {
    /// Load a book from an Excel file (all sheets)
    ///
    /// Values, formulas and merged regions come from calamine. Column widths
    /// and conditional formatting are read from the package parts directly.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_xlsx_with_options(path, &XlsxReadOptions::default())
    }

    /// Load a book from an Excel file with options
    pub fn from_xlsx_with_options<P: AsRef<Path>>(
        path: P,
        options: &XlsxReadOptions,
    ) -> Result<Self> {
        let mut workbook: Xlsx<BufReader<File>> =
            open_workbook(path.as_ref()).map_err(xlsx_error)?;

        if options.merged_regions {
            workbook.load_merged_regions().map_err(xlsx_error)?;
        }

        let mut package = if options.reads_layout() {
            Some(XlsxPackage::open(BufReader::new(File::open(path.as_ref())?))?)
        } else {
            None
        };

        let sheet_names = workbook.sheet_names().to_vec();
        let mut book = Book::new();

        for sheet_name in sheet_names {
            let mut sheet = Sheet::with_name(&sheet_name);

            let range = workbook.worksheet_range(&sheet_name).map_err(xlsx_error)?;
            let start = range.start().unwrap_or((0, 0));
            for (row, col, data) in range.used_cells() {
                let addr = offset_address(start, row, col)?;
                sheet.set_cell_value(addr, data_to_cell_value(data))?;
            }

            if options.formulas {
                let formulas = workbook
                    .worksheet_formula(&sheet_name)
                    .map_err(xlsx_error)?;
                let start = formulas.start().unwrap_or((0, 0));
                for (row, col, source) in formulas.used_cells() {
                    if source.is_empty() {
                        continue;
                    }
                    let addr = offset_address(start, row, col)?;
                    let cached = sheet.cell(addr).cloned().unwrap_or_default();
                    sheet.set_cell_value(addr, CellValue::formula_with_cached(source.as_str(), cached))?;
                }
            }

            if options.merged_regions {
                for (_, _, dims) in workbook.merged_regions_by_sheet(&sheet_name) {
                    let region = CellRange::new(
                        CellAddress::new(dims.start.0, dims.start.1),
                        CellAddress::new(dims.end.0, dims.end.1),
                    );
                    if let Err(e) = sheet.add_merged_region(region) {
                        warn!(sheet = %sheet_name, %region, "skipping merged region: {e}");
                    }
                }
            }

            if let Some(package) = package.as_mut() {
                let layout = package.sheet_layout(&sheet_name)?;
                apply_layout(&mut sheet, layout, options)?;
            }

            debug!(
                sheet = %sheet_name,
                rows = sheet.physical_row_count(),
                merged_regions = sheet.num_merged_regions(),
                column_widths = sheet.custom_column_widths().count(),
                conditional_formattings = sheet.conditional_formatting().num_conditional_formattings(),
                "loaded worksheet"
            );
            book.add_sheet(sheet)?;
        }

        Ok(book)
    }

    /// Save the book to an Excel file
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();

        for sheet in self.sheets() {
            let worksheet = workbook.add_worksheet();
            write_sheet(sheet, worksheet)?;
        }

        workbook.save(path.as_ref()).map_err(xlsx_error)?;
        Ok(())
    }

    /// Get sheet names from an Excel file without loading data
    pub fn xlsx_sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let workbook: Xlsx<BufReader<File>> = open_workbook(path.as_ref()).map_err(xlsx_error)?;
        Ok(workbook.sheet_names().to_vec())
    }
}

fn write_sheet(sheet: &Sheet, worksheet: &mut Worksheet) -> Result<()> {
    worksheet.set_name(sheet.name()).map_err(xlsx_error)?;

    for (col, width) in sheet.custom_column_widths() {
        worksheet
            .set_column_width(column_number(col)?, f64::from(width) / 256.0)
            .map_err(xlsx_error)?;
    }

    // Merge before writing values so the top-left value is not blanked.
    let merge_format = Format::new();
    for region in sheet.merged_regions() {
        worksheet
            .merge_range(
                region.first_row(),
                column_number(region.first_col())?,
                region.last_row(),
                column_number(region.last_col())?,
                "",
                &merge_format,
            )
            .map_err(xlsx_error)?;
    }

    for (row_idx, row) in sheet.rows() {
        if let Some(height) = row.height() {
            worksheet.set_row_height(row_idx, height).map_err(xlsx_error)?;
        }
        for (col_idx, value) in row.cells() {
            write_cell(worksheet, row_idx, column_number(col_idx)?, value)?;
        }
    }

    for block in sheet.conditional_formatting() {
        for rule in block.rules() {
            write_conditional_format(worksheet, block.ranges(), rule)?;
        }
    }

    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<()> {
    match value {
        CellValue::Null => return Ok(()),
        CellValue::Bool(b) => worksheet.write_boolean(row, col, *b),
        // Excel stores all numbers as f64; integers above 2^53 lose precision
        CellValue::Int(i) => worksheet.write_number(row, col, *i as f64),
        CellValue::Float(f) => worksheet.write_number(row, col, *f),
        CellValue::String(s) => worksheet.write_string(row, col, s),
        CellValue::Formula(formula) => {
            let mut xlsx_formula = Formula::new(&formula.source);
            if let Some(cached) = &formula.cached {
                xlsx_formula = xlsx_formula.set_result(cached.to_string());
            }
            worksheet.write_formula(row, col, xlsx_formula)
        }
    }
    .map_err(xlsx_error)?;
    Ok(())
}

fn differential_format(format: &DifferentialFormat) -> Format {
    let mut fmt = Format::new();
    if format.bold {
        fmt = fmt.set_bold();
    }
    if format.italic {
        fmt = fmt.set_italic();
    }
    if let Some(rgb) = format.font_color {
        fmt = fmt.set_font_color(Color::RGB(rgb));
    }
    if let Some(rgb) = format.fill_color {
        fmt = fmt
            .set_foreground_color(Color::RGB(rgb))
            .set_background_color(Color::RGB(rgb))
            .set_pattern(FormatPattern::Solid);
    }
    fmt
}

fn cell_rule<'a>(
    operator: CellIsOperator,
    formula1: &'a str,
    formula2: Option<&'a str>,
) -> ConditionalFormatCellRule<&'a str> {
    let formula1 = formula1.trim_start_matches('=');
    let formula2 = formula2.map_or(formula1, |f| f.trim_start_matches('='));
    match operator {
        CellIsOperator::GreaterThan => ConditionalFormatCellRule::GreaterThan(formula1),
        CellIsOperator::GreaterThanOrEqual => {
            ConditionalFormatCellRule::GreaterThanOrEqualTo(formula1)
        }
        CellIsOperator::LessThan => ConditionalFormatCellRule::LessThan(formula1),
        CellIsOperator::LessThanOrEqual => ConditionalFormatCellRule::LessThanOrEqualTo(formula1),
        CellIsOperator::Equal => ConditionalFormatCellRule::EqualTo(formula1),
        CellIsOperator::NotEqual => ConditionalFormatCellRule::NotEqualTo(formula1),
        CellIsOperator::Between => ConditionalFormatCellRule::Between(formula1, formula2),
        CellIsOperator::NotBetween => ConditionalFormatCellRule::NotBetween(formula1, formula2),
    }
}

/// Space separated `sqref`, single cells written without a `:`.
fn sqref(ranges: &[CellRange]) -> String {
    ranges
        .iter()
        .map(|range| {
            if range.is_single_cell() {
                range.start.to_a1()
            } else {
                range.normalized().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write one rule over every range of its block as a single
/// `<conditionalFormatting>` element.
fn write_conditional_format(
    worksheet: &mut Worksheet,
    ranges: &[CellRange],
    rule: &ConditionalFormattingRule,
) -> Result<()> {
    let Some(anchor) = ranges.first() else {
        return Ok(());
    };
    let first_row = anchor.first_row();
    let first_col = column_number(anchor.first_col())?;
    let last_row = anchor.last_row();
    let last_col = column_number(anchor.last_col())?;
    for range in ranges {
        column_number(range.last_col())?;
    }
    let multi_range = sqref(ranges);

    match &rule.kind {
        RuleKind::CellIs {
            operator,
            formula1,
            formula2,
        } => {
            let cf = ConditionalFormatCell::new()
                .set_rule(cell_rule(*operator, formula1, formula2.as_deref()))
                .set_format(differential_format(&rule.format))
                .set_stop_if_true(rule.stop_if_true)
                .set_multi_range(&multi_range);
            worksheet.add_conditional_format(first_row, first_col, last_row, last_col, &cf)
        }
        RuleKind::Expression { formula } => {
            let formula = if formula.trim_start().starts_with('=') {
                formula.clone()
            } else {
                format!("={formula}")
            };
            let cf = ConditionalFormatFormula::new()
                .set_rule(formula.as_str())
                .set_format(differential_format(&rule.format))
                .set_stop_if_true(rule.stop_if_true)
                .set_multi_range(&multi_range);
            worksheet.add_conditional_format(first_row, first_col, last_row, last_col, &cf)
        }
        RuleKind::DataBar => {
            let cf = ConditionalFormatDataBar::new().set_multi_range(&multi_range);
            worksheet.add_conditional_format(first_row, first_col, last_row, last_col, &cf)
        }
        RuleKind::ColorScale3 => {
            let cf = ConditionalFormat3ColorScale::new().set_multi_range(&multi_range);
            worksheet.add_conditional_format(first_row, first_col, last_row, last_col, &cf)
        }
    }
    .map_err(xlsx_error)?;
    Ok(())
}
