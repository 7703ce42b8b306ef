//! In-memory spreadsheet model for sheetplate
//!
//! Sheets keep sparse rows of cells together with the layout metadata a
//! report template carries: merged regions, column widths and conditional
//! formatting. Books can be read from and written to `.xlsx` files.
//!
//! # Examples
//!
//! ```
//! use sheetplate_sheet::{Book, CellIsOperator, ConditionalFormattingRule};
//! use sheetplate_primitives::CellRange;
//!
//! let mut book = Book::new();
//! let sheet = book.create_sheet("Report").unwrap();
//! sheet.set_a1("A1", "Total").unwrap();
//! sheet.set_a1("B1", 42).unwrap();
//! sheet.add_merged_region(CellRange::from_a1("A3:C3").unwrap()).unwrap();
//! sheet
//!     .conditional_formatting_mut()
//!     .add_conditional_formatting(
//!         &[CellRange::from_a1("B1:B10").unwrap()],
//!         ConditionalFormattingRule::cell_is(CellIsOperator::GreaterThan, "40"),
//!     )
//!     .unwrap();
//!
//! assert_eq!(sheet.last_row_num(), Some(2));
//! assert_eq!(sheet.row(0).unwrap().last_cell_num(), 2);
//! assert_eq!(sheet.conditional_formatting().num_conditional_formattings(), 1);
//! ```

mod book;
mod cell;
mod conditional_formatting;
mod error;
mod row;
mod sheet;
#[cfg(not(target_arch = "wasm32"))]
mod xlsx;
#[cfg(not(target_arch = "wasm32"))]
mod xlsx_layout;

pub use book::Book;
pub use cell::{CellValue, FormulaCell};
pub use conditional_formatting::{
    CellIsOperator, ConditionalFormatting, ConditionalFormattingRule, DifferentialFormat,
    RuleKind, SheetConditionalFormatting,
};
pub use error::{Result, SheetError};
pub use row::Row;
pub use sheet::{Sheet, DEFAULT_COLUMN_WIDTH, MAX_COLUMN_WIDTH};
#[cfg(not(target_arch = "wasm32"))]
/// Re-export XLSX read options (non-WASM only).
pub use xlsx::XlsxReadOptions;
