//! Template sheet data for sheetplate
//!
//! A template sheet is adapted once into a [`GridSheetData`]: rows of
//! [`CellData`], merged regions, column widths and conditional formatting
//! blocks. The [`Transformer`] then copies template cells to result cells,
//! mirroring conditional formatting onto each generated cell.
//!
//! ```
//! use sheetplate_sheet::{Book, ConditionalFormattingRule};
//! use sheetplate_primitives::CellRange;
//! use sheetplate_transform::{CellRef, Transformer};
//!
//! let mut book = Book::new();
//! let sheet = book.create_sheet("Template").unwrap();
//! sheet.set_a1("C3", 10).unwrap();
//! sheet
//!     .conditional_formatting_mut()
//!     .add_conditional_formatting(
//!         &[CellRange::from_a1("C3").unwrap()],
//!         ConditionalFormattingRule::expression("=C3>5"),
//!     )
//!     .unwrap();
//!
//! let mut transformer = Transformer::new(book);
//! transformer
//!     .transform(&CellRef::new("Template", 2, 2), &CellRef::new("Template", 5, 5))
//!     .unwrap();
//!
//! let sheet = transformer.book().sheet("Template").unwrap();
//! assert_eq!(sheet.conditional_formatting().num_conditional_formattings(), 2);
//! ```

mod cell_data;
mod conditional_formatting;
mod error;
mod options;
mod row_data;
mod sheet_data;
mod transformer;

pub use cell_data::{CellData, CellRef};
pub use conditional_formatting::ConditionalFormattingEntry;
pub use error::{Result, TransformError};
pub use options::TransformOptions;
pub use row_data::RowData;
pub use sheet_data::{GridSheetData, SheetData};
pub use transformer::Transformer;
