use sheetplate_primitives::{AddressError, CellRange};
use thiserror::Error;

/// Errors that can occur during sheet operations
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Row index out of bounds: {index} (max {max})")]
    RowIndexOutOfBounds { index: u32, max: u32 },

    #[error("Column index out of bounds: {index} (max {max})")]
    ColumnIndexOutOfBounds { index: u32, max: u32 },

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Sheet already exists: {name}")]
    SheetAlreadyExists { name: String },

    #[error("Invalid sheet name: '{name}'")]
    InvalidSheetName { name: String },

    #[error("Invalid cell notation: {0}")]
    InvalidCellNotation(#[from] AddressError),

    #[error("Merged region {range} must contain at least two cells")]
    MergedRegionTooSmall { range: CellRange },

    #[error("Merged region {range} overlaps existing merged region {existing}")]
    MergedRegionOverlap { range: CellRange, existing: CellRange },

    #[error("Merged region index out of bounds: {index} (sheet has {count})")]
    MergedRegionIndexOutOfBounds { index: usize, count: usize },

    #[error("Column width {width} for column {col} exceeds the maximum of {max}")]
    ColumnWidthTooLarge { col: u32, width: u32, max: u32 },

    #[error("Conditional formatting requires at least one range")]
    EmptyConditionalFormattingRanges,

    #[error("Conditional formatting requires at least one rule")]
    EmptyConditionalFormattingRules,

    #[error("Conditional formatting index out of bounds: {index} (sheet has {count})")]
    ConditionalFormattingIndexOutOfBounds { index: usize, count: usize },

    #[error("XLSX error: {0}")]
    Xlsx(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
