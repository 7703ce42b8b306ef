use crate::cell_data::CellRef;
use sheetplate_primitives::{AddressError, CellRange};
use sheetplate_sheet::SheetError;
use thiserror::Error;

/// Errors raised while moving cells from a template into a result sheet
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("No sheet data for sheet: {name}")]
    SheetNotFound { name: String },

    #[error("Area {area} placed at {target} runs past the last row or column")]
    TargetOutOfBounds { area: CellRange, target: CellRef },

    #[error("Invalid cell reference: {0}")]
    Address(#[from] AddressError),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
