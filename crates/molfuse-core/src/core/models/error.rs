use super::atom::GridCell;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid argument for '{field}': expected a whole number, got {value}")]
    InvalidArgument { field: &'static str, value: f64 },

    #[error("Grid cell {cell} is already occupied by another atom")]
    CellOccupied { cell: GridCell },

    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),
}
