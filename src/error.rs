use thiserror::Error;

/// Errors raised while building a grid or planning over it.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("grid has no cells ({rows} rows, {cols} columns)")]
    Empty { rows: usize, cols: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength { row: usize, expected: usize, found: usize },

    #[error("grid declares {declared_rows}x{declared_cols} but the map is {rows}x{cols}")]
    DimensionMismatch {
        declared_rows: usize,
        declared_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("grid cells do not fit the grid shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("value grid is {found:?}, grid is {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("invalid planning parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("unrecognized action: {0:?}")]
    UnrecognizedAction(String),

    #[error("unable to write CSV output: {0}")]
    Csv(#[from] csv::Error),

    #[error("unable to load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: config_file::ConfigFileError,
    },
}

pub type Result<T> = std::result::Result<T, GridError>;
