//! Structured error types for the pageflow layout engine.
//!
//! Configuration mistakes fail at the mutating call; geometric
//! degeneracy fails when a boundary is built. Content that merely does
//! not fit is never an error: the fitters resolve it with forward-progress
//! fallbacks and report it through [`crate::layout::Status`].

/// The unified error type returned by fallible pageflow operations.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A run direction code outside the known range.
    #[error("invalid run direction: {0}")]
    InvalidRunDirection(i32),

    /// A column wall with fewer than two points or no usable segment.
    #[error("invalid column line: {0}")]
    InvalidColumnLine(String),

    /// Composite elements can only flow into rectangular columns.
    #[error("irregular columns are not supported in composite mode")]
    IrregularComposite,

    /// A committing `go` was issued without an output sink.
    #[error("a content sink is required to commit lines")]
    MissingSink,

    /// A committing `go` was issued before any column was defined.
    #[error("no column boundary has been set")]
    NoColumn,

    /// Tables need at least one column.
    #[error("the number of columns must be greater than 0")]
    InvalidColumnCount,

    /// A width array with no entries.
    #[error("the widths array is empty")]
    EmptyWidths,

    /// A width array whose length disagrees with the column count.
    #[error("wrong number of columns: expected {expected}, found {found}")]
    WrongNumberOfColumns { expected: usize, found: usize },

    /// Rows were written before the table received a total width.
    #[error("the table width must be greater than zero")]
    ZeroTableWidth,

    /// Font data could not be parsed.
    #[error("font error: {0}")]
    InvalidFont(String),

    /// The pagination driver gave up.
    #[error("content did not finish within {0} pages")]
    PageLimitExceeded(usize),

    /// A configuration or column spec failed to deserialize.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
