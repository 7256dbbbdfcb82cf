//! # Row Break Decisions
//!
//! What a column does with the first table row that does not fit in the
//! height it has left. The fitter measures; this module decides. The
//! rules mirror the way a reader expects tables to break: split-late
//! tables move a row to the next column rather than cut it, unless the
//! row would not fit on a fresh column either.

/// What to do with the row that overflowed the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowBreakDecision {
    /// Split the row at the remaining height and place its head here.
    SplitRow,
    /// The row cannot start on this column even though it is fresh.
    Refuse,
    /// Leave the rest of the table for the next column.
    ExhaustColumn,
    /// Place the rows that fit; the overflowing row starts the next column.
    PlaceFitting,
}

/// The facts the decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowBreakInput {
    pub split_rows: bool,
    pub split_late: bool,
    /// The overflowing row is the first body row tried on this column.
    pub first_row: bool,
    /// Nothing was placed on this column before the table.
    pub fresh_column: bool,
    /// The table wants to stay in one piece and has not started yet.
    pub keep_together: bool,
}

pub fn decide_row_break(input: RowBreakInput) -> RowBreakDecision {
    // A table that must stay whole tries again on a fresh column.
    if input.keep_together && !input.fresh_column {
        return RowBreakDecision::ExhaustColumn;
    }

    if input.split_rows && (!input.split_late || (input.first_row && input.fresh_column)) {
        return RowBreakDecision::SplitRow;
    }

    if input.first_row {
        if input.fresh_column {
            return RowBreakDecision::Refuse;
        }
        return RowBreakDecision::ExhaustColumn;
    }

    RowBreakDecision::PlaceFitting
}
