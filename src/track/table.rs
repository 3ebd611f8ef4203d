//! Fixed-width layout for report lines.

use super::terms::TrackedTerms;

/// Width of the timestamp column.
pub const TIME_WIDTH: usize = 20;

/// Default width of the interval, missed, and term columns.
pub const DEFAULT_COLUMN_WIDTH: usize = 20;

/// Narrowest a column is allowed to get.
pub const MIN_COLUMN_WIDTH: usize = 10;

/// Column layout shared by the header and every count line.
///
/// One width serves the interval, missed, and term columns; the timestamp
/// column is always [`TIME_WIDTH`]. Cells are right-aligned and never
/// truncated, so the width must fit the widest quoted term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    column_width: usize,
}

impl TableLayout {
    /// Layout sized for a term set: room for the longest term plus its
    /// quote marks and a separator space, never narrower than
    /// [`DEFAULT_COLUMN_WIDTH`].
    pub fn for_terms(terms: &TrackedTerms) -> Self {
        Self::with_column_width(DEFAULT_COLUMN_WIDTH.max(terms.longest() + 3))
    }

    /// Layout with an explicit column width, floored at [`MIN_COLUMN_WIDTH`].
    pub fn with_column_width(width: usize) -> Self {
        Self {
            column_width: width.max(MIN_COLUMN_WIDTH),
        }
    }

    pub fn column_width(&self) -> usize {
        self.column_width
    }

    /// Right-align `cell` in the shared column width.
    pub fn pad(&self, cell: &str) -> String {
        format!("{:>width$}", cell, width = self.column_width)
    }

    /// Right-align `cell` in the timestamp column.
    pub fn pad_time(&self, cell: &str) -> String {
        format!("{:>width$}", cell, width = TIME_WIDTH)
    }
}
