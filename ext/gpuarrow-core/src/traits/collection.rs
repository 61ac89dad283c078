use crate::{ColumnView, Result};

/// Indexed, fixed-length, read-only access to columns
///
/// Positions follow the order the metadata parser emitted the columns in,
/// never the lexical order of their names.
pub trait ColumnCollection {
    /// Number of columns
    fn count(&self) -> usize;

    /// Column at `index`, failing with `IndexOutOfRange` outside `[0, count)`
    fn get(&self, index: usize) -> Result<ColumnView<'_>>;

    /// Column the name resolves to; when duplicate names are allowed, the last one
    fn column(&self, name: &str) -> Option<ColumnView<'_>>;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column names in positional order
    fn names(&self) -> Vec<&str>;
}
