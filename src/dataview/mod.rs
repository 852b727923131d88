//! Pure transformations from the record set to what the views display.
//!
//! Nothing here mutates its input: every step returns a new collection.

pub mod compare;
pub mod criteria;
pub mod format;
pub mod pagination;
pub mod projections;

pub use criteria::{apply, Filters, RangeFilter, SortField, ViewCriteria};
pub use pagination::paginate;
