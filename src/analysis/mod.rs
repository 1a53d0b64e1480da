//! Aggregation pipeline.
//!
//! Every function here is a pure computation over an immutable
//! [`InspectionTable`](crate::dataset::InspectionTable). Grouped results are
//! emitted in ascending [`GroupKey`] order; count rankings are sorted
//! descending with ties kept in key order.

pub mod aggregator;
pub mod coverage;

pub use aggregator::*;
pub use coverage::*;

/// Ordering key for grouped columns.
///
/// Integer-looking values sort numerically and before any other text, so
/// Inspection ID `9` comes before `10`. Everything else sorts lexically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum GroupKey<'a> {
    Integer(i64, &'a str),
    Text(&'a str),
}

impl<'a> GroupKey<'a> {
    pub(crate) fn new(value: &'a str) -> Self {
        match value.parse::<i64>() {
            Ok(n) => GroupKey::Integer(n, value),
            Err(_) => GroupKey::Text(value),
        }
    }

    pub(crate) fn as_str(&self) -> &'a str {
        match *self {
            GroupKey::Integer(_, value) | GroupKey::Text(value) => value,
        }
    }
}
