//! Query executor subsystem
//!
//! Consumes validated queries and produces deterministic row sets.
//!
//! # Execution Flow (strict order)
//!
//! 1. Fetch one dataset snapshot from the repository
//! 2. Filter records by WHERE, on record indices
//! 3. Group and aggregate when TRANSFORMATIONS is present
//! 4. Reject results over the row cap
//! 5. Project to COLUMNS
//! 6. Stable multi-key sort by ORDER
//!
//! Nothing here mutates records; concurrent queries may share a snapshot.

mod executor;
mod filters;
mod result;
mod sorter;
mod transform;

pub use executor::{QueryExecutor, MAX_RESULT_ROWS};
pub use filters::FilterEvaluator;
pub use result::{QueryOutput, ResultRow};
pub use sorter::ResultSorter;
pub use transform::{AggregateRow, Group, TransformEngine, AGGREGATE_SCALE};
