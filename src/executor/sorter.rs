//! Result sorting for query execution
//!
//! Multi-key and stable: rows compare key by key, left to right, and rows
//! equal on every key keep their input order. One direction applies to all
//! keys.

use std::cmp::Ordering;

use super::result::ResultRow;
use crate::planner::Direction;

/// Sorts projected rows
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts `rows` by the values at `key_columns`.
    ///
    /// `key_columns` are indices into each row, in tie-break order.
    pub fn sort(rows: &mut [ResultRow], key_columns: &[usize], direction: Direction) {
        rows.sort_by(|a, b| {
            let ordering = Self::compare_rows(a, b, key_columns);
            match direction {
                Direction::Up => ordering,
                Direction::Down => ordering.reverse(),
            }
        });
    }

    /// Compares two rows on the key chain; missing values order first
    fn compare_rows(a: &ResultRow, b: &ResultRow, key_columns: &[usize]) -> Ordering {
        for &col in key_columns {
            let ordering = match (a.get(col), b.get(col)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => x.natural_cmp(y),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
