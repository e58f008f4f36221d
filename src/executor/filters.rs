//! WHERE evaluation
//!
//! Works on record indices into the dataset's record slice, never on copies
//! of records. Each step narrows or combines index lists:
//!
//! - AND: first child's matches, narrowed by each following child
//! - OR: first child's matches, then unseen matches of the others
//! - NOT: scope minus the child's matches, in scope order

use std::collections::HashSet;

use crate::dataset::Record;
use crate::planner::Filter;

/// Evaluates filter trees against a record collection
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Indices of matching records. `None` matches every record.
    pub fn evaluate(filter: Option<&Filter>, records: &[Record]) -> Vec<usize> {
        let all: Vec<usize> = (0..records.len()).collect();
        match filter {
            Some(f) => Self::evaluate_in(f, records, &all),
            None => all,
        }
    }

    /// Evaluates within `scope`, a list of indices into `records`
    pub fn evaluate_in(filter: &Filter, records: &[Record], scope: &[usize]) -> Vec<usize> {
        match filter {
            Filter::And(children) => {
                let mut current = scope.to_vec();
                for child in children {
                    if current.is_empty() {
                        break;
                    }
                    current = Self::evaluate_in(child, records, &current);
                }
                current
            }
            Filter::Or(children) => {
                let mut seen = HashSet::new();
                let mut out = Vec::new();
                for child in children {
                    for idx in Self::evaluate_in(child, records, scope) {
                        if seen.insert(idx) {
                            out.push(idx);
                        }
                    }
                }
                out
            }
            Filter::Not(inner) => {
                let excluded: HashSet<usize> =
                    Self::evaluate_in(inner, records, scope).into_iter().collect();
                scope
                    .iter()
                    .copied()
                    .filter(|idx| !excluded.contains(idx))
                    .collect()
            }
            Filter::Compare { .. } | Filter::Match { .. } => scope
                .iter()
                .copied()
                .filter(|&idx| Self::matches(filter, &records[idx]))
                .collect(),
        }
    }

    /// Checks a single record against a filter
    pub fn matches(filter: &Filter, record: &Record) -> bool {
        match filter {
            Filter::And(children) => children.iter().all(|c| Self::matches(c, record)),
            Filter::Or(children) => children.iter().any(|c| Self::matches(c, record)),
            Filter::Not(inner) => !Self::matches(inner, record),
            Filter::Compare { op, field, value } => record
                .get(*field)
                .and_then(|v| v.as_f64())
                .map_or(false, |actual| op.holds(actual, *value)),
            Filter::Match { field, pattern } => record
                .get(*field)
                .and_then(|v| v.as_str())
                .map_or(false, |actual| pattern.matches(actual)),
        }
    }
}
