//! GROUP + APPLY
//!
//! Two phases over the filtered index list:
//!
//! 1. Grouping: partition indices by the tuple of GROUP field values. Groups
//!    keep first-seen order; members keep input order.
//! 2. Apply: reduce each group to one row of group values plus one value per
//!    APPLY rule.
//!
//! SUM and AVG are computed in exact decimal arithmetic and rounded half away
//! from zero to two places.

use std::collections::{HashMap, HashSet};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::dataset::{Field, Record, Value, ValueRef};
use crate::planner::{ApplyRule, ApplyToken, QueryError, QueryResult, Transformations};

/// Decimal places kept by SUM and AVG
pub const AGGREGATE_SCALE: u32 = 2;

/// Hashable form of one field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum KeyPart<'a> {
    Number(u64),
    Text(&'a str),
    Missing,
}

impl<'a> KeyPart<'a> {
    fn of(value: Option<ValueRef<'a>>) -> Self {
        match value {
            // -0.0 and 0.0 compare equal, so they must hash equal
            Some(ValueRef::Number(n)) if n == 0.0 => KeyPart::Number(0.0f64.to_bits()),
            Some(ValueRef::Number(n)) => KeyPart::Number(n.to_bits()),
            Some(ValueRef::Text(s)) => KeyPart::Text(s),
            None => KeyPart::Missing,
        }
    }
}

/// One group: its key values and the indices of its members
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: Vec<Value>,
    pub members: Vec<usize>,
}

/// A reduced group
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    /// Values of the GROUP fields, in GROUP order
    pub group: Vec<Value>,
    /// One value per APPLY rule, in APPLY order
    pub applied: Vec<Value>,
}

pub struct TransformEngine;

impl TransformEngine {
    /// Runs both phases
    pub fn transform(
        transformations: &Transformations,
        records: &[Record],
        indices: &[usize],
    ) -> QueryResult<Vec<AggregateRow>> {
        Self::group(&transformations.group, records, indices)
            .into_iter()
            .map(|group| {
                let applied = transformations
                    .apply
                    .iter()
                    .map(|rule| Self::apply(rule, records, &group.members))
                    .collect::<QueryResult<Vec<_>>>()?;
                Ok(AggregateRow {
                    group: group.key,
                    applied,
                })
            })
            .collect()
    }

    /// Partitions `indices` by the values of `fields`
    pub fn group(fields: &[Field], records: &[Record], indices: &[usize]) -> Vec<Group> {
        let mut slots: HashMap<Vec<KeyPart<'_>>, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();

        for &idx in indices {
            let record = &records[idx];
            let parts: Vec<KeyPart<'_>> = fields
                .iter()
                .map(|f| KeyPart::of(record.get(*f)))
                .collect();

            match slots.get(&parts) {
                Some(&slot) => groups[slot].members.push(idx),
                None => {
                    slots.insert(parts, groups.len());
                    groups.push(Group {
                        key: fields
                            .iter()
                            .filter_map(|f| record.get(*f).map(ValueRef::to_value))
                            .collect(),
                        members: vec![idx],
                    });
                }
            }
        }

        groups
    }

    /// Reduces one group's members with one rule
    pub fn apply(rule: &ApplyRule, records: &[Record], members: &[usize]) -> QueryResult<Value> {
        let result = match rule.token {
            ApplyToken::Count => {
                let distinct: HashSet<KeyPart<'_>> = members
                    .iter()
                    .map(|&idx| KeyPart::of(records[idx].get(rule.field)))
                    .collect();
                distinct.len() as f64
            }
            ApplyToken::Max => numeric_values(rule, records, members)?
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max),
            ApplyToken::Min => numeric_values(rule, records, members)?
                .into_iter()
                .fold(f64::INFINITY, f64::min),
            ApplyToken::Sum => {
                let numbers = numeric_values(rule, records, members)?;
                to_f64(round(decimal_sum(rule, &numbers)?), rule)?
            }
            ApplyToken::Avg => {
                let numbers = numeric_values(rule, records, members)?;
                let mean = decimal_sum(rule, &numbers)? / Decimal::from(numbers.len());
                to_f64(round(mean), rule)?
            }
        };

        Ok(Value::Number(result))
    }
}

fn numeric_values(rule: &ApplyRule, records: &[Record], members: &[usize]) -> QueryResult<Vec<f64>> {
    let numbers: Vec<f64> = members
        .iter()
        .filter_map(|&idx| records[idx].get(rule.field).and_then(ValueRef::as_f64))
        .collect();
    if numbers.is_empty() {
        return Err(QueryError::invalid(format!(
            "{} in '{}' found no numeric values",
            rule.token.as_str(),
            rule.name
        )));
    }
    Ok(numbers)
}

fn decimal_sum(rule: &ApplyRule, numbers: &[f64]) -> QueryResult<Decimal> {
    numbers.iter().try_fold(Decimal::ZERO, |acc, &n| {
        let d = Decimal::from_f64(n).ok_or_else(|| {
            QueryError::invalid(format!(
                "{} in '{}' cannot represent {} exactly",
                rule.token.as_str(),
                rule.name,
                n
            ))
        })?;
        acc.checked_add(d).ok_or_else(|| {
            QueryError::invalid(format!("{} in '{}' overflowed", rule.token.as_str(), rule.name))
        })
    })
}

fn round(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(AGGREGATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn to_f64(d: Decimal, rule: &ApplyRule) -> QueryResult<f64> {
    d.to_f64().ok_or_else(|| {
        QueryError::invalid(format!("{} in '{}' is out of range", rule.token.as_str(), rule.name))
    })
}
