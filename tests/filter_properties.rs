//! Property tests for the filter algebra and the transformation engine

use std::collections::{BTreeSet, HashSet};

use insightdb::dataset::{Field, Record, Section, Value};
use insightdb::executor::{FilterEvaluator, TransformEngine};
use insightdb::planner::{ApplyRule, ApplyToken, CompareOp, Filter, Pattern};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

const DEPTS: [&str; 4] = ["cpsc", "math", "engl", "phys"];
const PATTERNS: [&str; 7] = ["cpsc", "*h", "m*", "*ng*", "*", "p*s", "xyz"];

fn arb_section() -> impl Strategy<Value = Section> {
    (0usize..DEPTS.len(), 0u32..10_000, 0u64..50, 0u64..5).prop_map(|(d, avg, pass, fail)| {
        Section {
            dept: DEPTS[d].to_string(),
            id: "100".to_string(),
            uuid: String::new(),
            instructor: String::new(),
            title: String::new(),
            avg: f64::from(avg) / 100.0,
            pass,
            fail,
            audit: 0,
            year: 2015,
        }
    })
}

fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_section(), 0..40).prop_map(|sections| {
        sections
            .into_iter()
            .enumerate()
            .map(|(i, mut s)| {
                s.uuid = i.to_string();
                Record::from(s)
            })
            .collect()
    })
}

fn arb_leaf() -> impl Strategy<Value = Filter> {
    let compare = (0usize..3, prop::bool::ANY, 0u32..100).prop_map(|(op, on_avg, value)| {
        let op = [CompareOp::Lt, CompareOp::Gt, CompareOp::Eq][op];
        let field = if on_avg { Field::Avg } else { Field::Pass };
        Filter::compare(op, field, f64::from(value))
    });
    let matching = (0usize..PATTERNS.len()).prop_filter_map("wildcard in the middle", |p| {
        Pattern::parse(PATTERNS[p]).map(|pattern| Filter::matching(Field::Dept, pattern))
    });
    prop_oneof![compare, matching]
}

fn arb_filter() -> impl Strategy<Value = Filter> {
    arb_leaf().prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Filter::And),
            prop::collection::vec(inner.clone(), 1..4).prop_map(Filter::Or),
            inner.prop_map(Filter::negate),
        ]
    })
}

fn eval(filter: &Filter, records: &[Record]) -> BTreeSet<usize> {
    FilterEvaluator::evaluate(Some(filter), records).into_iter().collect()
}

// =============================================================================
// Filter algebra
// =============================================================================

proptest! {
    #[test]
    fn prop_not_is_complement(records in arb_records(), f in arb_filter()) {
        let all: BTreeSet<usize> = (0..records.len()).collect();
        let matched = eval(&f, &records);
        let negated = eval(&Filter::negate(f), &records);
        prop_assert_eq!(negated, all.difference(&matched).copied().collect::<BTreeSet<_>>());
    }

    #[test]
    fn prop_and_is_intersection(records in arb_records(), f1 in arb_filter(), f2 in arb_filter()) {
        let a = eval(&f1, &records);
        let b = eval(&f2, &records);
        let both = eval(&Filter::And(vec![f1, f2]), &records);
        prop_assert_eq!(both, a.intersection(&b).copied().collect::<BTreeSet<_>>());
    }

    #[test]
    fn prop_or_is_union_without_duplicates(
        records in arb_records(),
        f1 in arb_filter(),
        f2 in arb_filter(),
    ) {
        let a = eval(&f1, &records);
        let b = eval(&f2, &records);
        let either = FilterEvaluator::evaluate(Some(&Filter::Or(vec![f1, f2])), &records);

        let distinct: HashSet<usize> = either.iter().copied().collect();
        prop_assert_eq!(distinct.len(), either.len());
        prop_assert_eq!(
            either.into_iter().collect::<BTreeSet<_>>(),
            a.union(&b).copied().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn prop_index_list_agrees_with_record_check(records in arb_records(), f in arb_filter()) {
        let expected: BTreeSet<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| FilterEvaluator::matches(&f, r))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(eval(&f, &records), expected);
    }
}

// =============================================================================
// Transformations
// =============================================================================

fn rule(token: ApplyToken, field: Field) -> ApplyRule {
    ApplyRule {
        name: "agg".to_string(),
        token,
        field,
    }
}

fn two_places(v: &Value) -> bool {
    v.as_f64().map_or(false, |n| ((n * 100.0).round() - n * 100.0).abs() < 1e-6)
}

proptest! {
    #[test]
    fn prop_grouping_is_partition(records in arb_records(), f in arb_filter()) {
        let filtered = FilterEvaluator::evaluate(Some(&f), &records);
        let groups = TransformEngine::group(&[Field::Dept], &records, &filtered);

        let mut members: Vec<usize> = groups.iter().flat_map(|g| g.members.clone()).collect();
        let mut expected = filtered.clone();
        members.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(members, expected);

        // Members of a group share its key, and keys are distinct
        let keys: HashSet<String> = groups.iter().map(|g| format!("{:?}", g.key)).collect();
        prop_assert_eq!(keys.len(), groups.len());
        for g in &groups {
            for &idx in &g.members {
                let dept = records[idx].get(Field::Dept).map(|v| v.to_value());
                prop_assert_eq!(dept.as_ref(), g.key.first());
            }
        }
    }

    #[test]
    fn prop_sum_avg_ignore_member_order(
        (records, shuffled) in arb_records()
            .prop_filter("need members", |r| !r.is_empty())
            .prop_flat_map(|records| {
                let order: Vec<usize> = (0..records.len()).collect();
                (Just(records), Just(order).prop_shuffle())
            })
    ) {
        let in_order: Vec<usize> = (0..records.len()).collect();
        for token in [ApplyToken::Sum, ApplyToken::Avg] {
            let r = rule(token, Field::Avg);
            let a = TransformEngine::apply(&r, &records, &in_order).unwrap();
            let b = TransformEngine::apply(&r, &records, &shuffled).unwrap();
            prop_assert!(two_places(&a));
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn prop_count_never_exceeds_rows(records in arb_records().prop_filter("need members", |r| !r.is_empty())) {
        let members: Vec<usize> = (0..records.len()).collect();
        let count = TransformEngine::apply(&rule(ApplyToken::Count, Field::Dept), &records, &members)
            .unwrap();
        let n = count.as_f64().unwrap_or_default();
        prop_assert!(n >= 1.0 && n <= DEPTS.len() as f64 && n <= records.len() as f64);
    }
}
