//! Query engine scenarios
//!
//! End-to-end: wire-format JSON in, rows out, through the planner and
//! executor against an in-memory store.

use insightdb::dataset::{Dataset, DatasetStore, Room, Section, Value};
use insightdb::executor::{QueryExecutor, MAX_RESULT_ROWS};
use insightdb::planner::{ErrorKind, QueryErrorCode};
use serde_json::json;

// =============================================================================
// Test Utilities
// =============================================================================

fn section(dept: &str, uuid: &str, avg: f64, pass: u64) -> Section {
    Section {
        dept: dept.to_string(),
        id: "310".to_string(),
        uuid: uuid.to_string(),
        instructor: "smith, jane".to_string(),
        title: "software eng".to_string(),
        avg,
        pass,
        fail: 0,
        audit: 0,
        year: 2015,
    }
}

fn room(shortname: &str, number: &str, seats: u64) -> Room {
    Room {
        fullname: format!("{} Building", shortname),
        shortname: shortname.to_string(),
        number: number.to_string(),
        name: format!("{}_{}", shortname, number),
        address: "2329 West Mall".to_string(),
        href: String::new(),
        room_type: "Small Group".to_string(),
        furniture: "Classroom-Movable Tables & Chairs".to_string(),
        lat: 49.26,
        lon: -123.25,
        seats,
    }
}

fn courses_store() -> DatasetStore {
    let store = DatasetStore::in_memory();
    store
        .insert(
            Dataset::sections(
                "courses",
                vec![
                    section("cpsc", "1", 80.0, 10),
                    section("cpsc", "2", 90.0, 20),
                    section("math", "3", 70.0, 30),
                ],
            )
            .unwrap(),
        )
        .unwrap();
    store
}

// =============================================================================
// Filtering and projection
// =============================================================================

#[test]
fn test_gt_filter_returns_matching_rows() {
    let store = courses_store();
    let out = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {"GT": {"courses_avg": 75}},
            "OPTIONS": {"COLUMNS": ["courses_dept", "courses_avg"]}
        }))
        .unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out.column_values("courses_dept"), vec![&Value::from("cpsc"); 2]);
    let mut avgs: Vec<f64> = out
        .column_values("courses_avg")
        .iter()
        .filter_map(|v| v.as_f64())
        .collect();
    avgs.sort_by(f64::total_cmp);
    assert_eq!(avgs, vec![80.0, 90.0]);
}

#[test]
fn test_empty_where_returns_everything() {
    let store = courses_store();
    let out = QueryExecutor::new(&store)
        .execute_json(&json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["courses_uuid"]}}))
        .unwrap();
    assert_eq!(out.len(), 3);
}

#[test]
fn test_wildcard_patterns() {
    let store = DatasetStore::in_memory();
    store
        .insert(
            Dataset::sections(
                "courses",
                vec![section("ENGL", "1", 70.0, 1), section("CPSC", "2", 80.0, 1)],
            )
            .unwrap(),
        )
        .unwrap();
    let executor = QueryExecutor::new(&store);

    let out = executor
        .execute_json(&json!({
            "WHERE": {"IS": {"courses_dept": "*ENG*"}},
            "OPTIONS": {"COLUMNS": ["courses_dept"]}
        }))
        .unwrap();
    assert_eq!(out.to_json(), json!([{"courses_dept": "ENGL"}]));

    let err = executor
        .execute_json(&json!({
            "WHERE": {"IS": {"courses_dept": "EN*SH"}},
            "OPTIONS": {"COLUMNS": ["courses_dept"]}
        }))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.code(), QueryErrorCode::InsightQueryInvalid);
}

#[test]
fn test_nested_logic() {
    let store = courses_store();
    let out = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {
                "OR": [
                    {"AND": [{"IS": {"courses_dept": "cpsc"}}, {"NOT": {"LT": {"courses_avg": 85}}}]},
                    {"EQ": {"courses_pass": 30}}
                ]
            },
            "OPTIONS": {"COLUMNS": ["courses_uuid"], "ORDER": "courses_uuid"}
        }))
        .unwrap();
    assert_eq!(out.to_json(), json!([{"courses_uuid": "2"}, {"courses_uuid": "3"}]));
}

#[test]
fn test_rooms_query() {
    let store = DatasetStore::in_memory();
    store
        .insert(
            Dataset::rooms(
                "rooms",
                vec![room("DMP", "110", 120), room("DMP", "201", 40), room("ANGU", "098", 260)],
            )
            .unwrap(),
        )
        .unwrap();

    let out = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {"GT": {"rooms_seats": 100}},
            "OPTIONS": {
                "COLUMNS": ["rooms_name", "rooms_seats"],
                "ORDER": {"dir": "DOWN", "keys": ["rooms_seats"]}
            }
        }))
        .unwrap();
    assert_eq!(
        out.to_json(),
        json!([
            {"rooms_name": "ANGU_098", "rooms_seats": 260},
            {"rooms_name": "DMP_110", "rooms_seats": 120}
        ])
    );
}

// =============================================================================
// Transformations
// =============================================================================

#[test]
fn test_group_avg_scenario() {
    let store = courses_store();
    let out = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {},
            "OPTIONS": {
                "COLUMNS": ["courses_dept", "avgGrade"],
                "ORDER": "courses_dept"
            },
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept"],
                "APPLY": [{"avgGrade": {"AVG": "courses_avg"}}]
            }
        }))
        .unwrap();
    assert_eq!(
        out.to_json(),
        json!([
            {"courses_dept": "cpsc", "avgGrade": 85},
            {"courses_dept": "math", "avgGrade": 70}
        ])
    );
}

#[test]
fn test_count_is_distinct_values() {
    let store = DatasetStore::in_memory();
    store
        .insert(
            Dataset::sections(
                "courses",
                vec![
                    section("cpsc", "1", 80.0, 10),
                    section("cpsc", "2", 80.0, 10),
                    section("cpsc", "3", 75.0, 10),
                ],
            )
            .unwrap(),
        )
        .unwrap();

    let out = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept", "avgs", "rows"]},
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept"],
                "APPLY": [
                    {"avgs": {"COUNT": "courses_avg"}},
                    {"rows": {"COUNT": "courses_uuid"}}
                ]
            }
        }))
        .unwrap();
    assert_eq!(out.to_json(), json!([{"courses_dept": "cpsc", "avgs": 2, "rows": 3}]));
}

#[test]
fn test_apply_only_columns() {
    let store = courses_store();
    let out = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["total"]},
            "TRANSFORMATIONS": {
                "GROUP": ["courses_title"],
                "APPLY": [{"total": {"SUM": "courses_pass"}}]
            }
        }))
        .unwrap();
    assert_eq!(out.to_json(), json!([{"total": 60}]));
}

#[test]
fn test_numeric_apply_on_string_field_rejected() {
    let store = courses_store();
    let err = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["m"]},
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept"],
                "APPLY": [{"m": {"MAX": "courses_title"}}]
            }
        }))
        .unwrap_err();
    assert!(err.is_validation());
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_sort_is_stable() {
    let store = DatasetStore::in_memory();
    store
        .insert(
            Dataset::sections(
                "courses",
                vec![
                    section("math", "a", 70.0, 1),
                    section("cpsc", "b", 70.0, 1),
                    section("math", "c", 70.0, 1),
                    section("cpsc", "d", 70.0, 1),
                ],
            )
            .unwrap(),
        )
        .unwrap();

    let out = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept", "courses_uuid"], "ORDER": "courses_dept"}
        }))
        .unwrap();
    let uuids: Vec<&Value> = out.column_values("courses_uuid");
    assert_eq!(
        uuids,
        vec![&Value::from("b"), &Value::from("d"), &Value::from("a"), &Value::from("c")]
    );
}

#[test]
fn test_multi_key_down() {
    let store = DatasetStore::in_memory();
    store
        .insert(
            Dataset::sections(
                "courses",
                vec![
                    section("cpsc", "a", 70.0, 1),
                    section("math", "b", 90.0, 1),
                    section("cpsc", "c", 90.0, 1),
                ],
            )
            .unwrap(),
        )
        .unwrap();

    let out = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {},
            "OPTIONS": {
                "COLUMNS": ["courses_avg", "courses_dept", "courses_uuid"],
                "ORDER": {"dir": "DOWN", "keys": ["courses_avg", "courses_dept"]}
            }
        }))
        .unwrap();
    assert_eq!(
        out.column_values("courses_uuid"),
        vec![&Value::from("b"), &Value::from("c"), &Value::from("a")]
    );
}

#[test]
fn test_order_key_must_be_a_column() {
    let store = courses_store();
    let err = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept"], "ORDER": "courses_avg"}
        }))
        .unwrap_err();
    assert!(err.is_validation());
}

// =============================================================================
// Result cap
// =============================================================================

fn large_store(rows: usize) -> DatasetStore {
    let store = DatasetStore::in_memory();
    let sections = (0..rows)
        .map(|i| section(if i % 2 == 0 { "cpsc" } else { "math" }, &i.to_string(), 70.0, 1))
        .collect();
    store
        .insert(Dataset::sections("courses", sections).unwrap())
        .unwrap();
    store
}

#[test]
fn test_result_over_cap_fails() {
    let store = large_store(MAX_RESULT_ROWS + 1);
    let err = QueryExecutor::new(&store)
        .execute_json(&json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["courses_uuid"]}}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResultTooLarge);
    assert_eq!(err.code(), QueryErrorCode::InsightResultTooLarge);
}

#[test]
fn test_result_at_cap_succeeds() {
    let store = large_store(MAX_RESULT_ROWS);
    let out = QueryExecutor::new(&store)
        .execute_json(&json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["courses_uuid"]}}))
        .unwrap();
    assert_eq!(out.len(), MAX_RESULT_ROWS);
}

#[test]
fn test_transformations_can_bring_result_under_cap() {
    let store = large_store(MAX_RESULT_ROWS + 1);
    let out = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept", "n"]},
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept"],
                "APPLY": [{"n": {"COUNT": "courses_uuid"}}]
            }
        }))
        .unwrap();
    assert_eq!(
        out.to_json(),
        json!([{"courses_dept": "cpsc", "n": 2501}, {"courses_dept": "math", "n": 2500}])
    );
}

// =============================================================================
// Dataset resolution
// =============================================================================

#[test]
fn test_two_datasets_rejected() {
    let store = courses_store();
    let err = QueryExecutor::new(&store)
        .execute_json(&json!({
            "WHERE": {"GT": {"other_avg": 1}},
            "OPTIONS": {"COLUMNS": ["courses_dept"]}
        }))
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_unknown_dataset_not_found() {
    let store = courses_store();
    let err = QueryExecutor::new(&store)
        .execute_json(&json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["ghost_dept"]}}))
        .unwrap_err();
    assert_eq!(err.code(), QueryErrorCode::InsightDatasetNotFound);
}
