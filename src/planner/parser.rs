//! JSON query parser
//!
//! Turns the wire-format query object into a [`Query`]. All shape, field and
//! dataset validation happens here, so a `Query` that exists is one the
//! executor can run without further checks.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::ast::{
    ApplyRule, ApplyToken, Column, CompareOp, FieldKey, Filter, OrderSpec, Direction, Pattern,
    Query, Transformations,
};
use super::errors::{QueryError, QueryResult};
use crate::dataset::{DatasetKind, Field, KEY_SEPARATOR};

const WHERE: &str = "WHERE";
const OPTIONS: &str = "OPTIONS";
const TRANSFORMATIONS: &str = "TRANSFORMATIONS";
const COLUMNS: &str = "COLUMNS";
const ORDER: &str = "ORDER";
const GROUP: &str = "GROUP";
const APPLY: &str = "APPLY";

/// Parse a query from JSON text
pub fn parse_query_str(text: &str) -> QueryResult<Query> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| QueryError::invalid(format!("Query is not valid JSON: {}", e)))?;
    parse_query(&value)
}

/// Parse and validate a query object
pub fn parse_query(value: &Value) -> QueryResult<Query> {
    QueryParser::default().parse(value)
}

/// Tracks the single dataset a query may reference
#[derive(Debug, Default)]
struct QueryParser {
    dataset_id: Option<String>,
    kind: Option<DatasetKind>,
}

impl QueryParser {
    fn parse(mut self, value: &Value) -> QueryResult<Query> {
        let obj = expect_object(value, "Query")?;

        for key in obj.keys() {
            if key != WHERE && key != OPTIONS && key != TRANSFORMATIONS {
                return Err(QueryError::invalid(format!("Invalid query key: {}", key)));
            }
        }

        let where_value = obj
            .get(WHERE)
            .ok_or_else(|| QueryError::invalid("Missing WHERE"))?;
        let options_value = obj
            .get(OPTIONS)
            .ok_or_else(|| QueryError::invalid("Missing OPTIONS"))?;

        let filter = self.parse_where(where_value)?;
        let transformations = match obj.get(TRANSFORMATIONS) {
            Some(t) => Some(self.parse_transformations(t)?),
            None => None,
        };
        let (columns, order) = self.parse_options(options_value, transformations.as_ref())?;

        let dataset_id = self
            .dataset_id
            .ok_or_else(|| QueryError::invalid("Query references no dataset"))?;
        let kind = self
            .kind
            .ok_or_else(|| QueryError::invalid("Query references no dataset"))?;

        Ok(Query {
            dataset_id,
            kind,
            filter,
            columns,
            order,
            transformations,
        })
    }

    /// Resolves a prefixed key, fixing the dataset on first use
    fn resolve(&mut self, key: &str) -> QueryResult<FieldKey> {
        let field_key = FieldKey::parse(key)
            .ok_or_else(|| QueryError::invalid(format!("Invalid key: {}", key)))?;

        match &self.dataset_id {
            None => self.dataset_id = Some(field_key.dataset.clone()),
            Some(id) if *id != field_key.dataset => {
                return Err(QueryError::invalid(format!(
                    "Cannot query more than one dataset: '{}' and '{}'",
                    id, field_key.dataset
                )));
            }
            Some(_) => {}
        }

        let field_kind = field_key.field.kind();
        match self.kind {
            None => self.kind = Some(field_kind),
            Some(kind) if kind != field_kind => {
                return Err(QueryError::invalid(format!(
                    "Field '{}' does not belong to a {} dataset",
                    key, kind
                )));
            }
            Some(_) => {}
        }

        Ok(field_key)
    }

    // ========== WHERE ==========

    fn parse_where(&mut self, value: &Value) -> QueryResult<Option<Filter>> {
        let obj = expect_object(value, WHERE)?;
        if obj.is_empty() {
            return Ok(None);
        }
        self.parse_filter(value).map(Some)
    }

    fn parse_filter(&mut self, value: &Value) -> QueryResult<Filter> {
        let (tag, body) = single_entry(value, "Filter")?;

        match tag {
            "AND" | "OR" => {
                let items = body
                    .as_array()
                    .ok_or_else(|| QueryError::invalid(format!("{} must be an array", tag)))?;
                if items.is_empty() {
                    return Err(QueryError::invalid(format!(
                        "{} must be a non-empty array",
                        tag
                    )));
                }
                let children = items
                    .iter()
                    .map(|item| self.parse_filter(item))
                    .collect::<QueryResult<Vec<_>>>()?;
                Ok(if tag == "AND" {
                    Filter::And(children)
                } else {
                    Filter::Or(children)
                })
            }
            "NOT" => Ok(Filter::negate(self.parse_filter(body)?)),
            "LT" | "GT" | "EQ" => {
                let op = CompareOp::parse(tag)
                    .ok_or_else(|| QueryError::invalid(format!("Invalid filter key: {}", tag)))?;
                let (key, literal) = single_entry(body, tag)?;
                let field = self.resolve(key)?.field;
                if !field.is_numeric() {
                    return Err(QueryError::invalid(format!(
                        "Invalid key type in {}: {} is not numeric",
                        tag, key
                    )));
                }
                let number = literal
                    .as_f64()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| {
                        QueryError::invalid(format!("Invalid value type in {}, should be number", tag))
                    })?;
                Ok(Filter::compare(op, field, number))
            }
            "IS" => {
                let (key, literal) = single_entry(body, tag)?;
                let field = self.resolve(key)?.field;
                if field.is_numeric() {
                    return Err(QueryError::invalid(format!(
                        "Invalid key type in IS: {} is not a string field",
                        key
                    )));
                }
                let raw = literal.as_str().ok_or_else(|| {
                    QueryError::invalid("Invalid value type in IS, should be string")
                })?;
                let pattern = Pattern::parse(raw).ok_or_else(|| {
                    QueryError::invalid(format!(
                        "Asterisks can only be the first or last characters of IS input: {}",
                        raw
                    ))
                })?;
                Ok(Filter::matching(field, pattern))
            }
            other => Err(QueryError::invalid(format!("Invalid filter key: {}", other))),
        }
    }

    // ========== TRANSFORMATIONS ==========

    fn parse_transformations(&mut self, value: &Value) -> QueryResult<Transformations> {
        let obj = expect_object(value, TRANSFORMATIONS)?;
        for key in obj.keys() {
            if key != GROUP && key != APPLY {
                return Err(QueryError::invalid(format!(
                    "Invalid key in TRANSFORMATIONS: {}",
                    key
                )));
            }
        }

        let group_value = obj
            .get(GROUP)
            .ok_or_else(|| QueryError::invalid("TRANSFORMATIONS missing GROUP"))?;
        let apply_value = obj
            .get(APPLY)
            .ok_or_else(|| QueryError::invalid("TRANSFORMATIONS missing APPLY"))?;

        let group_keys = string_array(group_value, GROUP)?;
        if group_keys.is_empty() {
            return Err(QueryError::invalid("GROUP must be a non-empty array"));
        }
        let group = group_keys
            .into_iter()
            .map(|key| self.resolve(key).map(|k| k.field))
            .collect::<QueryResult<Vec<_>>>()?;

        let rules = apply_value
            .as_array()
            .ok_or_else(|| QueryError::invalid("APPLY must be an array"))?;
        let mut seen = HashSet::new();
        let mut apply = Vec::with_capacity(rules.len());
        for rule in rules {
            let parsed = self.parse_apply_rule(rule)?;
            if !seen.insert(parsed.name.clone()) {
                return Err(QueryError::invalid(format!(
                    "Duplicate APPLY key {}",
                    parsed.name
                )));
            }
            apply.push(parsed);
        }

        Ok(Transformations { group, apply })
    }

    fn parse_apply_rule(&mut self, value: &Value) -> QueryResult<ApplyRule> {
        let (name, body) = single_entry(value, "APPLY rule")?;
        if name.is_empty() {
            return Err(QueryError::invalid("Apply key cannot be empty string"));
        }
        if name.contains(KEY_SEPARATOR) {
            return Err(QueryError::invalid(format!(
                "Cannot have underscore in applyKey: {}",
                name
            )));
        }

        let (token_name, target) = single_entry(body, "APPLY body")?;
        let token = ApplyToken::parse(token_name)
            .ok_or_else(|| QueryError::invalid(format!("Invalid transformation operator: {}", token_name)))?;
        let key = target.as_str().ok_or_else(|| {
            QueryError::invalid(format!("Invalid apply rule target key for {}", name))
        })?;
        let field = self.resolve(key)?.field;
        if token.requires_numeric() && !field.is_numeric() {
            return Err(QueryError::invalid(format!(
                "Invalid key type in {}: {} is not numeric",
                token.as_str(),
                key
            )));
        }

        Ok(ApplyRule {
            name: name.to_string(),
            token,
            field,
        })
    }

    // ========== OPTIONS ==========

    fn parse_options(
        &mut self,
        value: &Value,
        transformations: Option<&Transformations>,
    ) -> QueryResult<(Vec<Column>, Option<OrderSpec>)> {
        let obj = expect_object(value, OPTIONS)?;
        for key in obj.keys() {
            if key != COLUMNS && key != ORDER {
                return Err(QueryError::invalid(format!("Invalid key in OPTIONS: {}", key)));
            }
        }

        let columns_value = obj
            .get(COLUMNS)
            .ok_or_else(|| QueryError::invalid("OPTIONS missing COLUMNS"))?;
        let keys = string_array(columns_value, COLUMNS)?;
        if keys.is_empty() {
            return Err(QueryError::invalid("COLUMNS must be a non-empty array"));
        }

        let columns = keys
            .into_iter()
            .map(|key| self.parse_column(key, transformations))
            .collect::<QueryResult<Vec<_>>>()?;

        let order = match obj.get(ORDER) {
            Some(order_value) => Some(parse_order(order_value, &columns)?),
            None => None,
        };

        Ok((columns, order))
    }

    fn parse_column(
        &mut self,
        key: &str,
        transformations: Option<&Transformations>,
    ) -> QueryResult<Column> {
        if !key.contains(KEY_SEPARATOR) {
            return match transformations {
                Some(t) if t.find_rule(key).is_some() => Ok(Column::Apply(key.to_string())),
                Some(_) => Err(QueryError::invalid(format!(
                    "Keys in COLUMNS must be in GROUP or APPLY when TRANSFORMATIONS is present: {}",
                    key
                ))),
                None => Err(QueryError::invalid(format!("Invalid key {} in COLUMNS", key))),
            };
        }

        let field_key = self.resolve(key)?;
        if let Some(t) = transformations {
            if !t.group.contains(&field_key.field) {
                return Err(QueryError::invalid(format!(
                    "Keys in COLUMNS must be in GROUP or APPLY when TRANSFORMATIONS is present: {}",
                    key
                )));
            }
        }
        Ok(Column::Field(field_key))
    }
}

fn parse_order(value: &Value, columns: &[Column]) -> QueryResult<OrderSpec> {
    let names: Vec<String> = columns.iter().map(Column::name).collect();
    let require_in_columns = |key: &str| -> QueryResult<()> {
        if names.iter().any(|n| n == key) {
            Ok(())
        } else {
            Err(QueryError::invalid(format!(
                "ORDER key must be in COLUMNS: {}",
                key
            )))
        }
    };

    if let Some(key) = value.as_str() {
        require_in_columns(key)?;
        return Ok(OrderSpec::up(vec![key.to_string()]));
    }

    let obj = expect_object(value, ORDER)?;
    for key in obj.keys() {
        if key != "dir" && key != "keys" {
            return Err(QueryError::invalid(format!("Extra keys in ORDER: {}", key)));
        }
    }

    let direction = obj
        .get("dir")
        .and_then(Value::as_str)
        .and_then(Direction::parse)
        .ok_or_else(|| QueryError::invalid("Invalid ORDER direction"))?;

    let keys_value = obj
        .get("keys")
        .ok_or_else(|| QueryError::invalid("ORDER missing 'keys' key"))?;
    let keys = string_array(keys_value, "ORDER keys")?;
    if keys.is_empty() {
        return Err(QueryError::invalid("ORDER keys must be a non-empty array"));
    }
    for key in &keys {
        require_in_columns(key)?;
    }

    Ok(OrderSpec {
        direction,
        keys: keys.into_iter().map(str::to_string).collect(),
    })
}

fn expect_object<'v>(value: &'v Value, what: &str) -> QueryResult<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| QueryError::invalid(format!("{} must be an object", what)))
}

/// An object with exactly one key
fn single_entry<'v>(value: &'v Value, what: &str) -> QueryResult<(&'v str, &'v Value)> {
    let obj = expect_object(value, what)?;
    let mut entries = obj.iter();
    match (entries.next(), entries.next()) {
        (Some((key, inner)), None) => Ok((key.as_str(), inner)),
        _ => Err(QueryError::invalid(format!(
            "{} should only have 1 key, has {}",
            what,
            obj.len()
        ))),
    }
}

fn string_array<'v>(value: &'v Value, what: &str) -> QueryResult<Vec<&'v str>> {
    let items = value
        .as_array()
        .ok_or_else(|| QueryError::invalid(format!("{} must be an array", what)))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| QueryError::invalid(format!("{} entries must be strings", what)))
        })
        .collect()
}

/// Returns the bare field names referenced by a query's filter, used in logs
pub fn filter_fields(filter: &Filter) -> Vec<Field> {
    let mut out = Vec::new();
    collect_fields(filter, &mut out);
    out
}

fn collect_fields(filter: &Filter, out: &mut Vec<Field>) {
    match filter {
        Filter::And(children) | Filter::Or(children) => {
            children.iter().for_each(|c| collect_fields(c, out))
        }
        Filter::Not(inner) => collect_fields(inner, out),
        Filter::Compare { field, .. } | Filter::Match { field, .. } => {
            if !out.contains(field) {
                out.push(*field);
            }
        }
    }
}
