//! Query executor
//!
//! Runs a validated [`Query`] against one dataset snapshot from a
//! [`DatasetRepository`].
//!
//! Execution flow (strict order):
//! 1. Fetch the dataset snapshot; check its kind against the query
//! 2. Filter records (WHERE)
//! 3. Group and aggregate (TRANSFORMATIONS, if present)
//! 4. Enforce the result cap
//! 5. Project to COLUMNS
//! 6. Sort (ORDER, if present)
//!
//! The row count is fixed once step 3 is done, so the cap is checked before
//! paying for projection and sorting.

use crate::dataset::{Dataset, DatasetRepository, Record, ValueRef};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, ObservationScope};
use crate::planner::{
    parse_query, Column, ErrorKind, Query, QueryError, QueryResult, Transformations,
};

use super::filters::FilterEvaluator;
use super::result::{QueryOutput, ResultRow};
use super::sorter::ResultSorter;
use super::transform::{AggregateRow, TransformEngine};

/// Default cap on rows a query may return
pub const MAX_RESULT_ROWS: usize = 5000;

/// Query executor bound to a dataset repository
pub struct QueryExecutor<'a, R: DatasetRepository + ?Sized> {
    repository: &'a R,
    result_limit: usize,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a, R: DatasetRepository + ?Sized> QueryExecutor<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self {
            repository,
            result_limit: MAX_RESULT_ROWS,
            metrics: None,
        }
    }

    /// Overrides the row cap
    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    /// Parses and executes a wire-format query
    pub fn execute_json(&self, query: &serde_json::Value) -> QueryResult<QueryOutput> {
        let parsed = parse_query(query).map_err(|err| {
            self.record_failure(&err);
            err
        })?;
        self.execute(&parsed)
    }

    /// Executes a parsed query.
    ///
    /// Deterministic: same query and same dataset snapshot give the same
    /// rows in the same order.
    pub fn execute(&self, query: &Query) -> QueryResult<QueryOutput> {
        let scope = ObservationScope::with_fields("QUERY", &[("dataset", &query.dataset_id)]);

        match self.run(query) {
            Ok(output) => {
                if let Some(m) = self.metrics {
                    m.increment_queries_executed();
                    m.add_rows_returned(output.len() as u64);
                }
                scope.complete_with_fields(&[("rows", &output.len().to_string())]);
                Ok(output)
            }
            Err(err) => {
                self.record_failure(&err);
                scope.fail(err.code().code(), err.message());
                Err(err)
            }
        }
    }

    fn run(&self, query: &Query) -> QueryResult<QueryOutput> {
        // Step 1: snapshot; held for the whole query
        let dataset = self.repository.get(&query.dataset_id)?;
        if dataset.kind() != query.kind {
            return Err(QueryError::invalid(format!(
                "Dataset '{}' holds {}, query references {} fields",
                dataset.id(),
                dataset.kind(),
                query.kind
            )));
        }
        let records = dataset.records();

        // Step 2: WHERE
        let matched = FilterEvaluator::evaluate(query.filter.as_ref(), records);

        // Steps 3-5
        let mut rows = match &query.transformations {
            Some(t) => {
                let aggregated = TransformEngine::transform(t, records, &matched)?;
                self.check_limit(aggregated.len())?;
                project_aggregates(query, t, &aggregated)
            }
            None => {
                self.check_limit(matched.len())?;
                project_records(query, &dataset, &matched)?
            }
        };

        // Step 6: ORDER
        let columns = query.column_names();
        if let Some(order) = &query.order {
            let key_columns: Vec<usize> = order
                .keys
                .iter()
                .filter_map(|k| columns.iter().position(|c| c == k))
                .collect();
            ResultSorter::sort(&mut rows, &key_columns, order.direction);
        }

        Ok(QueryOutput {
            dataset_id: query.dataset_id.clone(),
            kind: query.kind,
            columns,
            rows,
        })
    }

    fn check_limit(&self, rows: usize) -> QueryResult<()> {
        if rows > self.result_limit {
            Err(QueryError::result_too_large(rows, self.result_limit))
        } else {
            Ok(())
        }
    }

    fn record_failure(&self, err: &QueryError) {
        let code = err.code().code();
        match err.kind() {
            ErrorKind::ResultTooLarge => {
                if let Some(m) = self.metrics {
                    m.increment_queries_too_large();
                }
                log_event_with_fields(
                    Event::QueryTooLarge,
                    &[("code", code), ("reason", err.message())],
                );
            }
            ErrorKind::Validation | ErrorKind::NotFound => {
                if let Some(m) = self.metrics {
                    m.increment_queries_rejected();
                }
                log_event_with_fields(
                    Event::QueryRejected,
                    &[("code", code), ("reason", err.message())],
                );
            }
        }
    }
}

fn project_records(
    query: &Query,
    dataset: &Dataset,
    matched: &[usize],
) -> QueryResult<Vec<ResultRow>> {
    let records: &[Record] = dataset.records();
    matched
        .iter()
        .map(|&idx| {
            let record = &records[idx];
            query
                .columns
                .iter()
                .map(|column| match column {
                    Column::Field(key) => record
                        .get(key.field)
                        .map(ValueRef::to_value)
                        .ok_or_else(|| {
                            QueryError::invalid(format!("Field '{}' is not present in dataset", key))
                        }),
                    Column::Apply(name) => Err(QueryError::invalid(format!(
                        "Column '{}' requires TRANSFORMATIONS",
                        name
                    ))),
                })
                .collect::<QueryResult<Vec<_>>>()
                .map(ResultRow::new)
        })
        .collect()
}

fn project_aggregates(
    query: &Query,
    t: &Transformations,
    aggregated: &[AggregateRow],
) -> Vec<ResultRow> {
    // Column -> position in the aggregate row, resolved once
    let sources: Vec<Source> = query
        .columns
        .iter()
        .filter_map(|column| match column {
            Column::Field(key) => t.group.iter().position(|f| *f == key.field).map(Source::Group),
            Column::Apply(name) => t.apply.iter().position(|r| r.name == *name).map(Source::Applied),
        })
        .collect();

    aggregated
        .iter()
        .map(|row| {
            ResultRow::new(
                sources
                    .iter()
                    .filter_map(|source| match source {
                        Source::Group(i) => row.group.get(*i).cloned(),
                        Source::Applied(i) => row.applied.get(*i).cloned(),
                    })
                    .collect(),
            )
        })
        .collect()
}

enum Source {
    Group(usize),
    Applied(usize),
}
