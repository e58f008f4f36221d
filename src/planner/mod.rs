//! Query planner subsystem
//!
//! Parses the JSON query language into a validated [`Query`]:
//!
//! - Filter trees become an exhaustive [`Filter`] enum at parse time
//! - Every prefixed key must resolve to one dataset id and one dataset kind
//! - COLUMNS, ORDER, GROUP and APPLY are cross-checked before execution
//!
//! Failures are [`QueryError`]s of kind `Validation`; the executor adds the
//! `NotFound` and `ResultTooLarge` kinds.

mod ast;
mod errors;
mod parser;

pub use ast::{
    ApplyRule, ApplyToken, Column, CompareOp, Direction, FieldKey, Filter, OrderSpec, Pattern,
    Query, Transformations, WILDCARD,
};
pub use errors::{ErrorKind, QueryError, QueryErrorCode, QueryResult};
pub use parser::{filter_fields, parse_query, parse_query_str};
