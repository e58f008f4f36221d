//! Query AST structures
//!
//! Defines the parsed, validated query representation. Every variant here
//! is decided once by the parser; the executor never re-inspects raw JSON.

use std::fmt;

use crate::dataset::{DatasetKind, Field, KEY_SEPARATOR};

/// A dataset-prefixed field reference, e.g. `courses_avg`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub dataset: String,
    pub field: Field,
}

impl FieldKey {
    pub fn new(dataset: impl Into<String>, field: Field) -> Self {
        Self {
            dataset: dataset.into(),
            field,
        }
    }

    /// Splits `<id>_<field>`. Returns `None` unless there is exactly one
    /// separator, a non-empty id and a known field name.
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.split(KEY_SEPARATOR);
        let dataset = parts.next()?;
        let field = parts.next()?;
        if parts.next().is_some() || dataset.is_empty() {
            return None;
        }
        Field::from_name(field).map(|f| Self::new(dataset, f))
    }

    /// The wire form `<id>_<field>`
    pub fn key(&self) -> String {
        format!("{}{}{}", self.dataset, KEY_SEPARATOR, self.field.name())
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.dataset, KEY_SEPARATOR, self.field.name())
    }
}

/// Numeric comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Eq,
}

impl CompareOp {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "LT" => Some(CompareOp::Lt),
            "GT" => Some(CompareOp::Gt),
            "EQ" => Some(CompareOp::Eq),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Lt => "LT",
            CompareOp::Gt => "GT",
            CompareOp::Eq => "EQ",
        }
    }

    /// Evaluates `lhs <op> rhs`
    pub fn holds(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Lt => lhs < rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Eq => lhs == rhs,
        }
    }
}

/// Wildcard marker in IS patterns
pub const WILDCARD: char = '*';

/// A string pattern for IS, with wildcards only at the ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// No wildcard: whole-string equality
    Exact(String),
    /// `abc*`
    Prefix(String),
    /// `*abc`
    Suffix(String),
    /// `*abc*`
    Contains(String),
}

impl Pattern {
    /// Parses a raw IS value. Returns `None` if a wildcard appears anywhere
    /// other than the first or last position.
    pub fn parse(raw: &str) -> Option<Self> {
        let (leading, rest) = match raw.strip_prefix(WILDCARD) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (trailing, core) = match rest.strip_suffix(WILDCARD) {
            Some(core) => (true, core),
            None => (false, rest),
        };
        if core.contains(WILDCARD) {
            return None;
        }
        let core = core.to_string();
        Some(match (leading, trailing) {
            (false, false) => Pattern::Exact(core),
            (false, true) => Pattern::Prefix(core),
            (true, false) => Pattern::Suffix(core),
            (true, true) => Pattern::Contains(core),
        })
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(p) => value == p,
            Pattern::Prefix(p) => value.starts_with(p.as_str()),
            Pattern::Suffix(p) => value.ends_with(p.as_str()),
            Pattern::Contains(p) => value.contains(p.as_str()),
        }
    }
}

/// WHERE filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    /// Numeric field comparison
    Compare { op: CompareOp, field: Field, value: f64 },
    /// String field match
    Match { field: Field, pattern: Pattern },
}

impl Filter {
    pub fn compare(op: CompareOp, field: Field, value: f64) -> Self {
        Filter::Compare { op, field, value }
    }

    pub fn matching(field: Field, pattern: Pattern) -> Self {
        Filter::Match { field, pattern }
    }

    pub fn negate(inner: Filter) -> Self {
        Filter::Not(Box::new(inner))
    }

    /// Nesting depth; leaves are depth 1
    pub fn depth(&self) -> usize {
        match self {
            Filter::And(children) | Filter::Or(children) => {
                1 + children.iter().map(Filter::depth).max().unwrap_or(0)
            }
            Filter::Not(inner) => 1 + inner.depth(),
            Filter::Compare { .. } | Filter::Match { .. } => 1,
        }
    }
}

/// One output column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// A dataset field (or GROUP key)
    Field(FieldKey),
    /// An APPLY rule output, by name
    Apply(String),
}

impl Column {
    /// Output key: prefixed for fields, bare for apply names
    pub fn name(&self) -> String {
        match self {
            Column::Field(key) => key.key(),
            Column::Apply(name) => name.clone(),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UP" => Some(Direction::Up),
            "DOWN" => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        }
    }
}

/// ORDER clause: one direction for all keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub direction: Direction,
    /// Column names, compared left to right
    pub keys: Vec<String>,
}

impl OrderSpec {
    pub fn up(keys: Vec<String>) -> Self {
        Self {
            direction: Direction::Up,
            keys,
        }
    }

    pub fn down(keys: Vec<String>) -> Self {
        Self {
            direction: Direction::Down,
            keys,
        }
    }
}

/// Aggregate tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyToken {
    Max,
    Min,
    Avg,
    Sum,
    Count,
}

impl ApplyToken {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MAX" => Some(ApplyToken::Max),
            "MIN" => Some(ApplyToken::Min),
            "AVG" => Some(ApplyToken::Avg),
            "SUM" => Some(ApplyToken::Sum),
            "COUNT" => Some(ApplyToken::Count),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyToken::Max => "MAX",
            ApplyToken::Min => "MIN",
            ApplyToken::Avg => "AVG",
            ApplyToken::Sum => "SUM",
            ApplyToken::Count => "COUNT",
        }
    }

    /// COUNT accepts any field; the rest need numbers
    pub fn requires_numeric(&self) -> bool {
        !matches!(self, ApplyToken::Count)
    }
}

/// A named aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRule {
    pub name: String,
    pub token: ApplyToken,
    pub field: Field,
}

/// GROUP + APPLY stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformations {
    pub group: Vec<Field>,
    pub apply: Vec<ApplyRule>,
}

impl Transformations {
    pub fn find_rule(&self, name: &str) -> Option<&ApplyRule> {
        self.apply.iter().find(|r| r.name == name)
    }
}

/// A validated query bound to one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub dataset_id: String,
    pub kind: DatasetKind,
    /// `None` selects every record
    pub filter: Option<Filter>,
    pub columns: Vec<Column>,
    pub order: Option<OrderSpec>,
    pub transformations: Option<Transformations>,
}

impl Query {
    /// Output keys in COLUMNS order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn is_transformed(&self) -> bool {
        self.transformations.is_some()
    }
}
