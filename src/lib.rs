//! insightdb - a query engine and room scheduler over course-section and
//! campus-room datasets
//!
//! Queries are JSON documents (WHERE / OPTIONS / TRANSFORMATIONS) validated
//! by the planner and run by the executor against immutable dataset
//! snapshots from a [`dataset::DatasetRepository`].

pub mod cli;
pub mod dataset;
pub mod executor;
pub mod observability;
pub mod planner;
pub mod scheduler;
