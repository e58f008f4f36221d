//! Dataset subsystem
//!
//! Holds the two fixed record schemas (course sections and campus rooms),
//! the field catalog, and the repository the query engine reads from.
//!
//! # Design Principles
//!
//! - Datasets are immutable once built; replacement swaps a whole snapshot
//! - Every record in a dataset has the dataset's kind
//! - Dataset files are checksum-verified on every load
//! - Ingestion (archive extraction, HTML parsing, geocoding) is not done here;
//!   records arrive already parsed

mod checksum;
mod dataset;
mod errors;
mod fields;
mod file;
mod record;
mod store;

pub use checksum::compute_checksum;
pub use dataset::{validate_id, Dataset, DatasetSummary};
pub use errors::{DatasetError, DatasetResult};
pub use fields::{DatasetKind, Field, KEY_SEPARATOR};
pub use file::{dataset_path, read_dataset, write_dataset, DatasetFileHeader};
pub use record::{Record, Room, Section, Value, ValueRef};
pub use store::{DatasetRepository, DatasetStore};

#[cfg(test)]
pub(crate) use record::test_support;
