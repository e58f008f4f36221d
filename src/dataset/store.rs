//! Dataset repository
//!
//! The query path only reads through [`DatasetRepository`]. [`DatasetStore`]
//! is the concrete repository: an id -> `Arc<Dataset>` map behind a `RwLock`,
//! optionally mirrored to one file per dataset.
//!
//! # Concurrency contract
//!
//! - Single writer, many readers: `insert` and `remove` hold the write lock
//!   for the whole replace (including the file write).
//! - `get` hands out an `Arc` snapshot, so a query that started before a
//!   replacement keeps reading the dataset it resolved.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::observability::{log_event_with_fields, Event};

use super::dataset::{validate_id, Dataset, DatasetSummary};
use super::errors::{DatasetError, DatasetResult};
use super::file::{dataset_path, read_dataset, write_dataset, DATASET_FILE_EXT};

/// Read access to datasets, as consumed by the query executor
pub trait DatasetRepository {
    /// Returns a snapshot of dataset `id`, or `NotFound`
    fn get(&self, id: &str) -> DatasetResult<Arc<Dataset>>;

    /// Lists all datasets, sorted by id
    fn list(&self) -> Vec<DatasetSummary>;
}

/// In-memory dataset repository with optional file persistence
#[derive(Debug, Default)]
pub struct DatasetStore {
    data_dir: Option<PathBuf>,
    datasets: RwLock<HashMap<String, Arc<Dataset>>>,
}

impl DatasetStore {
    /// Creates a store that never touches disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a file-backed store, loading every dataset file in `dir`.
    ///
    /// Any corrupt file aborts the open; nothing is partially loaded.
    pub fn open(dir: impl AsRef<Path>) -> DatasetResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut datasets = HashMap::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !is_dataset_file(&path) {
                continue;
            }

            let dataset = read_dataset(&path).inspect_err(|e| {
                if e.is_corruption() {
                    log_event_with_fields(
                        Event::DatasetCorrupted,
                        &[("path", &path.display().to_string()), ("reason", &e.to_string())],
                    );
                }
            })?;

            log_event_with_fields(
                Event::DatasetLoaded,
                &[("id", dataset.id()), ("rows", &dataset.len().to_string())],
            );
            datasets.insert(dataset.id().to_string(), Arc::new(dataset));
        }

        Ok(Self {
            data_dir: Some(dir),
            datasets: RwLock::new(datasets),
        })
    }

    /// Directory backing this store, if any
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Stores a dataset, replacing any dataset with the same id.
    ///
    /// Returns the ids of all stored datasets, sorted.
    pub fn insert(&self, dataset: Dataset) -> DatasetResult<Vec<String>> {
        if dataset.is_empty() {
            return Err(DatasetError::Empty(dataset.id().to_string()));
        }

        let mut datasets = self.datasets.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(dir) = &self.data_dir {
            write_dataset(dir, &dataset)?;
        }

        log_event_with_fields(
            Event::DatasetStored,
            &[
                ("id", dataset.id()),
                ("kind", dataset.kind().as_str()),
                ("rows", &dataset.len().to_string()),
            ],
        );
        datasets.insert(dataset.id().to_string(), Arc::new(dataset));

        Ok(sorted_ids(&datasets))
    }

    /// Removes a dataset and its file. Returns the removed id.
    pub fn remove(&self, id: &str) -> DatasetResult<String> {
        validate_id(id)?;

        let mut datasets = self.datasets.write().unwrap_or_else(PoisonError::into_inner);
        if !datasets.contains_key(id) {
            return Err(DatasetError::NotFound(id.to_string()));
        }

        if let Some(dir) = &self.data_dir {
            let path = dataset_path(dir, id);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }

        datasets.remove(id);
        log_event_with_fields(Event::DatasetRemoved, &[("id", id)]);
        Ok(id.to_string())
    }

    /// Returns true if a dataset with this id is stored
    pub fn contains(&self, id: &str) -> bool {
        self.datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Ids of all stored datasets, sorted
    pub fn ids(&self) -> Vec<String> {
        sorted_ids(&self.datasets.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl DatasetRepository for DatasetStore {
    fn get(&self, id: &str) -> DatasetResult<Arc<Dataset>> {
        self.datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| DatasetError::NotFound(id.to_string()))
    }

    fn list(&self) -> Vec<DatasetSummary> {
        let datasets = self.datasets.read().unwrap_or_else(PoisonError::into_inner);
        let mut summaries: Vec<DatasetSummary> = datasets.values().map(|d| d.summary()).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }
}

fn is_dataset_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(true, |n| n.starts_with('.'));
    path.is_file() && !hidden && path.extension().and_then(|e| e.to_str()) == Some(DATASET_FILE_EXT)
}

fn sorted_ids(datasets: &HashMap<String, Arc<Dataset>>) -> Vec<String> {
    let mut ids: Vec<String> = datasets.keys().cloned().collect();
    ids.sort();
    ids
}
