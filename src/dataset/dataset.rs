//! Dataset: an identified, kind-homogeneous, immutable record sequence

use serde::{Deserialize, Serialize};

use super::errors::{DatasetError, DatasetResult};
use super::fields::{DatasetKind, KEY_SEPARATOR};
use super::record::{Record, Room, Section};

/// Validates a dataset id: non-empty, not blank, no key separator.
///
/// The id is also the dataset's file name, so it may not start with `.`
/// (skipped as hidden on load) or contain a path separator.
pub fn validate_id(id: &str) -> DatasetResult<()> {
    if id.trim().is_empty()
        || id.contains(KEY_SEPARATOR)
        || id.starts_with('.')
        || id.contains(['/', '\\'])
    {
        return Err(DatasetError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// A dataset as read by the query engine. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    id: String,
    kind: DatasetKind,
    records: Vec<Record>,
}

impl Dataset {
    /// Creates a dataset, checking the id and that every record matches `kind`.
    pub fn new(id: impl Into<String>, kind: DatasetKind, records: Vec<Record>) -> DatasetResult<Self> {
        let id = id.into();
        validate_id(&id)?;

        if let Some(bad) = records.iter().find(|r| r.kind() != kind) {
            return Err(DatasetError::KindMismatch {
                id,
                expected: kind,
                found: bad.kind(),
            });
        }

        Ok(Self { id, kind, records })
    }

    /// Creates a sections dataset
    pub fn sections(id: impl Into<String>, sections: Vec<Section>) -> DatasetResult<Self> {
        let records = sections.into_iter().map(Record::Section).collect();
        Self::new(id, DatasetKind::Sections, records)
    }

    /// Creates a rooms dataset
    pub fn rooms(id: impl Into<String>, rooms: Vec<Room>) -> DatasetResult<Self> {
        let records = rooms.into_iter().map(Record::Room).collect();
        Self::new(id, DatasetKind::Rooms, records)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates the sections of a sections dataset (empty for rooms)
    pub fn iter_sections(&self) -> impl Iterator<Item = &Section> {
        self.records.iter().filter_map(Record::as_section)
    }

    /// Iterates the rooms of a rooms dataset (empty for sections)
    pub fn iter_rooms(&self) -> impl Iterator<Item = &Room> {
        self.records.iter().filter_map(Record::as_room)
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            id: self.id.clone(),
            kind: self.kind,
            num_rows: self.records.len(),
        }
    }
}

/// Listing entry for a stored dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: String,
    pub kind: DatasetKind,
    pub num_rows: usize,
}
