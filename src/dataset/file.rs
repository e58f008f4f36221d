//! Dataset file codec
//!
//! One file per dataset id, `<data_dir>/<id>.json`:
//!
//! ```text
//! {"id":"courses","kind":"sections","num_rows":2,"checksum":123,"written_at":"..."}\n
//! [{...},{...}]\n
//! ```
//!
//! The header checksum is CRC32 over the exact bytes of the record line.
//! Files are replaced whole (write to a temp file, then rename), so the last
//! write wins and readers never see a half-written dataset.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::checksum::{compute_checksum, verify_checksum};
use super::dataset::Dataset;
use super::errors::{DatasetError, DatasetResult};
use super::fields::DatasetKind;
use super::record::{Room, Section};

/// Extension used for dataset files
pub const DATASET_FILE_EXT: &str = "json";

/// First line of a dataset file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFileHeader {
    pub id: String,
    pub kind: DatasetKind,
    pub num_rows: usize,
    pub checksum: u32,
    pub written_at: DateTime<Utc>,
}

/// Path of the file holding dataset `id`
pub fn dataset_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.{}", id, DATASET_FILE_EXT))
}

/// Serializes a dataset into the two-line file format.
pub fn encode(dataset: &Dataset) -> DatasetResult<Vec<u8>> {
    let body = match dataset.kind() {
        DatasetKind::Sections => {
            let sections: Vec<&Section> = dataset.iter_sections().collect();
            serde_json::to_vec(&sections)?
        }
        DatasetKind::Rooms => {
            let rooms: Vec<&Room> = dataset.iter_rooms().collect();
            serde_json::to_vec(&rooms)?
        }
    };

    let header = DatasetFileHeader {
        id: dataset.id().to_string(),
        kind: dataset.kind(),
        num_rows: dataset.len(),
        checksum: compute_checksum(&body),
        written_at: Utc::now(),
    };

    let mut out = serde_json::to_vec(&header)?;
    out.push(b'\n');
    out.extend_from_slice(&body);
    out.push(b'\n');
    Ok(out)
}

/// Parses and verifies a dataset file. `label` names the source in errors.
pub fn decode(label: &str, bytes: &[u8]) -> DatasetResult<(DatasetFileHeader, Dataset)> {
    let split = bytes
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| DatasetError::corrupted(label, "missing header line"))?;

    let header: DatasetFileHeader = serde_json::from_slice(&bytes[..split])
        .map_err(|e| DatasetError::corrupted(label, format!("bad header: {}", e)))?;

    let mut body = &bytes[split + 1..];
    if let Some(stripped) = body.strip_suffix(b"\n") {
        body = stripped;
    }

    if !verify_checksum(body, header.checksum) {
        return Err(DatasetError::corrupted(label, "checksum mismatch"));
    }

    let dataset = match header.kind {
        DatasetKind::Sections => {
            let sections: Vec<Section> = serde_json::from_slice(body)
                .map_err(|e| DatasetError::corrupted(label, format!("bad records: {}", e)))?;
            Dataset::sections(header.id.clone(), sections)?
        }
        DatasetKind::Rooms => {
            let rooms: Vec<Room> = serde_json::from_slice(body)
                .map_err(|e| DatasetError::corrupted(label, format!("bad records: {}", e)))?;
            Dataset::rooms(header.id.clone(), rooms)?
        }
    };

    if dataset.len() != header.num_rows {
        return Err(DatasetError::corrupted(
            label,
            format!("header declares {} rows, found {}", header.num_rows, dataset.len()),
        ));
    }

    Ok((header, dataset))
}

/// Writes a dataset file, replacing any previous one.
pub fn write_dataset(dir: &Path, dataset: &Dataset) -> DatasetResult<PathBuf> {
    let bytes = encode(dataset)?;
    let path = dataset_path(dir, dataset.id());
    let tmp = dir.join(format!(".{}.{}.tmp", dataset.id(), DATASET_FILE_EXT));

    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, &path)?;
    Ok(path)
}

/// Reads and verifies a dataset file.
pub fn read_dataset(path: &Path) -> DatasetResult<Dataset> {
    let bytes = fs::read(path)?;
    let label = path.display().to_string();
    let (header, dataset) = decode(&label, &bytes)?;

    // The file name is the id; a renamed file is not trusted.
    let expected = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if header.id != expected {
        return Err(DatasetError::corrupted(
            label,
            format!("header id '{}' does not match file name", header.id),
        ));
    }

    Ok(dataset)
}
