//! Observable events
//!
//! Events are explicit and typed; the string form is what appears in the
//! `event` field of a log line.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file loaded and validated
    ConfigLoaded,

    /// Dataset file read and verified
    DatasetLoaded,
    /// Dataset written (insert or replace)
    DatasetStored,
    /// Dataset deleted
    DatasetRemoved,
    /// Dataset file failed integrity checks
    DatasetCorrupted,

    /// Query failed validation or referenced a missing dataset
    QueryRejected,
    /// Query was valid but produced too many rows
    QueryTooLarge,

    /// Scheduler finished a run
    ScheduleComplete,
    /// Scheduler found no slot for a section
    SectionUnplaced,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DatasetLoaded => "DATASET_LOADED",
            Event::DatasetStored => "DATASET_STORED",
            Event::DatasetRemoved => "DATASET_REMOVED",
            Event::DatasetCorrupted => "DATASET_CORRUPTED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::QueryTooLarge => "QUERY_RESULT_TOO_LARGE",
            Event::ScheduleComplete => "SCHEDULE_COMPLETE",
            Event::SectionUnplaced => "SECTION_UNPLACED",
        }
    }

    /// Events logged at WARN rather than INFO
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::DatasetCorrupted | Event::QueryRejected | Event::QueryTooLarge
        )
    }

    /// Events only interesting when tracing
    pub fn is_trace(&self) -> bool {
        matches!(self, Event::SectionUnplaced)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
