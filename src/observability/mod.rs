//! Observability subsystem
//!
//! - Structured logging (one JSON object per line on stderr)
//! - Counter metrics
//! - Scoped begin/complete tracing for queries and scheduler runs
//!
//! Observability is read-only: nothing here changes query or scheduler
//! results, and logging failures are swallowed.
//!
//! # Usage
//!
//! ```ignore
//! use insightdb::observability::{Logger, MetricsRegistry, ObservationScope};
//!
//! Logger::info("QUERY_COMPLETE", &[("rows", "42")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_executed();
//!
//! let scope = ObservationScope::new("SCHEDULE");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

fn event_severity(event: Event) -> Severity {
    if event.is_warning() {
        Severity::Warn
    } else if event.is_trace() {
        Severity::Trace
    } else {
        Severity::Info
    }
}

/// Log an event
pub fn log_event(event: Event) {
    Logger::log(event_severity(event), event.as_str(), &[]);
}

/// Log an event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}
