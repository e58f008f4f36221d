//! Room scheduler
//!
//! Assigns course sections to (room, timeslot) slots over a fixed weekly
//! grid of 15 timeslots. Independent of the query engine; it only borrows
//! the dataset record shapes through `From` conversions.

mod geo;
mod scheduler;
mod timeslot;

pub use geo::{haversine_distance, Centroid, GeoPoint, EARTH_RADIUS_M};
pub use scheduler::{Assignment, SchedRoom, SchedSection, ScheduleReport, Scheduler};
pub use timeslot::TimeSlot;
