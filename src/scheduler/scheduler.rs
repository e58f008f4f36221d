//! Greedy nearest-centroid room scheduler
//!
//! Single pass, largest section first. Each section takes the free
//! (room, timeslot) slot whose room fits it and lies closest to the running
//! centroid of rooms used so far. Earlier placements are never revisited, so
//! the result is feasible but not optimal.

use serde::Serialize;

use super::geo::{Centroid, GeoPoint};
use super::timeslot::TimeSlot;
use crate::dataset::{Room, Section};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, ObservationScope};

/// The parts of a section the scheduler needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedSection {
    pub dept: String,
    pub id: String,
    pub uuid: String,
    pub pass: u64,
    pub fail: u64,
    pub audit: u64,
}

impl SchedSection {
    /// Seats needed: pass + fail + audit
    pub fn size(&self) -> u64 {
        self.pass.saturating_add(self.fail).saturating_add(self.audit)
    }
}

impl From<&Section> for SchedSection {
    fn from(s: &Section) -> Self {
        Self {
            dept: s.dept.clone(),
            id: s.id.clone(),
            uuid: s.uuid.clone(),
            pass: s.pass,
            fail: s.fail,
            audit: s.audit,
        }
    }
}

/// The parts of a room the scheduler needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedRoom {
    pub shortname: String,
    pub number: String,
    pub name: String,
    pub seats: u64,
    pub lat: f64,
    pub lon: f64,
}

impl SchedRoom {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn fits(&self, section: &SchedSection) -> bool {
        self.seats >= section.size()
    }
}

impl From<&Room> for SchedRoom {
    fn from(r: &Room) -> Self {
        Self {
            shortname: r.shortname.clone(),
            number: r.number.clone(),
            name: r.name.clone(),
            seats: r.seats,
            lat: r.lat,
            lon: r.lon,
        }
    }
}

/// One placed section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub room: SchedRoom,
    pub section: SchedSection,
    pub timeslot: TimeSlot,
}

/// Full outcome of a run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScheduleReport {
    /// In placement order (largest section first)
    pub assignments: Vec<Assignment>,
    /// Sections with no room large enough and free
    pub unplaced: Vec<SchedSection>,
}

/// Greedy scheduler
#[derive(Default)]
pub struct Scheduler<'a> {
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> Scheduler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Assignment triples only
    pub fn schedule(&self, sections: &[SchedSection], rooms: &[SchedRoom]) -> Vec<Assignment> {
        self.schedule_report(sections, rooms).assignments
    }

    /// Runs the scheduler and reports placed and unplaced sections
    pub fn schedule_report(&self, sections: &[SchedSection], rooms: &[SchedRoom]) -> ScheduleReport {
        let scope = ObservationScope::with_fields(
            "SCHEDULE",
            &[
                ("sections", &sections.len().to_string()),
                ("rooms", &rooms.len().to_string()),
            ],
        );

        let report = place(sections, rooms);

        for section in &report.unplaced {
            log_event_with_fields(
                Event::SectionUnplaced,
                &[("uuid", &section.uuid), ("size", &section.size().to_string())],
            );
        }
        if let Some(m) = self.metrics {
            m.add_sections_scheduled(report.assignments.len() as u64);
            m.add_sections_unplaced(report.unplaced.len() as u64);
        }

        let placed = report.assignments.len().to_string();
        let unplaced = report.unplaced.len().to_string();
        log_event_with_fields(
            Event::ScheduleComplete,
            &[("placed", &placed), ("unplaced", &unplaced)],
        );
        scope.complete_with_fields(&[("placed", &placed), ("unplaced", &unplaced)]);

        report
    }
}

fn place(sections: &[SchedSection], rooms: &[SchedRoom]) -> ScheduleReport {
    let mut report = ScheduleReport::default();

    let Some(mut reference) = Centroid::of(rooms.iter().map(SchedRoom::location)).point() else {
        report.unplaced = sections.to_vec();
        return report;
    };

    // Largest first; stable, so equal sizes keep input order
    let mut order: Vec<&SchedSection> = sections.iter().collect();
    order.sort_by(|a, b| b.size().cmp(&a.size()));

    // Slots are room-major and a room's slots are all equally far, so a
    // room's free slots are always the tail of the timeslot list
    let mut used_slots = vec![0usize; rooms.len()];
    let mut assigned = Centroid::new();

    for section in order {
        let mut best: Option<(usize, f64)> = None;
        for (idx, room) in rooms.iter().enumerate() {
            if used_slots[idx] >= TimeSlot::ALL.len() || !room.fits(section) {
                continue;
            }
            let distance = reference.distance_to(&room.location());
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((idx, distance));
            }
        }

        match best {
            Some((idx, _)) => {
                let room = &rooms[idx];
                let timeslot = TimeSlot::ALL[used_slots[idx]];
                used_slots[idx] += 1;
                assigned.add(room.location());
                if let Some(point) = assigned.point() {
                    reference = point;
                }
                report.assignments.push(Assignment {
                    room: room.clone(),
                    section: section.clone(),
                    timeslot,
                });
            }
            None => report.unplaced.push(section.clone()),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(uuid: &str, size: u64) -> SchedSection {
        SchedSection {
            dept: "cpsc".into(),
            id: "310".into(),
            uuid: uuid.into(),
            pass: size,
            fail: 0,
            audit: 0,
        }
    }

    fn room(name: &str, seats: u64, lat: f64, lon: f64) -> SchedRoom {
        SchedRoom {
            shortname: name.into(),
            number: "100".into(),
            name: format!("{}_100", name),
            seats,
            lat,
            lon,
        }
    }

    #[test]
    fn test_section_size() {
        let s = SchedSection {
            pass: 40,
            fail: 5,
            audit: 2,
            ..section("a", 0)
        };
        assert_eq!(s.size(), 47);
    }

    #[test]
    fn test_no_rooms() {
        let report = Scheduler::new().schedule_report(&[section("a", 10)], &[]);
        assert!(report.assignments.is_empty());
        assert_eq!(report.unplaced.len(), 1);
    }

    #[test]
    fn test_no_sections() {
        assert!(Scheduler::new().schedule(&[], &[room("A", 10, 0.0, 0.0)]).is_empty());
    }

    #[test]
    fn test_largest_first_and_capacity() {
        let rooms = [room("A", 50, 49.0, -123.0)];
        let out = Scheduler::new().schedule(&[section("small", 40), section("big", 60)], &rooms);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].section.uuid, "small");
        assert_eq!(out[0].timeslot, TimeSlot::Mwf0800);
    }

    #[test]
    fn test_fills_timeslots_in_order() {
        let rooms = [room("A", 100, 49.0, -123.0)];
        let sections: Vec<_> = (0..16).map(|i| section(&format!("s{}", i), 10)).collect();
        let report = Scheduler::new().schedule_report(&sections, &rooms);
        assert_eq!(report.assignments.len(), 15);
        assert_eq!(report.unplaced.len(), 1);
        assert_eq!(report.unplaced[0].uuid, "s15");
        let slots: Vec<TimeSlot> = report.assignments.iter().map(|a| a.timeslot).collect();
        assert_eq!(slots, TimeSlot::ALL.to_vec());
    }

    #[test]
    fn test_prefers_room_near_centroid() {
        // Centroid of all three is near B
        let rooms = [
            room("A", 100, 49.00, -123.00),
            room("B", 100, 49.10, -123.10),
            room("C", 100, 49.20, -123.20),
        ];
        let out = Scheduler::new().schedule(&[section("x", 10)], &rooms);
        assert_eq!(out[0].room.shortname, "B");
    }

    #[test]
    fn test_centroid_follows_assignments() {
        // First section can only fit the far room; the second then prefers
        // the room nearest to it rather than the overall mean
        let rooms = [
            room("NEAR", 20, 49.00, -123.00),
            room("MID", 20, 49.05, -123.05),
            room("FAR", 200, 49.50, -123.50),
            room("FAR2", 20, 49.45, -123.45),
        ];
        let out = Scheduler::new().schedule(&[section("big", 150), section("small", 10)], &rooms);
        assert_eq!(out[0].room.shortname, "FAR");
        assert_eq!(out[1].room.shortname, "FAR");
        assert_eq!(out[1].timeslot, TimeSlot::Mwf0900);
    }

    #[test]
    fn test_equal_sizes_keep_input_order() {
        let rooms = [room("A", 100, 0.0, 0.0)];
        let out = Scheduler::new().schedule(&[section("first", 5), section("second", 5)], &rooms);
        assert_eq!(out[0].section.uuid, "first");
        assert_eq!(out[1].section.uuid, "second");
    }

    #[test]
    fn test_metrics() {
        let metrics = MetricsRegistry::new();
        let rooms = [room("A", 50, 0.0, 0.0)];
        Scheduler::new()
            .with_metrics(&metrics)
            .schedule(&[section("a", 10), section("b", 99)], &rooms);
        let snap = metrics.snapshot();
        assert_eq!(snap.sections_scheduled, 1);
        assert_eq!(snap.sections_unplaced, 1);
    }
}
