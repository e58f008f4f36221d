//! Record shapes and field values
//!
//! A record is an immutable flat mapping from field to value. The two shapes
//! are typed structs; field access goes through [`Record::get`] so the query
//! engine never needs to know which shape it is looking at.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::fields::{DatasetKind, Field};

/// An owned field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            Value::Number(n) => ValueRef::Number(*n),
            Value::Text(s) => ValueRef::Text(s),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(s) => Some(s),
        }
    }

    /// Converts to JSON, emitting integral numbers as JSON integers
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
        }
    }

    /// Natural ordering: numeric for numbers, lexicographic for strings.
    ///
    /// Numbers order before strings; a single column never mixes the two.
    pub fn natural_cmp(&self, other: &Value) -> Ordering {
        self.as_value_ref().natural_cmp(&other.as_value_ref())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A borrowed view of a field value inside a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> ValueRef<'a> {
    pub fn to_value(self) -> Value {
        match self {
            ValueRef::Number(n) => Value::Number(n),
            ValueRef::Text(s) => Value::Text(s.to_string()),
        }
    }

    pub fn as_f64(self) -> Option<f64> {
        match self {
            ValueRef::Number(n) => Some(n),
            ValueRef::Text(_) => None,
        }
    }

    pub fn as_str(self) -> Option<&'a str> {
        match self {
            ValueRef::Number(_) => None,
            ValueRef::Text(s) => Some(s),
        }
    }

    pub fn natural_cmp(&self, other: &ValueRef<'_>) -> Ordering {
        match (self, other) {
            (ValueRef::Number(a), ValueRef::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (ValueRef::Text(a), ValueRef::Text(b)) => a.cmp(b),
            (ValueRef::Number(_), ValueRef::Text(_)) => Ordering::Less,
            (ValueRef::Text(_), ValueRef::Number(_)) => Ordering::Greater,
        }
    }
}

/// One course section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub dept: String,
    pub id: String,
    pub uuid: String,
    pub instructor: String,
    pub title: String,
    pub avg: f64,
    pub pass: u64,
    pub fail: u64,
    pub audit: u64,
    pub year: u64,
}

impl Section {
    /// Number of students enrolled (pass + fail + audit)
    pub fn size(&self) -> u64 {
        self.pass.saturating_add(self.fail).saturating_add(self.audit)
    }
}

/// One campus room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub fullname: String,
    pub shortname: String,
    pub number: String,
    /// Composite `shortname_number`
    pub name: String,
    pub address: String,
    pub href: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub furniture: String,
    pub lat: f64,
    pub lon: f64,
    pub seats: u64,
}

/// A record of either dataset kind
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Section(Section),
    Room(Room),
}

impl Record {
    pub fn kind(&self) -> DatasetKind {
        match self {
            Record::Section(_) => DatasetKind::Sections,
            Record::Room(_) => DatasetKind::Rooms,
        }
    }

    /// Reads a field. Returns `None` for fields of the other dataset kind.
    pub fn get(&self, field: Field) -> Option<ValueRef<'_>> {
        match self {
            Record::Section(s) => section_field(s, field),
            Record::Room(r) => room_field(r, field),
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Record::Section(s) => Some(s),
            Record::Room(_) => None,
        }
    }

    pub fn as_room(&self) -> Option<&Room> {
        match self {
            Record::Section(_) => None,
            Record::Room(r) => Some(r),
        }
    }
}

impl From<Section> for Record {
    fn from(s: Section) -> Self {
        Record::Section(s)
    }
}

impl From<Room> for Record {
    fn from(r: Room) -> Self {
        Record::Room(r)
    }
}

fn section_field(s: &Section, field: Field) -> Option<ValueRef<'_>> {
    let v = match field {
        Field::Dept => ValueRef::Text(&s.dept),
        Field::Id => ValueRef::Text(&s.id),
        Field::Uuid => ValueRef::Text(&s.uuid),
        Field::Instructor => ValueRef::Text(&s.instructor),
        Field::Title => ValueRef::Text(&s.title),
        Field::Avg => ValueRef::Number(s.avg),
        Field::Pass => ValueRef::Number(s.pass as f64),
        Field::Fail => ValueRef::Number(s.fail as f64),
        Field::Audit => ValueRef::Number(s.audit as f64),
        Field::Year => ValueRef::Number(s.year as f64),
        _ => return None,
    };
    Some(v)
}

fn room_field(r: &Room, field: Field) -> Option<ValueRef<'_>> {
    let v = match field {
        Field::Fullname => ValueRef::Text(&r.fullname),
        Field::Shortname => ValueRef::Text(&r.shortname),
        Field::Number => ValueRef::Text(&r.number),
        Field::Name => ValueRef::Text(&r.name),
        Field::Address => ValueRef::Text(&r.address),
        Field::Href => ValueRef::Text(&r.href),
        Field::Type => ValueRef::Text(&r.room_type),
        Field::Furniture => ValueRef::Text(&r.furniture),
        Field::Lat => ValueRef::Number(r.lat),
        Field::Lon => ValueRef::Number(r.lon),
        Field::Seats => ValueRef::Number(r.seats as f64),
        _ => return None,
    };
    Some(v)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn section(dept: &str, id: &str, avg: f64, pass: u64, fail: u64, audit: u64) -> Section {
        Section {
            dept: dept.to_string(),
            id: id.to_string(),
            uuid: format!("{}{}-{}", dept, id, pass),
            instructor: String::new(),
            title: format!("{} {}", dept, id),
            avg,
            pass,
            fail,
            audit,
            year: 2015,
        }
    }

    pub fn room(shortname: &str, number: &str, seats: u64, lat: f64, lon: f64) -> Room {
        Room {
            fullname: format!("{} Building", shortname),
            shortname: shortname.to_string(),
            number: number.to_string(),
            name: format!("{}_{}", shortname, number),
            address: String::new(),
            href: String::new(),
            room_type: "Small Group".to_string(),
            furniture: "Classroom-Movable Tables & Chairs".to_string(),
            lat,
            lon,
            seats,
        }
    }
}
