//! Field catalog for the two fixed dataset schemas
//!
//! Sections and rooms have disjoint field names, so a bare field name is
//! enough to tell which dataset kind it belongs to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between dataset id and field name in a query key
pub const KEY_SEPARATOR: char = '_';

/// The two dataset shapes the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Course sections
    Sections,
    /// Campus rooms
    Rooms,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Sections => "sections",
            DatasetKind::Rooms => "rooms",
        }
    }

    /// Parses the lowercase kind name used on the wire and in dataset files
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sections" | "courses" => Some(DatasetKind::Sections),
            "rooms" => Some(DatasetKind::Rooms),
            _ => None,
        }
    }

    /// All fields belonging to this kind, in catalog order
    pub fn fields(&self) -> &'static [Field] {
        match self {
            DatasetKind::Sections => SECTION_FIELDS,
            DatasetKind::Rooms => ROOM_FIELDS,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every queryable field across both schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // Sections
    Dept,
    Id,
    Uuid,
    Instructor,
    Title,
    Avg,
    Pass,
    Fail,
    Audit,
    Year,
    // Rooms
    Fullname,
    Shortname,
    Number,
    Name,
    Address,
    Href,
    Type,
    Furniture,
    Lat,
    Lon,
    Seats,
}

const SECTION_FIELDS: &[Field] = &[
    Field::Dept,
    Field::Id,
    Field::Uuid,
    Field::Instructor,
    Field::Title,
    Field::Avg,
    Field::Pass,
    Field::Fail,
    Field::Audit,
    Field::Year,
];

const ROOM_FIELDS: &[Field] = &[
    Field::Fullname,
    Field::Shortname,
    Field::Number,
    Field::Name,
    Field::Address,
    Field::Href,
    Field::Type,
    Field::Furniture,
    Field::Lat,
    Field::Lon,
    Field::Seats,
];

impl Field {
    /// Looks up a field by its bare (unprefixed) name
    pub fn from_name(name: &str) -> Option<Self> {
        SECTION_FIELDS
            .iter()
            .chain(ROOM_FIELDS.iter())
            .copied()
            .find(|f| f.name() == name)
    }

    /// Bare field name as it appears after the dataset prefix
    pub fn name(&self) -> &'static str {
        match self {
            Field::Dept => "dept",
            Field::Id => "id",
            Field::Uuid => "uuid",
            Field::Instructor => "instructor",
            Field::Title => "title",
            Field::Avg => "avg",
            Field::Pass => "pass",
            Field::Fail => "fail",
            Field::Audit => "audit",
            Field::Year => "year",
            Field::Fullname => "fullname",
            Field::Shortname => "shortname",
            Field::Number => "number",
            Field::Name => "name",
            Field::Address => "address",
            Field::Href => "href",
            Field::Type => "type",
            Field::Furniture => "furniture",
            Field::Lat => "lat",
            Field::Lon => "lon",
            Field::Seats => "seats",
        }
    }

    /// Dataset kind owning this field
    pub fn kind(&self) -> DatasetKind {
        match self {
            Field::Dept
            | Field::Id
            | Field::Uuid
            | Field::Instructor
            | Field::Title
            | Field::Avg
            | Field::Pass
            | Field::Fail
            | Field::Audit
            | Field::Year => DatasetKind::Sections,
            _ => DatasetKind::Rooms,
        }
    }

    /// Returns true for number-valued fields
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Field::Avg
                | Field::Pass
                | Field::Fail
                | Field::Audit
                | Field::Year
                | Field::Lat
                | Field::Lon
                | Field::Seats
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
