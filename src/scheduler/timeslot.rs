//! Weekly timeslot grid

use std::fmt;

use serde::{Serialize, Serializer};

/// One weekly teaching block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeSlot {
    Mwf0800,
    Mwf0900,
    Mwf1000,
    Mwf1100,
    Mwf1200,
    Mwf1300,
    Mwf1400,
    Mwf1500,
    Mwf1600,
    Tr0800,
    Tr0930,
    Tr1100,
    Tr1230,
    Tr1400,
    Tr1530,
}

impl TimeSlot {
    /// Every slot in scheduling order: nine hourly MWF blocks, then six
    /// ninety-minute TR blocks
    pub const ALL: [TimeSlot; 15] = [
        TimeSlot::Mwf0800,
        TimeSlot::Mwf0900,
        TimeSlot::Mwf1000,
        TimeSlot::Mwf1100,
        TimeSlot::Mwf1200,
        TimeSlot::Mwf1300,
        TimeSlot::Mwf1400,
        TimeSlot::Mwf1500,
        TimeSlot::Mwf1600,
        TimeSlot::Tr0800,
        TimeSlot::Tr0930,
        TimeSlot::Tr1100,
        TimeSlot::Tr1230,
        TimeSlot::Tr1400,
        TimeSlot::Tr1530,
    ];

    /// Display label; TR labels carry two spaces
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Mwf0800 => "MWF 0800-0900",
            TimeSlot::Mwf0900 => "MWF 0900-1000",
            TimeSlot::Mwf1000 => "MWF 1000-1100",
            TimeSlot::Mwf1100 => "MWF 1100-1200",
            TimeSlot::Mwf1200 => "MWF 1200-1300",
            TimeSlot::Mwf1300 => "MWF 1300-1400",
            TimeSlot::Mwf1400 => "MWF 1400-1500",
            TimeSlot::Mwf1500 => "MWF 1500-1600",
            TimeSlot::Mwf1600 => "MWF 1600-1700",
            TimeSlot::Tr0800 => "TR  0800-0930",
            TimeSlot::Tr0930 => "TR  0930-1100",
            TimeSlot::Tr1100 => "TR  1100-1230",
            TimeSlot::Tr1230 => "TR  1230-1400",
            TimeSlot::Tr1400 => "TR  1400-1530",
            TimeSlot::Tr1530 => "TR  1530-1700",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|slot| slot.as_str() == label)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_shape() {
        let mwf = TimeSlot::ALL.iter().filter(|s| s.as_str().starts_with("MWF ")).count();
        let tr = TimeSlot::ALL.iter().filter(|s| s.as_str().starts_with("TR  ")).count();
        assert_eq!(mwf, 9);
        assert_eq!(tr, 6);
    }

    #[test]
    fn test_order_and_labels() {
        assert_eq!(TimeSlot::ALL[0].as_str(), "MWF 0800-0900");
        assert_eq!(TimeSlot::ALL[9].as_str(), "TR  0800-0930");
        assert_eq!(TimeSlot::ALL[14].as_str(), "TR  1530-1700");
        let mut sorted = TimeSlot::ALL;
        sorted.sort();
        assert_eq!(sorted, TimeSlot::ALL);
    }

    #[test]
    fn test_parse() {
        for slot in TimeSlot::ALL {
            assert_eq!(TimeSlot::parse(slot.as_str()), Some(slot));
        }
        assert_eq!(TimeSlot::parse("TR 0800-0930"), None);
    }

    #[test]
    fn test_serialize_as_label() {
        assert_eq!(
            serde_json::to_value(TimeSlot::Tr1100).unwrap(),
            serde_json::json!("TR  1100-1230")
        );
    }
}
