use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

// Zone boundaries are inclusive upper bounds, in feet from the basket.
const RIM_MAX_FEET: f64 = 4.0;
const SHORT_MID_RANGE_MAX_FEET: f64 = 13.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShotZone {
    Rim,
    ShortMidRange,
    LongMidRange,
    GenericTwoPoint,
    ThreePoint,
    FreeThrow,
}

impl ShotZone {
    pub const ALL: [ShotZone; 6] = [
        Self::Rim,
        Self::ShortMidRange,
        Self::LongMidRange,
        Self::GenericTwoPoint,
        Self::ThreePoint,
        Self::FreeThrow,
    ];

    pub fn point_value(self) -> u8 {
        match self {
            Self::FreeThrow => 1,
            Self::Rim | Self::ShortMidRange | Self::LongMidRange | Self::GenericTwoPoint => 2,
            Self::ThreePoint => 3,
        }
    }

    pub fn is_field_goal(self) -> bool {
        !matches!(self, Self::FreeThrow)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rim => "RIM",
            Self::ShortMidRange => "SHORT_MID_RANGE",
            Self::LongMidRange => "LONG_MID_RANGE",
            Self::GenericTwoPoint => "GENERIC_TWO_POINT",
            Self::ThreePoint => "THREE_POINT",
            Self::FreeThrow => "FREE_THROW",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Rim => "Rim",
            Self::ShortMidRange => "Short Mid-Range",
            Self::LongMidRange => "Long Mid-Range",
            Self::GenericTwoPoint => "2PT",
            Self::ThreePoint => "3PT",
            Self::FreeThrow => "Free Throw",
        }
    }
}

impl FromStr for ShotZone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|zone| zone.as_str() == s)
            .ok_or_else(|| anyhow!("unrecognized shot zone {s:?}"))
    }
}

impl fmt::Display for ShotZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Two-point zone for a shot distance in feet. Negative distances are the
/// "unparseable" marker and have no zone.
pub fn classify_two_point_zone(distance_feet: f64) -> Option<ShotZone> {
    if distance_feet < 0.0 || distance_feet.is_nan() {
        return None;
    }
    if distance_feet <= RIM_MAX_FEET {
        return Some(ShotZone::Rim);
    }
    if distance_feet <= SHORT_MID_RANGE_MAX_FEET {
        return Some(ShotZone::ShortMidRange);
    }
    Some(ShotZone::LongMidRange)
}
