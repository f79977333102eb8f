//! Role-tagged timeline entries and the computed timeline itself.

use crate::models::types::{Leg, Stop};

/// One time-stamped stop in a computed itinerary.
///
/// The variant set is closed and decided purely by position in the day:
/// the first stop only departs, the last only arrives, and everything in
/// between does both. Renderers match on the variant to decide which
/// timestamps to show; only a `Waypoint` has a displayable stay figure.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "role", rename_all = "snake_case")
)]
pub enum TimelineEntry {
    /// First stop of the day; the clock starts here.
    Origin { stop: Stop, departure: u32 },
    /// Interior stop with both timestamps.
    Waypoint {
        stop: Stop,
        arrival: u32,
        departure: u32,
    },
    /// Last stop of the day; no further departure is modeled.
    FinalDestination { stop: Stop, arrival: u32 },
}

impl TimelineEntry {
    pub fn stop(&self) -> &Stop {
        match self {
            Self::Origin { stop, .. }
            | Self::Waypoint { stop, .. }
            | Self::FinalDestination { stop, .. } => stop,
        }
    }

    /// Seconds since midnight, `None` for the origin.
    pub fn arrival(&self) -> Option<u32> {
        match self {
            Self::Origin { .. } => None,
            Self::Waypoint { arrival, .. } | Self::FinalDestination { arrival, .. } => {
                Some(*arrival)
            }
        }
    }

    /// Seconds since midnight, `None` for the final destination.
    pub fn departure(&self) -> Option<u32> {
        match self {
            Self::Origin { departure, .. } | Self::Waypoint { departure, .. } => Some(*departure),
            Self::FinalDestination { .. } => None,
        }
    }

    /// Stay at this stop as rendered, derived from the two timestamps.
    /// Only a waypoint shows one.
    pub fn stay_seconds(&self) -> Option<u32> {
        match self {
            Self::Waypoint {
                arrival, departure, ..
            } => Some(departure.saturating_sub(*arrival)),
            _ => None,
        }
    }
}

/// The full result of timeline generation: one entry per input stop, in
/// input order, plus the leg list passed through untouched so renderers can
/// draw path segments between consecutive entries.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
    pub legs: Vec<Leg>,
}

impl Timeline {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn stop(id: &str) -> Stop {
        Stop::new(id, id, Point::new(13.4050, 52.5200))
    }

    #[test]
    fn test_accessors_by_variant() {
        let origin = TimelineEntry::Origin {
            stop: stop("a"),
            departure: 100,
        };
        let waypoint = TimelineEntry::Waypoint {
            stop: stop("b"),
            arrival: 200,
            departure: 500,
        };
        let last = TimelineEntry::FinalDestination {
            stop: stop("c"),
            arrival: 900,
        };

        assert_eq!(origin.arrival(), None);
        assert_eq!(origin.departure(), Some(100));
        assert_eq!(origin.stay_seconds(), None);

        assert_eq!(waypoint.arrival(), Some(200));
        assert_eq!(waypoint.departure(), Some(500));
        assert_eq!(waypoint.stay_seconds(), Some(300));

        assert_eq!(last.arrival(), Some(900));
        assert_eq!(last.departure(), None);
        assert_eq!(last.stay_seconds(), None);

        assert_eq!(last.stop().id.as_str(), "c");
    }
}
