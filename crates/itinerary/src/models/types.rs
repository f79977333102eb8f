//! Core data types and enums for itinerary data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use geo::Point;

use crate::identifiers::*;

/// Stay applied to a stop when the user has not picked one yet.
pub const DEFAULT_STAY_MINUTES: u32 = 60;

// ============================================================================
// Enums
// ============================================================================

/// Movement modes reported by the routing API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum TravelMode {
    Drive,
    Walk,
    Cycle,
    Ferry,
}

impl TravelMode {
    pub fn from_api(value: &str) -> Option<Self> {
        match value {
            "driving" | "drive" | "car" => Some(Self::Drive),
            "walking" | "foot" => Some(Self::Walk),
            "cycling" | "bike" => Some(Self::Cycle),
            "ferry" => Some(Self::Ferry),
            _ => None,
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A place the user plans to visit, with a stay duration.
///
/// Times of day elsewhere in this crate are seconds since midnight of the
/// travel day and can exceed 24 hours for late-night plans; the timestamps
/// here are absolute and only track when the user edited the stop.
///
/// Stops are immutable values: edits return a new instance carrying the same
/// identifier with `updated_at` bumped.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    pub id: StopIdentifier,
    pub name: Arc<str>,
    pub location: Point,
    pub stay_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stop {
    pub fn new(id: impl Into<StopIdentifier>, name: impl Into<Arc<str>>, location: Point) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            location,
            stay_minutes: DEFAULT_STAY_MINUTES,
            created_at: now,
            updated_at: now,
        }
    }

    /// New instance with a different stay duration, same identity.
    pub fn with_stay(&self, minutes: u32) -> Self {
        Self {
            stay_minutes: minutes,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// New instance with a different display name, same identity.
    pub fn renamed(&self, name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    pub fn stay_seconds(&self) -> u32 {
        self.stay_minutes.saturating_mul(60)
    }
}

/// One instruction-level step inside a leg (no timeline significance)
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteStep {
    pub mode: TravelMode,
    pub instruction: String,
    pub duration_seconds: u32,
    pub distance_meters: f64,
}

/// A precomputed directed travel segment between two specific stops.
///
/// Legs come from the routing API and are inputs everywhere in this crate;
/// nothing here fabricates or recomputes one. The endpoints are carried by
/// value so a leg can be matched back to its stop pair after reloads.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    pub from: Stop,
    pub to: Stop,
    pub duration_seconds: u32,
    pub distance_meters: f64,
    /// Encoded polyline for map rendering; opaque to timeline math.
    pub geometry: String,
    pub steps: Vec<RouteStep>,
}

impl Leg {
    /// Leg with no step breakdown or geometry, e.g. for offline data.
    pub fn direct(from: Stop, to: Stop, duration_seconds: u32, distance_meters: f64) -> Self {
        Self {
            from,
            to,
            duration_seconds,
            distance_meters,
            geometry: String::new(),
            steps: Vec::new(),
        }
    }

    /// Does this leg cover the ordered pair (from, to)?
    pub fn connects(&self, from: &StopIdentifier, to: &StopIdentifier) -> bool {
        self.from.id == *from && self.to.id == *to
    }
}

/// A trip in the user's library
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    pub id: TripIdentifier,
    pub name: Arc<str>,
    pub created_at: DateTime<Utc>,
}

/// One day of a trip: the ordered stops and the time the day begins.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayPlan {
    pub trip_id: TripIdentifier,
    pub date: chrono::NaiveDate,
    /// Seconds since midnight of the travel day.
    pub start_time: u32,
    pub stops: Vec<Stop>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ItineraryError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, ItineraryError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str) -> Stop {
        Stop::new(id, id.to_uppercase(), Point::new(4.8952, 52.3702))
    }

    #[test]
    fn test_new_stop_defaults() {
        let s = stop("museum");
        assert_eq!(s.stay_minutes, DEFAULT_STAY_MINUTES);
        assert_eq!(s.stay_seconds(), 3600);
        assert_eq!(s.created_at, s.updated_at);
    }

    #[test]
    fn test_stop_edits_keep_identity() {
        let s = stop("museum");
        let edited = s.with_stay(15).renamed("Rijksmuseum");

        assert_eq!(edited.id, s.id);
        assert_eq!(edited.stay_minutes, 15);
        assert_eq!(&*edited.name, "Rijksmuseum");
        assert_eq!(edited.created_at, s.created_at);
        assert!(edited.updated_at >= s.updated_at);
        // Original untouched
        assert_eq!(s.stay_minutes, DEFAULT_STAY_MINUTES);
    }

    #[test]
    fn test_leg_connects_is_directional() {
        let a = stop("a");
        let b = stop("b");
        let leg = Leg::direct(a.clone(), b.clone(), 600, 1200.0);

        assert!(leg.connects(&a.id, &b.id));
        assert!(!leg.connects(&b.id, &a.id));
        assert!(!leg.connects(&a.id, &StopIdentifier::new("c")));
    }

    #[test]
    fn test_travel_mode_from_api() {
        assert_eq!(TravelMode::from_api("driving"), Some(TravelMode::Drive));
        assert_eq!(TravelMode::from_api("foot"), Some(TravelMode::Walk));
        assert_eq!(TravelMode::from_api("cycling"), Some(TravelMode::Cycle));
        assert_eq!(TravelMode::from_api("teleport"), None);
    }
}
