//! FFI value types.
//!
//! Flat records for the Kotlin side; chrono and geo types never cross the
//! boundary. Times of day stay in seconds since midnight of the travel day.

use daytrip_itinerary::models::types::{Leg, Stop, Trip};
use daytrip_itinerary::timeline::{Timeline, TimelineEntry};

#[derive(Debug, Clone, uniffi::Record)]
pub struct TripRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct StopRecord {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub stay_minutes: u32,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct LegRecord {
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub duration_seconds: u32,
    pub distance_meters: f64,
    /// Encoded polyline for the map layer.
    pub geometry: String,
}

/// Mirrors the engine's closed entry variants for the UI layer.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum TimelineEntryRecord {
    Origin {
        stop: StopRecord,
        departure_seconds: u32,
    },
    Waypoint {
        stop: StopRecord,
        arrival_seconds: u32,
        departure_seconds: u32,
    },
    FinalDestination {
        stop: StopRecord,
        arrival_seconds: u32,
    },
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct TimelineRecord {
    pub entries: Vec<TimelineEntryRecord>,
    pub legs: Vec<LegRecord>,
}

impl From<Trip> for TripRecord {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id.to_string(),
            name: trip.name.to_string(),
        }
    }
}

impl From<&Stop> for StopRecord {
    fn from(stop: &Stop) -> Self {
        Self {
            id: stop.id.to_string(),
            name: stop.name.to_string(),
            latitude: stop.location.y(),
            longitude: stop.location.x(),
            stay_minutes: stop.stay_minutes,
        }
    }
}

impl From<&Leg> for LegRecord {
    fn from(leg: &Leg) -> Self {
        Self {
            from_stop_id: leg.from.id.to_string(),
            to_stop_id: leg.to.id.to_string(),
            duration_seconds: leg.duration_seconds,
            distance_meters: leg.distance_meters,
            geometry: leg.geometry.clone(),
        }
    }
}

impl From<&TimelineEntry> for TimelineEntryRecord {
    fn from(entry: &TimelineEntry) -> Self {
        match entry {
            TimelineEntry::Origin { stop, departure } => Self::Origin {
                stop: stop.into(),
                departure_seconds: *departure,
            },
            TimelineEntry::Waypoint {
                stop,
                arrival,
                departure,
            } => Self::Waypoint {
                stop: stop.into(),
                arrival_seconds: *arrival,
                departure_seconds: *departure,
            },
            TimelineEntry::FinalDestination { stop, arrival } => Self::FinalDestination {
                stop: stop.into(),
                arrival_seconds: *arrival,
            },
        }
    }
}

impl From<Timeline> for TimelineRecord {
    fn from(timeline: Timeline) -> Self {
        Self {
            entries: timeline.entries.iter().map(Into::into).collect(),
            legs: timeline.legs.iter().map(Into::into).collect(),
        }
    }
}
