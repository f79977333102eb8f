//! The timeline generation engine.

use crate::models::types::{Leg, Stop};
use crate::timeline::entry::{Timeline, TimelineEntry};

/// Computes the time-stamped timeline for one day's ordered stops.
///
/// A single clock runs forward from `start_time` (seconds since midnight of
/// the travel day): each stop's arrival is the current clock, its departure
/// adds the stop's stay, and the clock then advances by the duration of the
/// leg to the next stop. The first stop's departure includes its stay like
/// every other stop's does. Legs are matched to consecutive pairs by ordered
/// identifier pair; a pair with no leg contributes zero travel time.
///
/// This never fails. An empty stop list yields an empty timeline, and a
/// solitary stop yields a single `FinalDestination` arriving at `start_time`
/// with its stay duration unrepresented. The input legs are returned
/// untouched alongside the entries.
pub fn generate(stops: &[Stop], legs: Vec<Leg>, start_time: u32) -> Timeline {
    if stops.is_empty() {
        return Timeline {
            entries: Vec::new(),
            legs,
        };
    }

    // You arrive at a solitary stop and the day is over; no clock runs.
    if let [only] = stops {
        let entry = TimelineEntry::FinalDestination {
            stop: only.clone(),
            arrival: start_time,
        };
        return Timeline {
            entries: vec![entry],
            legs,
        };
    }

    let last = stops.len() - 1;
    let mut entries = Vec::with_capacity(stops.len());
    let mut current = start_time;

    for (i, stop) in stops.iter().enumerate() {
        let arrival = current;
        let departure = arrival.saturating_add(stop.stay_seconds());

        let entry = if i == 0 {
            TimelineEntry::Origin {
                stop: stop.clone(),
                departure,
            }
        } else if i == last {
            // The day ends here; the computed departure is discarded.
            TimelineEntry::FinalDestination {
                stop: stop.clone(),
                arrival,
            }
        } else {
            TimelineEntry::Waypoint {
                stop: stop.clone(),
                arrival,
                departure,
            }
        };
        entries.push(entry);

        if let Some(next) = stops.get(i + 1) {
            let travel = legs
                .iter()
                .find(|leg| leg.connects(&stop.id, &next.id))
                .map(|leg| leg.duration_seconds)
                .unwrap_or(0);
            current = departure.saturating_add(travel);
        }
    }

    Timeline { entries, legs }
}
