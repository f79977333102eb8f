//! Orchestrates day-plan loading, leg fetching, and timeline generation.

use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::future::join_all;

use daytrip_itinerary::identifiers::{StopIdentifier, TripIdentifier};
use daytrip_itinerary::models::traits::{DayPlanSource, LegProvider};
use daytrip_itinerary::models::types::{ItineraryError, Leg};
use daytrip_itinerary::timeline::{Timeline, generate};

use crate::store::{StoreError, TripStore};

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("No plan for trip {trip} on {date}")]
    DayPlanNotFound {
        trip: TripIdentifier,
        date: NaiveDate,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ItineraryError),
}

/// Builds timelines from stored day plans and fetched legs, and applies user
/// edits. Every edit invalidates the stored row (via the store) and returns
/// the freshly generated timeline.
pub struct ItineraryPlanner {
    store: Arc<TripStore>,
    legs: Arc<dyn LegProvider>,
}

impl ItineraryPlanner {
    pub fn new(store: Arc<TripStore>, legs: Arc<dyn LegProvider>) -> Self {
        Self { store, legs }
    }

    /// Recompute the timeline for one trip day and refresh the cached row.
    ///
    /// All consecutive-pair leg lookups run concurrently; generation happens
    /// once, synchronously, after the last one resolves. A failed lookup is
    /// logged and treated as a pair with no leg.
    pub async fn timeline_for(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
    ) -> Result<Timeline, PlanError> {
        let plan = self
            .store
            .day_plan(trip, date)?
            .ok_or_else(|| PlanError::DayPlanNotFound {
                trip: trip.clone(),
                date,
            })?;

        let lookups = plan
            .stops
            .windows(2)
            .map(|pair| self.legs.leg(&pair[0], &pair[1]));
        let mut legs: Vec<Leg> = Vec::new();
        for outcome in join_all(lookups).await {
            match outcome {
                Ok(Some(leg)) => legs.push(leg),
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(trip = %trip, %error, "leg lookup failed, treating pair as unrouted");
                }
            }
        }

        let timeline = generate(&plan.stops, legs, plan.start_time);
        self.store.cache_timeline(trip, date, &timeline)?;
        Ok(timeline)
    }

    /// Serve the stored row when present, otherwise rebuild it.
    pub async fn cached_or_rebuild(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
    ) -> Result<Timeline, PlanError> {
        if let Some(timeline) = self.store.cached_timeline(trip, date)? {
            return Ok(timeline);
        }
        self.timeline_for(trip, date).await
    }

    // ---- Edits ----

    pub async fn set_stay_duration(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        stop: &StopIdentifier,
        minutes: u32,
    ) -> Result<Timeline, PlanError> {
        self.store.update_stop_stay(trip, date, stop, minutes)?;
        self.timeline_for(trip, date).await
    }

    pub async fn set_day_start(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        start_time: u32,
    ) -> Result<Timeline, PlanError> {
        self.store.set_day_start(trip, date, start_time)?;
        self.timeline_for(trip, date).await
    }

    pub async fn move_stop(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        stop: &StopIdentifier,
        new_position: usize,
    ) -> Result<Timeline, PlanError> {
        self.store.move_stop(trip, date, stop, new_position)?;
        self.timeline_for(trip, date).await
    }

    pub async fn remove_stop(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        stop: &StopIdentifier,
    ) -> Result<Timeline, PlanError> {
        self.store.remove_stop(trip, date, stop)?;
        self.timeline_for(trip, date).await
    }
}
