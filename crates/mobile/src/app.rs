//! The app object the Kotlin layer drives.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use daytrip_core::planner::ItineraryPlanner;
use daytrip_core::routing::{CachingLegProvider, RoutingClient, RoutingConfig};
use daytrip_core::store::TripStore;
use daytrip_itinerary::identifiers::{StopIdentifier, TripIdentifier};

use crate::records::{StopRecord, TimelineRecord, TripRecord};

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum AppError {
    #[error("{0}")]
    Storage(String),
    #[error("{0}")]
    Planning(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

struct AppState {
    store: Arc<TripStore>,
    planner: ItineraryPlanner,
}

/// One instance per process, constructed from Kotlin with the database path
/// and the routing server to use. The store and planner open lazily on first
/// use.
#[derive(uniffi::Object)]
pub struct DaytripApp {
    db_path: String,
    routing_base_url: String,
    state: RwLock<Option<Arc<AppState>>>,
}

#[uniffi::export(async_runtime = "tokio")]
impl DaytripApp {
    #[uniffi::constructor]
    pub fn new(db_path: String, routing_base_url: String) -> Self {
        Self {
            db_path,
            routing_base_url,
            state: RwLock::new(None),
        }
    }

    pub async fn create_trip(&self, name: String) -> Result<TripRecord, AppError> {
        let state = self.app_state().await?;
        let trip = state
            .store
            .create_trip(&name)
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(trip.into())
    }

    pub async fn trips(&self) -> Result<Vec<TripRecord>, AppError> {
        let state = self.app_state().await?;
        let trips = state
            .store
            .all_trips()
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(trips.into_iter().map(Into::into).collect())
    }

    pub async fn add_stop(
        &self,
        trip_id: String,
        date: String,
        name: String,
        latitude: f64,
        longitude: f64,
        stay_minutes: u32,
    ) -> Result<StopRecord, AppError> {
        let state = self.app_state().await?;
        let stop = state
            .store
            .append_stop_with_stay(
                &TripIdentifier::new(trip_id),
                parse_date(&date)?,
                &name,
                latitude,
                longitude,
                stay_minutes,
            )
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok((&stop).into())
    }

    pub async fn set_day_start(
        &self,
        trip_id: String,
        date: String,
        start_seconds: u32,
    ) -> Result<TimelineRecord, AppError> {
        let state = self.app_state().await?;
        let timeline = state
            .planner
            .set_day_start(&TripIdentifier::new(trip_id), parse_date(&date)?, start_seconds)
            .await
            .map_err(|e| AppError::Planning(e.to_string()))?;
        Ok(timeline.into())
    }

    pub async fn set_stay_duration(
        &self,
        trip_id: String,
        date: String,
        stop_id: String,
        stay_minutes: u32,
    ) -> Result<TimelineRecord, AppError> {
        let state = self.app_state().await?;
        let timeline = state
            .planner
            .set_stay_duration(
                &TripIdentifier::new(trip_id),
                parse_date(&date)?,
                &StopIdentifier::new(stop_id),
                stay_minutes,
            )
            .await
            .map_err(|e| AppError::Planning(e.to_string()))?;
        Ok(timeline.into())
    }

    pub async fn move_stop(
        &self,
        trip_id: String,
        date: String,
        stop_id: String,
        new_position: u32,
    ) -> Result<TimelineRecord, AppError> {
        let state = self.app_state().await?;
        let timeline = state
            .planner
            .move_stop(
                &TripIdentifier::new(trip_id),
                parse_date(&date)?,
                &StopIdentifier::new(stop_id),
                new_position as usize,
            )
            .await
            .map_err(|e| AppError::Planning(e.to_string()))?;
        Ok(timeline.into())
    }

    pub async fn remove_stop(
        &self,
        trip_id: String,
        date: String,
        stop_id: String,
    ) -> Result<TimelineRecord, AppError> {
        let state = self.app_state().await?;
        let timeline = state
            .planner
            .remove_stop(
                &TripIdentifier::new(trip_id),
                parse_date(&date)?,
                &StopIdentifier::new(stop_id),
            )
            .await
            .map_err(|e| AppError::Planning(e.to_string()))?;
        Ok(timeline.into())
    }

    /// The timeline for one trip day, served from the stored row when the
    /// inputs have not changed since the last generation.
    pub async fn timeline(&self, trip_id: String, date: String) -> Result<TimelineRecord, AppError> {
        let state = self.app_state().await?;
        let timeline = state
            .planner
            .cached_or_rebuild(&TripIdentifier::new(trip_id), parse_date(&date)?)
            .await
            .map_err(|e| AppError::Planning(e.to_string()))?;
        Ok(timeline.into())
    }
}

impl DaytripApp {
    async fn app_state(&self) -> Result<Arc<AppState>, AppError> {
        if let Some(ref state) = *(self.state.read().await) {
            return Ok(Arc::clone(state));
        }

        let mut guard = self.state.write().await;
        if let Some(ref state) = *guard {
            return Ok(Arc::clone(state));
        }

        let store = Arc::new(
            TripStore::open(&self.db_path).map_err(|e| AppError::Storage(e.to_string()))?,
        );
        let config = RoutingConfig {
            base_url: self.routing_base_url.clone(),
            ..RoutingConfig::default()
        };
        let client =
            RoutingClient::new(config).map_err(|e| AppError::Planning(e.to_string()))?;
        let planner = ItineraryPlanner::new(
            Arc::clone(&store),
            Arc::new(CachingLegProvider::new(client)),
        );

        let state = Arc::new(AppState { store, planner });
        *guard = Some(Arc::clone(&state));
        Ok(state)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    value
        .parse()
        .map_err(|_| AppError::InvalidDate(value.to_owned()))
}
