//! Itinerary data models, types, and traits.

pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::{DayPlanSource, LegProvider};
pub use types::{
    DayPlan, ItineraryError, Leg, Result, RouteStep, Stop, TravelMode, Trip,
    DEFAULT_STAY_MINUTES,
};
