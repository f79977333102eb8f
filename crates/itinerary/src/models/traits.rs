//! Collaborator traits for itinerary data.
//!
//! These are the seams the timeline layer pulls its inputs through.
//! Implementations can be in-memory, database-backed, or remote.

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDate;

use crate::identifiers::TripIdentifier;
use crate::models::types::{DayPlan, Leg, Result, Stop};

/// Yields the ordered stop list and start time for one trip day.
///
/// `Ok(None)` means the day simply has no plan, which callers treat as an
/// empty state rather than an error.
pub trait DayPlanSource: Send + Sync {
    fn day_plan(&self, trip: &TripIdentifier, date: NaiveDate) -> Result<Option<DayPlan>>;
}

/// Yields zero or one precomputed leg for an ordered stop pair.
///
/// A pair with no leg is a tolerated condition; timeline generation carries
/// the clock forward unchanged across the gap.
pub trait LegProvider: Send + Sync {
    fn leg<'a>(
        &'a self,
        from: &'a Stop,
        to: &'a Stop,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Leg>>> + Send + 'a>>;
}
