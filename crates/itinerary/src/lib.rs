//! # daytrip-itinerary
//!
//! Trip-day timeline computation for the Daytrip travel planner.
//!
//! ## Features
//!
//! - **Pure timeline engine**: arrival/departure times from stays and legs,
//!   no I/O, no failure modes
//! - **Role-tagged entries**: origin / waypoint / final destination, decided
//!   by position in the day
//! - **Graceful gaps**: a stop pair with no routed leg costs zero travel time
//! - **Pluggable providers**: implement your own day-plan and leg sources
//!
//! ## Example
//!
//! ```
//! use daytrip_itinerary::prelude::*;
//! use geo::Point;
//!
//! let hotel = Stop::new("hotel", "Harbour Hotel", Point::new(4.4842, 51.9170)).with_stay(0);
//! let museum = Stop::new("museum", "Maritime Museum", Point::new(4.4853, 51.9175));
//! let leg = Leg::direct(hotel.clone(), museum.clone(), 600, 820.0);
//!
//! // Day starts at 09:00; ten minutes of travel to the museum.
//! let timeline = generate(&[hotel, museum], vec![leg], 9 * 3600);
//!
//! assert_eq!(timeline.entries.len(), 2);
//! assert_eq!(timeline.entries[0].departure(), Some(9 * 3600));
//! assert_eq!(timeline.entries[1].arrival(), Some(9 * 3600 + 600));
//! ```

pub mod identifiers;
pub mod models;
pub mod provider;
pub mod timeline;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{traits::*, types::*};
    pub use crate::provider::static_provider::StaticLegProvider;
    pub use crate::timeline::{generate, Timeline, TimelineEntry};
}

pub use prelude::*;
