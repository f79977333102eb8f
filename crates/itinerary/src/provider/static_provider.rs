//! In-memory leg provider backed by a fixed set of legs.
//!
//! Serves leg lookups without any network. Useful for offline bundles and
//! as the test-side implementation of the provider seam.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::identifiers::StopIdentifier;
use crate::models::traits::LegProvider;
use crate::models::types::{Leg, Result, Stop};

/// Leg lookups over a `HashMap` keyed by ordered stop-identifier pairs.
#[derive(Clone, Default)]
pub struct StaticLegProvider {
    legs: HashMap<(StopIdentifier, StopIdentifier), Leg>,
}

impl StaticLegProvider {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Build provider from raw data. The first leg for a pair wins.
    pub fn from_data(legs: Vec<Leg>) -> Self {
        let mut map = HashMap::new();
        for leg in legs {
            map.entry((leg.from.id.clone(), leg.to.id.clone()))
                .or_insert(leg);
        }
        Self { legs: map }
    }

    pub fn leg_between(&self, from: &StopIdentifier, to: &StopIdentifier) -> Option<&Leg> {
        self.legs.get(&(from.clone(), to.clone()))
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

impl LegProvider for StaticLegProvider {
    fn leg<'a>(
        &'a self,
        from: &'a Stop,
        to: &'a Stop,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Leg>>> + Send + 'a>> {
        let found = self.leg_between(&from.id, &to.id).cloned();
        Box::pin(async move { Ok(found) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn stop(id: &str) -> Stop {
        Stop::new(id, id, Point::new(-0.1276, 51.5072))
    }

    #[test]
    fn test_empty_provider() {
        let provider = StaticLegProvider::new();
        assert!(provider.is_empty());
        assert!(provider
            .leg_between(&StopIdentifier::new("a"), &StopIdentifier::new("b"))
            .is_none());
    }

    #[test]
    fn test_lookup_by_ordered_pair() {
        let a = stop("a");
        let b = stop("b");
        let provider = StaticLegProvider::from_data(vec![Leg::direct(
            a.clone(),
            b.clone(),
            600,
            1500.0,
        )]);

        assert_eq!(provider.len(), 1);
        let found = provider.leg_between(&a.id, &b.id).unwrap();
        assert_eq!(found.duration_seconds, 600);
        // Reverse direction is a different pair.
        assert!(provider.leg_between(&b.id, &a.id).is_none());
    }

    #[test]
    fn test_first_leg_wins_on_duplicate_pair() {
        let a = stop("a");
        let b = stop("b");
        let provider = StaticLegProvider::from_data(vec![
            Leg::direct(a.clone(), b.clone(), 600, 1500.0),
            Leg::direct(a.clone(), b.clone(), 900, 2000.0),
        ]);

        assert_eq!(provider.len(), 1);
        assert_eq!(provider.leg_between(&a.id, &b.id).unwrap().duration_seconds, 600);
    }
}
