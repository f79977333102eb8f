//! Leg provider over the routing client with a local LRU cache.

use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::Mutex;

use lru::LruCache;

use daytrip_itinerary::identifiers::StopIdentifier;
use daytrip_itinerary::models::traits::LegProvider;
use daytrip_itinerary::models::types::{Leg, Result as ItineraryResult, Stop};

use crate::routing::client::RoutingClient;

const CACHE_CAPACITY: usize = 256;

/// Remote-backed [`LegProvider`] that remembers recent legs per ordered stop
/// pair. A failed fetch is reported as "no leg" so the timeline degrades to
/// zero travel time instead of failing the whole day.
pub struct CachingLegProvider {
    client: RoutingClient,
    cache: Mutex<LruCache<(StopIdentifier, StopIdentifier), Leg>>,
}

impl CachingLegProvider {
    pub fn new(client: RoutingClient) -> Self {
        Self {
            client,
            cache: Mutex::new(LruCache::new(NonZeroUsize::new(CACHE_CAPACITY).unwrap())),
        }
    }

    async fn fetch(&self, from: &Stop, to: &Stop) -> Option<Leg> {
        let key = (from.id.clone(), to.id.clone());
        if let Some(leg) = self.cache.lock().unwrap().get(&key).cloned() {
            return Some(leg);
        }

        match self.client.route(from, to).await {
            Ok(leg) => {
                self.cache.lock().unwrap().put(key, leg.clone());
                Some(leg)
            }
            Err(error) => {
                tracing::warn!(from = %from.id, to = %to.id, %error, "leg fetch failed");
                None
            }
        }
    }
}

impl LegProvider for CachingLegProvider {
    fn leg<'a>(
        &'a self,
        from: &'a Stop,
        to: &'a Stop,
    ) -> Pin<Box<dyn Future<Output = ItineraryResult<Option<Leg>>> + Send + 'a>> {
        Box::pin(async move { Ok(self.fetch(from, to).await) })
    }
}
