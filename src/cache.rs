use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::models::StatsResponse;

// Cache entry with timestamp
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub response: StatsResponse,
    pub created_at: Instant,
}

#[derive(Default)]
struct Slot {
    entry: Option<CacheEntry>,
    // bumped on every invalidation
    generation: u64,
}

/// Process-wide single-entry snapshot of the visitor counters.
///
/// A live read calls [`StatsCache::generation`] before it reads the store and
/// hands that value back to [`StatsCache::store`]. If a write invalidated the
/// cache in between, the (possibly pre-write) snapshot is dropped instead of
/// being cached for a full TTL.
pub struct StatsCache {
    slot: RwLock<Slot>,
    ttl: Duration,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(Slot::default()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_fresh(&self) -> Option<StatsResponse> {
        self.get_fresh_at(Instant::now()).await
    }

    pub async fn get_fresh_at(&self, now: Instant) -> Option<StatsResponse> {
        let slot = self.slot.read().await;
        slot.entry
            .as_ref()
            .filter(|entry| now.saturating_duration_since(entry.created_at) < self.ttl)
            .map(|entry| entry.response.clone())
    }

    pub async fn generation(&self) -> u64 {
        self.slot.read().await.generation
    }

    // Returns false when the snapshot was discarded because of an invalidation
    pub async fn store(&self, response: StatsResponse, generation: u64) -> bool {
        self.store_at(response, generation, Instant::now()).await
    }

    pub async fn store_at(&self, response: StatsResponse, generation: u64, now: Instant) -> bool {
        let mut slot = self.slot.write().await;
        if slot.generation != generation {
            return false;
        }
        slot.entry = Some(CacheEntry {
            response,
            created_at: now,
        });
        true
    }

    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
    }
}
