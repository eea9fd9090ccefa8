use crate::prelude::HashMap;
use crate::tiles::ImageHandle;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Address of one tile in the pyramid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub level: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub fn new(level: u8, x: u32, y: u32) -> Self {
        Self { level, x, y }
    }
}

/// How many decoded tiles the cache may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CachePolicy {
    /// Never evict; memory grows with every distinct tile viewed
    #[default]
    Unbounded,
    /// Keep at most `capacity` tiles, dropping the least recently used
    Lru { capacity: usize },
}

impl CachePolicy {
    pub fn build(self) -> Box<dyn CacheStrategy> {
        match self {
            CachePolicy::Unbounded => Box::new(UnboundedStrategy::default()),
            CachePolicy::Lru { capacity } => Box::new(LruStrategy::new(capacity)),
        }
    }
}

/// Storage and eviction behaviour behind a [`TileCache`]
pub trait CacheStrategy: Send {
    fn get(&mut self, key: &TileKey) -> Option<ImageHandle>;

    fn insert(&mut self, key: TileKey, image: ImageHandle);

    fn contains(&self, key: &TileKey) -> bool;

    fn len(&self) -> usize;

    fn clear(&mut self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps every tile it is given
#[derive(Default)]
pub struct UnboundedStrategy {
    tiles: HashMap<TileKey, ImageHandle>,
}

impl CacheStrategy for UnboundedStrategy {
    fn get(&mut self, key: &TileKey) -> Option<ImageHandle> {
        self.tiles.get(key).cloned()
    }

    fn insert(&mut self, key: TileKey, image: ImageHandle) {
        self.tiles.insert(key, image);
    }

    fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains_key(key)
    }

    fn len(&self) -> usize {
        self.tiles.len()
    }

    fn clear(&mut self) {
        self.tiles.clear();
    }
}

/// Size-limited storage with least-recently-used eviction
pub struct LruStrategy {
    tiles: LruCache<TileKey, ImageHandle>,
}

impl LruStrategy {
    /// A zero capacity falls back to a single slot
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            tiles: LruCache::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.tiles.cap().get()
    }
}

impl CacheStrategy for LruStrategy {
    fn get(&mut self, key: &TileKey) -> Option<ImageHandle> {
        self.tiles.get(key).cloned()
    }

    fn insert(&mut self, key: TileKey, image: ImageHandle) {
        self.tiles.put(key, image);
    }

    fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains(key)
    }

    fn len(&self) -> usize {
        self.tiles.len()
    }

    fn clear(&mut self) {
        self.tiles.clear();
    }
}

/// In-memory cache of decoded tiles
///
/// Lookups take `&self` so rendering can fill the cache without needing
/// mutable access to the rest of the map state.
pub struct TileCache {
    cache: Arc<Mutex<Box<dyn CacheStrategy>>>,
}

impl TileCache {
    /// Create a new tile cache with the given policy
    pub fn new(policy: CachePolicy) -> Self {
        Self::with_strategy(policy.build())
    }

    /// Create a tile cache around a caller-supplied strategy
    pub fn with_strategy(strategy: Box<dyn CacheStrategy>) -> Self {
        Self {
            cache: Arc::new(Mutex::new(strategy)),
        }
    }

    /// Get a tile from the cache
    pub fn get(&self, key: &TileKey) -> Option<ImageHandle> {
        self.cache.lock().ok()?.get(key)
    }

    /// Insert a tile into the cache
    pub fn insert(&self, key: TileKey, image: ImageHandle) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, image);
        }
    }

    /// Check if a tile is in the cache
    pub fn contains(&self, key: &TileKey) -> bool {
        self.cache
            .lock()
            .ok()
            .map(|cache| cache.contains(key))
            .unwrap_or(false)
    }

    /// Clear all tiles from the cache
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// Get the current number of cached tiles
    pub fn len(&self) -> usize {
        self.cache
            .lock()
            .ok()
            .map(|cache| cache.len())
            .unwrap_or(0)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for TileCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl std::fmt::Debug for TileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileCache").field("len", &self.len()).finish()
    }
}
