//! Bounded cache of decoded originals.
//!
//! Entries are keyed by path and validated against the file's modification
//! time: a lookup with a different time than the stored one is a miss and
//! evicts the stale entry, so an original replaced on disk is decoded again.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use log::debug;
use lru::LruCache;

use crate::decode::Bitmap;

/// A decoded original together with its downscaled preview source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// Full-resolution pixels used for the final crop.
    pub source: Bitmap,
    /// Reduced copy used for live previews.
    pub preview: Bitmap,
}

#[derive(Debug)]
struct CacheEntry {
    modified: SystemTime,
    image: Arc<LoadedImage>,
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because the file changed on disk.
    pub invalidations: u64,
}

/// LRU cache of [`LoadedImage`]s keyed by `(path, modified time)`.
pub struct ImageCache {
    entries: LruCache<PathBuf, CacheEntry>,
    stats: CacheStats,
}

impl ImageCache {
    /// Cache holding at most `capacity` images (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Look up `path` as it was at `modified`.
    pub fn get(&mut self, path: &Path, modified: SystemTime) -> Option<Arc<LoadedImage>> {
        let stale = match self.entries.get(path) {
            Some(entry) if entry.modified == modified => {
                self.stats.hits += 1;
                debug!("image cache hit: {}", path.display());
                return Some(Arc::clone(&entry.image));
            }
            Some(_) => true,
            None => false,
        };

        if stale {
            self.entries.pop(path);
            self.stats.invalidations += 1;
            debug!("image cache entry outdated: {}", path.display());
        }
        self.stats.misses += 1;
        debug!("image cache miss: {}", path.display());
        None
    }

    /// Store an image, replacing any entry for the same path.
    pub fn insert(&mut self, path: PathBuf, modified: SystemTime, image: LoadedImage) -> Arc<LoadedImage> {
        let image = Arc::new(image);
        if let Some((evicted, _)) = self.entries.push(
            path.clone(),
            CacheEntry {
                modified,
                image: Arc::clone(&image),
            },
        ) {
            if evicted != path {
                debug!("image cache evicted: {}", evicted.display());
            }
        }
        image
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains(path)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn image(color: u8) -> LoadedImage {
        LoadedImage {
            source: Bitmap::filled(4, 4, [color, 0, 0, 255]),
            preview: Bitmap::filled(2, 2, [color, 0, 0, 255]),
        }
    }

    fn t(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_hit_with_same_modified_time() {
        let mut cache = ImageCache::new(4);
        let path = PathBuf::from("/photos/a.jpg");
        cache.insert(path.clone(), t(10), image(1));

        let hit = cache.get(&path, t(10)).unwrap();
        assert_eq!(hit.source.pixel(0, 0)[0], 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_changed_file_invalidates() {
        let mut cache = ImageCache::new(4);
        let path = PathBuf::from("/photos/a.jpg");
        cache.insert(path.clone(), t(10), image(1));

        assert!(cache.get(&path, t(11)).is_none());
        assert!(!cache.contains(&path));
        let stats = cache.stats();
        assert_eq!((stats.misses, stats.invalidations), (1, 1));
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = ImageCache::new(2);
        let a = PathBuf::from("a.png");
        let b = PathBuf::from("b.png");
        let c = PathBuf::from("c.png");
        cache.insert(a.clone(), t(1), image(1));
        cache.insert(b.clone(), t(1), image(2));

        // Touch a so b becomes least recently used
        assert!(cache.get(&a, t(1)).is_some());
        cache.insert(c.clone(), t(1), image(3));

        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_reinsert_replaces() {
        let mut cache = ImageCache::new(2);
        let path = PathBuf::from("a.png");
        cache.insert(path.clone(), t(1), image(1));
        cache.insert(path.clone(), t(2), image(9));

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&path, t(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut cache = ImageCache::new(0);
        cache.insert(PathBuf::from("a"), t(1), image(1));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
