//! Short-lived memo of the active input source for the key-down path.

use keyshift_input_source::InputSource;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long a read of the active input source is reused.
pub const READ_CACHE_TTL: Duration = Duration::from_millis(500);

/// Reuses the last input source read for [`READ_CACHE_TTL`].
///
/// Accessed from the tap callback, so it never waits: if the slot is
/// contended the caller reads the system directly without caching.
#[derive(Debug)]
pub struct InputSourceReadCache {
    ttl: Duration,
    slot: Mutex<Option<(InputSource, Instant)>>,
}

impl Default for InputSourceReadCache {
    fn default() -> Self {
        Self::new(READ_CACHE_TTL)
    }
}

impl InputSourceReadCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Cached input source, or the result of `read` if the entry expired.
    pub fn get_or_read<F>(&self, read: F) -> Option<InputSource>
    where
        F: FnOnce() -> Option<InputSource>,
    {
        self.get_or_read_at(Instant::now(), read)
    }

    pub fn get_or_read_at<F>(&self, now: Instant, read: F) -> Option<InputSource>
    where
        F: FnOnce() -> Option<InputSource>,
    {
        if let Ok(slot) = self.slot.try_lock() {
            if let Some((source, read_at)) = slot.as_ref() {
                if now.saturating_duration_since(*read_at) < self.ttl {
                    return Some(source.clone());
                }
            }
        }

        // System read happens outside the lock
        let fresh = read()?;
        if let Ok(mut slot) = self.slot.try_lock() {
            *slot = Some((fresh.clone(), now));
        }
        Some(fresh)
    }

    /// Forget the cached value so the next read hits the system.
    pub fn clear(&self) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn abc() -> InputSource {
        InputSource::new("abc", "ABC", false)
    }

    fn pinyin() -> InputSource {
        InputSource::new("pinyin", "Pinyin", true)
    }

    #[test]
    fn test_reads_within_ttl_are_cached() {
        let cache = InputSourceReadCache::default();
        let start = Instant::now();
        let reads = Cell::new(0);

        let first = cache.get_or_read_at(start, || {
            reads.set(reads.get() + 1);
            Some(abc())
        });
        // Underlying source changed, but we are still inside the window
        let second = cache.get_or_read_at(start + Duration::from_millis(499), || {
            reads.set(reads.get() + 1);
            Some(pinyin())
        });

        assert_eq!(first.unwrap().id, "abc");
        assert_eq!(second.unwrap().id, "abc");
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn test_read_after_ttl_is_fresh() {
        let cache = InputSourceReadCache::default();
        let start = Instant::now();

        cache.get_or_read_at(start, || Some(abc()));
        let later = cache.get_or_read_at(start + READ_CACHE_TTL, || Some(pinyin()));

        assert_eq!(later.unwrap().id, "pinyin");
    }

    #[test]
    fn test_clear_forces_fresh_read() {
        let cache = InputSourceReadCache::default();
        let start = Instant::now();

        cache.get_or_read_at(start, || Some(abc()));
        cache.clear();
        let next = cache.get_or_read_at(start, || Some(pinyin()));

        assert_eq!(next.unwrap().id, "pinyin");
    }

    #[test]
    fn test_failed_read_is_not_cached() {
        let cache = InputSourceReadCache::default();
        let start = Instant::now();

        assert!(cache.get_or_read_at(start, || None).is_none());
        let next = cache.get_or_read_at(start, || Some(abc()));
        assert_eq!(next.unwrap().id, "abc");
    }
}
