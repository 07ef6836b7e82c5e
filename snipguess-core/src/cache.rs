//! Song cache
//!
//! Buffers fetched song records between games so that starting a round
//! usually costs no network round-trip. Refills happen in batches with
//! per-item failure isolation; picks are uniform over the subset matching
//! the active album filter.

use rand::Rng;
use tracing::{debug, warn};

use crate::album::{group_of, AlbumFilter};
use crate::catalog::{SongRecord, SongSource};

/// Buffer size below which the caller should refill before picking
pub const LOW_WATER_MARK: usize = 5;

/// How many songs one refill attempts to fetch
pub const REFILL_BATCH_SIZE: usize = 10;

/// Ordered buffer of fetched songs. No record appears twice; a record
/// leaves the buffer exactly when it is selected for play.
#[derive(Default)]
pub struct SongCache {
    songs: Vec<SongRecord>,
}

impl SongCache {
    pub fn new() -> Self {
        Self { songs: Vec::new() }
    }

    /// Number of buffered songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Whether the buffer has drained below the refill threshold
    pub fn needs_refill(&self) -> bool {
        self.songs.len() < LOW_WATER_MARK
    }

    /// Fetch up to `batch_size` songs, appending successes.
    ///
    /// Individual fetch failures are logged and skipped; they only shrink
    /// the batch, never fail it. Records already buffered (same catalog
    /// path) are dropped to keep the no-duplicates invariant.
    ///
    /// Returns the number of songs actually added.
    pub async fn refill<S: SongSource>(&mut self, source: &S, batch_size: usize) -> usize {
        let mut added = 0;

        for _ in 0..batch_size {
            match source.fetch_random().await {
                Ok(record) => {
                    if self.songs.iter().any(|s| s.path == record.path) {
                        debug!(path = %record.path, "Skipping duplicate song in refill");
                        continue;
                    }
                    self.songs.push(record);
                    added += 1;
                }
                Err(e) => {
                    warn!("Song fetch failed during refill: {}", e);
                }
            }
        }

        debug!(added, buffered = self.songs.len(), "Cache refill complete");
        added
    }

    /// Remove and return a uniformly random song allowed by the filter.
    ///
    /// Returns `None` without touching the buffer when no buffered song's
    /// album group is enabled.
    pub fn take_random(&mut self, filter: &AlbumFilter) -> Option<SongRecord> {
        let matching: Vec<usize> = self
            .songs
            .iter()
            .enumerate()
            .filter(|(_, song)| filter.allows(group_of(song.era.as_deref())))
            .map(|(i, _)| i)
            .collect();

        if matching.is_empty() {
            return None;
        }

        let pick = matching[rand::thread_rng().gen_range(0..matching.len())];
        Some(self.songs.remove(pick))
    }
}
