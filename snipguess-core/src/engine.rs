//! Game engine
//!
//! Long-lived orchestration above the per-song session: owns the catalog
//! client, the song cache, the persisted album filter and the settings
//! pool. Starting a game is the recovery boundary for every error in the
//! crate; a failed start leaves the engine exactly as it was.

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::album::AlbumFilter;
use crate::cache::{SongCache, REFILL_BATCH_SIZE};
use crate::catalog::{CatalogClient, SongSource};
use crate::error::{Error, Result};
use crate::playback::AudioSource;
use crate::session::GameSession;
use crate::settings::{load_album_filter, save_album_filter};

/// Orchestrates game starts and filter settings over a song source.
///
/// Generic over the song source so the flow can be driven by a stub in
/// tests; production code uses [`CatalogClient`].
pub struct GameEngine<C: SongSource> {
    catalog: C,
    cache: SongCache,
    filter: AlbumFilter,
    db: SqlitePool,
}

impl<C: SongSource> GameEngine<C> {
    /// Build an engine, loading the persisted album filter.
    pub async fn new(catalog: C, db: SqlitePool) -> Result<Self> {
        let filter = load_album_filter(&db).await?;
        Ok(Self {
            catalog,
            cache: SongCache::new(),
            filter,
            db,
        })
    }

    /// The active album filter
    pub fn filter(&self) -> &AlbumFilter {
        &self.filter
    }

    /// Number of songs currently buffered
    pub fn buffered_songs(&self) -> usize {
        self.cache.len()
    }

    /// Enable or disable one album group, persisting immediately.
    pub async fn set_group_enabled(&mut self, group: &str, enabled: bool) -> Result<()> {
        self.filter.set_enabled(group, enabled);
        save_album_filter(&self.db, &self.filter).await
    }

    /// Bulk select/deselect every album group, persisting immediately.
    pub async fn set_all_groups(&mut self, enabled: bool) -> Result<()> {
        self.filter.set_all(enabled);
        save_album_filter(&self.db, &self.filter).await
    }

    /// Start a new game on the given audio source.
    ///
    /// Fails with [`Error::EmptyFilter`] before any network traffic when no
    /// album group is enabled, and with [`Error::NoMatchingSong`] when the
    /// cache plus one refill-and-retry yields nothing the filter allows.
    pub async fn start_game(&mut self, source: Arc<dyn AudioSource>) -> Result<GameSession> {
        if !self.filter.any_enabled() {
            return Err(Error::EmptyFilter);
        }

        if self.cache.needs_refill() {
            self.cache.refill(&self.catalog, REFILL_BATCH_SIZE).await;
        }

        let song = match self.cache.take_random(&self.filter) {
            Some(song) => song,
            None => {
                // one bounded retry after a further refill, never a loop
                warn!("No buffered song matches the filter; refilling once");
                self.cache.refill(&self.catalog, REFILL_BATCH_SIZE).await;
                self.cache
                    .take_random(&self.filter)
                    .ok_or(Error::NoMatchingSong)?
            }
        };

        info!(path = %song.path, buffered = self.cache.len(), "Starting game");
        Ok(GameSession::new(song, source))
    }
}

impl GameEngine<CatalogClient> {
    /// Engine over the default catalog
    pub async fn with_default_catalog(db: SqlitePool) -> Result<Self> {
        Self::new(CatalogClient::new()?, db).await
    }

    /// URL serving the audio bytes for a session's song
    pub fn audio_url(&self, song_path: &str) -> String {
        self.catalog.audio_url(song_path)
    }
}
