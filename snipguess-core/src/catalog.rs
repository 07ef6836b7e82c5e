//! Song catalog API client
//!
//! Talks to the remote catalog over HTTP: one endpoint returning a random
//! song record as JSON, one returning the raw audio bytes for a catalog
//! path. The wire shape nests most metadata under a `song` object; the
//! client flattens it into a [`SongRecord`] so the rest of the crate never
//! sees the wire types.

use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

/// Default catalog base URL
pub const DEFAULT_CATALOG_BASE: &str = "https://juicewrldapi.com/juicewrld";

/// Artist credited when the catalog omits one
pub const FALLBACK_ARTIST: &str = "Juice WRLD";

const HTTP_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("snipguess/", env!("CARGO_PKG_VERSION"));

/// A song as held by the cache and the game session.
///
/// Immutable once fetched. `length` is the catalog's display duration
/// ("3:45"); when absent the duration is measured from the audio source at
/// reveal time.
#[derive(Debug, Clone, PartialEq)]
pub struct SongRecord {
    /// Opaque catalog identifier, also the audio download key
    pub path: String,
    /// Primary title used for guess matching
    pub title: String,
    /// Credited artists, falling back to [`FALLBACK_ARTIST`]
    pub artists: String,
    /// Raw album/source label as the catalog reports it
    pub era: Option<String>,
    /// Ordered alternate titles, any of which counts as a correct guess
    pub track_titles: Vec<String>,
    /// Catalog-formatted duration, if known
    pub length: Option<String>,
}

// Wire types for GET {base}/radio/random/

#[derive(Debug, Deserialize)]
struct RandomSongResponse {
    path: String,
    title: String,
    song: Option<SongDetails>,
}

#[derive(Debug, Deserialize)]
struct SongDetails {
    era: Option<EraRef>,
    credited_artists: Option<String>,
    #[serde(default)]
    track_titles: Vec<String>,
    length: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EraRef {
    name: String,
}

impl From<RandomSongResponse> for SongRecord {
    fn from(raw: RandomSongResponse) -> Self {
        let details = raw.song;
        let (era, artists, track_titles, length) = match details {
            Some(d) => (
                d.era.map(|e| e.name),
                d.credited_artists
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_ARTIST.to_string()),
                d.track_titles,
                d.length.filter(|l| !l.trim().is_empty()),
            ),
            None => (None, FALLBACK_ARTIST.to_string(), Vec::new(), None),
        };

        SongRecord {
            path: raw.path,
            title: raw.title,
            artists,
            era,
            track_titles,
            length,
        }
    }
}

/// Source of random songs, implemented by [`CatalogClient`] and by test stubs.
pub trait SongSource {
    fn fetch_random(&self) -> impl std::future::Future<Output = Result<SongRecord>> + Send;
}

/// URL construction for the catalog endpoints.
///
/// Shared by the typed client and by the relay, which forwards these URLs
/// verbatim without parsing the responses.
#[derive(Debug, Clone)]
pub struct CatalogEndpoints {
    base_url: String,
}

impl CatalogEndpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint returning one random song record as JSON
    pub fn random_url(&self) -> String {
        format!("{}/radio/random/", self.base_url)
    }

    /// Endpoint streaming the audio bytes for a song's catalog path
    pub fn audio_url(&self, path: &str) -> String {
        let mut url = format!("{}/files/download/?path=", self.base_url);
        url.push_str(&percent_encode(path));
        url
    }
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_BASE)
    }
}

/// HTTP client for the song catalog
pub struct CatalogClient {
    http_client: reqwest::Client,
    endpoints: CatalogEndpoints,
}

impl CatalogClient {
    /// Create a client against the default catalog
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_CATALOG_BASE)
    }

    /// Create a client against a specific catalog base URL
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoints: CatalogEndpoints::new(base_url),
        })
    }

    /// URL serving the audio bytes for a song's catalog path
    pub fn audio_url(&self, path: &str) -> String {
        self.endpoints.audio_url(path)
    }

    async fn get_random(&self) -> Result<SongRecord> {
        let url = self.endpoints.random_url();
        debug!(url = %url, "Fetching random song from catalog");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!(
                "catalog returned HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let raw: RandomSongResponse = response
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("invalid catalog response: {}", e)))?;

        let record = SongRecord::from(raw);
        debug!(path = %record.path, title = %record.title, "Fetched song record");
        Ok(record)
    }
}

impl SongSource for CatalogClient {
    fn fetch_random(&self) -> impl std::future::Future<Output = Result<SongRecord>> + Send {
        self.get_random()
    }
}

/// Percent-encode a catalog path for use as a query value.
///
/// Matches encodeURIComponent: unreserved characters and the marks
/// `- _ . ! ~ * ' ( )` pass through, everything else is %XX-escaped.
fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(byte as char),
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
