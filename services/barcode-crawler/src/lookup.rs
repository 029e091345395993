//!
//! src/lookup.rs  Andrew Belles  Oct 16th, 2026
//!
//! Resolves one barcode into an album row and its track rows:
//! barcode search, then release detail, then flattening.
//! Never fails; every failure degrades the record instead.
//!

use tracing::{debug, warn};

use crate::errors::CrawlerError;
use crate::fetch::CatalogTransport;
use crate::retry::{retry_with, RetryPolicy};
use crate::types::{
    AccessToken, AlbumRecord, ReleaseDetail, SearchHit, TextOrList, TrackEntry, TrackRecord
};

pub const DEFAULT_ROLE: &str = "Composed by";
pub const UNKNOWN_ARTIST: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupStatus {
    Found,
    NoMatch,
    SearchFailed,
    ReleaseFailed
}

impl LookupStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LookupStatus::Found         => "found",
            LookupStatus::NoMatch       => "no_match",
            LookupStatus::SearchFailed  => "search_failed",
            LookupStatus::ReleaseFailed => "release_failed"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    pub album: AlbumRecord,
    pub tracks: Vec<TrackRecord>,
    pub status: LookupStatus
}

impl LookupOutcome {
    fn degraded(album: AlbumRecord, status: LookupStatus) -> Self {
        Self { album, tracks: Vec::new(), status }
    }

    pub fn into_parts(self) -> (AlbumRecord, Vec<TrackRecord>) {
        (self.album, self.tracks)
    }
}

pub struct LookupClient<T> {
    transport: T,
    policy: RetryPolicy
}

impl<T: CatalogTransport> LookupClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Album and track rows only, for callers with no use for the status
    #[allow(dead_code)]
    pub async fn fetch(&self, barcode: &str, token: &AccessToken) ->
        (AlbumRecord, Vec<TrackRecord>) {
        self.lookup(barcode, token).await.into_parts()
    }

    pub async fn lookup(&self, barcode: &str, token: &AccessToken) -> LookupOutcome {
        let search = retry_with(
            &self.policy,
            &format!("search barcode {barcode}"),
            |_| self.transport.search_barcode(barcode, token),
            CrawlerError::is_transient
        ).await;

        let search = match search {
            Ok(search) => search,
            Err(e) => {
                warn!(barcode, attempts = attempts_made(&e), error = %e,
                    "lookup.search.exhausted");
                return LookupOutcome::degraded(
                    AlbumRecord::barcode_only(barcode), LookupStatus::SearchFailed
                );
            }
        };

        let Some(hit) = search.results.into_iter().next() else {
            debug!(barcode, "lookup.no_match");
            return LookupOutcome::degraded(
                AlbumRecord::barcode_only(barcode), LookupStatus::NoMatch
            );
        };

        let detail = retry_with(
            &self.policy,
            &format!("release {}", hit.id),
            |_| self.transport.release(&hit.id, token),
            CrawlerError::is_transient
        ).await;

        match detail {
            Ok(detail) => {
                let (album, tracks) = normalize(barcode, &hit, &detail);
                debug!(barcode, release = %hit.id, tracks = tracks.len(), "lookup.found");
                LookupOutcome { album, tracks, status: LookupStatus::Found }
            }
            Err(e) => {
                warn!(barcode, release = %hit.id, attempts = attempts_made(&e),
                    error = %e, "lookup.release.exhausted");
                LookupOutcome::degraded(
                    album_from_search(barcode, &hit), LookupStatus::ReleaseFailed
                )
            }
        }
    }
}

/// Attempts spent before `retry_with` gave up; a rejected error stops at one
fn attempts_made(e: &CrawlerError) -> u32 {
    match e {
        CrawlerError::Exhausted { attempts, .. } => *attempts,
        _ => 1
    }
}

/// Fields the search hit alone supplies
pub fn album_from_search(barcode: &str, hit: &SearchHit) -> AlbumRecord {
    AlbumRecord {
        complete_title: hit.title.clone(),
        country: hit.country.clone(),
        genre: hit.genre.as_ref().and_then(TextOrList::joined),
        style: hit.style.as_ref().and_then(TextOrList::joined),
        cover_image: hit.cover_image.clone(),
        ..AlbumRecord::barcode_only(barcode)
    }
}

pub fn normalize(barcode: &str, hit: &SearchHit, detail: &ReleaseDetail) ->
    (AlbumRecord, Vec<TrackRecord>) {

    let names: Vec<&str> = detail.artists.iter()
        .filter_map(|a| a.name.as_deref())
        .collect();

    let main_artist = detail.artists.first()
        .and_then(|a| a.name.clone());
    let artists = (!names.is_empty()).then(|| names.join(", "));

    let album = AlbumRecord {
        main_artist,
        artists,
        title: detail.title.clone(),
        year: detail.year,
        lowest_price: detail.lowest_price,
        ..album_from_search(barcode, hit)
    };

    let tracks = detail.tracklist.iter()
        .enumerate()
        .map(|(index, entry)| track_record(
            barcode, index as u32 + 1, entry, album.main_artist.as_deref()
        ))
        .collect();

    (album, tracks)
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn track_record(barcode: &str, position: u32, entry: &TrackEntry, main_artist: Option<&str>) ->
    TrackRecord {
    let fallback = non_blank(main_artist).unwrap_or(UNKNOWN_ARTIST);

    let credits: Vec<(&str, &str)> = if entry.extraartists.is_empty() {
        vec![(DEFAULT_ROLE, fallback)]
    } else {
        entry.extraartists.iter()
            .map(|c| (
                non_blank(c.role.as_deref()).unwrap_or(DEFAULT_ROLE),
                non_blank(c.name.as_deref()).unwrap_or(fallback)
            ))
            .collect()
    };

    TrackRecord {
        album_barcode: barcode.to_string(),
        position,
        title: entry.title.clone(),
        contributions: credits.iter()
            .map(|(role, name)| format!("{role} {name}"))
            .collect::<Vec<_>>()
            .join(", "),
        contributors: credits.iter()
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
