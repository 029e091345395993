//!
//! src/crawler.rs  Andrew Belles  Oct 16th, 2026
//!
//! Defines the batch driver: one barcode at a time, paced,
//! results accumulated in memory until export
//!
//!

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::fetch::CatalogTransport;
use crate::lookup::{LookupClient, LookupStatus};
use crate::retry::RetryPolicy;
use crate::types::{AccessToken, AlbumRecord, TrackRecord};

#[derive(Clone, Debug)]
pub struct CrawlerLimits {
    pub pacing: Duration,
    pub retry: RetryPolicy
}

impl CrawlerLimits {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            pacing: cfg.batch.pacing,
            retry: RetryPolicy::from(&cfg.http.retry)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub found: usize,
    pub no_match: usize,
    pub search_failed: usize,
    pub release_failed: usize
}

impl BatchSummary {
    fn record(&mut self, status: LookupStatus) {
        match status {
            LookupStatus::Found         => self.found += 1,
            LookupStatus::NoMatch       => self.no_match += 1,
            LookupStatus::SearchFailed  => self.search_failed += 1,
            LookupStatus::ReleaseFailed => self.release_failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.found + self.no_match + self.search_failed + self.release_failed
    }
}

/// Everything one run produced, in input order
#[derive(Debug, Default)]
pub struct Harvest {
    pub albums: Vec<AlbumRecord>,
    pub tracks: Vec<TrackRecord>,
    pub summary: BatchSummary
}

pub struct Crawler<T> {
    lookup: LookupClient<T>,
    limits: CrawlerLimits
}

impl<T: CatalogTransport> Crawler<T> {
    pub fn new(transport: T, limits: CrawlerLimits) -> Self {
        let lookup = LookupClient::new(transport, limits.retry);
        Self { lookup, limits }
    }

    pub async fn run(&self, barcodes: &[String], token: &AccessToken) -> Harvest {
        info!(
            barcodes = barcodes.len(),
            pacing_ms = ?self.limits.pacing.as_millis(),
            max_attempts = self.lookup.policy().max_attempts,
            "batch.start"
        );

        let mut harvest = Harvest::default();
        for (index, barcode) in barcodes.iter().enumerate() {
            sleep(self.limits.pacing).await;
            info!(barcode = %barcode, n = index + 1, of = barcodes.len(), "barcode.start");

            let outcome = self.lookup.lookup(barcode, token).await;

            debug!(barcode = %barcode, tracks = outcome.tracks.len(), "barcode.tracks");
            info!(barcode = %barcode, status = outcome.status.as_str(), "barcode.done");

            harvest.summary.record(outcome.status);
            let (album, tracks) = outcome.into_parts();
            harvest.albums.push(album);
            harvest.tracks.extend(tracks);
        }

        let s = harvest.summary;
        info!(
            total = s.total(), found = s.found, no_match = s.no_match,
            search_failed = s.search_failed, release_failed = s.release_failed,
            tracks = harvest.tracks.len(),
            "batch.summary"
        );
        harvest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::time::Instant;

    use crate::errors::CrawlerError;
    use crate::lookup::tests::{
        discovery_release, discovery_search, token, FakeTransport
    };

    fn limits() -> CrawlerLimits {
        CrawlerLimits {
            pacing: Duration::from_secs(1),
            retry: RetryPolicy { max_attempts: 5, delay: Duration::from_secs(10) }
        }
    }

    fn barcodes(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn mixed_fake() -> FakeTransport {
        let mut fake = FakeTransport::default()
            // A: found with two tracks
            .with_search(Ok(discovery_search()))
            .with_release(Ok(json!({
                "artists": [{"name": "Daft Punk"}],
                "title": "Discovery",
                "tracklist": [{"title": "One More Time"}, {"title": "Aerodynamic"}]
            })))
            // B: no match
            .with_search(Ok(json!({"results": []})));
        // C: search never succeeds
        for _ in 0..5 {
            fake = fake.with_search(Err(CrawlerError::Status(500)));
        }
        // D: found with one track
        fake.with_search(Ok(discovery_search()))
            .with_release(Ok(discovery_release()))
    }

    #[tokio::test(start_paused = true)]
    async fn one_album_per_barcode_in_order() {
        let crawler = Crawler::new(mixed_fake(), limits());
        let input = barcodes(&["A", "B", "C", "D"]);

        let harvest = crawler.run(&input, &token()).await;

        assert_eq!(harvest.albums.len(), input.len());
        let order: Vec<&str> = harvest.albums.iter().map(|a| a.barcode.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C", "D"]);

        assert_eq!(harvest.albums[1], AlbumRecord::barcode_only("B"));
        assert_eq!(harvest.albums[2], AlbumRecord::barcode_only("C"));

        let track_keys: Vec<(&str, u32)> = harvest.tracks.iter()
            .map(|t| (t.album_barcode.as_str(), t.position))
            .collect();
        assert_eq!(track_keys, vec![("A", 1), ("A", 2), ("D", 1)]);

        assert_eq!(harvest.summary, BatchSummary {
            found: 2, no_match: 1, search_failed: 1, release_failed: 0
        });
        assert_eq!(harvest.summary.total(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn paces_every_barcode() {
        let mut fake = FakeTransport::default();
        for _ in 0..3 {
            fake = fake.with_search(Ok(json!({"results": []})));
        }
        let crawler = Crawler::new(fake, limits());
        let started = Instant::now();

        let harvest = crawler.run(&barcodes(&["1", "2", "3"]), &token()).await;

        assert_eq!(harvest.albums.len(), 3);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(3) && waited < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_yields_empty_harvest() {
        let crawler = Crawler::new(FakeTransport::default(), limits());
        let harvest = crawler.run(&[], &token()).await;

        assert!(harvest.albums.is_empty());
        assert!(harvest.tracks.is_empty());
        assert_eq!(harvest.summary.total(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn identical_responses_give_identical_rows() {
        let input = barcodes(&["A", "B", "C", "D"]);

        let first = Crawler::new(mixed_fake(), limits()).run(&input, &token()).await;
        let second = Crawler::new(mixed_fake(), limits()).run(&input, &token()).await;

        assert_eq!(first.albums, second.albums);
        assert_eq!(first.tracks, second.tracks);
    }
}
