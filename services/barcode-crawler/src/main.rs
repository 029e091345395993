//!
//! src/main.rs  Andrew Belles  Oct 16, 2026
//!
//! Reads barcodes, looks each one up on discogs and exports
//! albums.csv and tracks.csv
//!
//!

mod config;
mod errors;
mod logging;

mod credential;
mod crawler;
mod fetch;
mod lookup;
mod retry;
mod sink;
mod source;
mod types;

use crate::errors::CrawlerError;

#[tokio::main]
async fn main() -> Result<(), CrawlerError> {
    let cfgs    = config::load_config()?;
    let _logger = logging::init_logging(&cfgs.logging)?;

    tracing::info!(
        service="barcode-crawler",
        version=%env!("CARGO_PKG_VERSION"),
        "starting"
    );

    let token    = credential::resolve_token(&cfgs.discogs.token_env)?;
    let barcodes = source::read_barcodes(&cfgs.input)?;

    let discogs = fetch::DiscogsClient::new(&cfgs.http, &cfgs.discogs)?;
    let limits  = crawler::CrawlerLimits::from_config(&cfgs);
    let crawler = crawler::Crawler::new(discogs, limits);

    let harvest = crawler.run(&barcodes, &token).await;

    tracing::info!(dir = %cfgs.output.dir.display(), "export.start");
    let sink   = sink::CsvSink::new(
        &cfgs.output.dir,
        &cfgs.output.albums_file,
        &cfgs.output.tracks_file
    );
    let albums = sink.write_albums(&harvest.albums)?;
    let tracks = sink.write_tracks(&harvest.tracks)?;

    tracing::info!(
        albums = %albums.display(), album_rows = harvest.albums.len(),
        tracks = %tracks.display(), track_rows = harvest.tracks.len(),
        "export.done"
    );

    Ok(())
}
