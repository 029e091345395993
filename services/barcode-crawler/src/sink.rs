use std::{fs, path::{Path, PathBuf}};
use serde::Serialize;

use crate::errors::CrawlerError;
use crate::types::{AlbumRecord, TrackRecord};

pub struct CsvSink {
    root: PathBuf,
    albums_file: String,
    tracks_file: String
}

impl CsvSink {
    pub fn new(root: impl AsRef<Path>, albums_file: &str, tracks_file: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            albums_file: albums_file.to_string(),
            tracks_file: tracks_file.to_string()
        }
    }

    pub fn write_albums(&self, albums: &[AlbumRecord]) -> Result<PathBuf, CrawlerError> {
        self.write_rows(&self.albums_file, &AlbumRecord::COLUMNS, albums)
    }

    pub fn write_tracks(&self, tracks: &[TrackRecord]) -> Result<PathBuf, CrawlerError> {
        self.write_rows(&self.tracks_file, &TrackRecord::COLUMNS, tracks)
    }

    /// Header is written by hand so an empty table still gets one
    fn write_rows<T: Serialize>(&self, name: &str, columns: &[&str], rows: &[T]) ->
        Result<PathBuf, CrawlerError> {

        let path = self.root.join(name);
        let parent = path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        fs::create_dir_all(&parent).map_err(|e|
            CrawlerError::Csv(
                format!("create dir {}: {e}", parent.display())
        ))?;

        let temp = tempfile::NamedTempFile::new_in(&parent)
            .map_err(|e| CrawlerError::Csv(
                format!("tempfile in {}: {e}", parent.display())
            ))?;

        {
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(temp.as_file());

            wtr.write_record(columns)?;
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }

        temp.persist(&path).map_err(|e|
            CrawlerError::Csv(format!("persist {}: {e}", path.display())))?;

        Ok(path)
    }
}
