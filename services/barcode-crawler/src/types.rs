use std::fmt;
use serde::{Deserialize, Deserializer, Serialize};

// Discogs personal access token, kept out of Debug output
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

// Discogs release id, numeric on the wire but kept as text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReleaseId(pub String);

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ReleaseId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw { Number(u64), Text(String) }

        match Raw::deserialize(d)? {
            Raw::Number(n) => Ok(ReleaseId(n.to_string())),
            Raw::Text(s) if !s.trim().is_empty() => Ok(ReleaseId(s.trim().to_string())),
            Raw::Text(_) => Err(serde::de::Error::custom("empty release id")),
        }
    }
}

/// One row of albums.csv, one per barcode queried
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumRecord {
    pub barcode: String,
    pub main_artist: Option<String>,
    pub artists: Option<String>,
    pub title: Option<String>,
    pub complete_title: Option<String>,
    pub country: Option<String>,
    pub year: Option<i64>,
    pub genre: Option<String>,
    pub style: Option<String>,
    pub cover_image: Option<String>,
    pub lowest_price: Option<f64>
}

impl AlbumRecord {
    pub const COLUMNS: [&'static str; 11] = [
        "barcode", "main_artist", "artists", "title", "complete_title",
        "country", "year", "genre", "style", "cover_image", "lowest_price"
    ];

    /// Record with nothing but the barcode
    pub fn barcode_only(barcode: &str) -> Self {
        Self {
            barcode: barcode.to_string(),
            main_artist: None,
            artists: None,
            title: None,
            complete_title: None,
            country: None,
            year: None,
            genre: None,
            style: None,
            cover_image: None,
            lowest_price: None
        }
    }
}

/// One row of tracks.csv
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    pub album_barcode: String,
    pub position: u32,
    pub title: Option<String>,
    pub contributions: String,
    pub contributors: String
}

impl TrackRecord {
    pub const COLUMNS: [&'static str; 5] = [
        "album_barcode", "position", "title", "contributions", "contributors"
    ];
}

///
/// Wire documents returned by the catalog
///

// genre/style come back as lists from search, occasionally as plain text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>)
}

impl TextOrList {
    pub fn joined(&self) -> Option<String> {
        let s = match self {
            TextOrList::Text(s) => s.trim().to_string(),
            TextOrList::List(items) => items.iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };
        (!s.is_empty()).then_some(s)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub id: ReleaseId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub genre: Option<TextOrList>,
    #[serde(default)]
    pub style: Option<TextOrList>,
    #[serde(default)]
    pub cover_image: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseDetail {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "year_value")]
    pub year: Option<i64>,
    #[serde(default)]
    pub lowest_price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tracklist: Vec<TrackEntry>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub name: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extraartists: Vec<Credit>
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credit {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>
}

fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

fn year_value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw { Number(i64), Text(String) }

    Ok(match Option::<Raw>::deserialize(d)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<i64>().ok(),
        None => None,
    })
}
