use crate::dates;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use time::Date;

/// One streamed track from the export. Serializes with the export's field
/// names; parsing goes through [`PlayHistory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayEvent {
    #[serde(rename = "ts")]
    pub timestamp: String,
    pub ms_played: u64,
    pub skipped: bool,
    #[serde(rename = "master_metadata_track_name")]
    pub track_name: String,
    #[serde(rename = "master_metadata_album_album_name")]
    pub album_name: String,
    #[serde(rename = "master_metadata_album_artist_name")]
    pub artist_name: String,
}

impl PlayEvent {
    /// Calendar day the play started on, taken from the first ten
    /// characters of the timestamp.
    pub fn date(&self) -> Result<Date> {
        dates::timestamp_date(&self.timestamp)
    }

    pub fn song_label(&self) -> String {
        format!("{} - {}", self.track_name, self.artist_name)
    }
}

/// Play events in export order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlayHistory(pub Vec<PlayEvent>);

impl PlayHistory {
    pub fn new(events: Vec<PlayEvent>) -> Self {
        Self(events)
    }

    pub fn events(&self) -> &[PlayEvent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayEvent> {
        self.0.iter()
    }

    /// Parses a raw export. Podcast and audiobook entries carry no track
    /// metadata and are dropped.
    pub fn from_json_slice(raw: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(raw)
    }
}

impl From<Vec<PlayEvent>> for PlayHistory {
    fn from(events: Vec<PlayEvent>) -> Self {
        Self(events)
    }
}

impl FromIterator<PlayEvent> for PlayHistory {
    fn from_iter<I: IntoIterator<Item = PlayEvent>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PlayHistory {
    type Item = PlayEvent;
    type IntoIter = std::vec::IntoIter<PlayEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PlayHistory {
    type Item = &'a PlayEvent;
    type IntoIter = std::slice::Iter<'a, PlayEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for PlayHistory {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let records = Vec::<StreamRecord>::deserialize(deserializer)?;
        let total = records.len();
        let events: Vec<PlayEvent> = records
            .into_iter()
            .filter_map(StreamRecord::into_event)
            .collect();
        if events.len() < total {
            tracing::debug!(
                dropped = total - events.len(),
                "skipped records without track metadata"
            );
        }
        Ok(Self(events))
    }
}

/// A record as it appears in the export, before non-music entries are
/// filtered out.
#[derive(Debug, Deserialize)]
struct StreamRecord {
    ts: String,
    ms_played: u64,
    #[serde(default)]
    skipped: Option<bool>,
    #[serde(default)]
    master_metadata_track_name: Option<String>,
    #[serde(default)]
    master_metadata_album_artist_name: Option<String>,
    #[serde(default)]
    master_metadata_album_album_name: Option<String>,
}

impl StreamRecord {
    fn into_event(self) -> Option<PlayEvent> {
        Some(PlayEvent {
            timestamp: self.ts,
            ms_played: self.ms_played,
            skipped: self.skipped.unwrap_or(false),
            track_name: self.master_metadata_track_name?,
            album_name: self.master_metadata_album_album_name?,
            artist_name: self.master_metadata_album_artist_name?,
        })
    }
}
