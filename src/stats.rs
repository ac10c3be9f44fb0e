use crate::error::{Error, Result};
use crate::model::PlayHistory;
use crate::source::HistorySource;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use time::Date;

pub const TOP_ARTISTS: usize = 5;
pub const DEFAULT_SKIP_THRESHOLD_MS: u64 = 30_000;

const MS_PER_SECOND: f64 = 1000.0;
const SECONDS_PER_MINUTE: f64 = 60.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;
const DAYS_PER_WEEK: f64 = 7.0;
const WEEKS_PER_MONTH: f64 = 4.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Total playback time, in raw milliseconds and in coarser units rounded to
/// four decimals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ListeningTime {
    pub ms: u64,
    pub seconds: f64,
    pub minutes: f64,
    pub hours: f64,
    pub days: f64,
    pub weeks: f64,
    pub months: f64,
    pub years: f64,
}

impl ListeningTime {
    pub fn from_ms(ms: u64) -> Self {
        let seconds = ms as f64 / MS_PER_SECOND;
        let minutes = seconds / SECONDS_PER_MINUTE;
        let hours = minutes / MINUTES_PER_HOUR;
        let days = hours / HOURS_PER_DAY;
        let weeks = days / DAYS_PER_WEEK;
        let months = weeks / WEEKS_PER_MONTH;
        let years = months / MONTHS_PER_YEAR;
        Self {
            ms,
            seconds: round4(seconds),
            minutes: round4(minutes),
            hours: round4(hours),
            days: round4(days),
            weeks: round4(weeks),
            months: round4(months),
            years: round4(years),
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistPlays {
    pub artist: String,
    pub plays: u64,
}

/// Controls which plays count towards an artist.
///
/// A play is left out only when it was skipped, exclusion is enabled, and it
/// lasted less than `skip_threshold_ms`. Skipped plays at or over the
/// threshold still count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopArtistsOptions {
    pub exclude_skipped: bool,
    pub skip_threshold_ms: u64,
}

impl Default for TopArtistsOptions {
    fn default() -> Self {
        Self {
            exclude_skipped: false,
            skip_threshold_ms: DEFAULT_SKIP_THRESHOLD_MS,
        }
    }
}

impl TopArtistsOptions {
    fn counts(&self, skipped: bool, ms_played: u64) -> bool {
        !(skipped && self.exclude_skipped && ms_played < self.skip_threshold_ms)
    }
}

/// Counts keys and orders them by descending count. Keys with equal counts
/// keep the order they were first seen in.
pub fn rank_by_count<K, I>(keys: I) -> Vec<(K, u64)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, u64)> = Vec::new();
    for key in keys {
        match slots.get(&key) {
            Some(&slot) => counts[slot].1 = counts[slot].1.saturating_add(1),
            None => {
                slots.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    // sort_by is stable, first-seen order survives among ties
    counts.sort_by(|a, b| compare_counts(a.1, b.1));
    counts
}

fn compare_counts(a: u64, b: u64) -> Ordering {
    b.cmp(&a)
}

impl PlayHistory {
    pub fn total_time(&self) -> ListeningTime {
        let ms = self
            .iter()
            .fold(0_u64, |total, event| total.saturating_add(event.ms_played));
        ListeningTime::from_ms(ms)
    }

    pub fn top_artists(&self, options: &TopArtistsOptions, limit: usize) -> Vec<ArtistPlays> {
        let artists = self
            .iter()
            .filter(|event| options.counts(event.skipped, event.ms_played))
            .map(|event| event.artist_name.as_str());
        rank_by_count(artists)
            .into_iter()
            .take(limit)
            .map(|(artist, plays)| ArtistPlays {
                artist: artist.to_string(),
                plays,
            })
            .collect()
    }

    /// Plays per (track, artist), most played first.
    pub fn song_ranking(&self) -> Vec<((&str, &str), u64)> {
        rank_by_count(
            self.iter()
                .map(|event| (event.track_name.as_str(), event.artist_name.as_str())),
        )
    }

    /// Plays per album name, most played first.
    pub fn album_ranking(&self) -> Vec<(&str, u64)> {
        rank_by_count(self.iter().map(|event| event.album_name.as_str()))
    }

    pub fn most_played_song(&self) -> Result<String> {
        let ((track, artist), _) = self
            .song_ranking()
            .into_iter()
            .next()
            .ok_or(Error::EmptyHistory)?;
        Ok(format!("{track} - {artist}"))
    }

    pub fn most_played_album(&self) -> Result<String> {
        let (album, _) = self
            .album_ranking()
            .into_iter()
            .next()
            .ok_or(Error::EmptyHistory)?;
        Ok(album.to_string())
    }
}

pub fn total_time_listened(source: HistorySource<'_>) -> Result<ListeningTime> {
    Ok(source.load()?.total_time())
}

pub fn top_five_artists(
    source: HistorySource<'_>,
    options: &TopArtistsOptions,
) -> Result<Vec<ArtistPlays>> {
    Ok(source.load()?.top_artists(options, TOP_ARTISTS))
}

pub fn filter_by_date_range(
    source: HistorySource<'_>,
    start: Date,
    end: Date,
) -> Result<PlayHistory> {
    source.load()?.filter_by_date_range(start, end)
}

pub fn most_played_song(source: HistorySource<'_>) -> Result<String> {
    source.load()?.most_played_song()
}

pub fn most_played_album(source: HistorySource<'_>) -> Result<String> {
    source.load()?.most_played_album()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlayEvent;
    use proptest::prelude::*;
    use time::macros::date;

    fn play(artist: &str, ms_played: u64, skipped: bool) -> PlayEvent {
        PlayEvent {
            timestamp: String::from("2025-01-15T10:00:00Z"),
            ms_played,
            skipped,
            track_name: format!("{artist} track"),
            album_name: format!("{artist} album"),
            artist_name: artist.to_string(),
        }
    }

    fn song(track: &str, artist: &str, album: &str) -> PlayEvent {
        PlayEvent {
            timestamp: String::from("2025-01-15T10:00:00Z"),
            ms_played: 180_000,
            skipped: false,
            track_name: track.to_string(),
            album_name: album.to_string(),
            artist_name: artist.to_string(),
        }
    }

    fn pairs(ranked: &[ArtistPlays]) -> Vec<(&str, u64)> {
        ranked
            .iter()
            .map(|row| (row.artist.as_str(), row.plays))
            .collect()
    }

    #[test]
    fn total_time_converts_through_each_unit() {
        let history = PlayHistory::new(vec![play("A", 3_600_000, false), play("B", 0, true)]);
        let total = history.total_time();
        assert_eq!(total.ms, 3_600_000);
        assert_eq!(total.seconds, 3600.0);
        assert_eq!(total.minutes, 60.0);
        assert_eq!(total.hours, 1.0);
        assert_eq!(total.days, 0.0417);
        assert_eq!(total.weeks, 0.006);
        assert_eq!(total.months, 0.0015);
        assert_eq!(total.years, 0.0001);
    }

    #[test]
    fn empty_history_has_zero_total() {
        assert_eq!(PlayHistory::default().total_time(), ListeningTime::default());
    }

    #[test]
    fn counts_every_play_without_exclusion() {
        let history = PlayHistory::new(vec![
            play("A", 1_000, false),
            play("A", 2_000, false),
            play("B", 500, true),
        ]);
        let top = history.top_artists(&TopArtistsOptions::default(), TOP_ARTISTS);
        assert_eq!(pairs(&top), vec![("A", 2), ("B", 1)]);
    }

    #[test]
    fn excludes_only_short_skipped_plays() {
        let history = PlayHistory::new(vec![
            play("A", 1_000, true),
            play("A", 45_000, true),
            play("B", 1_000, false),
            play("B", 10_000, false),
            play("C", 29_999, true),
        ]);
        let options = TopArtistsOptions {
            exclude_skipped: true,
            skip_threshold_ms: 30_000,
        };
        let top = history.top_artists(&options, TOP_ARTISTS);
        assert_eq!(pairs(&top), vec![("B", 2), ("A", 1)]);
    }

    #[test]
    fn keeps_five_with_first_seen_tie_break() {
        let history = PlayHistory::new(
            ["F", "E", "D", "C", "B", "A", "A", "E"]
                .into_iter()
                .map(|artist| play(artist, 1_000, false))
                .collect(),
        );
        let top = history.top_artists(&TopArtistsOptions::default(), TOP_ARTISTS);
        assert_eq!(
            pairs(&top),
            vec![("E", 2), ("A", 2), ("F", 1), ("D", 1), ("C", 1)]
        );
    }

    #[test]
    fn most_played_song_and_album() {
        let history = PlayHistory::new(vec![
            song("Song2", "ArtistY", "Second"),
            song("Song1", "ArtistX", "First"),
            song("Song1", "ArtistX", "First"),
        ]);
        assert_eq!(history.most_played_song().expect("song"), "Song1 - ArtistX");
        assert_eq!(history.most_played_album().expect("album"), "First");
    }

    #[test]
    fn same_title_by_different_artists_counts_separately() {
        let history = PlayHistory::new(vec![
            song("Intro", "ArtistY", "Y"),
            song("Intro", "ArtistX", "X"),
            song("Intro", "ArtistX", "X"),
            song("Outro", "ArtistY", "Y"),
            song("Outro", "ArtistY", "Y"),
        ]);
        let ranking = history.song_ranking();
        assert_eq!(ranking[0], (("Intro", "ArtistX"), 2));
        assert_eq!(ranking[1], (("Outro", "ArtistY"), 2));
        assert_eq!(ranking[2], (("Intro", "ArtistY"), 1));
        assert_eq!(history.most_played_album().expect("album"), "Y");
    }

    #[test]
    fn most_played_requires_plays() {
        let empty = PlayHistory::default();
        assert!(matches!(empty.most_played_song(), Err(Error::EmptyHistory)));
        assert!(matches!(empty.most_played_album(), Err(Error::EmptyHistory)));
    }

    #[test]
    fn operations_need_a_source() {
        let none = HistorySource::default();
        assert!(matches!(total_time_listened(none), Err(Error::NoSource)));
        assert!(matches!(
            top_five_artists(none, &TopArtistsOptions::default()),
            Err(Error::NoSource)
        ));
        assert!(matches!(most_played_song(none), Err(Error::NoSource)));
        assert!(matches!(most_played_album(none), Err(Error::NoSource)));
        assert!(matches!(
            filter_by_date_range(none, date!(2025 - 01 - 01), date!(2025 - 01 - 31)),
            Err(Error::NoSource)
        ));
    }

    fn arb_history() -> impl Strategy<Value = PlayHistory> {
        proptest::collection::vec((0usize..9, 0u64..400_000, any::<bool>()), 0..80).prop_map(
            |plays| {
                plays
                    .into_iter()
                    .map(|(artist, ms, skipped)| play(&format!("artist-{artist}"), ms, skipped))
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn total_matches_sum_of_plays(history in arb_history()) {
            let expected: u64 = history.iter().map(|event| event.ms_played).sum();
            let total = history.total_time();
            prop_assert_eq!(total.ms, expected);
            prop_assert_eq!(total.minutes, round4(expected as f64 / 1000.0 / 60.0));
            prop_assert_eq!(total.days, round4(expected as f64 / 1000.0 / 60.0 / 60.0 / 24.0));
        }

        #[test]
        fn top_artists_are_bounded_and_sorted(
            history in arb_history(),
            exclude_skipped in any::<bool>(),
        ) {
            let options = TopArtistsOptions { exclude_skipped, ..TopArtistsOptions::default() };
            let top = history.top_artists(&options, TOP_ARTISTS);
            let distinct: std::collections::HashSet<&str> = history
                .iter()
                .filter(|event| options.counts(event.skipped, event.ms_played))
                .map(|event| event.artist_name.as_str())
                .collect();

            prop_assert_eq!(top.len(), distinct.len().min(TOP_ARTISTS));
            prop_assert!(top.windows(2).all(|pair| pair[0].plays >= pair[1].plays));
        }
    }
}
