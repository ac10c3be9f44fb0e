pub mod config;
pub mod dates;
pub mod error;
pub mod model;
pub mod source;
pub mod stats;

pub use dates::{build_date_range, parse_date};
pub use error::{Error, Result};
pub use model::{PlayEvent, PlayHistory};
pub use source::{HistorySource, load_history_file};
pub use stats::{
    ArtistPlays, ListeningTime, TopArtistsOptions, filter_by_date_range, most_played_album,
    most_played_song, top_five_artists, total_time_listened,
};
