use anyhow::Result;
use clap::{Parser, Subcommand};
use listenstat::config::{self, Settings};
use listenstat::stats::TOP_ARTISTS;
use listenstat::{ListeningTime, PlayHistory, build_date_range};
use serde::Serialize;
use std::path::PathBuf;
use time::Date;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Streaming history JSON export (defaults to the configured data path)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Total time listened
    Total,
    /// Most played artists
    TopArtists {
        /// Leave out skipped plays shorter than the skip threshold
        /// (overrides the saved setting)
        #[arg(long)]
        exclude_skipped: Option<bool>,

        /// Skip threshold in milliseconds
        #[arg(long)]
        skip_threshold_ms: Option<u64>,

        /// Number of artists to show
        #[arg(long, default_value_t = TOP_ARTISTS)]
        limit: usize,
    },
    /// Plays between two dates (YYYY-MM-DD), inclusive
    Range {
        #[arg(value_parser = parse_date_arg)]
        start: Date,
        #[arg(value_parser = parse_date_arg)]
        end: Date,
    },
    /// Most played song
    Song,
    /// Most played album
    Album,
    /// Total time, top artists, most played song and album
    Summary,
    /// Show or update saved settings
    Config {
        /// Default streaming history export
        #[arg(long)]
        data_path: Option<PathBuf>,

        #[arg(long)]
        exclude_skipped: Option<bool>,

        #[arg(long)]
        skip_threshold_ms: Option<u64>,
    },
}

#[derive(Serialize)]
struct Summary {
    events: usize,
    total: ListeningTime,
    top_artists: Vec<listenstat::ArtistPlays>,
    most_played_song: Option<String>,
    most_played_album: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("listenstat=warn")),
        )
        .init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    let settings = config::load_settings_or_default();
    let json = args.json;
    let load = || -> Result<PlayHistory> {
        Ok(settings
            .history_source(args.file.as_deref())
            .load()?
            .into_owned())
    };

    match args.command {
        Command::Total => {
            let total = load()?.total_time();
            if json {
                return print_json(&total);
            }
            print_total(&total);
        }
        Command::TopArtists {
            exclude_skipped,
            skip_threshold_ms,
            limit,
        } => {
            let options = settings.top_artists_options(exclude_skipped, skip_threshold_ms);
            let top = load()?.top_artists(&options, limit);
            if json {
                return print_json(&top);
            }
            print_artists(&top);
        }
        Command::Range { start, end } => {
            let days = build_date_range(start, end)?.len();
            let plays = load()?.filter_by_date_range(start, end)?;
            if json {
                return print_json(&plays);
            }
            println!("{} plays over {days} days ({start} to {end})", plays.len());
            for event in &plays {
                println!("  {}  {}", event.timestamp, event.song_label());
            }
        }
        Command::Song => {
            let song = load()?.most_played_song()?;
            if json {
                return print_json(&serde_json::json!({ "song": song }));
            }
            println!("{song}");
        }
        Command::Album => {
            let album = load()?.most_played_album()?;
            if json {
                return print_json(&serde_json::json!({ "album": album }));
            }
            println!("{album}");
        }
        Command::Summary => {
            let history = load()?;
            let summary = Summary {
                events: history.len(),
                total: history.total_time(),
                top_artists: history
                    .top_artists(&settings.top_artists_options(None, None), TOP_ARTISTS),
                most_played_song: history.most_played_song().ok(),
                most_played_album: history.most_played_album().ok(),
            };
            if json {
                return print_json(&summary);
            }
            println!("{} plays", summary.events);
            print_total(&summary.total);
            println!("Top artists:");
            print_artists(&summary.top_artists);
            println!(
                "Most played song:  {}",
                summary.most_played_song.as_deref().unwrap_or("-")
            );
            println!(
                "Most played album: {}",
                summary.most_played_album.as_deref().unwrap_or("-")
            );
        }
        Command::Config {
            data_path,
            exclude_skipped,
            skip_threshold_ms,
        } => {
            let mut settings = settings.clone();
            let changed =
                data_path.is_some() || exclude_skipped.is_some() || skip_threshold_ms.is_some();
            if let Some(path) = data_path {
                settings.data_path = Some(path);
            }
            if let Some(exclude) = exclude_skipped {
                settings.exclude_skipped = exclude;
            }
            if let Some(threshold) = skip_threshold_ms {
                settings.skip_threshold_ms = threshold;
            }
            if changed {
                config::save_settings(&settings)?;
                tracing::info!(path = %config::settings_path()?.display(), "saved settings");
            }
            print_settings(&settings, json)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_total(total: &ListeningTime) {
    println!("Listened for {} ms", total.ms);
    println!("  {} seconds", total.seconds);
    println!("  {} minutes", total.minutes);
    println!("  {} hours", total.hours);
    println!("  {} days", total.days);
    println!("  {} weeks", total.weeks);
    println!("  {} months", total.months);
    println!("  {} years", total.years);
}

fn print_artists(artists: &[listenstat::ArtistPlays]) {
    for (rank, row) in artists.iter().enumerate() {
        println!("  {:>2}. {} ({} plays)", rank + 1, row.artist, row.plays);
    }
}

fn print_settings(settings: &Settings, json: bool) -> Result<()> {
    if json {
        return print_json(settings);
    }
    match &settings.data_path {
        Some(path) => println!("data_path:         {}", path.display()),
        None => println!("data_path:         (not set)"),
    }
    println!("exclude_skipped:   {}", settings.exclude_skipped);
    println!("skip_threshold_ms: {}", settings.skip_threshold_ms);
    Ok(())
}

fn parse_date_arg(value: &str) -> Result<Date, String> {
    listenstat::parse_date(value).map_err(|err| err.to_string())
}
