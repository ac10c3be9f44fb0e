use crate::source::HistorySource;
use crate::stats::{DEFAULT_SKIP_THRESHOLD_MS, TopArtistsOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "listenstat";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Export file used when no file is given on the command line.
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    #[serde(default)]
    pub exclude_skipped: bool,
    #[serde(default = "default_skip_threshold_ms")]
    pub skip_threshold_ms: u64,
}

fn default_skip_threshold_ms() -> u64 {
    DEFAULT_SKIP_THRESHOLD_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: None,
            exclude_skipped: false,
            skip_threshold_ms: default_skip_threshold_ms(),
        }
    }
}

impl Settings {
    /// Saved artist options, with any per-run values taking their place.
    pub fn top_artists_options(
        &self,
        exclude_skipped: Option<bool>,
        skip_threshold_ms: Option<u64>,
    ) -> TopArtistsOptions {
        TopArtistsOptions {
            exclude_skipped: exclude_skipped.unwrap_or(self.exclude_skipped),
            skip_threshold_ms: skip_threshold_ms.unwrap_or(self.skip_threshold_ms),
        }
    }

    /// History source for a run: `file` wins over the saved data path.
    pub fn history_source<'a>(&'a self, file: Option<&'a Path>) -> HistorySource<'a> {
        match file.or(self.data_path.as_deref()) {
            Some(path) => HistorySource::from_path(path),
            None => HistorySource::default(),
        }
    }
}

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("LISTENSTAT_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join(SETTINGS_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

/// Falls back to defaults when the settings cannot be located or read, so
/// commands still run and `config` can overwrite a broken file.
pub fn load_settings_or_default() -> Settings {
    match settings_path() {
        Ok(path) => load_settings_or_default_from_path(&path),
        Err(err) => {
            tracing::warn!("using default settings: {err:#}");
            Settings::default()
        }
    }
}

fn load_settings_or_default_from_path(path: &Path) -> Settings {
    load_settings_from_path(path).unwrap_or_else(|err| {
        tracing::warn!("using default settings: {err:#}");
        Settings::default()
    })
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    ensure_config_dir()?;
    save_settings_to_path(&settings_path()?, settings)
}

fn load_settings_from_path(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings)
}

fn save_settings_to_path(path: &Path, settings: &Settings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
