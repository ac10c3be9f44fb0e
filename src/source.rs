use crate::error::{Error, Result};
use crate::model::PlayHistory;
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Where an operation takes its play history from: an already loaded
/// history, an export file, or both. Loaded data wins over the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistorySource<'a> {
    path: Option<&'a Path>,
    history: Option<&'a PlayHistory>,
}

impl<'a> HistorySource<'a> {
    pub fn from_path(path: &'a Path) -> Self {
        Self {
            path: Some(path),
            history: None,
        }
    }

    pub fn from_history(history: &'a PlayHistory) -> Self {
        Self {
            path: None,
            history: Some(history),
        }
    }

    pub fn with_path(mut self, path: &'a Path) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_history(mut self, history: &'a PlayHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn load(&self) -> Result<Cow<'a, PlayHistory>> {
        match (self.history, self.path) {
            (Some(history), path) => {
                if let Some(path) = path {
                    tracing::debug!(path = %path.display(), "using loaded history, ignoring path");
                }
                Ok(Cow::Borrowed(history))
            }
            (None, Some(path)) => load_history_file(path).map(Cow::Owned),
            (None, None) => Err(Error::NoSource),
        }
    }
}

impl<'a> From<&'a PlayHistory> for HistorySource<'a> {
    fn from(history: &'a PlayHistory) -> Self {
        Self::from_history(history)
    }
}

impl<'a> From<&'a Path> for HistorySource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::from_path(path)
    }
}

impl<'a> From<&'a PathBuf> for HistorySource<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Self::from_path(path)
    }
}

/// Reads and parses one streaming history export.
pub fn load_history_file(path: &Path) -> Result<PlayHistory> {
    let raw = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let history = PlayHistory::from_json_slice(&raw).map_err(|source| Error::Format {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), events = history.len(), "loaded history");
    Ok(history)
}
