//! Durable per-item progress.
//!
//! The checkpoint is a JSON object keyed by row id. It is rewritten in full after
//! every processed item through a temporary file and rename, so the file on disk
//! is always a complete snapshot.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::providers::ProviderKind;

/// Persisted result of fetching one provider's transcript for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Transcript fetched and written
    Ok,
    /// Provider answered without a transcript
    NoSubtitle,
    /// Every attempt failed; retried in a later run
    Failed,
}

impl Status {
    /// `Ok` and `NoSubtitle` are never retried
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Ok | Status::NoSubtitle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::NoSubtitle => "no_subtitle",
            Status::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known state of one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    #[serde(rename = "vtid")]
    pub voicetube_id: String,

    #[serde(rename = "ytid")]
    pub youtube_id: String,

    #[serde(rename = "vt_status")]
    pub voicetube_status: Status,

    #[serde(rename = "yt_status")]
    pub youtube_status: Status,

    /// Seconds since the Unix epoch when the entry was written
    pub timestamp: f64,
}

impl ProgressEntry {
    pub fn status(&self, kind: ProviderKind) -> Status {
        match kind {
            ProviderKind::VoiceTube => self.voicetube_status,
            ProviderKind::YouTube => self.youtube_status,
        }
    }

    /// Both providers have reached a terminal status
    pub fn is_done(&self) -> bool {
        self.voicetube_status.is_terminal() && self.youtube_status.is_terminal()
    }
}

/// Status counts for one provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub ok: usize,
    pub no_subtitle: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Ok => self.ok += 1,
            Status::NoSubtitle => self.no_subtitle += 1,
            Status::Failed => self.failed += 1,
        }
    }
}

/// Aggregate view of a checkpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointSummary {
    pub entries: usize,
    pub done: usize,
    pub voicetube: StatusCounts,
    pub youtube: StatusCounts,
}

/// Row id to progress mapping backed by a JSON file
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    entries: BTreeMap<String, ProgressEntry>,
}

impl CheckpointStore {
    /// Load the checkpoint at `path`.
    ///
    /// A missing file starts empty. So does a file that cannot be parsed: prior
    /// progress is discarded with a warning rather than failing the run.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match fs_err::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        "Checkpoint {} is unreadable ({}), starting without prior progress",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e).context("Failed to read checkpoint file"),
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, row_id: &str) -> Option<&ProgressEntry> {
        self.entries.get(row_id)
    }

    pub fn insert(&mut self, row_id: impl Into<String>, entry: ProgressEntry) {
        self.entries.insert(row_id.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the row has nothing left to fetch
    pub fn is_done(&self, row_id: &str) -> bool {
        self.get(row_id).is_some_and(ProgressEntry::is_done)
    }

    /// Rewrite the whole checkpoint file
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let content =
            serde_json::to_string_pretty(&self.entries).context("Failed to serialize checkpoint")?;

        let mut tmp = NamedTempFile::new_in(dir).context("Failed to create temporary checkpoint")?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write temporary checkpoint")?;
        tmp.as_file()
            .sync_all()
            .context("Failed to flush temporary checkpoint")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace checkpoint {}", self.path.display()))?;

        Ok(())
    }

    pub fn summary(&self) -> CheckpointSummary {
        let mut summary = CheckpointSummary {
            entries: self.entries.len(),
            ..CheckpointSummary::default()
        };

        for entry in self.entries.values() {
            if entry.is_done() {
                summary.done += 1;
            }
            summary.voicetube.record(entry.voicetube_status);
            summary.youtube.record(entry.youtube_status);
        }

        summary
    }
}
