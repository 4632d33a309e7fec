use std::path::{Path, PathBuf};

use crate::providers::{ProviderKind, TranscriptSegment};
use crate::{HarvestError, Result};

/// Destination for fetched transcripts
pub trait TranscriptSink: Send + Sync {
    /// Persist the segments fetched for `provider_id`
    fn save(
        &self,
        kind: ProviderKind,
        provider_id: &str,
        segments: &[TranscriptSegment],
    ) -> std::result::Result<PathBuf, HarvestError>;
}

/// Writes `<dir>/<provider_id>.json` per transcript, one directory per provider
#[derive(Debug, Clone)]
pub struct FileSink {
    voicetube_dir: PathBuf,
    youtube_dir: PathBuf,
}

impl FileSink {
    pub fn new(voicetube_dir: impl Into<PathBuf>, youtube_dir: impl Into<PathBuf>) -> Self {
        Self {
            voicetube_dir: voicetube_dir.into(),
            youtube_dir: youtube_dir.into(),
        }
    }

    /// Create both output directories
    pub fn prepare(&self) -> Result<()> {
        fs_err::create_dir_all(&self.voicetube_dir)?;
        fs_err::create_dir_all(&self.youtube_dir)?;
        Ok(())
    }

    pub fn dir_for(&self, kind: ProviderKind) -> &Path {
        match kind {
            ProviderKind::VoiceTube => &self.voicetube_dir,
            ProviderKind::YouTube => &self.youtube_dir,
        }
    }
}

/// Pretty JSON array of `{startTime, endTime, text}`; non-ASCII is written as-is
pub fn format_segments(segments: &[TranscriptSegment]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(segments)
}

impl TranscriptSink for FileSink {
    fn save(
        &self,
        kind: ProviderKind,
        provider_id: &str,
        segments: &[TranscriptSegment],
    ) -> std::result::Result<PathBuf, HarvestError> {
        let path = self.dir_for(kind).join(format!("{}.json", provider_id));
        let content = format_segments(segments).map_err(|e| HarvestError::Sink(e.to_string()))?;

        fs_err::write(&path, content).map_err(|e| HarvestError::Sink(e.to_string()))?;
        Ok(path)
    }
}
