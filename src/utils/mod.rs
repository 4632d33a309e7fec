use anyhow::{Context, Result};
use std::path::Path;
use url::Url;

use crate::config::ColumnsConfig;
use crate::HarvestError;

/// One item from the row source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Internal item identifier, used as the checkpoint key
    pub id: String,

    /// VoiceTube video id, empty if the item has none
    pub voicetube_id: String,

    /// YouTube video id, empty if the item has none
    pub youtube_id: String,
}

impl Row {
    pub fn new(id: impl Into<String>, voicetube_id: impl Into<String>, youtube_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            voicetube_id: voicetube_id.into(),
            youtube_id: youtube_id.into(),
        }
    }
}

/// Read all rows from a delimited file with a header line.
///
/// Missing columns or short records read as empty strings.
pub fn read_rows(path: &Path, columns: &ColumnsConfig) -> Result<Vec<Row>> {
    if !path.is_file() {
        return Err(HarvestError::RowSourceMissing(path.to_path_buf()).into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open row source {}", path.display()))?;

    let headers = reader.headers().context("Failed to read row source header")?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
    };
    let id_col = position(&columns.id);
    let vt_col = position(&columns.voicetube);
    let yt_col = position(&columns.youtube);

    if id_col.is_none() {
        tracing::warn!("Row source has no '{}' column; ids will be empty", columns.id);
    }

    let cell = |record: &csv::StringRecord, col: Option<usize>| {
        col.and_then(|i| record.get(i))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to parse row source record")?;
        rows.push(Row {
            id: cell(&record, id_col),
            voicetube_id: cell(&record, vt_col),
            youtube_id: cell(&record, yt_col),
        });
    }

    Ok(rows)
}

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Current time as fractional seconds since the Unix epoch
pub fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
