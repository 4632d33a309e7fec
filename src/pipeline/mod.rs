use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

pub mod item;
pub mod retry;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use item::ItemProcessor;
pub use retry::{fetch_with_retry, RetryPolicy};

use crate::checkpoint::{CheckpointStore, StatusCounts};
use crate::config::Config;
use crate::output::FileSink;
use crate::providers::voicetube::VoiceTubeProvider;
use crate::providers::youtube::YouTubeProvider;
use crate::providers::TranscriptSegment;
use crate::utils::Row;

/// Result of running the retry loop against one provider
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Segments were returned
    Data(Vec<TranscriptSegment>),
    /// The provider has no transcript for this id
    NoSubtitle,
    /// Every attempt errored
    Failed,
}

/// What one session did
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    /// Rows in the source
    pub total_rows: usize,

    /// Rows processed (and checkpointed) in this session
    pub processed: usize,

    /// Rows skipped because both providers were already finished
    pub skipped: usize,

    /// Session stopped at the per-session cap
    pub cap_reached: bool,

    /// Statuses recorded this session, per provider
    pub voicetube: StatusCounts,
    pub youtube: StatusCounts,

    pub elapsed: Duration,
}

/// Walks the row list in order and brings unfinished rows up to date, at most
/// `max_per_session` of them, saving the checkpoint after each one.
pub struct BatchRunner {
    processor: ItemProcessor,
    store: CheckpointStore,
    max_per_session: usize,
    delay: Duration,
    progress: ProgressBar,
}

impl BatchRunner {
    pub fn new(
        processor: ItemProcessor,
        store: CheckpointStore,
        max_per_session: usize,
        delay: Duration,
    ) -> Self {
        Self {
            processor,
            store,
            max_per_session,
            delay,
            progress: ProgressBar::hidden(),
        }
    }

    /// Wire the real providers, file sink and checkpoint from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let sink = FileSink::new(&config.batch.voicetube_dir, &config.batch.youtube_dir);
        sink.prepare().context("Failed to create output directories")?;

        let processor = ItemProcessor::new(
            Box::new(VoiceTubeProvider::new(&config.providers.voicetube)?),
            Box::new(YouTubeProvider::new(&config.providers.youtube)?),
            Box::new(sink),
            RetryPolicy::from_config(&config.batch),
        );
        let store = CheckpointStore::load(&config.batch.progress_file)?;

        Ok(Self::new(
            processor,
            store,
            config.batch.max_per_session,
            config.batch.delay(),
        ))
    }

    /// Show a session progress bar while running
    pub fn with_progress_bar(mut self) -> Self {
        let bar = ProgressBar::new(self.max_per_session as u64);
        let style = ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        self.progress = bar;
        self
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Run one session over `rows`
    pub async fn run(&mut self, rows: &[Row]) -> Result<SessionSummary> {
        let started = Instant::now();
        let total = rows.len();
        let mut summary = SessionSummary {
            total_rows: total,
            ..SessionSummary::default()
        };

        tracing::info!("Found {} videos in row source", total);

        for (i, row) in rows.iter().enumerate() {
            if summary.processed >= self.max_per_session {
                tracing::info!("Reached session limit of {} videos. Stopping.", self.max_per_session);
                summary.cap_reached = true;
                break;
            }

            if self.store.is_done(&row.id) {
                summary.skipped += 1;
                continue;
            }

            tracing::info!(
                "[{}/{}] (session {}/{}) ID {} | YT: {} | VT: {}",
                i + 1,
                total,
                summary.processed + 1,
                self.max_per_session,
                row.id,
                row.youtube_id,
                row.voicetube_id
            );
            self.progress.set_message(row.id.clone());

            let entry = self.processor.process(row, self.store.get(&row.id)).await;
            summary.voicetube.record(entry.voicetube_status);
            summary.youtube.record(entry.youtube_status);

            self.store.insert(row.id.clone(), entry);
            self.store
                .save()
                .with_context(|| format!("Failed to save progress after row {}", row.id))?;

            summary.processed += 1;
            self.progress.inc(1);

            let more_rows = i + 1 < total;
            if more_rows && summary.processed < self.max_per_session && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        self.progress.finish_and_clear();
        summary.elapsed = started.elapsed();
        tracing::info!("Session complete. Processed {} videos.", summary.processed);

        Ok(summary)
    }
}
