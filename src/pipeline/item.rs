use super::retry::{fetch_with_retry, RetryPolicy};
use super::FetchOutcome;
use crate::checkpoint::{ProgressEntry, Status};
use crate::output::TranscriptSink;
use crate::providers::TranscriptProvider;
use crate::utils::{unix_timestamp, Row};

/// Everything needed to bring one row up to date: both providers, the output
/// sink and the retry policy.
pub struct ItemProcessor {
    voicetube: Box<dyn TranscriptProvider>,
    youtube: Box<dyn TranscriptProvider>,
    sink: Box<dyn TranscriptSink>,
    retry: RetryPolicy,
}

impl ItemProcessor {
    pub fn new(
        voicetube: Box<dyn TranscriptProvider>,
        youtube: Box<dyn TranscriptProvider>,
        sink: Box<dyn TranscriptSink>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            voicetube,
            youtube,
            sink,
            retry,
        }
    }

    /// Fetch whatever is still missing for `row` and return its new entry.
    ///
    /// VoiceTube is handled before YouTube; the two slots never affect each other.
    pub async fn process(&self, row: &Row, existing: Option<&ProgressEntry>) -> ProgressEntry {
        let voicetube_status = self
            .resolve_slot(
                self.voicetube.as_ref(),
                &row.voicetube_id,
                existing.map(|e| e.voicetube_status),
            )
            .await;

        let youtube_status = self
            .resolve_slot(
                self.youtube.as_ref(),
                &row.youtube_id,
                existing.map(|e| e.youtube_status),
            )
            .await;

        ProgressEntry {
            voicetube_id: row.voicetube_id.clone(),
            youtube_id: row.youtube_id.clone(),
            voicetube_status,
            youtube_status,
            timestamp: unix_timestamp(),
        }
    }

    /// One provider slot. `previous` is `None` for a slot never attempted.
    async fn resolve_slot(
        &self,
        provider: &dyn TranscriptProvider,
        provider_id: &str,
        previous: Option<Status>,
    ) -> Status {
        if provider_id.is_empty() {
            return Status::NoSubtitle;
        }

        if let Some(status) = previous.filter(Status::is_terminal) {
            return status;
        }

        match fetch_with_retry(provider, provider_id, &self.retry).await {
            FetchOutcome::Data(segments) => {
                let kind = provider.kind();
                match self.sink.save(kind, provider_id, &segments) {
                    Ok(path) => {
                        tracing::info!("[{}] Saved transcript for {} to {}", kind.label(), provider_id, path.display());
                        Status::Ok
                    }
                    Err(e) => {
                        tracing::error!("[{}] Could not save transcript for {}: {}", kind.label(), provider_id, e);
                        Status::Failed
                    }
                }
            }
            FetchOutcome::NoSubtitle => Status::NoSubtitle,
            FetchOutcome::Failed => Status::Failed,
        }
    }
}
