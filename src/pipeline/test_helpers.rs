//! Scripted providers and an in-memory sink for pipeline tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::item::ItemProcessor;
use super::retry::RetryPolicy;
use crate::output::TranscriptSink;
use crate::providers::{ProviderKind, TranscriptProvider, TranscriptSegment};
use crate::HarvestError;

/// What a scripted provider answers for an id
#[derive(Debug, Clone, Copy)]
pub enum Script {
    Data,
    NoData,
    Error,
    /// Fail this many times, then return data
    FlakyThenData(usize),
}

/// Provider whose answers are scripted per id; unscripted ids return data
pub struct ScriptedProvider {
    kind: ProviderKind,
    scripts: HashMap<String, Script>,
    attempts: Mutex<HashMap<String, usize>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            scripts: HashMap::new(),
            attempts: Mutex::new(HashMap::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn script(mut self, id: &str, script: Script) -> Self {
        self.scripts.insert(id.to_string(), script);
        self
    }

    /// Shared handle to the total number of fetch calls
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

pub fn sample_segments(id: &str) -> Vec<TranscriptSegment> {
    vec![TranscriptSegment {
        start_time: 0.0,
        end_time: 1.5,
        text: format!("transcript for {}", id),
    }]
}

#[async_trait]
impl TranscriptProvider for ScriptedProvider {
    async fn fetch(&self, id: &str) -> Result<Option<Vec<TranscriptSegment>>, HarvestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let n = attempts.entry(id.to_string()).or_insert(0);
            *n += 1;
            *n
        };

        match self.scripts.get(id).copied().unwrap_or(Script::Data) {
            Script::Data => Ok(Some(sample_segments(id))),
            Script::NoData => Ok(None),
            Script::Error => Err(HarvestError::MalformedResponse("scripted failure".to_string())),
            Script::FlakyThenData(failures) if attempt <= failures => {
                Err(HarvestError::MalformedResponse("scripted flake".to_string()))
            }
            Script::FlakyThenData(_) => Ok(Some(sample_segments(id))),
        }
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }
}

/// Sink that records saves in memory; can be told to fail
#[derive(Default)]
pub struct MemorySink {
    pub saved: Mutex<Vec<(ProviderKind, String, usize)>>,
    pub fail: bool,
}

impl MemorySink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl TranscriptSink for Arc<MemorySink> {
    fn save(
        &self,
        kind: ProviderKind,
        provider_id: &str,
        segments: &[TranscriptSegment],
    ) -> Result<PathBuf, HarvestError> {
        if self.fail {
            return Err(HarvestError::Sink("disk full".to_string()));
        }
        self.saved
            .lock()
            .unwrap()
            .push((kind, provider_id.to_string(), segments.len()));
        Ok(PathBuf::from(format!("{}.json", provider_id)))
    }
}

pub fn instant_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        delay: Duration::ZERO,
    }
}

/// Processor over two scripted providers and a shared memory sink
pub fn processor(
    voicetube: ScriptedProvider,
    youtube: ScriptedProvider,
    sink: Arc<MemorySink>,
) -> ItemProcessor {
    ItemProcessor::new(Box::new(voicetube), Box::new(youtube), Box::new(sink), instant_retry())
}
