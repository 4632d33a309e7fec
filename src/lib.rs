//! Subtitle Harvester - resumable batch collection of timed transcripts
//!
//! This library fetches transcript segments for a list of videos from two providers
//! (VoiceTube and YouTube), writes one JSON file per fetched transcript and records
//! per-item, per-provider progress in a checkpoint file so that a long batch can be
//! spread across many bounded sessions.

use std::path::PathBuf;

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod providers;
pub mod utils;

pub use checkpoint::{CheckpointStore, ProgressEntry, Status};
pub use cli::{Cli, Commands};
pub use config::Config;
pub use pipeline::{BatchRunner, FetchOutcome, SessionSummary};
pub use providers::{TranscriptProvider, TranscriptSegment};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the harvester
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to write transcript: {0}")]
    Sink(String),

    #[error("Row source not found: {}", .0.display())]
    RowSourceMissing(PathBuf),
}
