use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "harvester",
    about = "Subtitle Harvester - Collect timed transcripts from VoiceTube and YouTube in resumable sessions",
    version,
    long_about = "Reads a list of videos, fetches their transcripts from VoiceTube and YouTube, writes one JSON file per transcript and records progress after every item so that interrupted or capped sessions resume where they left off."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one bounded session over the row source
    Fetch {
        /// Row source (CSV with id, vtid and ytid columns)
        #[arg(short, long, value_name = "FILE")]
        rows: Option<PathBuf>,

        /// Checkpoint file
        #[arg(short, long, value_name = "FILE")]
        progress: Option<PathBuf>,

        /// Maximum number of items processed in this session
        #[arg(short, long, value_name = "COUNT")]
        max_per_session: Option<usize>,

        /// YouTube caption language
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Seconds to wait between items and between failed attempts
        #[arg(long, value_name = "SECONDS")]
        delay: Option<f64>,
    },

    /// Summarize the checkpoint without making any requests
    Status {
        /// Checkpoint file
        #[arg(short, long, value_name = "FILE")]
        progress: Option<PathBuf>,

        /// Row source, to count rows still pending
        #[arg(short, long, value_name = "FILE")]
        rows: Option<PathBuf>,
    },

    /// Print the encoded YouTube transcript request parameter for a video
    Encode {
        /// YouTube video id
        #[arg(value_name = "VIDEO_ID")]
        video_id: String,

        /// Caption language
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Show or write the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
