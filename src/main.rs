use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subtitle_harvester::checkpoint::{CheckpointStore, StatusCounts};
use subtitle_harvester::cli::{Cli, Commands};
use subtitle_harvester::config::Config;
use subtitle_harvester::pipeline::{BatchRunner, SessionSummary};
use subtitle_harvester::providers::params::encode_params;
use subtitle_harvester::utils::{self, format_duration};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "subtitle_harvester=debug"
    } else {
        "subtitle_harvester=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load().await?;

    match cli.command {
        Commands::Fetch {
            rows,
            progress,
            max_per_session,
            language,
            delay,
        } => {
            if let Some(rows) = rows {
                config.batch.rows_file = rows;
            }
            if let Some(progress) = progress {
                config.batch.progress_file = progress;
            }
            if let Some(max) = max_per_session {
                config.batch.max_per_session = max;
            }
            if let Some(language) = language {
                config.providers.youtube.language = language;
            }
            if let Some(delay) = delay {
                config.batch.delay_secs = delay;
            }
            config.validate()?;

            // A missing row source stops the run before anything is touched
            let rows = utils::read_rows(&config.batch.rows_file, &config.columns)?;

            let mut runner = BatchRunner::from_config(&config)?;
            if !cli.quiet {
                runner = runner.with_progress_bar();
            }

            let summary = runner.run(&rows).await?;
            print_session_summary(&summary);
        }
        Commands::Status { progress, rows } => {
            let progress_file = progress.unwrap_or_else(|| config.batch.progress_file.clone());
            let store = CheckpointStore::load(&progress_file)?;
            let summary = store.summary();

            println!("Checkpoint: {}", progress_file.display());
            println!("  Entries: {} ({} done)", summary.entries, summary.done);
            print_counts("VoiceTube", &summary.voicetube);
            print_counts("YouTube", &summary.youtube);

            let rows_file = rows.unwrap_or_else(|| config.batch.rows_file.clone());
            if rows_file.is_file() {
                let rows = utils::read_rows(&rows_file, &config.columns)?;
                let pending = rows.iter().filter(|row| !store.is_done(&row.id)).count();
                println!("  Pending rows: {} of {}", pending, rows.len());
            }
        }
        Commands::Encode { video_id, language } => {
            let language = language.unwrap_or_else(|| config.providers.youtube.language.clone());
            println!("{}", encode_params(&video_id, &language));
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let path = config.save().await?;
                println!("Configuration written to: {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_counts(name: &str, counts: &StatusCounts) {
    println!(
        "  {}: {} ok, {} no subtitle, {} failed",
        name,
        style(counts.ok).green(),
        style(counts.no_subtitle).yellow(),
        style(counts.failed).red()
    );
}

fn print_session_summary(summary: &SessionSummary) {
    println!();
    println!(
        "{} Processed {} videos in {} ({} already done, {} rows total)",
        style("Session complete.").bold(),
        summary.processed,
        format_duration(summary.elapsed.as_secs_f64()),
        summary.skipped,
        summary.total_rows
    );
    print_counts("VoiceTube", &summary.voicetube);
    print_counts("YouTube", &summary.youtube);
    if summary.cap_reached {
        println!("Session limit reached; run again to continue.");
    }
}
