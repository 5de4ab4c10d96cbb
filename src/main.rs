use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_fetch::cli::{argument_error_message, Cli};
use transcript_fetch::config::Config;
use transcript_fetch::fetch::{self, TranscriptFetcher};
use transcript_fetch::output::{self, ResponseEnvelope};
use transcript_fetch::utils;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return;
        }
        Err(e) => {
            let _ = e.print();
            emit(&ResponseEnvelope::failure(argument_error_message(&e)));
            return;
        }
    };

    // Initialize tracing; stdout is reserved for the envelope
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let envelope = match cli.video.as_deref() {
        Some(input) => {
            let video_id = utils::extract_video_id(input);
            let config_path = cli.config.clone();

            tracing::debug!("Resolved video ID: {}", video_id);

            fetch::guarded(async move {
                let config = Config::load(config_path.as_deref())
                    .context("Failed to load configuration")?;
                let fetcher = TranscriptFetcher::new(Arc::new(config.provider()), config.fallback_plan());
                Ok(fetcher.fetch_transcript(&video_id).await)
            })
            .await
        }
        None => ResponseEnvelope::failure("Video ID required"),
    };

    emit(&envelope);
}

/// Write the envelope to stdout; a failed write is only reported on stderr
fn emit(envelope: &ResponseEnvelope) {
    if let Err(e) = output::print_to_console(envelope) {
        eprintln!("Failed to write result: {:#}", e);
    }
}
