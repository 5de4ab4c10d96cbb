//! Transcript Fetch - a CLI adapter that fetches YouTube captions
//!
//! Tries a language fallback chain against a caption provider, flattens the
//! result into plain text and reports it as a single JSON envelope on stdout.

pub mod cli;
pub mod config;
pub mod fetch;
pub mod output;
pub mod provider;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use fetch::{FallbackPlan, TranscriptFetcher};
pub use output::ResponseEnvelope;
pub use provider::{LanguagePreference, TranscriptPayload, TranscriptProvider};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to transcript fetching
#[derive(thiserror::Error, Debug)]
pub enum TranscriptFetchError {
    #[error(transparent)]
    Provider(#[from] provider::ProviderError),

    #[error("No transcript available")]
    NoTranscript,

    #[error("Configuration error: {0}")]
    Config(String),
}
