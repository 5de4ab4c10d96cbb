use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "get-transcript",
    about = "Fetch a YouTube video's captions and print them as JSON",
    version,
    long_about = "Fetches a video's captions, trying Korean, then English, then the provider's default track, and prints {\"success\", \"text\", \"segments\"} or {\"success\": false, \"error\"} as one JSON object on stdout. Diagnostics go to stderr."
)]
pub struct Cli {
    /// Video ID or YouTube URL (IDs may start with '-')
    #[arg(value_name = "VIDEO", allow_hyphen_values = true)]
    pub video: Option<String>,

    /// Additional arguments are accepted and ignored
    #[arg(hide = true, value_name = "IGNORED")]
    pub extra: Vec<String>,

    /// Path to a YAML configuration file
    #[arg(short, long, global = true, value_name = "FILE", env = "TRANSCRIPT_FETCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Default log filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "transcript_fetch=debug,get_transcript=debug"
        } else {
            "transcript_fetch=info,get_transcript=info"
        }
    }
}

/// First line of clap's rendered error, without the `error: ` prefix
pub fn argument_error_message(error: &clap::Error) -> String {
    let rendered = error.render().to_string();
    let first_line = rendered.lines().next().unwrap_or_default().trim();

    first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string()
}
