use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

pub mod youtube;

pub use youtube::YoutubeProvider;

/// Language preference for a single provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguagePreference {
    /// Ordered language codes, first match wins
    Languages(Vec<String>),

    /// Let the provider pick its default track
    ProviderDefault,
}

impl LanguagePreference {
    pub fn languages<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        if codes.is_empty() {
            LanguagePreference::ProviderDefault
        } else {
            LanguagePreference::Languages(codes)
        }
    }

    /// Human-readable label used in diagnostics ("Korean", "English", "Default")
    pub fn label(&self) -> String {
        match self {
            LanguagePreference::Languages(codes) => codes
                .iter()
                .map(|code| crate::utils::language_label(code))
                .collect::<Vec<_>>()
                .join("/"),
            LanguagePreference::ProviderDefault => "Default".to_string(),
        }
    }
}

impl fmt::Display for LanguagePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguagePreference::Languages(codes) => write!(f, "{}", codes.join(", ")),
            LanguagePreference::ProviderDefault => write!(f, "default"),
        }
    }
}

/// One timed caption unit. Only `text` takes part in normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Display duration in seconds
    pub duration: f64,
}

impl Snippet {
    pub fn new(text: impl Into<String>) -> Self {
        Self::timed(text, 0.0, 0.0)
    }

    pub fn timed(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// A segment-like item of a generic transcript sequence
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentItem {
    /// Item with a text attribute
    Snippet(Snippet),

    /// Key/value item, text read from its "text" key
    Mapping(Map<String, Value>),

    /// Anything else, used through its string form
    Plain(String),
}

impl SegmentItem {
    /// Resolve the item's text: attribute, then "text" key, then string form.
    pub fn text(&self) -> String {
        match self {
            SegmentItem::Snippet(snippet) => snippet.text.clone(),
            SegmentItem::Mapping(map) => match map.get("text") {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => Value::Object(map.clone()).to_string(),
            },
            SegmentItem::Plain(text) => text.clone(),
        }
    }
}

impl fmt::Display for SegmentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentItem::Snippet(snippet) => write!(f, "{}", snippet.text),
            SegmentItem::Mapping(map) => write!(f, "{}", Value::Object(map.clone())),
            SegmentItem::Plain(text) => write!(f, "{}", text),
        }
    }
}

/// Transcript data as returned by a provider.
///
/// Normalization inspects the variants in declaration order: a named snippet
/// list first, then a generic item sequence, then the opaque string form.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptPayload {
    Snippets(Vec<Snippet>),
    Items(Vec<SegmentItem>),
    Opaque(String),
}

impl TranscriptPayload {
    /// Empty payloads count as "no result" and let the fallback chain continue.
    pub fn is_empty(&self) -> bool {
        match self {
            TranscriptPayload::Snippets(snippets) => snippets.is_empty(),
            TranscriptPayload::Items(items) => items.is_empty(),
            TranscriptPayload::Opaque(text) => text.is_empty(),
        }
    }
}

impl fmt::Display for TranscriptPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptPayload::Snippets(snippets) => {
                let texts: Vec<&str> = snippets.iter().map(|s| s.text.as_str()).collect();
                write!(f, "[{}]", texts.join(", "))
            }
            TranscriptPayload::Items(items) => {
                let texts: Vec<String> = items.iter().map(|item| item.to_string()).collect();
                write!(f, "[{}]", texts.join(", "))
            }
            TranscriptPayload::Opaque(text) => write!(f, "{}", text),
        }
    }
}

/// Errors raised by a provider for a single fetch attempt
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("No transcripts were found in the requested languages ({requested}) for video {video_id}. Available languages: {}", .available.join(", "))]
    LanguageUnavailable {
        video_id: String,
        requested: String,
        available: Vec<String>,
    },

    #[error("{0}")]
    Upstream(String),
}

/// Source of transcript data for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript of `video_id` honoring `preference`.
    ///
    /// `Ok(None)` means the provider returned nothing without raising.
    async fn fetch(
        &self,
        video_id: &str,
        preference: &LanguagePreference,
    ) -> Result<Option<TranscriptPayload>, ProviderError>;

    /// Get the name of this provider
    fn provider_name(&self) -> &'static str;
}
