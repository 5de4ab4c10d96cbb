use async_trait::async_trait;
use html_escape::decode_html_entities;
use std::future::Future;
use ytranscript::{TranscriptConfig, YoutubeTranscript, YoutubeTranscriptError};

use super::{LanguagePreference, ProviderError, Snippet, TranscriptPayload, TranscriptProvider};

/// YouTube caption provider backed by the `ytranscript` crate
pub struct YoutubeProvider {
    decode_entities: bool,
}

impl YoutubeProvider {
    pub fn new() -> Self {
        Self {
            decode_entities: true,
        }
    }

    /// Control HTML entity decoding of caption text
    pub fn with_entity_decoding(mut self, enabled: bool) -> Self {
        self.decode_entities = enabled;
        self
    }

    /// Single `fetch_transcript` call for one language (or the default track)
    async fn fetch_language(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<TranscriptPayload, ProviderError> {
        tracing::debug!("Requesting captions for {} (lang: {})", video_id, lang.unwrap_or("default"));

        let config = TranscriptConfig {
            lang: lang.map(|l| l.to_string()),
        };

        let entries = YoutubeTranscript::fetch_transcript(video_id, Some(config))
            .await
            .map_err(|e| map_error(e, lang.unwrap_or("default")))?;

        let snippets = entries
            .into_iter()
            .map(|entry| Snippet::timed(self.clean_text(&entry.text), entry.offset, entry.duration))
            .collect();

        Ok(TranscriptPayload::Snippets(snippets))
    }

    fn clean_text(&self, raw: &str) -> String {
        if !self.decode_entities {
            return raw.to_string();
        }

        // Caption payloads are double-encoded for apostrophes.
        decode_html_entities(raw).replace("&#39;", "'")
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeProvider {
    async fn fetch(
        &self,
        video_id: &str,
        preference: &LanguagePreference,
    ) -> Result<Option<TranscriptPayload>, ProviderError> {
        match preference {
            LanguagePreference::Languages(codes) if !codes.is_empty() => {
                first_language(codes, |code| self.fetch_language(video_id, Some(code)))
                    .await
                    .map(Some)
            }
            _ => self.fetch_language(video_id, None).await.map(Some),
        }
    }

    fn provider_name(&self) -> &'static str {
        "YouTube"
    }
}

impl Default for YoutubeProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Try each language code in order; the first success wins, otherwise the
/// last code's error is returned.
async fn first_language<'a, F, Fut>(
    codes: &'a [String],
    mut fetch_one: F,
) -> Result<TranscriptPayload, ProviderError>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<TranscriptPayload, ProviderError>>,
{
    let mut last_error = None;

    for code in codes {
        match fetch_one(code.as_str()).await {
            Ok(payload) => return Ok(payload),
            Err(e) => {
                tracing::debug!("No '{}' captions: {}", code, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ProviderError::Upstream("No language codes requested".to_string())))
}

fn map_error(error: YoutubeTranscriptError, requested: &str) -> ProviderError {
    match error {
        YoutubeTranscriptError::TranscriptNotAvailableLanguage(_, available, video_id) => {
            ProviderError::LanguageUnavailable {
                video_id,
                requested: requested.to_string(),
                available,
            }
        }
        other => ProviderError::Upstream(other.to_string()),
    }
}
