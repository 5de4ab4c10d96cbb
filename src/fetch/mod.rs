use std::backtrace::{Backtrace, BacktraceStatus};
use std::future::Future;
use std::sync::Arc;

use crate::output::ResponseEnvelope;
use crate::provider::{LanguagePreference, TranscriptPayload, TranscriptProvider};
use crate::TranscriptFetchError;

pub mod normalize;

pub use normalize::{normalize, Normalized};

/// Ordered language preferences, one provider call per entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPlan {
    attempts: Vec<LanguagePreference>,
}

/// Payload produced by the winning attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub preference: LanguagePreference,
    pub payload: TranscriptPayload,
}

impl FallbackPlan {
    pub fn new(attempts: Vec<LanguagePreference>) -> Self {
        Self { attempts }
    }

    pub fn attempts(&self) -> &[LanguagePreference] {
        &self.attempts
    }

    /// Run the attempts in order until one yields a non-empty payload.
    ///
    /// Failures before the last attempt are logged and skipped. A failure on
    /// the last attempt is returned as is. If every attempt comes back empty
    /// the result is [`TranscriptFetchError::NoTranscript`].
    pub async fn resolve(
        &self,
        provider: &dyn TranscriptProvider,
        video_id: &str,
    ) -> Result<Resolved, TranscriptFetchError> {
        let last = self.attempts.len().saturating_sub(1);

        for (index, preference) in self.attempts.iter().enumerate() {
            match provider.fetch(video_id, preference).await {
                Ok(Some(payload)) if !payload.is_empty() => {
                    tracing::info!("{} transcript found", preference.label());
                    return Ok(Resolved {
                        preference: preference.clone(),
                        payload,
                    });
                }
                Ok(_) => {
                    tracing::info!("{} fetch returned no transcript", preference.label());
                }
                Err(e) if index == last => {
                    tracing::warn!("{} fetch failed: {}", preference.label(), e);
                    return Err(e.into());
                }
                Err(e) => {
                    tracing::warn!("{} fetch failed: {}", preference.label(), e);
                }
            }
        }

        Err(TranscriptFetchError::NoTranscript)
    }
}

impl Default for FallbackPlan {
    /// Korean, then English, then whatever the provider picks
    fn default() -> Self {
        Self::new(vec![
            LanguagePreference::languages(["ko"]),
            LanguagePreference::languages(["en"]),
            LanguagePreference::ProviderDefault,
        ])
    }
}

/// Fetches and flattens a video's transcript
pub struct TranscriptFetcher {
    provider: Arc<dyn TranscriptProvider>,
    plan: FallbackPlan,
}

impl TranscriptFetcher {
    pub fn new(provider: Arc<dyn TranscriptProvider>, plan: FallbackPlan) -> Self {
        Self { provider, plan }
    }

    /// Fetch the transcript of `video_id` and package it as an envelope
    pub async fn fetch_transcript(&self, video_id: &str) -> ResponseEnvelope {
        tracing::debug!(
            "Fetching transcript for {} from {} ({} attempts)",
            video_id,
            self.provider.provider_name(),
            self.plan.attempts().len()
        );

        match self.plan.resolve(self.provider.as_ref(), video_id).await {
            Ok(resolved) => {
                let normalized = normalize(&resolved.payload);
                tracing::debug!(
                    "Normalized {} segments ({} chars) from '{}' attempt",
                    normalized.segments,
                    normalized.text.chars().count(),
                    resolved.preference
                );
                ResponseEnvelope::success(normalized.text, normalized.segments)
            }
            Err(e) => ResponseEnvelope::failure(e.to_string()),
        }
    }
}

/// Run `work` on its own task and turn any error or panic into a failure envelope.
///
/// Errors are logged with their cause chain and a stack trace: the one anyhow
/// captured at the error site when `RUST_BACKTRACE` is set, otherwise one
/// captured here. Panics are reported by the panic hook.
pub async fn guarded<F>(work: F) -> ResponseEnvelope
where
    F: Future<Output = anyhow::Result<ResponseEnvelope>> + Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(Ok(envelope)) => envelope,
        Ok(Err(e)) => {
            tracing::error!("Transcript fetch failed: {}", failure_report(&e));
            ResponseEnvelope::failure(format!("{:#}", e))
        }
        Err(join_error) => {
            let message = if join_error.is_panic() {
                let panic = join_error.into_panic();
                panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "Transcript fetch panicked".to_string())
            } else {
                join_error.to_string()
            };
            tracing::error!("Transcript fetch aborted: {}", message);
            ResponseEnvelope::failure(message)
        }
    }
}

/// Cause chain followed by a stack trace
fn failure_report(error: &anyhow::Error) -> String {
    let chain = format!("{:#}", error);

    if error.backtrace().status() == BacktraceStatus::Captured {
        format!("{}\n\nStack backtrace:\n{}", chain, error.backtrace())
    } else {
        format!("{}\n\nStack backtrace:\n{}", chain, Backtrace::force_capture())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockTranscriptProvider, ProviderError, SegmentItem, Snippet};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use serde_json::json;

    fn ko() -> LanguagePreference {
        LanguagePreference::languages(["ko"])
    }

    fn en() -> LanguagePreference {
        LanguagePreference::languages(["en"])
    }

    fn snippets(texts: &[&str]) -> TranscriptPayload {
        TranscriptPayload::Snippets(texts.iter().map(|t| Snippet::new(*t)).collect())
    }

    fn unavailable(requested: &str) -> ProviderError {
        ProviderError::LanguageUnavailable {
            video_id: "vid".into(),
            requested: requested.into(),
            available: vec!["ja".into()],
        }
    }

    fn mock_provider() -> MockTranscriptProvider {
        let mut provider = MockTranscriptProvider::new();
        provider.expect_provider_name().return_const("mock");
        provider
    }

    fn fetcher(provider: MockTranscriptProvider) -> TranscriptFetcher {
        TranscriptFetcher::new(Arc::new(provider), FallbackPlan::default())
    }

    #[tokio::test]
    async fn test_korean_track_wins_without_further_calls() {
        let mut provider = mock_provider();
        provider
            .expect_fetch()
            .with(eq("vid"), eq(ko()))
            .times(1)
            .returning(|_, _| Ok(Some(snippets(&["안녕하세요", "여러분"]))));

        let envelope = fetcher(provider).fetch_transcript("vid").await;

        assert_eq!(envelope, ResponseEnvelope::success("안녕하세요 여러분", 2));
    }

    #[tokio::test]
    async fn test_english_after_korean_failure() {
        let mut provider = mock_provider();
        let mut seq = Sequence::new();
        provider
            .expect_fetch()
            .with(eq("vid"), eq(ko()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(unavailable("ko")));
        provider
            .expect_fetch()
            .with(eq("vid"), eq(en()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Some(snippets(&["hello", "world"]))));

        let envelope = fetcher(provider).fetch_transcript("vid").await;

        assert_eq!(envelope, ResponseEnvelope::success("hello world", 2));
    }

    #[tokio::test]
    async fn test_default_track_after_two_failures() {
        let mut provider = mock_provider();
        let mut seq = Sequence::new();
        for preference in [ko(), en()] {
            provider
                .expect_fetch()
                .with(eq("vid"), eq(preference))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, p| Err(unavailable(&p.to_string())));
        }
        provider
            .expect_fetch()
            .with(eq("vid"), eq(LanguagePreference::ProviderDefault))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Some(snippets(&["bonjour"]))));

        let envelope = fetcher(provider).fetch_transcript("vid").await;

        assert_eq!(envelope, ResponseEnvelope::success("bonjour", 1));
    }

    #[tokio::test]
    async fn test_final_failure_message_is_returned() {
        let mut provider = mock_provider();
        provider
            .expect_fetch()
            .times(3)
            .returning(|_, p| match p {
                LanguagePreference::ProviderDefault => {
                    Err(ProviderError::Upstream("Transcript is disabled on this video".into()))
                }
                other => Err(unavailable(&other.to_string())),
            });

        let envelope = fetcher(provider).fetch_transcript("vid").await;

        assert_eq!(
            envelope,
            ResponseEnvelope::failure("Transcript is disabled on this video")
        );
    }

    #[tokio::test]
    async fn test_no_result_without_error() {
        let mut provider = mock_provider();
        provider
            .expect_fetch()
            .times(3)
            .returning(|_, p| match p {
                LanguagePreference::ProviderDefault => Ok(Some(TranscriptPayload::Items(vec![]))),
                _ => Ok(None),
            });

        let envelope = fetcher(provider).fetch_transcript("vid").await;

        assert_eq!(envelope, ResponseEnvelope::failure("No transcript available"));
    }

    #[tokio::test]
    async fn test_empty_korean_payload_falls_back() {
        let mut provider = mock_provider();
        let mut seq = Sequence::new();
        provider
            .expect_fetch()
            .with(eq("vid"), eq(ko()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Some(TranscriptPayload::Snippets(vec![]))));
        provider
            .expect_fetch()
            .with(eq("vid"), eq(en()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Some(snippets(&["fallback"]))));

        let envelope = fetcher(provider).fetch_transcript("vid").await;

        assert_eq!(envelope, ResponseEnvelope::success("fallback", 1));
    }

    #[tokio::test]
    async fn test_mapping_segments_from_provider() {
        let mut provider = mock_provider();
        provider.expect_fetch().times(1).returning(|_, _| {
            let items = [json!({"text": "hello"}), json!({"text": "world"})]
                .into_iter()
                .filter_map(|v| v.as_object().cloned().map(SegmentItem::Mapping))
                .collect();
            Ok(Some(TranscriptPayload::Items(items)))
        });

        let envelope = fetcher(provider).fetch_transcript("vid").await;

        assert_eq!(envelope.text(), Some("hello world"));
        assert_eq!(envelope.segments(), Some(2));
    }

    #[tokio::test]
    async fn test_repeated_fetches_are_identical() {
        let mut provider = mock_provider();
        provider
            .expect_fetch()
            .times(2)
            .returning(|_, _| Ok(Some(snippets(&["same", "text"]))));
        let fetcher = fetcher(provider);

        let first = fetcher.fetch_transcript("vid").await.to_json().unwrap();
        let second = fetcher.fetch_transcript("vid").await.to_json().unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_single_attempt_plan_failure() {
        let mut provider = mock_provider();
        provider
            .expect_fetch()
            .times(1)
            .returning(|_, _| Err(ProviderError::Upstream("boom".into())));
        let plan = FallbackPlan::new(vec![LanguagePreference::ProviderDefault]);

        let result = plan.resolve(&provider, "vid").await;

        assert!(matches!(result, Err(TranscriptFetchError::Provider(_))));
    }

    #[tokio::test]
    async fn test_guarded_converts_errors() {
        let envelope = guarded(async {
            Err(anyhow::anyhow!("inner").context("Failed to load configuration"))
        })
        .await;

        assert_eq!(
            envelope,
            ResponseEnvelope::failure("Failed to load configuration: inner")
        );
    }

    #[tokio::test]
    async fn test_guarded_converts_panics() {
        let envelope = guarded(async {
            if true {
                panic!("provider exploded");
            }
            Ok(ResponseEnvelope::success("unreachable", 1))
        })
        .await;

        assert_eq!(envelope, ResponseEnvelope::failure("provider exploded"));
    }

    #[test]
    fn test_failure_report_always_has_stack_trace() {
        let error = anyhow::anyhow!("disk on fire").context("Failed to load configuration");
        let report = failure_report(&error);

        assert!(report.starts_with("Failed to load configuration: disk on fire"));
        assert!(report.contains("Stack backtrace:"));
        assert!(report.lines().count() > 3);
    }

    #[test]
    fn test_guarded_passes_success_through() {
        let envelope = tokio_test::block_on(guarded(async { Ok(ResponseEnvelope::success("ok", 1)) }));
        assert_eq!(envelope, ResponseEnvelope::success("ok", 1));
    }
}
