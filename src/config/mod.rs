use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::fetch::FallbackPlan;
use crate::provider::{LanguagePreference, YoutubeProvider};
use crate::TranscriptFetchError;

const LOCAL_CONFIG_FILE: &str = "transcript-fetch.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Language fallback settings
    pub languages: LanguagesConfig,

    /// Provider settings
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagesConfig {
    /// Language preferences tried in order, one provider call each
    pub fallback: Vec<Vec<String>>,

    /// Finish with an attempt that lets the provider pick the track
    pub provider_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Decode HTML entities in caption text
    pub decode_html_entities: bool,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            fallback: vec![vec!["ko".to_string()], vec!["en".to_string()]],
            provider_default: true,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            decode_html_entities: true,
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults when no file exists.
    ///
    /// An explicit path must exist. The file is never created.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(TranscriptFetchError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                Some(path.to_path_buf())
            }
            None => Self::config_path(),
        };

        match config_path {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read and validate a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!("Loading config from {}", path.display());

        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Locate a config file in the working directory or the user config dir
    fn config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("transcript-fetch").join("config.yaml"))
            .filter(|path| path.exists())
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.languages.fallback.is_empty() && !self.languages.provider_default {
            return Err(TranscriptFetchError::Config(
                "At least one transcript attempt must be configured".to_string(),
            )
            .into());
        }

        if let Some(entry) = self
            .languages
            .fallback
            .iter()
            .find(|codes| codes.is_empty() || codes.iter().any(|c| c.trim().is_empty()))
        {
            return Err(TranscriptFetchError::Config(format!(
                "Invalid fallback entry {:?}: language codes must be non-empty",
                entry
            ))
            .into());
        }

        Ok(())
    }

    /// Build the ordered attempt plan
    pub fn fallback_plan(&self) -> FallbackPlan {
        let mut attempts: Vec<LanguagePreference> = self
            .languages
            .fallback
            .iter()
            .map(|codes| LanguagePreference::languages(codes.iter().map(|c| c.trim())))
            .collect();

        if self.languages.provider_default {
            attempts.push(LanguagePreference::ProviderDefault);
        }

        FallbackPlan::new(attempts)
    }

    /// Build the caption provider
    pub fn provider(&self) -> YoutubeProvider {
        YoutubeProvider::new().with_entity_decoding(self.provider.decode_html_entities)
    }
}
