//! Text-to-speech proxy
//!
//! The provider is an opaque capability: text + speaker + credentials in,
//! encoded audio bytes out. [`SpeechSynthesizer`] is the seam; the production
//! implementation is [`ByteDanceClient`].

pub mod bytedance;

use crate::error::{Error, Result};
use async_trait::async_trait;
use banter_common::config::TtsDefaults;

pub use bytedance::ByteDanceClient;

/// Credentials for one synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsCredentials {
    pub app_key: String,
    pub access_token: String,
    pub cluster: String,
}

impl TtsCredentials {
    /// Request-supplied values win when non-empty; otherwise fall back to the
    /// server defaults. An app key is mandatory.
    pub fn resolve(
        app_key: Option<String>,
        access_token: Option<String>,
        defaults: &TtsDefaults,
    ) -> Result<Self> {
        let pick = |value: Option<String>, fallback: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };

        let app_key = pick(app_key, &defaults.app_key);
        if app_key.trim().is_empty() {
            return Err(Error::InvalidInput("Missing ByteDance AppKey".to_string()));
        }

        Ok(Self {
            app_key,
            access_token: pick(access_token, &defaults.access_token),
            cluster: defaults.cluster.clone(),
        })
    }
}

/// One utterance to synthesize
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    /// Provider voice identifier
    pub speaker: String,
    pub credentials: TtsCredentials,
}

/// Encoded audio returned by a provider
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// MP3 bytes
    pub bytes: Vec<u8>,
    /// Duration reported by the provider, when it reports one
    pub duration_ms: Option<u64>,
}

/// Speech synthesis capability
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio>;
}
