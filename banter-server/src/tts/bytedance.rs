//! ByteDance OpenSpeech HTTP client
//!
//! Posts one synthesis request per utterance and decodes the base64 MP3
//! payload from the JSON reply.

use super::{SpeechSynthesizer, SynthesisRequest, SynthesizedAudio};
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

const USER_AGENT: &str = concat!("piraeus-banter/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_ID: &str = "piraeus-banter";

/// Provider status code for a successful synthesis
const SUCCESS_CODE: i64 = 3000;

/// JSON reply from the OpenSpeech endpoint
#[derive(Debug, Deserialize)]
pub struct ByteDanceResponse {
    #[serde(default)]
    pub reqid: Option<String>,
    pub code: i64,
    #[serde(default)]
    pub message: String,
    /// Base64 encoded audio
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub addition: Option<ByteDanceAddition>,
}

#[derive(Debug, Deserialize)]
pub struct ByteDanceAddition {
    /// Audio duration in milliseconds, as a decimal string
    #[serde(default)]
    pub duration: Option<String>,
}

/// ByteDance TTS client
pub struct ByteDanceClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl ByteDanceClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Synthesis(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    /// Build the JSON body for one synthesis call
    pub fn request_body(request: &SynthesisRequest, reqid: &str) -> Value {
        json!({
            "app": {
                "appid": request.credentials.app_key,
                "token": request.credentials.access_token,
                "cluster": request.credentials.cluster,
            },
            "user": {
                "uid": USER_ID,
            },
            "audio": {
                "voice_type": request.speaker,
                "encoding": "mp3",
                "speed_ratio": 1.0,
            },
            "request": {
                "reqid": reqid,
                "text": request.text,
                "text_type": "plain",
                "operation": "query",
            }
        })
    }

    /// Turn a provider reply into audio bytes
    pub fn parse_response(response: ByteDanceResponse) -> Result<SynthesizedAudio> {
        if response.code != SUCCESS_CODE {
            return Err(Error::Synthesis(format!(
                "Provider error {}: {}",
                response.code, response.message
            )));
        }

        let data = response
            .data
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::Synthesis("Provider returned no audio".to_string()))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.as_bytes())
            .map_err(|e| Error::Synthesis(format!("Invalid audio payload: {}", e)))?;

        let duration_ms = response
            .addition
            .and_then(|a| a.duration)
            .and_then(|d| d.trim().parse::<u64>().ok());

        Ok(SynthesizedAudio { bytes, duration_ms })
    }
}

#[async_trait]
impl SpeechSynthesizer for ByteDanceClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio> {
        let reqid = Uuid::new_v4().to_string();
        let body = Self::request_body(request, &reqid);

        debug!(reqid = %reqid, speaker = %request.speaker, "Requesting speech synthesis");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer;{}", request.credentials.access_token),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("Network error: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Synthesis(format!("Failed to read response: {}", e)))?;

        let parsed: ByteDanceResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Synthesis(format!("HTTP {}: unexpected response ({})", status.as_u16(), e))
        })?;

        let audio = Self::parse_response(parsed)?;
        info!(reqid = %reqid, bytes = audio.bytes.len(), "Speech synthesized");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::TtsCredentials;

    fn request() -> SynthesisRequest {
        SynthesisRequest {
            text: "Hello there".to_string(),
            speaker: "BV700_streaming".to_string(),
            credentials: TtsCredentials {
                app_key: "app".to_string(),
                access_token: "token".to_string(),
                cluster: "volcano_tts".to_string(),
            },
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = ByteDanceClient::request_body(&request(), "req-1");

        assert_eq!(body["app"]["appid"], "app");
        assert_eq!(body["app"]["token"], "token");
        assert_eq!(body["app"]["cluster"], "volcano_tts");
        assert_eq!(body["audio"]["voice_type"], "BV700_streaming");
        assert_eq!(body["audio"]["encoding"], "mp3");
        assert_eq!(body["request"]["reqid"], "req-1");
        assert_eq!(body["request"]["text"], "Hello there");
        assert_eq!(body["request"]["operation"], "query");
    }

    #[test]
    fn test_parse_success() {
        let reply: ByteDanceResponse = serde_json::from_str(
            r#"{"reqid":"r","code":3000,"message":"Success","sequence":-1,
                "data":"SUQz","addition":{"duration":"1960"}}"#,
        )
        .unwrap();

        let audio = ByteDanceClient::parse_response(reply).unwrap();
        assert_eq!(audio.bytes, b"ID3");
        assert_eq!(audio.duration_ms, Some(1960));
    }

    #[test]
    fn test_parse_provider_error() {
        let reply: ByteDanceResponse =
            serde_json::from_str(r#"{"code":3001,"message":"invalid request"}"#).unwrap();

        match ByteDanceClient::parse_response(reply) {
            Err(Error::Synthesis(msg)) => assert!(msg.contains("invalid request")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_data() {
        let reply: ByteDanceResponse =
            serde_json::from_str(r#"{"code":3000,"message":"Success"}"#).unwrap();
        assert!(ByteDanceClient::parse_response(reply).is_err());
    }

    #[test]
    fn test_parse_bad_base64() {
        let reply: ByteDanceResponse =
            serde_json::from_str(r#"{"code":3000,"data":"***"}"#).unwrap();
        assert!(ByteDanceClient::parse_response(reply).is_err());
    }
}
