//! POST /api/generate
//!
//! Synthesizes one bubble's speech and stores it as
//! `<project>/audio/<bubble_id>.mp3`.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::audio::SimpleDecoder;
use crate::error::{ApiError, ApiResult, Error};
use crate::tts::{SynthesisRequest, TtsCredentials};
use crate::AppState;

/// Generate request body
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    /// Provider voice identifier
    pub speaker: String,
    #[serde(default)]
    pub project_path: String,
    pub bubble_id: String,
    #[serde(default)]
    pub app_key: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub audio_path: String,
    /// Seconds; 0 when the duration could not be determined
    pub duration: f64,
}

/// A bubble id becomes a file stem, so it must not name a directory
fn validate_bubble_id(bubble_id: &str) -> ApiResult<()> {
    let trimmed = bubble_id.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
        || trimmed.contains('\0')
    {
        return Err(ApiError::BadRequest(format!("Invalid bubble_id: {:?}", bubble_id)));
    }
    Ok(())
}

pub async fn generate_audio(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    validate_bubble_id(&req.bubble_id)?;

    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text is required".to_string()));
    }

    let credentials = TtsCredentials::resolve(req.app_key, req.access_token, &state.config.tts)?;

    let project = if req.project_path.trim().is_empty() {
        state.config.projects_dir.clone()
    } else {
        PathBuf::from(req.project_path.trim())
    };
    let audio_dir = project.join("audio");
    let output = audio_dir.join(format!("{}.mp3", req.bubble_id.trim()));

    let request = SynthesisRequest {
        text: req.text,
        speaker: req.speaker,
        credentials,
    };

    let audio = state.synthesizer.synthesize(&request).await.map_err(|e| {
        error!("Speech synthesis failed for {}: {}", req.bubble_id, e);
        ApiError::from(e)
    })?;

    tokio::fs::create_dir_all(&audio_dir)
        .await
        .map_err(|e| ApiError::from(Error::Io(e)))?;
    tokio::fs::write(&output, &audio.bytes).await.map_err(|e| {
        error!("Failed to write {}: {}", output.display(), e);
        ApiError::from(Error::Io(e))
    })?;

    let duration_ms = match audio.duration_ms {
        Some(ms) => ms,
        None => {
            let path = output.clone();
            match tokio::task::spawn_blocking(move || SimpleDecoder::probe_duration_ms(&path)).await {
                Ok(Ok(ms)) => ms,
                Ok(Err(e)) => {
                    warn!("Could not measure {}: {}", output.display(), e);
                    0
                }
                Err(e) => {
                    warn!("Duration probe task failed: {}", e);
                    0
                }
            }
        }
    };

    info!(
        "Generated {} ({} bytes, {}ms)",
        output.display(),
        audio.bytes.len(),
        duration_ms
    );

    Ok(Json(GenerateResponse {
        success: true,
        audio_path: output.to_string_lossy().into_owned(),
        duration: duration_ms as f64 / 1000.0,
    }))
}
