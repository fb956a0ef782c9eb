//! POST /api/export/audio
//!
//! Merges the listed clips into one MP3. The merge is CPU bound and runs on
//! the blocking pool.

use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::export::{AudioMerger, MergeRequest, DEFAULT_GAP_MS};

/// Export request body
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    /// Base directory for relative paths (may be empty)
    #[serde(default)]
    pub project_path: String,
    /// Clip paths in playback order
    pub audio_files: Vec<String>,
    pub output_path: String,
    #[serde(default = "default_gap_ms")]
    pub gap_ms: u64,
}

fn default_gap_ms() -> u64 {
    DEFAULT_GAP_MS
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub success: bool,
    pub output_path: String,
    /// Number of clips written to the output
    pub count: usize,
}

/// Resolve `path` against `base` unless it is already absolute
fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() || base.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub async fn export_audio(Json(req): Json<ExportRequest>) -> ApiResult<Json<ExportResponse>> {
    if req.output_path.trim().is_empty() {
        return Err(ApiError::BadRequest("output_path is required".to_string()));
    }

    let base = PathBuf::from(req.project_path.trim());
    let inputs: Vec<PathBuf> = req
        .audio_files
        .iter()
        .map(|p| resolve_path(&base, p))
        .collect();
    let output = resolve_path(&base, req.output_path.trim());

    info!("Export requested: {} files -> {}", inputs.len(), output.display());

    let request = MergeRequest::new(inputs, output.clone(), req.gap_ms);
    let summary = tokio::task::spawn_blocking(move || AudioMerger::merge(&request))
        .await
        .map_err(|e| {
            error!("Export task failed: {}", e);
            ApiError::Internal(format!("Export task failed: {}", e))
        })?
        .map_err(|e| {
            error!("Export failed: {}", e);
            ApiError::from(e)
        })?;

    if !summary.success() {
        return Err(ApiError::BadRequest("No valid audio files to merge".to_string()));
    }

    Ok(Json(ExportResponse {
        success: true,
        output_path: output.to_string_lossy().into_owned(),
        count: summary.included,
    }))
}
