//! Audio merge pipeline
//!
//! Concatenates an ordered list of audio files into one MP3, inserting a fixed
//! silence gap after each included clip except the one at the final list
//! position.
//!
//! Per-file problems (missing, undecodable) are recorded as [`InputOutcome`]s
//! and never abort the batch. Only infrastructure failures (directory
//! creation, encoding, writing) are returned as errors.

use crate::audio::conform::{conform, track_format};
use crate::audio::{AudioClip, Mp3Encoder, SimpleDecoder, Track};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Gap inserted between clips when the caller does not specify one
pub const DEFAULT_GAP_MS: u64 = 500;

/// Longest gap accepted between clips (one minute)
pub const MAX_GAP_MS: u64 = 60_000;

/// One merge invocation's arguments
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Input files in playback order
    pub inputs: Vec<PathBuf>,
    /// Destination MP3; parent directories are created as needed
    pub output: PathBuf,
    /// Silence between clips, in milliseconds
    pub gap_ms: u64,
}

impl MergeRequest {
    pub fn new(inputs: Vec<PathBuf>, output: impl Into<PathBuf>, gap_ms: u64) -> Self {
        Self {
            inputs,
            output: output.into(),
            gap_ms,
        }
    }
}

/// Why an input position contributed nothing to the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Path does not reference an existing file
    Missing,
    /// File exists but could not be decoded
    Undecodable(String),
}

/// Result of processing one input position
#[derive(Debug)]
pub enum InputOutcome {
    Included { position: usize, clip: AudioClip },
    Skipped {
        position: usize,
        path: PathBuf,
        reason: SkipReason,
    },
}

/// An input that was left out of the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    pub position: usize,
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Aggregate outcome of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    /// Number of inputs decoded and written to the output
    pub included: usize,
    /// Inputs left out, in list order
    pub skipped: Vec<SkippedInput>,
    /// Duration of the written track (0 when nothing was written)
    pub duration_ms: u64,
}

impl MergeSummary {
    /// True iff at least one input made it into the output
    pub fn success(&self) -> bool {
        self.included > 0
    }
}

/// Audio merge pipeline.
pub struct AudioMerger;

impl AudioMerger {
    /// Merge `request.inputs` into `request.output`.
    ///
    /// Returns a summary with `included == 0` (and writes nothing) when no
    /// input could be used.
    ///
    /// # Errors
    /// - Output path is empty
    /// - Gap longer than [`MAX_GAP_MS`]
    /// - Output directory cannot be created
    /// - Encoding or writing the output fails
    pub fn merge(request: &MergeRequest) -> Result<MergeSummary> {
        if request.output.as_os_str().is_empty() {
            return Err(Error::InvalidInput("Output path is empty".to_string()));
        }
        check_gap(request.gap_ms)?;

        info!(
            "Merging {} files into {} (gap {}ms)",
            request.inputs.len(),
            request.output.display(),
            request.gap_ms
        );

        let outcomes = Self::collect_inputs(&request.inputs);
        let (clips, skipped) = Self::partition(outcomes);

        if clips.is_empty() {
            warn!("No valid audio files to merge");
            return Ok(MergeSummary {
                included: 0,
                skipped,
                duration_ms: 0,
            });
        }

        let included = clips.len();
        let track = Self::assemble(clips, request.inputs.len(), request.gap_ms)?;

        if let Some(parent) = request.output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Exporting to {}", request.output.display());
        let bytes = Mp3Encoder::write_track(&track, &request.output)?;

        info!(
            "Exported {} of {} files ({}ms, {} bytes) to {}",
            included,
            request.inputs.len(),
            track.duration_ms(),
            bytes,
            request.output.display()
        );

        Ok(MergeSummary {
            included,
            skipped,
            duration_ms: track.duration_ms(),
        })
    }

    /// Decode each input once, in order, recording what happened.
    pub fn collect_inputs(inputs: &[PathBuf]) -> Vec<InputOutcome> {
        inputs
            .iter()
            .enumerate()
            .map(|(position, path)| Self::load_input(position, path))
            .collect()
    }

    fn load_input(position: usize, path: &Path) -> InputOutcome {
        if !path.is_file() {
            warn!("File not found, skipping: {}", path.display());
            return InputOutcome::Skipped {
                position,
                path: path.to_path_buf(),
                reason: SkipReason::Missing,
            };
        }

        match SimpleDecoder::decode_file(path) {
            Ok(clip) => {
                debug!("Loaded #{} {} ({}ms)", position, path.display(), clip.duration_ms());
                InputOutcome::Included { position, clip }
            }
            Err(e) => {
                warn!("Error loading {}: {}", path.display(), e);
                InputOutcome::Skipped {
                    position,
                    path: path.to_path_buf(),
                    reason: SkipReason::Undecodable(e.to_string()),
                }
            }
        }
    }

    /// Split outcomes into positioned clips and skip records, keeping order.
    fn partition(outcomes: Vec<InputOutcome>) -> (Vec<(usize, AudioClip)>, Vec<SkippedInput>) {
        let mut clips = Vec::new();
        let mut skipped = Vec::new();

        for outcome in outcomes {
            match outcome {
                InputOutcome::Included { position, clip } => clips.push((position, clip)),
                InputOutcome::Skipped {
                    position,
                    path,
                    reason,
                } => skipped.push(SkippedInput {
                    position,
                    path,
                    reason,
                }),
            }
        }

        (clips, skipped)
    }

    /// Build the output track from positioned clips.
    ///
    /// A gap follows each clip unless the clip sits at the last position of
    /// the original input list (`input_count - 1`). Skipped positions add
    /// nothing, so a skipped final input leaves a trailing gap.
    pub fn assemble(clips: Vec<(usize, AudioClip)>, input_count: usize, gap_ms: u64) -> Result<Track> {
        check_gap(gap_ms)?;
        let format = track_format(clips.iter().map(|(_, clip)| clip))
            .ok_or_else(|| Error::InvalidInput("No clips to assemble".to_string()))?;

        let mut track = Track::new(format);
        let clip_frames: usize = clips.iter().map(|(_, clip)| clip.frames()).sum();
        let gap_frames = format.frames_for_ms(gap_ms)?;
        let total = gap_frames
            .checked_mul(clips.len())
            .and_then(|gaps| gaps.checked_add(clip_frames))
            .ok_or_else(|| Error::InvalidInput("Merged track is too long".to_string()))?;
        track.reserve_frames(total)?;

        let last_position = input_count.saturating_sub(1);

        for (position, clip) in clips {
            let clip = conform(clip, format)?;
            track.append_clip(&clip)?;

            if position != last_position {
                track.append_silence(gap_ms)?;
            }
        }

        Ok(track)
    }
}

fn check_gap(gap_ms: u64) -> Result<()> {
    if gap_ms > MAX_GAP_MS {
        return Err(Error::InvalidInput(format!(
            "gap_ms {} exceeds the maximum of {}",
            gap_ms, MAX_GAP_MS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFormat;

    fn clip(ms: u64) -> AudioClip {
        let format = AudioFormat::new(1000, 1);
        AudioClip::new(vec![0.5; format.frames_for_ms(ms).unwrap()], 1000, 1)
    }

    #[test]
    fn test_gap_between_consecutive_clips() {
        let track = AudioMerger::assemble(vec![(0, clip(500)), (1, clip(700))], 2, 300).unwrap();
        assert_eq!(track.duration_ms(), 1500);
    }

    #[test]
    fn test_skipped_middle_adds_no_gap() {
        // Positions 0 and 2 of 3: one gap after position 0, none after the last
        let track = AudioMerger::assemble(vec![(0, clip(100)), (2, clip(100))], 3, 200).unwrap();
        assert_eq!(track.duration_ms(), 400);
    }

    #[test]
    fn test_skipped_last_leaves_trailing_gap() {
        let track = AudioMerger::assemble(vec![(0, clip(100)), (1, clip(100))], 3, 50).unwrap();
        assert_eq!(track.duration_ms(), 300);
        // Trailing samples are silence
        assert!(track.samples()[250..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_single_clip_no_gap() {
        let track = AudioMerger::assemble(vec![(0, clip(250))], 1, 1000).unwrap();
        assert_eq!(track.duration_ms(), 250);
    }

    #[test]
    fn test_order_preserved() {
        let a = AudioClip::new(vec![0.1, 0.1], 1000, 1);
        let b = AudioClip::new(vec![0.9, 0.9], 1000, 1);
        let track = AudioMerger::assemble(vec![(0, a), (1, b)], 2, 0).unwrap();
        assert_eq!(track.samples(), &[0.1, 0.1, 0.9, 0.9]);
    }

    #[test]
    fn test_oversized_gap_is_rejected() {
        for gap_ms in [MAX_GAP_MS + 1, 1_000_000_000_000, u64::MAX] {
            let result = AudioMerger::assemble(vec![(0, clip(100))], 2, gap_ms);
            assert!(matches!(result, Err(Error::InvalidInput(_))), "gap {}", gap_ms);
        }
    }

    #[test]
    fn test_maximum_gap_is_accepted() {
        let track = AudioMerger::assemble(vec![(0, clip(100))], 2, MAX_GAP_MS).unwrap();
        assert_eq!(track.duration_ms(), 100 + MAX_GAP_MS);
    }

    #[test]
    fn test_oversized_gap_fails_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("full.mp3");
        let request = MergeRequest::new(vec![PathBuf::from("/nonexistent/a.mp3")], &output, u64::MAX);

        assert!(matches!(AudioMerger::merge(&request), Err(Error::InvalidInput(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_assemble_empty_is_error() {
        assert!(AudioMerger::assemble(Vec::new(), 0, 100).is_err());
    }

    #[test]
    fn test_summary_success_iff_included() {
        let summary = MergeSummary {
            included: 0,
            skipped: Vec::new(),
            duration_ms: 0,
        };
        assert!(!summary.success());

        let summary = MergeSummary {
            included: 1,
            ..summary
        };
        assert!(summary.success());
    }

    #[test]
    fn test_empty_input_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("full.mp3");

        let summary = AudioMerger::merge(&MergeRequest::new(Vec::new(), &output, 300)).unwrap();

        assert!(!summary.success());
        assert!(!output.exists());
        assert!(!output.parent().unwrap().exists());
    }

    #[test]
    fn test_empty_output_path_is_invalid() {
        let result = AudioMerger::merge(&MergeRequest::new(Vec::new(), "", 300));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_missing_inputs_are_recorded() {
        let outcomes = AudioMerger::collect_inputs(&[PathBuf::from("/nonexistent/a.mp3")]);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            &outcomes[0],
            InputOutcome::Skipped {
                position: 0,
                reason: SkipReason::Missing,
                ..
            }
        ));
    }
}
