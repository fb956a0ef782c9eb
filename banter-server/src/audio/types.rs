//! Core audio data types
//!
//! **Format:**
//! - Samples are f32 (floating point -1.0 to 1.0)
//! - Interleaved by frame: [L, R, L, R, ...] for stereo, [M, M, ...] for mono

use crate::error::{Error, Result};

/// Sample rate and channel count of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Number of whole frames in `ms` milliseconds at this sample rate
    ///
    /// # Errors
    /// The frame count does not fit in `usize`
    pub fn frames_for_ms(&self, ms: u64) -> Result<usize> {
        ms.checked_mul(self.sample_rate as u64)
            .map(|n| n / 1000)
            .and_then(|frames| usize::try_from(frames).ok())
            .ok_or_else(|| {
                Error::InvalidInput(format!("{}ms at {}Hz is too long", ms, self.sample_rate))
            })
    }

    /// Number of interleaved samples in `frames` frames
    fn samples_for_frames(&self, frames: usize) -> Result<usize> {
        frames
            .checked_mul(self.channels as usize)
            .ok_or_else(|| Error::InvalidInput(format!("{} frames is too long", frames)))
    }
}

/// One decoded input file.
///
/// Created by decoding an input path, consumed by the merge step.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// PCM audio samples (interleaved)
    pub samples: Vec<f32>,

    /// Native sample rate of the source
    pub sample_rate: u32,

    /// Native channel count of the source
    pub channels: u16,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn format(&self) -> AudioFormat {
        AudioFormat::new(self.sample_rate, self.channels)
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Get duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frames() as u64 * 1000) / self.sample_rate as u64
    }
}

/// Accumulating output of a merge: clips and silence gaps in playback order.
#[derive(Debug, Clone)]
pub struct Track {
    format: AudioFormat,
    samples: Vec<f32>,
}

impl Track {
    /// Create an empty track in the given format
    pub fn new(format: AudioFormat) -> Self {
        Self {
            format,
            samples: Vec::new(),
        }
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Reserve capacity for expected total frames
    ///
    /// Allocation failure is reported instead of aborting the process.
    pub fn reserve_frames(&mut self, frames: usize) -> Result<()> {
        let additional = self.format.samples_for_frames(frames)?;
        self.samples.try_reserve(additional).map_err(|e| {
            Error::Format(format!("Cannot allocate {} frames: {}", frames, e))
        })
    }

    /// Append a clip already conformed to the track format.
    ///
    /// # Errors
    /// The clip format differs from the track format.
    pub fn append_clip(&mut self, clip: &AudioClip) -> Result<()> {
        if clip.format() != self.format {
            return Err(Error::Format(format!(
                "clip is {}Hz/{}ch, track is {}Hz/{}ch",
                clip.sample_rate, clip.channels, self.format.sample_rate, self.format.channels
            )));
        }
        self.reserve_frames(clip.frames())?;
        self.samples.extend_from_slice(&clip.samples);
        Ok(())
    }

    /// Append `ms` milliseconds of zero-amplitude silence
    pub fn append_silence(&mut self, ms: u64) -> Result<()> {
        let frames = self.format.frames_for_ms(ms)?;
        self.reserve_frames(frames)?;
        let added = self.format.samples_for_frames(frames)?;
        self.samples.resize(self.samples.len() + added, 0.0);
        Ok(())
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.format.channels as usize
    }

    /// Get duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        (self.frames() as u64 * 1000) / self.format.sample_rate as u64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
