//! Clip fixture generator
//!
//! Writes short sine-tone clips as WAV (via hound) or MP3 (via the crate's
//! own encoder) so tests never depend on checked-in audio.

use banter_server::audio::{AudioClip, AudioFormat, Mp3Encoder, Track};
use std::path::{Path, PathBuf};

/// Shape of a generated clip
#[derive(Debug, Clone)]
pub struct ToneConfig {
    pub duration_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub frequency: f32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            duration_ms: 500,
            sample_rate: 44100,
            channels: 2,
            frequency: 440.0,
        }
    }
}

impl ToneConfig {
    pub fn ms(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    fn frames(&self) -> usize {
        AudioFormat::new(self.sample_rate, self.channels)
            .frames_for_ms(self.duration_ms)
            .expect("fixture duration fits in memory")
    }

    fn sample_at(&self, frame: usize) -> f32 {
        let t = frame as f32 / self.sample_rate as f32;
        0.3 * (2.0 * std::f32::consts::PI * self.frequency * t).sin()
    }
}

/// Write a 16-bit PCM WAV tone
pub fn generate_test_wav(path: &Path, config: &ToneConfig) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for frame in 0..config.frames() {
        let sample = (config.sample_at(frame) * i16::MAX as f32) as i16;
        for _ in 0..config.channels {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()?;

    Ok(path.to_path_buf())
}

/// Write an MP3 tone
pub fn generate_test_mp3(path: &Path, config: &ToneConfig) -> anyhow::Result<PathBuf> {
    let mp3 = encode_tone(config)?;
    std::fs::write(path, mp3)?;
    Ok(path.to_path_buf())
}

/// Encode a tone to MP3 bytes
pub fn encode_tone(config: &ToneConfig) -> anyhow::Result<Vec<u8>> {
    let format = AudioFormat::new(config.sample_rate, config.channels);
    let mut samples = Vec::with_capacity(config.frames() * config.channels as usize);
    for frame in 0..config.frames() {
        let sample = config.sample_at(frame);
        for _ in 0..config.channels {
            samples.push(sample);
        }
    }

    let mut track = Track::new(format);
    track.append_clip(&AudioClip::new(samples, config.sample_rate, config.channels))?;
    Ok(Mp3Encoder::encode_track(&track)?)
}

/// Write bytes that carry an audio extension but no audio
pub fn write_corrupt_file(path: &Path) -> anyhow::Result<PathBuf> {
    std::fs::write(path, b"not audio at all, just text pretending")?;
    Ok(path.to_path_buf())
}
