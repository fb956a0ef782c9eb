//! Bring clips of differing formats into one track format
//!
//! The track format is the highest sample rate and the highest channel count
//! among the clips, with channels capped at [`MAX_TRACK_CHANNELS`].

use crate::audio::resampler::resample_interleaved;
use crate::audio::types::{AudioClip, AudioFormat};
use crate::error::Result;
use tracing::debug;

/// Upper channel bound for a track (MP3 carries at most stereo)
pub const MAX_TRACK_CHANNELS: u16 = 2;

/// Pick the format every clip will be converted to.
///
/// Returns `None` for an empty clip list.
pub fn track_format<'a, I>(clips: I) -> Option<AudioFormat>
where
    I: IntoIterator<Item = &'a AudioClip>,
{
    clips.into_iter().fold(None, |acc: Option<AudioFormat>, clip| {
        let channels = clip.channels.min(MAX_TRACK_CHANNELS);
        Some(match acc {
            None => AudioFormat::new(clip.sample_rate, channels),
            Some(f) => AudioFormat::new(f.sample_rate.max(clip.sample_rate), f.channels.max(channels)),
        })
    })
}

/// Convert a clip to `target`. Clips already in the target format pass through.
pub fn conform(clip: AudioClip, target: AudioFormat) -> Result<AudioClip> {
    if clip.format() == target {
        return Ok(clip);
    }

    debug!(
        "Conforming clip {}Hz/{}ch -> {}Hz/{}ch",
        clip.sample_rate, clip.channels, target.sample_rate, target.channels
    );

    let samples = remap_channels(&clip.samples, clip.channels, target.channels);
    let samples = resample_interleaved(&samples, target.channels, clip.sample_rate, target.sample_rate)?;

    Ok(AudioClip::new(samples, target.sample_rate, target.channels))
}

/// Change the channel layout of interleaved samples.
///
/// - same count: copy
/// - mono -> N: duplicate the single channel
/// - N -> mono: average all channels
/// - N -> stereo (N > 2): even-indexed channels fold into left, odd into right
fn remap_channels(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    let from = from as usize;
    let to = to as usize;

    if from == to {
        return samples.to_vec();
    }

    let frames = samples.len() / from;
    let mut output = Vec::with_capacity(frames * to);

    for frame in samples.chunks_exact(from) {
        if from == 1 {
            output.extend(std::iter::repeat(frame[0]).take(to));
        } else if to == 1 {
            output.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            for out_ch in 0..to {
                let (sum, count) = frame
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| idx % to == out_ch)
                    .fold((0.0f32, 0usize), |(s, c), (_, &v)| (s + v, c + 1));
                output.push(if count > 0 { sum / count as f32 } else { 0.0 });
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_to_stereo() {
        let out = remap_channels(&[0.1, 0.2, 0.3], 1, 2);
        assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
    }

    #[test]
    fn test_stereo_to_mono() {
        let out = remap_channels(&[0.2, 0.4, -0.2, 0.2], 2, 1);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.3).abs() < 1e-6);
        assert!(out[1].abs() < 1e-6);
    }

    #[test]
    fn test_quad_folds_to_stereo() {
        // FL, FR, RL, RR
        let out = remap_channels(&[0.2, 0.4, 0.6, 0.8], 4, 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.4).abs() < 1e-6);
        assert!((out[1] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_track_format_takes_maximum() {
        let clips = vec![
            AudioClip::new(vec![0.0; 10], 22050, 1),
            AudioClip::new(vec![0.0; 20], 44100, 2),
            AudioClip::new(vec![0.0; 60], 16000, 6),
        ];
        let format = track_format(&clips).unwrap();
        assert_eq!(format, AudioFormat::new(44100, 2));
    }

    #[test]
    fn test_track_format_empty() {
        let clips: Vec<AudioClip> = Vec::new();
        assert!(track_format(&clips).is_none());
    }

    #[test]
    fn test_conform_passthrough() {
        let clip = AudioClip::new(vec![0.5, -0.5], 44100, 2);
        let out = conform(clip, AudioFormat::new(44100, 2)).unwrap();
        assert_eq!(out.samples, vec![0.5, -0.5]);
    }

    #[test]
    fn test_conform_channels_only() {
        let clip = AudioClip::new(vec![0.5, -0.5], 44100, 1);
        let out = conform(clip, AudioFormat::new(44100, 2)).unwrap();
        assert_eq!(out.channels, 2);
        assert_eq!(out.samples, vec![0.5, 0.5, -0.5, -0.5]);
    }
}
