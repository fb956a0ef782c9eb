//! MP3 encoding using LAME (mp3lame-encoder)
//!
//! Export format is fixed: MP3 at [`EXPORT_BITRATE_KBPS`] kbps. The decoded
//! sample rate and channel count are passed straight to the encoder.

use crate::audio::types::Track;
use crate::error::{Error, Result};
use mp3lame_encoder::{max_required_buffer_size, Bitrate, Builder, FlushNoGap, InterleavedPcm, MonoPcm};
use std::path::Path;
use tracing::debug;

/// Export bitrate in kbps
pub const EXPORT_BITRATE_KBPS: u32 = 192;

/// LAME setting matching [`EXPORT_BITRATE_KBPS`]
const EXPORT_BITRATE: Bitrate = Bitrate::Kbps192;

/// Frames handed to LAME per encode call
const ENCODE_CHUNK_FRAMES: usize = 1152 * 32;

/// Bytes LAME may emit on flush
const FLUSH_BUFFER_BYTES: usize = 7200;

/// MP3 encoder for merged tracks.
pub struct Mp3Encoder;

impl Mp3Encoder {
    /// Encode a whole track to MP3 bytes.
    pub fn encode_track(track: &Track) -> Result<Vec<u8>> {
        let format = track.format();
        let channels = format.channels;

        if channels == 0 || channels > 2 {
            return Err(Error::Encode(format!(
                "MP3 supports 1 or 2 channels, track has {}",
                channels
            )));
        }

        let mut builder =
            Builder::new().ok_or_else(|| Error::Encode("Failed to create LAME encoder".to_string()))?;
        builder
            .set_num_channels(channels as u8)
            .map_err(|e| Error::Encode(format!("Failed to set channels: {:?}", e)))?;
        builder
            .set_sample_rate(format.sample_rate)
            .map_err(|e| Error::Encode(format!("Failed to set sample rate {}: {:?}", format.sample_rate, e)))?;
        builder
            .set_brate(EXPORT_BITRATE)
            .map_err(|e| Error::Encode(format!("Failed to set bitrate: {:?}", e)))?;
        let mut encoder = builder
            .build()
            .map_err(|e| Error::Encode(format!("Failed to initialize LAME: {:?}", e)))?;

        let pcm = to_i16(track.samples());
        let mut mp3 = Vec::with_capacity(estimated_size(track.duration_ms()));

        for chunk in pcm.chunks(ENCODE_CHUNK_FRAMES * channels as usize) {
            let frames = chunk.len() / channels as usize;
            mp3.reserve(max_required_buffer_size(frames));

            let written = if channels == 1 {
                encoder.encode_to_vec(MonoPcm(chunk), &mut mp3)
            } else {
                encoder.encode_to_vec(InterleavedPcm(chunk), &mut mp3)
            }
            .map_err(|e| Error::Encode(format!("Encoding failed: {:?}", e)))?;

            debug!("Encoded {} frames into {} bytes", frames, written);
        }

        mp3.reserve(FLUSH_BUFFER_BYTES);
        encoder
            .flush_to_vec::<FlushNoGap>(&mut mp3)
            .map_err(|e| Error::Encode(format!("Flush failed: {:?}", e)))?;

        Ok(mp3)
    }

    /// Encode a track and write it to `path` in one write.
    ///
    /// Encoding finishes before the file is touched, so an encoder failure
    /// never leaves a partial file behind.
    pub fn write_track(track: &Track, path: &Path) -> Result<usize> {
        let mp3 = Self::encode_track(track)?;
        std::fs::write(path, &mp3)?;
        Ok(mp3.len())
    }
}

/// Quantise f32 [-1.0, 1.0] samples to i16, clamping out-of-range values
fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

/// Expected encoded size for a constant-bitrate stream, plus frame slack
fn estimated_size(duration_ms: u64) -> usize {
    (duration_ms as usize * EXPORT_BITRATE_KBPS as usize / 8) + FLUSH_BUFFER_BYTES
}
