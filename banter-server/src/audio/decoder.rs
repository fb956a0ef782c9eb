//! Audio decoder using symphonia
//!
//! Decodes MP3, WAV, FLAC, AAC/M4A and Vorbis files to interleaved f32 PCM.
//! Container and codec are auto-detected from the extension hint and content.

use crate::audio::types::AudioClip;
use crate::error::{Error, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Simple whole-file audio decoder.
pub struct SimpleDecoder;

impl SimpleDecoder {
    /// Decode a whole clip to interleaved f32 PCM.
    ///
    /// Sample rate and channel count are those of the source; nothing is
    /// resampled or remixed here. The file handle lives only for the
    /// duration of this call.
    ///
    /// # Errors
    /// - File cannot be opened
    /// - Unsupported or unrecognised audio format
    /// - No audio could be decoded
    pub fn decode_file(path: &Path) -> Result<AudioClip> {
        let (mut format, mut decoder, track_id) = Self::open(path)?;
        let params = decoder.codec_params();
        let mut sample_rate = params.sample_rate;
        let mut channels = params.channels.map(|c| c.count() as u16);
        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(e) if is_end_of_stream(&e) => break,
                Err(e) => {
                    // A broken container leaves the clip incomplete; skip it whole
                    return Err(Error::Decode(format!(
                        "Failed reading {}: {}",
                        path.display(),
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    // A corrupt packet is not fatal to the file
                    warn!("Decode error in {}: {}", path.display(), e);
                    continue;
                }
                Err(e) if is_end_of_stream(&e) => break,
                Err(e) => {
                    return Err(Error::Decode(format!(
                        "Failed to decode {}: {}",
                        path.display(),
                        e
                    )))
                }
            };

            let spec = *decoded.spec();
            let buffer_channels = spec.channels.count() as u16;

            if let (Some(rate), Some(ch)) = (sample_rate, channels) {
                if !samples.is_empty() && (rate != spec.rate || ch != buffer_channels) {
                    warn!(
                        "Skipping packet with format change in {} ({}Hz/{}ch -> {}Hz/{}ch)",
                        path.display(),
                        rate,
                        ch,
                        spec.rate,
                        buffer_channels
                    );
                    continue;
                }
            }
            sample_rate = Some(spec.rate);
            channels = Some(buffer_channels);

            // Convert whatever sample type the codec produced to interleaved f32
            let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }

        let (sample_rate, channels) = match (sample_rate, channels) {
            (Some(rate), Some(ch)) if rate > 0 && ch > 0 => (rate, ch),
            _ => return Err(Error::Decode(format!("No sample format in {}", path.display()))),
        };

        if samples.is_empty() {
            return Err(Error::Decode(format!(
                "No audio decoded from {}",
                path.display()
            )));
        }

        let clip = AudioClip::new(samples, sample_rate, channels);

        debug!(
            "Decoded {} frames ({}ms, {}Hz, {}ch)",
            clip.frames(),
            clip.duration_ms(),
            sample_rate,
            channels
        );

        Ok(clip)
    }

    /// Probe the container and build a decoder for its first audio track.
    fn open(path: &Path) -> Result<(Box<dyn FormatReader>, Box<dyn Decoder>, u32)> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Decode(format!("Cannot open {}: {}", path.display(), e)))?;
        let source = MediaSourceStream::new(Box::new(file), Default::default());

        // Extension narrows the probe; content still decides
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let format = symphonia::default::get_probe()
            .format(&hint, source, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| Error::Decode(format!("Unrecognised audio in {}: {}", path.display(), e)))?
            .format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode(format!("No audio track in {}", path.display())))?;
        let track_id = track.id;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("Unsupported codec in {}: {}", path.display(), e)))?;

        debug!("Opened {} (track {})", path.display(), track_id);
        Ok((format, decoder, track_id))
    }

    /// Decode a file and report its duration in milliseconds.
    pub fn probe_duration_ms(path: &Path) -> Result<u64> {
        Self::decode_file(path).map(|clip| clip.duration_ms())
    }
}

/// Symphonia signals a clean end of stream with an EOF I/O error or a reset
fn is_end_of_stream(err: &SymphoniaError) -> bool {
    match err {
        SymphoniaError::IoError(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
        SymphoniaError::ResetRequired => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_end_of_stream_classification() {
        let eof = SymphoniaError::IoError(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
        assert!(is_end_of_stream(&eof));
        assert!(is_end_of_stream(&SymphoniaError::ResetRequired));

        let broken = SymphoniaError::IoError(std::io::Error::new(std::io::ErrorKind::Other, "bad sector"));
        assert!(!is_end_of_stream(&broken));
        assert!(!is_end_of_stream(&SymphoniaError::DecodeError("bad frame")));
        assert!(!is_end_of_stream(&SymphoniaError::Unsupported("codec")));
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let result = SimpleDecoder::decode_file(Path::new("/nonexistent/clip.mp3"));
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.mp3");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"this is definitely not audio data").unwrap();
        drop(file);

        let result = SimpleDecoder::decode_file(&path);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    // Decoding real files is covered by tests/decoder_tests.rs with generated WAV fixtures
}
