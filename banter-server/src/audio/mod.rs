//! Audio processing: decode, conform, encode
//!
//! **Architecture:** symphonia (decode) + rubato (resample) + LAME (encode)

pub mod conform;
pub mod decoder;
pub mod encoder;
pub mod resampler;
pub mod types;

pub use decoder::SimpleDecoder;
pub use encoder::{Mp3Encoder, EXPORT_BITRATE_KBPS};
pub use types::{AudioClip, AudioFormat, Track};
