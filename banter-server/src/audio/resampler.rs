//! Sample-rate conversion for clips joining a track
//!
//! Clips are short (one speech bubble), so each one is converted in a single
//! rubato pass rather than streamed in chunks.

use crate::error::{Error, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler as _};
use tracing::debug;

/// Convert interleaved `samples` with `channels` channels from `from_rate` to `to_rate`.
///
/// Equal rates return the input unchanged.
pub fn resample_interleaved(
    samples: &[f32],
    channels: u16,
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }
    if channels == 0 || from_rate == 0 || to_rate == 0 {
        return Err(Error::Resample(format!(
            "cannot convert {}Hz -> {}Hz with {} channels",
            from_rate, to_rate, channels
        )));
    }

    let planes = split_channels(samples, channels as usize);
    let frames = planes.first().map_or(0, Vec::len);
    if frames == 0 {
        return Ok(Vec::new());
    }

    let mut converter = FastFixedIn::<f32>::new(
        to_rate as f64 / from_rate as f64,
        1.0,
        PolynomialDegree::Septic,
        frames,
        planes.len(),
    )
    .map_err(|e| Error::Resample(e.to_string()))?;

    let converted = converter
        .process(&planes, None)
        .map_err(|e| Error::Resample(e.to_string()))?;

    let out = join_channels(&converted);
    debug!(
        "{}Hz -> {}Hz: {} frames became {}",
        from_rate,
        to_rate,
        frames,
        out.len() / planes.len()
    );
    Ok(out)
}

/// Interleaved -> one Vec per channel (rubato works on planar data)
fn split_channels(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    (0..channels)
        .map(|ch| samples.iter().skip(ch).step_by(channels).copied().collect())
        .collect()
}

/// One Vec per channel -> interleaved; stops at the shortest plane
fn join_channels(planes: &[Vec<f32>]) -> Vec<f32> {
    let frames = planes.iter().map(Vec::len).min().unwrap_or(0);
    (0..frames)
        .flat_map(|frame| planes.iter().map(move |plane| plane[frame]))
        .collect()
}
