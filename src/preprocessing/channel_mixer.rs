//! Channel mixing utilities (multi-channel to mono conversion)

use crate::error::CleanError;

/// Average interleaved multi-channel frames down to mono
///
/// # Arguments
///
/// * `interleaved` - Samples laid out frame by frame (`L R L R ...`)
/// * `channels` - Number of channels per frame
///
/// # Returns
///
/// Mono samples, one per complete frame. A trailing partial frame is dropped.
///
/// # Errors
///
/// Returns `CleanError::InvalidInput` if `channels` is zero.
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Result<Vec<f32>, CleanError> {
    if channels == 0 {
        return Err(CleanError::InvalidInput(
            "Channel count must be at least 1".to_string(),
        ));
    }

    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    log::debug!("Downmixing {} channels to mono", channels);
    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect())
}
