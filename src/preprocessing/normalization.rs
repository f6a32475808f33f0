//! Peak normalization
//!
//! Applies one global gain so the loudest sample lands `headroom_db` below
//! full scale. No perceptual loudness modelling is done.
//!
//! # Example
//!
//! ```
//! use clean_audio::preprocessing::normalization::normalize;
//! use clean_audio::{SampleFormat, Waveform};
//!
//! let wave = Waveform::new(vec![1000.0, -2000.0, 500.0], 8000, SampleFormat::Int(16))?;
//! let (louder, metadata) = normalize(&wave, 1.0)?;
//!
//! assert!(metadata.gain_db > 0.0);
//! assert!(louder.peak() <= 32768.0);
//! # Ok::<(), clean_audio::CleanError>(())
//! ```

use crate::error::CleanError;
use crate::preprocessing::energy::{db_to_ratio, ratio_to_db, rms};
use crate::waveform::Waveform;
use serde::Serialize;

/// Loudness information returned from normalization
#[derive(Debug, Clone, Serialize)]
pub struct LoudnessMetadata {
    /// Peak level in dBFS (before normalization)
    pub peak_db: f32,
    /// RMS level in dBFS (before normalization)
    pub rms_db: f32,
    /// Gain applied in dB
    pub gain_db: f32,
}

impl Default for LoudnessMetadata {
    fn default() -> Self {
        Self {
            peak_db: f32::NEG_INFINITY,
            rms_db: f32::NEG_INFINITY,
            gain_db: 0.0,
        }
    }
}

/// Numerical stability epsilon, relative to full scale
const EPSILON: f32 = 1e-10;

/// Normalize a clip by its peak
///
/// # Arguments
///
/// * `waveform` - Clip to normalize (not modified)
/// * `headroom_db` - Margin below full scale for the new peak (>= 0)
///
/// # Returns
///
/// The rescaled clip and `LoudnessMetadata` describing the input and the
/// gain applied. Empty or silent clips are returned unchanged with zero gain.
///
/// # Errors
///
/// Returns `CleanError::InvalidInput` if `headroom_db` is negative or not finite.
pub fn normalize(waveform: &Waveform, headroom_db: f32) -> Result<(Waveform, LoudnessMetadata), CleanError> {
    if !headroom_db.is_finite() || headroom_db < 0.0 {
        return Err(CleanError::InvalidInput(format!(
            "Headroom must be a non-negative dB value, got {}",
            headroom_db
        )));
    }

    let full_scale = waveform.max_possible_amplitude();
    let peak = waveform.peak();

    if peak <= EPSILON * full_scale {
        log::warn!("Audio is silent or extremely quiet, cannot normalize");
        return Ok((waveform.clone(), LoudnessMetadata::default()));
    }

    let peak_db = ratio_to_db(peak / full_scale);
    let rms_db = ratio_to_db(rms(waveform.samples()) / full_scale);

    // Target peak sits headroom_db below 0 dBFS; never push past full scale
    let target_peak = full_scale * db_to_ratio(-headroom_db);
    let gain_linear = (target_peak / peak).min(full_scale / peak);
    let gain_db = ratio_to_db(gain_linear);

    let samples = waveform.samples().iter().map(|&x| x * gain_linear).collect();

    log::debug!(
        "Peak normalization: peak={:.2} dB, gain={:.2} dB",
        peak_db,
        gain_db
    );

    Ok((
        waveform.with_samples(samples),
        LoudnessMetadata {
            peak_db,
            rms_db,
            gain_db,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::SampleFormat;

    /// Generate a test signal: sine wave at 440 Hz in 16-bit scale
    fn generate_test_signal(length: usize, amplitude: f32, sample_rate: u32) -> Waveform {
        let freq = 440.0;
        let samples = (0..length)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                amplitude * 32768.0 * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect();
        Waveform::new(samples, sample_rate, SampleFormat::Int(16)).unwrap()
    }

    #[test]
    fn test_peak_normalization() {
        let wave = generate_test_signal(44100, 0.25, 44100);

        let (normalized, metadata) = normalize(&wave, 1.0).unwrap();

        let target_peak = 32768.0 * 10.0_f32.powf(-1.0 / 20.0);
        let new_peak = normalized.peak();
        assert!(
            (new_peak - target_peak).abs() < 1.0,
            "Peak normalization failed: expected ~{:.1}, got {:.1}",
            target_peak,
            new_peak
        );
        assert!((metadata.peak_db - ratio_to_db(0.25)).abs() < 0.05);
        assert!(metadata.gain_db > 10.0 && metadata.gain_db < 11.5);

        // Input untouched
        assert!((wave.peak() - 0.25 * 32768.0).abs() < 1.0);
    }

    #[test]
    fn test_attenuates_hot_signal() {
        // Zero headroom on a signal already at full scale leaves it unchanged
        let wave = Waveform::new(vec![32768.0, -16384.0], 8000, SampleFormat::Int(16)).unwrap();
        let (normalized, metadata) = normalize(&wave, 0.0).unwrap();
        assert_eq!(normalized.samples(), wave.samples());
        assert!(metadata.gain_db.abs() < 1e-4);

        let (normalized, metadata) = normalize(&wave, 6.0).unwrap();
        assert!(metadata.gain_db < 0.0);
        assert!(normalized.peak() < 32768.0 * 0.51);
    }

    #[test]
    fn test_silent_audio() {
        let wave = Waveform::new(vec![0.0; 4410], 44100, SampleFormat::Int(16)).unwrap();

        let (normalized, metadata) = normalize(&wave, 0.3).unwrap();
        assert_eq!(metadata.gain_db, 0.0, "Silent audio should not apply gain");
        assert_eq!(metadata.peak_db, f32::NEG_INFINITY);
        assert_eq!(normalized, wave);
    }

    #[test]
    fn test_empty_samples() {
        let wave = Waveform::new(vec![], 44100, SampleFormat::Int(16)).unwrap();
        let (normalized, _) = normalize(&wave, 0.3).unwrap();
        assert!(normalized.is_empty());
    }

    #[test]
    fn test_invalid_headroom() {
        let wave = generate_test_signal(100, 0.5, 8000);
        assert!(normalize(&wave, -1.0).is_err());
        assert!(normalize(&wave, f32::NAN).is_err());
    }

    #[test]
    fn test_float_format_full_scale() {
        let wave = Waveform::new(vec![0.1, -0.2, 0.05], 8000, SampleFormat::Float).unwrap();
        let (normalized, _) = normalize(&wave, 0.0).unwrap();
        assert!((normalized.peak() - 1.0).abs() < 1e-5);
    }
}
