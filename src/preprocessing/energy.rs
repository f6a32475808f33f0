//! RMS energy measurement and dB conversion
//!
//! The boundary scan compares raw RMS values against absolute thresholds;
//! [`measure_energy_profile`] exposes the same measurement as a dB series
//! for calibrating those thresholds.
//!
//! # Example
//!
//! ```
//! use clean_audio::preprocessing::energy::measure_energy_profile;
//! use clean_audio::{SampleFormat, ThresholdConfig, Waveform};
//!
//! let wave = Waveform::new(vec![3276.8; 8000], 8000, SampleFormat::Int(16))?;
//! let profile: Vec<f32> = measure_energy_profile(&wave, &ThresholdConfig::default()).collect();
//! assert_eq!(profile.len(), 990);
//! assert!((profile[0] + 20.0).abs() < 0.01);
//! # Ok::<(), clean_audio::CleanError>(())
//! ```

use crate::config::ThresholdConfig;
use crate::waveform::Waveform;

/// Root-mean-square of a block of samples (0.0 for an empty block)
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&x| (x as f64) * (x as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// Convert a dB value to a linear amplitude ratio
pub fn db_to_ratio(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert a linear amplitude ratio to dB (`-inf` for zero)
pub fn ratio_to_db(ratio: f32) -> f32 {
    20.0 * ratio.log10()
}

/// Absolute RMS level corresponding to `db` below the waveform's full scale
pub fn threshold_amplitude(waveform: &Waveform, db: f32) -> f32 {
    db_to_ratio(db) * waveform.max_possible_amplitude()
}

/// Lazy sliding-window energy profile
///
/// Yields one dB value per 1ms step. A clone continues from the current
/// position; call [`measure_energy_profile`] again to start over.
#[derive(Debug, Clone)]
pub struct EnergyProfile<'a> {
    waveform: &'a Waveform,
    window_ms: u64,
    position_ms: u64,
    end_ms: u64,
}

impl Iterator for EnergyProfile<'_> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.position_ms >= self.end_ms {
            return None;
        }
        let start = self.position_ms;
        self.position_ms += 1;
        let window = self.waveform.view_ms(start, start + self.window_ms);
        Some(ratio_to_db(rms(window) / self.waveform.max_possible_amplitude()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end_ms - self.position_ms) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EnergyProfile<'_> {}

/// Overlapping RMS scan for threshold calibration
///
/// Windows are `silence_slice_ms` wide and advance by 1ms, so a waveform of
/// `L` ms produces `max(0, L - silence_slice_ms)` values. Each value is
/// `20 * log10(window_rms / max_possible_amplitude)`.
///
/// Expects a validated config; a zero-width slice yields `-inf` windows.
pub fn measure_energy_profile<'a>(waveform: &'a Waveform, config: &ThresholdConfig) -> EnergyProfile<'a> {
    let window_ms = config.silence_slice_ms as u64;
    let end_ms = waveform.duration_ms().saturating_sub(window_ms);
    log::debug!(
        "Measuring energy profile: {} windows of {}ms",
        end_ms,
        window_ms
    );
    EnergyProfile {
        waveform,
        window_ms,
        position_ms: 0,
        end_ms,
    }
}
