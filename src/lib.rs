//! # clean-audio
//!
//! Trims leading and trailing silence from short spoken-word clips and
//! normalizes their loudness, ready for use as flashcard audio.
//!
//! ## Features
//!
//! - **Silence trimming**: slice-wise RMS scan that separates speech from
//!   silence and rejects isolated clicks
//! - **Peak normalization**: single global gain with configurable headroom
//! - **Energy profile**: sliding-window dB dump for threshold calibration
//! - **Batch and sync**: parallel per-file processing, and a directory sync
//!   mode that skips files whose content has not changed
//!
//! ## Quick Start
//!
//! ```no_run
//! use clean_audio::{clean_audio, io::format::AudioFile, ThresholdConfig};
//!
//! let file = AudioFile::from_path("hello.wav")?;
//! let clip = file.decode()?;
//!
//! let result = clean_audio(&clip, &ThresholdConfig::default())?;
//! println!(
//!     "{}ms -> {}ms (gain {:.2} dB)",
//!     result.metadata.input_duration_ms,
//!     result.metadata.output_duration_ms,
//!     result.metadata.loudness.gain_db
//! );
//! # Ok::<(), clean_audio::CleanError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Discovery → Decode (mono) → Normalize → Trim start → Trim end → Encode
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod config;
pub mod error;
pub mod io;
pub mod manifest;
pub mod preprocessing;
pub mod result;
pub mod waveform;

// Re-export main types
pub use config::ThresholdConfig;
pub use error::CleanError;
pub use preprocessing::energy::measure_energy_profile;
pub use preprocessing::silence::{trim_silence, Boundary, TrimDirection};
pub use result::{CleanFlag, CleanMetadata, CleanResult};
pub use waveform::{SampleFormat, Waveform};

/// Main cleaning function
///
/// Normalizes the clip once, then trims leading and trailing silence.
/// Normalization runs first so the dB thresholds are always judged against
/// a clip whose peak sits just below full scale.
///
/// # Arguments
///
/// * `waveform` - Mono clip (not modified)
/// * `config` - Thresholds, slice geometry and headroom
///
/// # Returns
///
/// `CleanResult` holding the cleaned clip and metadata. Degenerate clips
/// (shorter than one slice, or only clicks) yield an empty clip, not an error.
///
/// # Errors
///
/// Returns `CleanError` if the config breaks an invariant.
///
/// # Example
///
/// ```
/// use clean_audio::{clean_audio, SampleFormat, ThresholdConfig, Waveform};
///
/// let clip = Waveform::new(vec![0.0f32; 8000], 8000, SampleFormat::Int(16))?;
/// let result = clean_audio(&clip, &ThresholdConfig::default())?;
/// assert_eq!(result.waveform, clip);
/// # Ok::<(), clean_audio::CleanError>(())
/// ```
pub fn clean_audio(waveform: &Waveform, config: &ThresholdConfig) -> Result<CleanResult, CleanError> {
    use preprocessing::normalization::normalize;
    use preprocessing::silence::{detect_speech_boundary, trim_at_boundary};
    use std::time::Instant;

    let start_time = Instant::now();
    config.validate()?;

    log::debug!(
        "Cleaning clip: {} samples at {} Hz ({}ms)",
        waveform.samples().len(),
        waveform.sample_rate(),
        waveform.duration_ms()
    );

    // 1. Normalization
    let (normalized, loudness) = normalize(waveform, config.headroom_db)?;

    // 2. Leading silence
    let start_boundary = detect_speech_boundary(&normalized, TrimDirection::Start, config);
    let head = trim_at_boundary(&normalized, TrimDirection::Start, start_boundary, config);

    // 3. Trailing silence
    let end_boundary = detect_speech_boundary(&head, TrimDirection::End, config);
    let cleaned = trim_at_boundary(&head, TrimDirection::End, end_boundary, config);

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;
    log::debug!(
        "Boundaries: start {:?}, end {:?}; {}ms -> {}ms",
        start_boundary,
        end_boundary,
        waveform.duration_ms(),
        cleaned.duration_ms()
    );

    Ok(CleanResult {
        metadata: CleanMetadata {
            input_duration_ms: waveform.duration_ms(),
            output_duration_ms: cleaned.duration_ms(),
            sample_rate: waveform.sample_rate(),
            loudness,
            start_boundary,
            end_boundary,
            processing_time_ms,
            flags: CleanMetadata::flags_for(start_boundary, end_boundary, cleaned.is_empty()),
        },
        waveform: cleaned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(duration_ms: u64, amplitude: f32) -> Vec<f32> {
        (0..duration_ms * 8)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .collect()
    }

    #[test]
    fn test_clean_normalizes_then_trims() {
        // Speech at ~-56 dBFS: below the silence threshold until normalized
        let mut samples = vec![0.0f32; 2400];
        samples.extend(square(400, 50.0));
        samples.extend(vec![0.0f32; 2400]);
        let clip = Waveform::new(samples, 8000, SampleFormat::Int(16)).unwrap();

        let config = ThresholdConfig::default();
        assert_eq!(trim_silence(&clip, TrimDirection::Start, &config), clip);

        let result = clean_audio(&clip, &config).unwrap();
        assert!(result.metadata.loudness.gain_db > 50.0);
        assert!(result.waveform.peak() > 30_000.0);
        assert_eq!(result.metadata.start_boundary, Boundary::Speech(300));
        assert_eq!(result.metadata.output_duration_ms, 600);
    }

    #[test]
    fn test_clean_scenario() {
        let mut samples = vec![0.0f32; 2400];
        samples.extend(square(400, 10362.0));
        samples.extend(vec![0.0f32; 2400]);
        let clip = Waveform::new(samples, 8000, SampleFormat::Int(16)).unwrap();

        let result = clean_audio(&clip, &ThresholdConfig::default()).unwrap();
        assert_eq!(result.metadata.start_boundary, Boundary::Speech(300));
        assert_eq!(result.metadata.end_boundary, Boundary::Speech(390));
        assert_eq!(result.metadata.output_duration_ms, 600);
        assert!(result.metadata.flags.is_empty());
    }

    #[test]
    fn test_clean_rejects_bad_config() {
        let clip = Waveform::new(vec![0.0; 80], 8000, SampleFormat::Int(16)).unwrap();
        let config = ThresholdConfig {
            burst_threshold_db: -60.0,
            ..ThresholdConfig::default()
        };
        assert!(matches!(
            clean_audio(&clip, &config),
            Err(CleanError::ConfigInvariantViolation(_))
        ));
    }

    #[test]
    fn test_clean_too_short() {
        let clip = Waveform::new(vec![1000.0; 40], 8000, SampleFormat::Int(16)).unwrap();
        let result = clean_audio(&clip, &ThresholdConfig::default()).unwrap();
        assert!(result.waveform.is_empty());
        assert!(result.metadata.flags.contains(&CleanFlag::TooShort));
        assert!(result.metadata.flags.contains(&CleanFlag::EmptyResult));
    }
}
