//! Silence detection and trimming
//!
//! Finds where speech starts (or ends) by walking fixed-width slices from the
//! outer edge of the clip toward its interior, tracking a candidate noise run.
//!
//! Algorithm:
//! 1. Convert the silence and burst thresholds from dB to absolute RMS levels
//! 2. Partition the clip into `silence_slice_ms` slices (partial tail ignored)
//! 3. A slice louder than the silence threshold opens a run, or extends the
//!    open one; once the run spans more than `max_gap_ms` it is confirmed
//! 4. A quiet slice closes the open run only if its peak never exceeded the
//!    burst threshold, so isolated clicks are dropped while short pauses
//!    inside speech are not
//! 5. A run still open when the scan ends is confirmed at its start
//!
//! Thresholds are strict: an RMS exactly on a threshold does not exceed it.
//!
//! # Example
//!
//! ```
//! use clean_audio::preprocessing::silence::{trim_silence, TrimDirection};
//! use clean_audio::{SampleFormat, ThresholdConfig, Waveform};
//!
//! // 200ms of silence followed by 300ms at -10 dB, 1 sample per ms
//! let mut samples = vec![0.0f32; 200];
//! samples.extend((0..300).map(|i| if i % 2 == 0 { 10362.0 } else { -10362.0 }));
//! let clip = Waveform::new(samples, 1000, SampleFormat::Int(16))?;
//!
//! let trimmed = trim_silence(&clip, TrimDirection::Start, &ThresholdConfig::default());
//! assert_eq!(trimmed.duration_ms(), 300);
//! # Ok::<(), clean_audio::CleanError>(())
//! ```

use crate::config::ThresholdConfig;
use crate::preprocessing::energy::{rms, threshold_amplitude};
use crate::waveform::Waveform;
use serde::Serialize;

/// Which edge of the clip to trim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimDirection {
    /// Leading silence (scan forward from the start)
    Start,
    /// Trailing silence (scan backward from the end)
    End,
}

/// Outcome of a boundary scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "offset_ms", rename_all = "snake_case")]
pub enum Boundary {
    /// Clip is shorter than one slice
    TooShort,
    /// No slice ever rose above the silence threshold
    NoNoise,
    /// Noise was seen, but every run was discarded as a transient click
    TransientsOnly,
    /// Start offset (ms) of the confirmed noise run
    Speech(u64),
}

/// Absolute levels and widths used during one scan
#[derive(Debug, Clone, Copy)]
struct ScanLimits {
    slice_ms: u64,
    silence_rms: f32,
    burst_rms: f32,
    max_gap_ms: u64,
}

/// Candidate noise run, local to one scan
#[derive(Debug, Default)]
struct ScanState {
    noise_start: Option<u64>,
    noise_peak: Option<f32>,
    discarded_runs: usize,
}

impl ScanState {
    /// Register a slice above the silence threshold.
    /// Returns the run start once the run is confirmed.
    fn noisy(&mut self, start_ms: u64, level: f32, limits: &ScanLimits) -> Option<u64> {
        self.noise_peak = Some(self.noise_peak.map_or(level, |peak| peak.max(level)));

        match self.noise_start {
            None => {
                self.noise_start = Some(start_ms);
                None
            }
            Some(run_start) if start_ms.abs_diff(run_start) > limits.max_gap_ms => Some(run_start),
            Some(_) => None,
        }
    }

    /// Register a slice at or below the silence threshold
    fn quiet(&mut self, limits: &ScanLimits) {
        if self.noise_start.is_none() {
            return;
        }
        // Runs that reached burst level survive short pauses
        if self.noise_peak.is_some_and(|peak| peak <= limits.burst_rms) {
            self.noise_start = None;
            self.noise_peak = None;
            self.discarded_runs += 1;
        }
    }

    fn finish(self) -> Boundary {
        match self.noise_start {
            Some(run_start) => Boundary::Speech(run_start),
            None if self.discarded_runs > 0 => Boundary::TransientsOnly,
            None => Boundary::NoNoise,
        }
    }
}

fn scan<I>(waveform: &Waveform, slices: I, limits: &ScanLimits) -> Boundary
where
    I: Iterator<Item = u64>,
{
    let mut state = ScanState::default();

    for idx in slices {
        let start_ms = idx * limits.slice_ms;
        let level = rms(waveform.view_ms(start_ms, start_ms + limits.slice_ms));

        if level > limits.silence_rms {
            if let Some(run_start) = state.noisy(start_ms, level, limits) {
                return Boundary::Speech(run_start);
            }
        } else {
            state.quiet(limits);
        }
    }

    state.finish()
}

/// Locate the speech boundary seen from one edge of the clip
///
/// # Arguments
///
/// * `waveform` - Mono clip
/// * `direction` - Edge to scan from
/// * `config` - Thresholds and slice geometry
///
/// # Returns
///
/// The [`Boundary`] found; `Speech(ms)` carries the start offset of the
/// confirmed run (for `End` this is the run's latest slice, the first one
/// met scanning backward).
pub fn detect_speech_boundary(
    waveform: &Waveform,
    direction: TrimDirection,
    config: &ThresholdConfig,
) -> Boundary {
    debug_assert!(config.silence_slice_ms > 0, "config must be validated");
    let slice_ms = config.silence_slice_ms.max(1) as u64;
    let length_ms = waveform.duration_ms();

    if length_ms < slice_ms {
        return Boundary::TooShort;
    }

    let limits = ScanLimits {
        slice_ms,
        silence_rms: threshold_amplitude(waveform, config.silence_threshold_db),
        burst_rms: threshold_amplitude(waveform, config.burst_threshold_db),
        max_gap_ms: config.max_gap_ms as u64,
    };
    let slice_count = length_ms / slice_ms;

    match direction {
        TrimDirection::Start => scan(waveform, 0..slice_count, &limits),
        TrimDirection::End => scan(waveform, (0..slice_count).rev(), &limits),
    }
}

/// Cut a clip at a boundary already found by [`detect_speech_boundary`]
///
/// `Start` keeps everything from the run start; `End` keeps up to the run
/// start plus one slice and `trailing_margin_ms`, clamped to the clip.
pub fn trim_at_boundary(
    waveform: &Waveform,
    direction: TrimDirection,
    boundary: Boundary,
    config: &ThresholdConfig,
) -> Waveform {
    match boundary {
        Boundary::TooShort => {
            log::debug!(
                "Clip of {}ms is shorter than one {}ms slice",
                waveform.duration_ms(),
                config.silence_slice_ms
            );
            waveform.empty_like()
        }
        Boundary::TransientsOnly => {
            log::warn!("Clip contains only transient noise, trimming it away");
            waveform.empty_like()
        }
        Boundary::NoNoise => waveform.clone(),
        Boundary::Speech(run_start) => match direction {
            TrimDirection::Start => waveform.slice_ms(run_start, u64::MAX),
            TrimDirection::End => {
                let margin = config.silence_slice_ms as u64 + config.trailing_margin_ms as u64;
                let end = run_start + margin;
                if end >= waveform.duration_ms() {
                    waveform.clone()
                } else {
                    waveform.slice_ms(0, end)
                }
            }
        },
    }
}

/// Trim silence from one edge of a clip
///
/// # Arguments
///
/// * `waveform` - Mono clip (borrowed, never modified)
/// * `direction` - `Start` cuts everything before the speech onset;
///   `End` keeps up to the boundary plus one slice and `trailing_margin_ms`
/// * `config` - Thresholds and slice geometry
///
/// # Returns
///
/// A new waveform. Clips shorter than one slice, and clips holding nothing
/// but transient clicks, come back empty. Clips that never rise above the
/// silence threshold come back unchanged.
///
/// The config is not re-checked here: build it with
/// [`ThresholdConfig::new`] or call [`ThresholdConfig::validate`] first.
/// A burst threshold at or below the silence threshold makes every run a
/// transient.
pub fn trim_silence(waveform: &Waveform, direction: TrimDirection, config: &ThresholdConfig) -> Waveform {
    let boundary = detect_speech_boundary(waveform, direction, config);
    log::debug!("Trim {:?}: boundary {:?}", direction, boundary);
    trim_at_boundary(waveform, direction, boundary, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::energy::db_to_ratio;
    use crate::waveform::SampleFormat;

    const RATE: u32 = 8000;

    /// Square wave at `db` below 16-bit full scale (`None` = digital silence)
    fn segment(duration_ms: u64, db: Option<f32>) -> Vec<f32> {
        let n = (duration_ms * RATE as u64 / 1000) as usize;
        match db {
            None => vec![0.0; n],
            Some(db) => {
                let amp = db_to_ratio(db) * 32768.0;
                (0..n).map(|i| if i % 2 == 0 { amp } else { -amp }).collect()
            }
        }
    }

    fn clip(parts: &[(u64, Option<f32>)]) -> Waveform {
        let samples = parts.iter().flat_map(|&(ms, db)| segment(ms, db)).collect();
        Waveform::new(samples, RATE, SampleFormat::Int(16)).unwrap()
    }

    /// 0-300ms silent, 300-700ms at -10 dB, 700-1000ms silent
    fn speech_clip() -> Waveform {
        clip(&[(300, None), (400, Some(-10.0)), (300, None)])
    }

    #[test]
    fn test_literal_config_needs_validate() {
        let inverted = ThresholdConfig {
            silence_threshold_db: -20.0,
            burst_threshold_db: -50.0,
            ..ThresholdConfig::default()
        };
        assert!(inverted.validate().is_err());
        assert!(ThresholdConfig::new(-20.0, -50.0).is_err());
    }

    #[test]
    fn test_shorter_than_slice_is_empty() {
        let config = ThresholdConfig::default();
        let short = clip(&[(5, Some(-10.0))]);

        assert!(trim_silence(&short, TrimDirection::Start, &config).is_empty());
        assert!(trim_silence(&short, TrimDirection::End, &config).is_empty());
        assert_eq!(
            detect_speech_boundary(&short, TrimDirection::Start, &config),
            Boundary::TooShort
        );
    }

    #[test]
    fn test_all_silent_unchanged() {
        let config = ThresholdConfig::default();
        for wave in [clip(&[(500, None)]), clip(&[(500, Some(-70.0))])] {
            assert_eq!(trim_silence(&wave, TrimDirection::Start, &config), wave);
            assert_eq!(trim_silence(&wave, TrimDirection::End, &config), wave);
        }
    }

    #[test]
    fn test_all_loud_starts_at_zero() {
        let config = ThresholdConfig::default();
        let wave = clip(&[(500, Some(-10.0))]);

        assert_eq!(
            detect_speech_boundary(&wave, TrimDirection::Start, &config),
            Boundary::Speech(0)
        );
        assert_eq!(trim_silence(&wave, TrimDirection::Start, &config), wave);
        // Backward scan confirms at 490ms; 490 + 10 + 200 clamps to the full clip
        assert_eq!(trim_silence(&wave, TrimDirection::End, &config), wave);
    }

    #[test]
    fn test_speech_scenario() {
        let config = ThresholdConfig::default();
        let wave = speech_clip();

        let head = trim_silence(&wave, TrimDirection::Start, &config);
        assert_eq!(head.duration_ms(), 700);
        assert_eq!(head.samples(), &wave.samples()[2400..]);

        // Backward scan over the 700ms result meets speech at 390ms
        assert_eq!(
            detect_speech_boundary(&head, TrimDirection::End, &config),
            Boundary::Speech(390)
        );
        let both = trim_silence(&head, TrimDirection::End, &config);
        assert_eq!(both.duration_ms(), 600);
        assert_eq!(both.samples(), &head.samples()[..4800]);
    }

    #[test]
    fn test_trailing_margin_clamped() {
        let config = ThresholdConfig::default();
        // Backward scan confirms at 640ms and 640 + 210 runs past the 700ms clip
        let wave = clip(&[(600, Some(-10.0)), (50, Some(-10.0)), (50, None)]);
        let tail = trim_silence(&wave, TrimDirection::End, &config);
        assert_eq!(tail.duration_ms(), 700);
    }

    #[test]
    fn test_start_trim_idempotent() {
        let config = ThresholdConfig::default();
        let wave = clip(&[(250, None), (40, Some(-30.0)), (300, Some(-8.0)), (200, None)]);

        let once = trim_silence(&wave, TrimDirection::Start, &config);
        let twice = trim_silence(&once, TrimDirection::Start, &config);
        assert_eq!(once, twice);
        assert_eq!(once.duration_ms(), 540);
    }

    #[test]
    fn test_transient_click_removed() {
        let config = ThresholdConfig::default();
        // One 10ms slice at -35 dB: above silence, never reaches burst level
        let wave = clip(&[(200, None), (10, Some(-35.0)), (290, None)]);

        assert_eq!(
            detect_speech_boundary(&wave, TrimDirection::Start, &config),
            Boundary::TransientsOnly
        );
        assert!(trim_silence(&wave, TrimDirection::Start, &config).is_empty());
        assert!(trim_silence(&wave, TrimDirection::End, &config).is_empty());
    }

    #[test]
    fn test_click_before_speech_ignored() {
        let config = ThresholdConfig::default();
        let wave = clip(&[(100, None), (20, Some(-35.0)), (280, None), (300, Some(-10.0))]);

        assert_eq!(
            detect_speech_boundary(&wave, TrimDirection::Start, &config),
            Boundary::Speech(400)
        );
    }

    #[test]
    fn test_separate_runs_confirm_first() {
        let config = ThresholdConfig::default();
        // Two loud spans separated by 250ms of quiet, longer than max_gap_ms
        let wave = clip(&[
            (100, None),
            (50, Some(-10.0)),
            (250, None),
            (200, Some(-10.0)),
            (200, None),
        ]);

        assert_eq!(
            detect_speech_boundary(&wave, TrimDirection::Start, &config),
            Boundary::Speech(100)
        );
        assert_eq!(
            detect_speech_boundary(&wave, TrimDirection::End, &config),
            Boundary::Speech(590)
        );
    }

    #[test]
    fn test_pause_inside_speech_keeps_run() {
        let config = ThresholdConfig::default();
        let loud = clip(&[(100, None), (60, Some(-10.0)), (30, None), (300, Some(-10.0))]);
        assert_eq!(
            detect_speech_boundary(&loud, TrimDirection::Start, &config),
            Boundary::Speech(100)
        );

        // Same shape below burst level: the pause resets the run
        let weak = clip(&[(100, None), (60, Some(-35.0)), (30, None), (300, Some(-10.0))]);
        assert_eq!(
            detect_speech_boundary(&weak, TrimDirection::Start, &config),
            Boundary::Speech(190)
        );
    }

    #[test]
    fn test_threshold_ties_are_quiet() {
        let config = ThresholdConfig::default();

        // Exactly on the silence threshold: never noisy
        let on_silence = clip(&[(300, Some(config.silence_threshold_db))]);
        assert_eq!(
            detect_speech_boundary(&on_silence, TrimDirection::Start, &config),
            Boundary::NoNoise
        );

        // A single slice exactly on the burst threshold is still a transient
        let on_burst = clip(&[(100, None), (10, Some(config.burst_threshold_db)), (100, None)]);
        assert_eq!(
            detect_speech_boundary(&on_burst, TrimDirection::Start, &config),
            Boundary::TransientsOnly
        );
    }

    #[test]
    fn test_short_run_confirmed_at_scan_end() {
        let config = ThresholdConfig::default();
        // Loud tail too short for the gap rule: confirmed when the scan runs out
        let wave = clip(&[(300, None), (50, Some(-10.0))]);
        assert_eq!(
            detect_speech_boundary(&wave, TrimDirection::Start, &config),
            Boundary::Speech(300)
        );
        assert_eq!(trim_silence(&wave, TrimDirection::Start, &config).duration_ms(), 50);
    }
}
