//! Decoded mono waveform with millisecond addressing

use crate::error::CleanError;
use serde::{Deserialize, Serialize};

/// Storage format of the samples, which fixes the full-scale amplitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    /// Signed integer PCM with the given bit depth
    Int(u16),
    /// 32-bit float PCM in [-1.0, 1.0]
    Float,
}

impl SampleFormat {
    /// Largest representable magnitude for this format
    pub fn max_possible_amplitude(self) -> f32 {
        match self {
            SampleFormat::Int(bits) => (1u64 << (bits.clamp(1, 32) - 1)) as f32,
            SampleFormat::Float => 1.0,
        }
    }
}

/// Mono audio clip
///
/// Samples are kept in the native scale of [`SampleFormat`] (a 16-bit clip
/// spans roughly ±32768). A waveform is never modified in place: trimming
/// and normalization return new waveforms.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
    format: SampleFormat,
}

impl Waveform {
    /// Create a waveform from mono samples
    ///
    /// # Errors
    ///
    /// Returns `CleanError::InvalidInput` for a zero sample rate or an
    /// integer bit depth outside 8..=32.
    pub fn new(samples: Vec<f32>, sample_rate: u32, format: SampleFormat) -> Result<Self, CleanError> {
        if sample_rate == 0 {
            return Err(CleanError::InvalidInput("Invalid sample rate".to_string()));
        }
        if let SampleFormat::Int(bits) = format {
            if !(8..=32).contains(&bits) {
                return Err(CleanError::InvalidInput(format!(
                    "Unsupported bit depth: {}",
                    bits
                )));
            }
        }
        Ok(Self {
            samples,
            sample_rate,
            format,
        })
    }

    /// Empty waveform sharing this waveform's rate and format
    pub fn empty_like(&self) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate: self.sample_rate,
            format: self.format,
        }
    }

    /// Same rate and format, different samples
    pub(crate) fn with_samples(&self, samples: Vec<f32>) -> Self {
        Self {
            samples,
            sample_rate: self.sample_rate,
            format: self.format,
        }
    }

    /// Raw samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sample format
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Full-scale magnitude used as the 0 dB reference
    pub fn max_possible_amplitude(&self) -> f32 {
        self.format.max_possible_amplitude()
    }

    /// True if the waveform holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in whole milliseconds (rounded to nearest)
    pub fn duration_ms(&self) -> u64 {
        let rate = self.sample_rate as u64;
        (self.samples.len() as u64 * 1000 + rate / 2) / rate
    }

    /// Sample index for a millisecond offset, clamped to the buffer
    pub fn sample_index(&self, ms: u64) -> usize {
        let idx = ms.saturating_mul(self.sample_rate as u64) / 1000;
        usize::try_from(idx).map_or(self.samples.len(), |i| i.min(self.samples.len()))
    }

    /// Borrowed samples covering `[start_ms, end_ms)`
    pub fn view_ms(&self, start_ms: u64, end_ms: u64) -> &[f32] {
        let start = self.sample_index(start_ms);
        let end = self.sample_index(end_ms).max(start);
        &self.samples[start..end]
    }

    /// Owned copy of `[start_ms, end_ms)`
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> Self {
        self.with_samples(self.view_ms(start_ms, end_ms).to_vec())
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|&x| x.abs()).fold(0.0f32, f32::max)
    }

    /// Consume the waveform, returning its samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
