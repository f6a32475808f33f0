//! Pipeline result types

use crate::preprocessing::normalization::LoudnessMetadata;
use crate::preprocessing::silence::Boundary;
use crate::waveform::Waveform;
use serde::Serialize;

/// Conditions worth surfacing to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CleanFlag {
    /// Clip was shorter than one analysis slice
    TooShort,
    /// Clip never rose above the silence threshold
    EntirelySilent,
    /// Clip held nothing but transient clicks
    TransientsOnly,
    /// Nothing is left after trimming
    EmptyResult,
}

/// Cleaning metadata
#[derive(Debug, Clone, Serialize)]
pub struct CleanMetadata {
    /// Input duration in milliseconds
    pub input_duration_ms: u64,

    /// Output duration in milliseconds
    pub output_duration_ms: u64,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Normalization measurements and applied gain
    pub loudness: LoudnessMetadata,

    /// Boundary found scanning from the start
    pub start_boundary: Boundary,

    /// Boundary found scanning from the end (offset relative to the
    /// start-trimmed clip)
    pub end_boundary: Boundary,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Notable conditions
    pub flags: Vec<CleanFlag>,
}

/// Cleaned clip plus metadata
#[derive(Debug, Clone)]
pub struct CleanResult {
    /// Normalized, trimmed clip
    pub waveform: Waveform,

    /// What was measured and done
    pub metadata: CleanMetadata,
}

impl CleanMetadata {
    /// Flags implied by the two boundaries and the output length
    pub(crate) fn flags_for(start: Boundary, end: Boundary, output_empty: bool) -> Vec<CleanFlag> {
        let mut flags = Vec::new();
        for boundary in [start, end] {
            let flag = match boundary {
                Boundary::TooShort => Some(CleanFlag::TooShort),
                Boundary::NoNoise => Some(CleanFlag::EntirelySilent),
                Boundary::TransientsOnly => Some(CleanFlag::TransientsOnly),
                Boundary::Speech(_) => None,
            };
            if let Some(flag) = flag {
                if !flags.contains(&flag) {
                    flags.push(flag);
                }
            }
        }
        if output_empty {
            flags.push(CleanFlag::EmptyResult);
        }
        flags
    }
}
