//! Audio preprocessing modules
//!
//! This module contains the clip cleaning core:
//! - RMS energy measurement and the diagnostic energy profile
//! - Silence detection and trimming
//! - Peak normalization
//! - Channel mixing (multi-channel to mono)

pub mod channel_mixer;
pub mod energy;
pub mod normalization;
pub mod silence;
