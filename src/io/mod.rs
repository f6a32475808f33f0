//! Audio I/O modules
//!
//! Format resolution, decoding (Symphonia, hound), encoding (hound) and
//! input discovery.

pub mod decoder;
pub mod discovery;
pub mod encoder;
pub mod format;
