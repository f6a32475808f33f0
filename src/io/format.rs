//! Recognised audio formats and their decode/encode capabilities
//!
//! The extension allow-list is a closed enum. Each file is resolved to an
//! [`AudioFile`] once, at discovery time; later stages dispatch on the
//! resolved format rather than re-inspecting the path.

use crate::error::CleanError;
use crate::io::{decoder, encoder};
use crate::waveform::Waveform;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Decoder entry point for one format
pub type DecodeFn = fn(&Path) -> Result<Waveform, CleanError>;

/// Encoder entry point for one format
pub type EncodeFn = fn(&Waveform, &Path) -> Result<(), CleanError>;

/// Audio formats recognised by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AudioFormat {
    /// RIFF WAVE PCM
    Wav,
    /// MPEG-1/2 Layer III
    Mp3,
    /// 3GPP container (recognised so it is skipped with a warning, not processed)
    ThreeGp,
}

impl AudioFormat {
    /// Every recognised format
    pub const ALL: [AudioFormat; 3] = [AudioFormat::Wav, AudioFormat::Mp3, AudioFormat::ThreeGp];

    /// Match an extension (without the dot, case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }

    /// Resolve the format of a path from its extension
    ///
    /// # Errors
    ///
    /// Returns `CleanError::UnsupportedFormat` if the extension is missing or
    /// not in the allow-list.
    pub fn from_path(path: &Path) -> Result<Self, CleanError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| CleanError::UnsupportedFormat(format!("{}", path.display())))
    }

    /// Canonical extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::ThreeGp => "3gp",
        }
    }

    /// Decoder for this format, if any
    pub fn decoder(self) -> Option<DecodeFn> {
        match self {
            AudioFormat::Wav => Some(decoder::decode_wav),
            AudioFormat::Mp3 => Some(decoder::decode_compressed),
            AudioFormat::ThreeGp => None,
        }
    }

    /// Encoder for this format, if any
    pub fn encoder(self) -> Option<EncodeFn> {
        match self {
            AudioFormat::Wav => Some(encoder::encode_wav),
            AudioFormat::Mp3 => Some(encoder::encode_mp3),
            AudioFormat::ThreeGp => None,
        }
    }

    /// Format cleaned output is written in, if this format can be cleaned
    ///
    /// Output always keeps the input's format so file names stay valid.
    pub fn output_format(self) -> Option<AudioFormat> {
        match (self.decoder(), self.encoder()) {
            (Some(_), Some(_)) => Some(self),
            _ => None,
        }
    }
}

/// A discovered input file with its resolved format
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioFile {
    /// Location on disk
    pub path: PathBuf,
    /// Format resolved from the extension
    pub format: AudioFormat,
}

impl AudioFile {
    /// Resolve a path against the allow-list
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, CleanError> {
        let path = path.into();
        let format = AudioFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    /// File name as UTF-8 (lossy)
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Decode the file into a mono waveform
    pub fn decode(&self) -> Result<Waveform, CleanError> {
        let decode = self.format.decoder().ok_or_else(|| {
            CleanError::UnsupportedFormat(format!(
                "cannot decode .{} files ({})",
                self.format.extension(),
                self.path.display()
            ))
        })?;
        decode(&self.path)
    }

    /// Where the cleaned clip goes inside `output_dir`, plus its format
    pub fn output_target(&self, output_dir: &Path) -> Result<(PathBuf, AudioFormat), CleanError> {
        let format = self.format.output_format().ok_or_else(|| {
            CleanError::UnsupportedFormat(format!(
                "cannot convert .{} files ({})",
                self.format.extension(),
                self.path.display()
            ))
        })?;
        let name = self.path.file_name().ok_or_else(|| {
            CleanError::InvalidInput(format!("No file name in {}", self.path.display()))
        })?;
        Ok((output_dir.join(name), format))
    }

    /// True if a cleaned clip can replace this file under the same name
    pub fn can_rewrite_in_place(&self) -> bool {
        self.format.output_format() == Some(self.format)
    }
}
