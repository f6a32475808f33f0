//! Audio encoding
//!
//! WAV goes through `hound` in the waveform's own sample format; MP3 goes
//! through LAME at 16-bit scale.

use crate::error::CleanError;
use crate::waveform::{SampleFormat, Waveform};
use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, MonoPcm, Quality};
use std::fs;
use std::path::Path;

/// Constant bitrate for MP3 output
const MP3_BITRATE: Bitrate = Bitrate::Kbps128;

/// Write a mono waveform as a WAV file in its own sample format
///
/// Integer samples are rounded and clamped to the bit depth's range.
///
/// # Errors
///
/// Returns `CleanError::EncodingError` if the file cannot be written.
pub fn encode_wav(waveform: &Waveform, path: &Path) -> Result<(), CleanError> {
    log::debug!(
        "Encoding {}ms WAV to {}",
        waveform.duration_ms(),
        path.display()
    );

    let (bits_per_sample, sample_format) = match waveform.format() {
        SampleFormat::Int(bits) => (bits, hound::SampleFormat::Int),
        SampleFormat::Float => (32, hound::SampleFormat::Float),
    };
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate(),
        bits_per_sample,
        sample_format,
    };

    let encode_err = |e: hound::Error| CleanError::EncodingError(format!("{}: {}", path.display(), e));
    let mut writer = hound::WavWriter::create(path, spec).map_err(encode_err)?;

    match waveform.format() {
        SampleFormat::Int(_) => {
            let max = waveform.max_possible_amplitude();
            for &sample in waveform.samples() {
                let clamped = sample.round().clamp(-max, max - 1.0);
                writer.write_sample(clamped as i32).map_err(encode_err)?;
            }
        }
        SampleFormat::Float => {
            for &sample in waveform.samples() {
                writer.write_sample(sample.clamp(-1.0, 1.0)).map_err(encode_err)?;
            }
        }
    }

    writer.finalize().map_err(encode_err)
}

/// Write a mono waveform as a constant-bitrate MP3 file
///
/// Samples are rescaled to 16-bit range before encoding, so integer and
/// float waveforms come out at the same loudness.
///
/// # Errors
///
/// Returns `CleanError::EncodingError` if LAME rejects the sample rate or
/// fails to encode, and `CleanError::Io` if the file cannot be written.
pub fn encode_mp3(waveform: &Waveform, path: &Path) -> Result<(), CleanError> {
    log::debug!(
        "Encoding {}ms MP3 to {}",
        waveform.duration_ms(),
        path.display()
    );

    let encode_err = |what: &str, e: &dyn std::fmt::Debug| {
        CleanError::EncodingError(format!("{}: {} ({:?})", path.display(), what, e))
    };

    let mut builder = Builder::new()
        .ok_or_else(|| CleanError::EncodingError("cannot allocate LAME encoder".to_string()))?;
    builder
        .set_num_channels(1)
        .map_err(|e| encode_err("channels", &e))?;
    builder
        .set_sample_rate(waveform.sample_rate())
        .map_err(|e| encode_err("sample rate", &e))?;
    builder
        .set_brate(MP3_BITRATE)
        .map_err(|e| encode_err("bitrate", &e))?;
    builder
        .set_quality(Quality::Good)
        .map_err(|e| encode_err("quality", &e))?;
    let mut lame = builder.build().map_err(|e| encode_err("init", &e))?;

    let pcm = to_i16(waveform);
    let mut mp3 = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(pcm.len()));
    lame.encode_to_vec(MonoPcm(&pcm[..]), &mut mp3)
        .map_err(|e| encode_err("encode", &e))?;
    lame.flush_to_vec::<FlushNoGap>(&mut mp3)
        .map_err(|e| encode_err("flush", &e))?;

    fs::write(path, mp3)?;
    Ok(())
}

fn to_i16(waveform: &Waveform) -> Vec<i16> {
    let scale = 32768.0 / waveform.max_possible_amplitude();
    waveform
        .samples()
        .iter()
        .map(|&s| (s * scale).round().clamp(-32768.0, 32767.0) as i16)
        .collect()
}
