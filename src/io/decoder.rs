//! Audio decoding
//!
//! WAV files are read with `hound`, keeping their native integer scale;
//! compressed formats go through Symphonia and come out at 16-bit scale.
//! Every decoder averages channels down to mono.

use crate::error::CleanError;
use crate::preprocessing::channel_mixer::downmix_to_mono;
use crate::waveform::{SampleFormat, Waveform};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Scale applied to Symphonia's [-1.0, 1.0] output
const COMPRESSED_BITS: u16 = 16;

/// Decode a WAV file to a mono waveform
///
/// # Arguments
///
/// * `path` - Path to a `.wav` file
///
/// # Errors
///
/// Returns `CleanError::DecodingError` if the file cannot be parsed.
pub fn decode_wav(path: &Path) -> Result<Waveform, CleanError> {
    log::debug!("Decoding WAV file: {}", path.display());

    let reader = hound::WavReader::open(path)
        .map_err(|e| CleanError::DecodingError(format!("{}: {}", path.display(), e)))?;
    let spec = reader.spec();

    let (interleaved, format) = match spec.sample_format {
        hound::SampleFormat::Float => {
            let samples = reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CleanError::DecodingError(format!("{}: {}", path.display(), e)))?;
            (samples, SampleFormat::Float)
        }
        hound::SampleFormat::Int => {
            let samples = reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CleanError::DecodingError(format!("{}: {}", path.display(), e)))?;
            (samples, SampleFormat::Int(spec.bits_per_sample))
        }
    };

    let mono = downmix_to_mono(&interleaved, spec.channels as usize)?;
    Waveform::new(mono, spec.sample_rate, format)
}

/// Decode a compressed file (MP3) to a mono waveform with Symphonia
///
/// # Errors
///
/// Returns `CleanError::Io` if the file cannot be opened and
/// `CleanError::DecodingError` if no decodable audio track is found.
pub fn decode_compressed(path: &Path) -> Result<Waveform, CleanError> {
    log::debug!("Decoding compressed file: {}", path.display());

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| CleanError::DecodingError(format!("{}: {}", path.display(), e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            CleanError::DecodingError(format!("{}: no supported audio track", path.display()))
        })?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params.sample_rate.ok_or_else(|| {
        CleanError::DecodingError(format!("{}: unknown sample rate", path.display()))
    })?;
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| CleanError::DecodingError(format!("{}: {}", path.display(), e)))?;

    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut interleaved: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(CleanError::DecodingError(format!("{}: {}", path.display(), e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt frames are skipped, as players do
            Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => {
                return Err(CleanError::DecodingError(format!("{}: {}", path.display(), e)));
            }
        };

        let spec = *decoded.spec();
        channels = spec.channels.count();
        let num_frames = decoded.capacity();

        let sbuf = sample_buf.get_or_insert_with(|| SampleBuffer::<f32>::new(num_frames as u64, spec));
        if !buffer_fits(sbuf, num_frames, &spec) {
            *sbuf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        }

        sbuf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sbuf.samples());
    }

    let sample_format = SampleFormat::Int(COMPRESSED_BITS);
    let scale = sample_format.max_possible_amplitude();
    let mono = downmix_to_mono(&interleaved, channels)?
        .into_iter()
        .map(|s| s * scale)
        .collect();

    Waveform::new(mono, sample_rate, sample_format)
}

/// `SampleBuffer::capacity` counts interleaved samples, not frames
fn buffer_fits(buf: &SampleBuffer<f32>, frames: usize, spec: &SignalSpec) -> bool {
    buf.capacity() >= frames * spec.channels.count()
}
