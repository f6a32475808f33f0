//! Example: Clean a single audio file and print what was done
//!
//! Usage:
//!   cargo run --example clean_file -- <input> <output-dir>

use clean_audio::{clean_audio, io::format::AudioFile, ThresholdConfig};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, output_dir) = match args.as_slice() {
        [input, output_dir] => (input, Path::new(output_dir)),
        _ => return Err("Usage: clean_file <input> <output-dir>".into()),
    };

    let file = AudioFile::from_path(input)?;
    let waveform = file.decode()?;
    let result = clean_audio(&waveform, &ThresholdConfig::default())?;

    println!("Clean Results:");
    println!(
        "  Duration: {}ms -> {}ms",
        result.metadata.input_duration_ms, result.metadata.output_duration_ms
    );
    println!("  Gain: {:.2} dB", result.metadata.loudness.gain_db);
    println!("  Start boundary: {:?}", result.metadata.start_boundary);
    println!("  End boundary: {:?}", result.metadata.end_boundary);
    println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);

    let (target, format) = file.output_target(output_dir)?;
    let encode = format.encoder().ok_or("no encoder for output format")?;
    std::fs::create_dir_all(output_dir)?;
    encode(&result.waveform, &target)?;
    println!("  Written: {}", target.display());

    Ok(())
}
