//! Command-line front end
//!
//! Usage:
//!   clean-audio -i <file|dir|glob> -o <dir> [--jobs N] [--config FILE] [--json]
//!   clean-audio -i <file|dir|glob> --dump-rms
//!   clean-audio --sync <media-dir> [--simulate]
//!
//! Set `RUST_LOG=debug` for per-stage logging.

use clean_audio::batch::{
    process_batch, sync_directory, BatchSummary, FileOutcome, FileStatus, SyncOptions,
};
use clean_audio::io::discovery::discover_all;
use clean_audio::{measure_energy_profile, ThresholdConfig};
use std::env;
use std::io::Write;
use std::path::PathBuf;

const USAGE: &str = "Usage: clean-audio [options]

  -i, --input PATH    Input file, directory or glob (repeatable)
  -o, --output DIR    Output directory
  -d, --dump-rms      Print the energy profile (dB per 1ms step) instead of cleaning
      --sync DIR      Clean changed files in DIR in place, tracking content hashes
  -s, --simulate      With --sync, only list the files that would be processed
  -j, --jobs N        Parallel workers (default: CPU-1)
  -c, --config FILE   JSON threshold config (missing keys use defaults)
      --json          Emit one JSON object per file (JSONL)
";

#[derive(Debug, Default)]
struct Args {
    inputs: Vec<String>,
    output: Option<PathBuf>,
    dump_rms: bool,
    sync: Option<PathBuf>,
    simulate: bool,
    jobs: usize,
    config: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Result<Args, Box<dyn std::error::Error>> {
    let mut raw = env::args().skip(1);
    let mut args = Args::default();

    while let Some(arg) = raw.next() {
        let mut value = |name: &str| raw.next().ok_or_else(|| format!("{} requires a value", name));
        match arg.as_str() {
            "-i" | "--input" => args.inputs.push(value(&arg)?),
            "-o" | "--output" => args.output = Some(PathBuf::from(value(&arg)?)),
            "-d" | "--dump-rms" => args.dump_rms = true,
            "--sync" => args.sync = Some(PathBuf::from(value(&arg)?)),
            "-s" | "--simulate" => args.simulate = true,
            "-j" | "--jobs" => args.jobs = std::cmp::max(1, value(&arg)?.parse::<usize>()?),
            "-c" | "--config" => args.config = Some(PathBuf::from(value(&arg)?)),
            "--json" => args.json = true,
            "-h" | "--help" => {
                eprint!("{}", USAGE);
                std::process::exit(0);
            }
            other => return Err(format!("Unknown argument: {}\n\n{}", other, USAGE).into()),
        }
    }

    Ok(args)
}

fn print_outcomes(outcomes: &[FileOutcome], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for outcome in outcomes {
        if json {
            writeln!(out, "{}", serde_json::to_string(outcome)?)?;
            continue;
        }
        let name = outcome.path.display();
        match &outcome.status {
            FileStatus::Processed {
                input_ms,
                output_ms,
                gain_db,
                ..
            } => writeln!(
                out,
                "{}: {}ms -> {}ms (gain {:+.2} dB)",
                name, input_ms, output_ms, gain_db
            )?,
            FileStatus::Skipped { reason } => writeln!(out, "{}: skipped ({})", name, reason)?,
            FileStatus::Failed { error } => writeln!(out, "{}: failed ({})", name, error)?,
        }
    }

    let summary = BatchSummary::from_outcomes(outcomes);
    let total = outcomes.len();
    eprintln!(
        "Processed {} {} ({} written, {} skipped, {} failed)",
        total,
        if total == 1 { "file" } else { "files" },
        summary.processed,
        summary.skipped,
        summary.failed
    );
    Ok(())
}

fn dump_rms(inputs: &[String], config: &ThresholdConfig) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for file in discover_all(inputs)? {
        let waveform = match file.decode() {
            Ok(waveform) => waveform,
            Err(e) => {
                log::warn!("Skipping {}: {}", file.path.display(), e);
                continue;
            }
        };
        eprintln!("{}", file.path.display());
        for db in measure_energy_profile(&waveform, config) {
            writeln!(out, "{}", db)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => ThresholdConfig::from_json_file(path)?,
        None => ThresholdConfig::default(),
    };

    let outcomes = if let Some(dir) = &args.sync {
        let options = SyncOptions {
            simulate: args.simulate,
            jobs: args.jobs,
        };
        let report = sync_directory(dir, &config, &options)?;
        if report.changed.is_empty() {
            eprintln!("Nothing needs to be done.");
            return Ok(());
        }
        if args.simulate {
            for file in &report.changed {
                println!("{}", file.path.display());
            }
            return Ok(());
        }
        report.outcomes
    } else {
        if args.inputs.is_empty() {
            return Err(format!("An input must be specified.\n\n{}", USAGE).into());
        }
        if args.dump_rms {
            return dump_rms(&args.inputs, &config);
        }
        let output = args
            .output
            .as_ref()
            .ok_or_else(|| format!("Input and output must be specified.\n\n{}", USAGE))?;

        let files = discover_all(&args.inputs)?;
        eprintln!("Batch: {} files", files.len());
        process_batch(&files, output, &config, args.jobs)?
    };

    print_outcomes(&outcomes, args.json)?;

    if BatchSummary::from_outcomes(&outcomes).failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
