//! Per-file processing, parallel batches and directory sync
//!
//! Parallelism is across files only; each clip is cleaned single-threaded.
//! A failing file never aborts the batch: it becomes a
//! [`FileStatus::Failed`] outcome and the rest carry on.

use crate::clean_audio;
use crate::config::ThresholdConfig;
use crate::error::CleanError;
use crate::io::format::AudioFile;
use crate::manifest::ContentManifest;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Cleaned clip written to `output`
    Processed {
        /// Destination path
        output: PathBuf,
        /// Duration before cleaning
        input_ms: u64,
        /// Duration after cleaning
        output_ms: u64,
        /// Normalization gain in dB
        gain_db: f32,
    },
    /// Left alone, with the reason
    Skipped {
        /// Why the file was not processed
        reason: String,
    },
    /// Processing failed
    Failed {
        /// Error message
        error: String,
    },
}

/// Outcome for one input file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    /// Input path
    pub path: PathBuf,
    /// Result
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Outcome counts for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Files written
    pub processed: usize,
    /// Files left alone
    pub skipped: usize,
    /// Files that failed
    pub failed: usize,
}

impl BatchSummary {
    /// Tally a list of outcomes
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut acc, outcome| {
            match outcome.status {
                FileStatus::Processed { .. } => acc.processed += 1,
                FileStatus::Skipped { .. } => acc.skipped += 1,
                FileStatus::Failed { .. } => acc.failed += 1,
            }
            acc
        })
    }
}

/// Default worker count: available CPU threads minus one, at least one
pub fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn clean_file(
    file: &AudioFile,
    output_dir: &Path,
    config: &ThresholdConfig,
) -> Result<FileStatus, CleanError> {
    let (target, format) = file.output_target(output_dir)?;
    let encode = format.encoder().ok_or_else(|| {
        CleanError::UnsupportedFormat(format!("no encoder for .{}", format.extension()))
    })?;

    let waveform = file.decode()?;
    let result = clean_audio(&waveform, config)?;

    if result.waveform.is_empty() {
        return Ok(FileStatus::Skipped {
            reason: format!("nothing left after trimming ({:?})", result.metadata.flags),
        });
    }

    encode(&result.waveform, &target)?;

    Ok(FileStatus::Processed {
        output: target,
        input_ms: result.metadata.input_duration_ms,
        output_ms: result.metadata.output_duration_ms,
        gain_db: result.metadata.loudness.gain_db,
    })
}

/// Clean one file into `output_dir`
///
/// Unsupported formats become `Skipped` with a warning; every other error
/// becomes `Failed`.
pub fn process_file(file: &AudioFile, output_dir: &Path, config: &ThresholdConfig) -> FileOutcome {
    log::info!("Processing {}", file.path.display());

    let status = match clean_file(file, output_dir, config) {
        Ok(status) => status,
        Err(CleanError::UnsupportedFormat(reason)) => {
            log::warn!("Skipping {}: {}", file.path.display(), reason);
            FileStatus::Skipped { reason }
        }
        Err(e) => {
            log::warn!("Failed {}: {}", file.path.display(), e);
            FileStatus::Failed {
                error: e.to_string(),
            }
        }
    };

    FileOutcome {
        path: file.path.clone(),
        status,
    }
}

/// Clean many files in parallel
///
/// # Arguments
///
/// * `files` - Inputs, already resolved by discovery
/// * `output_dir` - Destination directory (created if missing)
/// * `config` - Thresholds
/// * `jobs` - Worker threads (0 means [`default_jobs`])
///
/// # Returns
///
/// One outcome per input, in input order. An input whose output path is
/// already claimed by an earlier input fails without being processed.
///
/// # Errors
///
/// Returns `CleanError` only for problems that affect the whole batch: an
/// invalid config, an output directory that cannot be created, or a thread
/// pool that cannot be built.
pub fn process_batch(
    files: &[AudioFile],
    output_dir: &Path,
    config: &ThresholdConfig,
    jobs: usize,
) -> Result<Vec<FileOutcome>, CleanError> {
    config.validate()?;
    fs::create_dir_all(output_dir)?;

    let jobs = if jobs == 0 { default_jobs() } else { jobs };
    log::debug!("Batch: {} files, jobs={}", files.len(), jobs);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| CleanError::InvalidInput(format!("Cannot build thread pool: {}", e)))?;

    let claimed_by = output_collisions(files, output_dir);
    let outcomes = pool.install(|| {
        files
            .par_iter()
            .zip(claimed_by.par_iter())
            .map(|(file, earlier)| match earlier {
                Some(earlier) => collision_outcome(file, earlier),
                None => process_file(file, output_dir, config),
            })
            .collect()
    });

    Ok(outcomes)
}

/// For each input, the earlier input that already targets the same output path
fn output_collisions(files: &[AudioFile], output_dir: &Path) -> Vec<Option<PathBuf>> {
    let mut owners: HashMap<PathBuf, &Path> = HashMap::new();
    files
        .iter()
        .map(|file| {
            let (target, _) = file.output_target(output_dir).ok()?;
            match owners.get(&target) {
                Some(owner) => Some(owner.to_path_buf()),
                None => {
                    owners.insert(target, &file.path);
                    None
                }
            }
        })
        .collect()
}

fn collision_outcome(file: &AudioFile, earlier: &Path) -> FileOutcome {
    let error = CleanError::InvalidInput(format!(
        "{} has the same output name as {}",
        file.path.display(),
        earlier.display()
    ));
    log::warn!("Failed {}: {}", file.path.display(), error);
    FileOutcome {
        path: file.path.clone(),
        status: FileStatus::Failed {
            error: error.to_string(),
        },
    }
}

/// Directory sync options
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Only report what would be processed
    pub simulate: bool,
    /// Worker threads (0 means [`default_jobs`])
    pub jobs: usize,
}

/// Result of a directory sync
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Files whose content changed since the last sync
    pub changed: Vec<AudioFile>,
    /// Per-file outcomes (empty when simulating)
    pub outcomes: Vec<FileOutcome>,
}

/// Clean every audio file in `dir` that changed since the last sync, in place
///
/// Changed files are cleaned into a temporary directory and copied back over
/// the originals. Digests of rewritten and skipped files are then recorded in
/// the directory's manifest so the next sync leaves them alone; failed files
/// stay unrecorded and are retried next time. Formats that cannot be written
/// back under the same name are skipped.
pub fn sync_directory(
    dir: &Path,
    config: &ThresholdConfig,
    options: &SyncOptions,
) -> Result<SyncReport, CleanError> {
    config.validate()?;
    if !dir.is_dir() {
        return Err(CleanError::InvalidInput(format!(
            "Not a directory - {}",
            dir.display()
        )));
    }

    let mut manifest = ContentManifest::load(dir)?;
    let changed = manifest.changed_files(dir)?;

    if changed.is_empty() {
        log::info!("Nothing needs to be done in {}", dir.display());
        return Ok(SyncReport::default());
    }
    if options.simulate {
        return Ok(SyncReport {
            changed,
            outcomes: vec![],
        });
    }

    let (rewritable, fixed): (Vec<AudioFile>, Vec<AudioFile>) =
        changed.iter().cloned().partition(AudioFile::can_rewrite_in_place);

    let staging = tempfile::tempdir()?;
    let mut outcomes = Vec::with_capacity(changed.len());

    for file in fixed {
        log::warn!(
            "Skipping {}: cannot rewrite .{} in place",
            file.path.display(),
            file.format.extension()
        );
        outcomes.push(FileOutcome {
            path: file.path,
            status: FileStatus::Skipped {
                reason: format!("cannot rewrite .{} in place", file.format.extension()),
            },
        });
    }

    let staged = process_staged(&rewritable, staging.path(), config, options.jobs)?;
    for (file, staged) in rewritable.iter().zip(staged) {
        let original = &file.path;
        let status = match staged.status {
            FileStatus::Processed {
                output,
                input_ms,
                output_ms,
                gain_db,
            } => match fs::copy(&output, original) {
                Ok(_) => FileStatus::Processed {
                    output: original.clone(),
                    input_ms,
                    output_ms,
                    gain_db,
                },
                Err(e) => FileStatus::Failed {
                    error: format!("cannot copy back: {}", e),
                },
            },
            other => other,
        };
        outcomes.push(FileOutcome {
            path: original.clone(),
            status,
        });
    }

    for outcome in &outcomes {
        if !matches!(outcome.status, FileStatus::Failed { .. }) {
            manifest.record(dir, &outcome.path)?;
        }
    }
    manifest.save(dir)?;

    Ok(SyncReport { changed, outcomes })
}

fn process_staged(
    files: &[AudioFile],
    staging: &Path,
    config: &ThresholdConfig,
    jobs: usize,
) -> Result<Vec<FileOutcome>, CleanError> {
    // Recursive walks can yield the same file name twice, so each input gets its own slot
    let slots: Vec<PathBuf> = (0..files.len()).map(|i| staging.join(i.to_string())).collect();
    for slot in &slots {
        fs::create_dir_all(slot)?;
    }

    let jobs = if jobs == 0 { default_jobs() } else { jobs };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| CleanError::InvalidInput(format!("Cannot build thread pool: {}", e)))?;

    Ok(pool.install(|| {
        files
            .par_iter()
            .zip(slots.par_iter())
            .map(|(file, slot)| process_file(file, slot, config))
            .collect()
    }))
}
