//! Content-hash manifest for directory sync
//!
//! Records the SHA-256 digest of every audio file last seen in a directory,
//! keyed by its `/`-separated path relative to that directory, so a later
//! sync only touches files that changed.
//! Stored as `clean_audio.json` inside the synced directory.

use crate::error::CleanError;
use crate::io::format::AudioFile;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Manifest file name inside a synced directory
pub const MANIFEST_FILE_NAME: &str = "clean_audio.json";

/// Digest recorded for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Lowercase hex SHA-256 of the file contents
    pub sha256: String,
}

/// Relative path → last-seen content digest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentManifest {
    files: BTreeMap<String, ManifestEntry>,
}

/// SHA-256 of a file's contents as lowercase hex
pub fn file_sha256(path: &Path) -> Result<String, CleanError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn key_for(dir: &Path, path: &Path) -> Result<String, CleanError> {
    let relative = path.strip_prefix(dir).map_err(|_| {
        CleanError::InvalidInput(format!("{} is not inside {}", path.display(), dir.display()))
    })?;
    let parts: Vec<_> = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return Err(CleanError::InvalidInput(format!("No file name in {}", path.display())));
    }
    Ok(parts.join("/"))
}

impl ContentManifest {
    /// Location of the manifest for `dir`
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE_NAME)
    }

    /// Load the manifest stored in `dir`, or an empty one if there is none
    ///
    /// # Errors
    ///
    /// Returns `CleanError::Io` if the file cannot be read and
    /// `CleanError::InvalidInput` if it is not a valid manifest.
    pub fn load(dir: &Path) -> Result<Self, CleanError> {
        let path = Self::path_in(dir);
        if !path.exists() {
            log::debug!("No manifest at {}, starting fresh", path.display());
            return Ok(Self::default());
        }

        let json = fs::read_to_string(&path)?;
        serde_json::from_str(&json).map_err(|e| {
            CleanError::InvalidInput(format!("Malformed manifest {}: {}", path.display(), e))
        })
    }

    /// Write the manifest into `dir`
    pub fn save(&self, dir: &Path) -> Result<(), CleanError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CleanError::InvalidInput(format!("Cannot serialize manifest: {}", e)))?;
        fs::write(Self::path_in(dir), json)?;
        log::debug!("Saved manifest with {} entries", self.files.len());
        Ok(())
    }

    /// Number of files tracked
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if no files are tracked
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Recorded digest for a path relative to the synced directory
    pub fn digest(&self, relative: &str) -> Option<&str> {
        self.files.get(relative).map(|entry| entry.sha256.as_str())
    }

    /// Hash `path` (inside `dir`) as it is now and record it
    pub fn record(&mut self, dir: &Path, path: &Path) -> Result<(), CleanError> {
        let sha256 = file_sha256(path)?;
        self.files.insert(key_for(dir, path)?, ManifestEntry { sha256 });
        Ok(())
    }

    /// True if `path` (inside `dir`) differs from or is missing in the manifest
    pub fn is_changed(&self, dir: &Path, path: &Path) -> Result<bool, CleanError> {
        let current = file_sha256(path)?;
        Ok(self.digest(&key_for(dir, path)?) != Some(current.as_str()))
    }

    /// Walk `dir` recursively and list audio files that changed since they
    /// were last recorded
    pub fn changed_files(&self, dir: &Path) -> Result<Vec<AudioFile>, CleanError> {
        let mut candidates = Vec::new();
        collect_audio_files(dir, &mut candidates)?;
        candidates.sort_by(|a, b| a.path.cmp(&b.path));

        let mut changed = Vec::new();
        for file in candidates {
            if self.is_changed(dir, &file.path)? {
                changed.push(file);
            }
        }

        log::debug!("{} changed audio files under {}", changed.len(), dir.display());
        Ok(changed)
    }
}

fn collect_audio_files(dir: &Path, out: &mut Vec<AudioFile>) -> Result<(), CleanError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_audio_files(&path, out)?;
        } else if let Ok(file) = AudioFile::from_path(path) {
            out.push(file);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.wav");
        fs::write(&path, b"abc").unwrap();

        assert_eq!(
            file_sha256(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = ContentManifest::load(dir.path()).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_changed_files_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.wav"), b"one").unwrap();
        fs::write(dir.path().join("sub").join("b.mp3"), b"two").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut manifest = ContentManifest::load(dir.path()).unwrap();
        let changed = manifest.changed_files(dir.path()).unwrap();
        assert_eq!(changed.len(), 2);

        for file in &changed {
            manifest.record(dir.path(), &file.path).unwrap();
        }
        manifest.save(dir.path()).unwrap();

        let reloaded = ContentManifest::load(dir.path()).unwrap();
        assert_eq!(reloaded, manifest);
        assert!(reloaded.changed_files(dir.path()).unwrap().is_empty());

        fs::write(dir.path().join("a.wav"), b"edited").unwrap();
        let changed = reloaded.changed_files(dir.path()).unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].file_name(), "a.wav");
        assert!(reloaded.digest("sub/b.mp3").is_some());
    }

    #[test]
    fn test_same_name_in_two_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        for (sub, body) in [("sub1", b"first"), ("sub2", b"other")] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            fs::write(dir.path().join(sub).join("x.wav"), body).unwrap();
        }

        let mut manifest = ContentManifest::default();
        for file in manifest.changed_files(dir.path()).unwrap() {
            manifest.record(dir.path(), &file.path).unwrap();
        }

        assert_eq!(manifest.len(), 2);
        assert_ne!(manifest.digest("sub1/x.wav"), manifest.digest("sub2/x.wav"));
        assert!(manifest.changed_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_path_outside_dir_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let path = other.path().join("a.wav");
        fs::write(&path, b"one").unwrap();

        let mut manifest = ContentManifest::default();
        assert!(matches!(
            manifest.record(dir.path(), &path),
            Err(CleanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(ContentManifest::path_in(dir.path()), b"[1, 2").unwrap();
        assert!(matches!(
            ContentManifest::load(dir.path()),
            Err(CleanError::InvalidInput(_))
        ));
    }
}
