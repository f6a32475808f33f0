//! Input expansion: single file, directory listing or wildcard pattern
//!
//! Every candidate is checked against the format allow-list and resolved to
//! an [`AudioFile`] once. Unrecognised files in a directory or pattern are
//! silently filtered; a single explicit file with an unrecognised extension
//! is skipped with a warning.

use crate::error::CleanError;
use crate::io::format::AudioFile;
use std::fs;
use std::path::{Path, PathBuf};

/// True if `input` is a wildcard pattern rather than a literal path
pub fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?'])
}

/// Expand one input into the audio files it names
///
/// # Arguments
///
/// * `input` - A file path, a directory (listed non-recursively) or a
///   pattern with `*`/`?` wildcards in its file-name component
///
/// # Returns
///
/// Recognised audio files, sorted by path
///
/// # Errors
///
/// Returns `CleanError::InvalidInput` if the path does not exist or the
/// pattern puts wildcards in a directory component, and `CleanError::Io`
/// if a directory cannot be listed.
pub fn discover(input: &str) -> Result<Vec<AudioFile>, CleanError> {
    if is_pattern(input) {
        return discover_pattern(input);
    }

    let path = Path::new(input);
    if path.is_file() {
        return Ok(match AudioFile::from_path(path) {
            Ok(file) => vec![file],
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                vec![]
            }
        });
    }
    if path.is_dir() {
        return list_dir(path, |_| true);
    }

    Err(CleanError::InvalidInput(format!("Invalid input - {}", input)))
}

/// Expand several inputs, dropping duplicates while keeping first-seen order
pub fn discover_all<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<AudioFile>, CleanError> {
    let mut files: Vec<AudioFile> = Vec::new();
    for input in inputs {
        for file in discover(input.as_ref())? {
            if !files.iter().any(|f| f.path == file.path) {
                files.push(file);
            }
        }
    }
    log::debug!("Discovered {} audio files", files.len());
    Ok(files)
}

fn discover_pattern(input: &str) -> Result<Vec<AudioFile>, CleanError> {
    let path = Path::new(input);
    let name_pattern = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CleanError::InvalidInput(format!("Invalid pattern - {}", input)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if is_pattern(&dir.to_string_lossy()) {
        return Err(CleanError::InvalidInput(format!(
            "Wildcards are only supported in the file name - {}",
            input
        )));
    }
    if !dir.is_dir() {
        return Ok(vec![]);
    }

    let pattern: Vec<char> = name_pattern.chars().collect();
    list_dir(&dir, |name| {
        let name: Vec<char> = name.chars().collect();
        wildcard_match(&pattern, &name)
    })
}

fn list_dir<F>(dir: &Path, keep: F) -> Result<Vec<AudioFile>, CleanError>
where
    F: Fn(&str) -> bool,
{
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        if !keep(&name) {
            continue;
        }
        if let Ok(file) = AudioFile::from_path(path) {
            files.push(file);
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Match `*` (any run, including empty) and `?` (one character)
fn wildcard_match(pattern: &[char], name: &[char]) -> bool {
    let (mut p, mut n) = (0, 0);
    // Last `*` seen and the name position it is currently absorbing up to
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, absorbed)) => {
                    p = star + 1;
                    n = absorbed + 1;
                    backtrack = Some((star, absorbed + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::format::AudioFormat;

    fn matches(pattern: &str, name: &str) -> bool {
        let p: Vec<char> = pattern.chars().collect();
        let n: Vec<char> = name.chars().collect();
        wildcard_match(&p, &n)
    }

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[test]
    fn test_wildcard_match() {
        assert!(matches("*.wav", "hello.wav"));
        assert!(matches("*.wav", ".wav"));
        assert!(!matches("*.wav", "hello.mp3"));
        assert!(matches("word_??.mp3", "word_01.mp3"));
        assert!(!matches("word_??.mp3", "word_1.mp3"));
        assert!(matches("a*b*c", "aXXbYYbc"));
        assert!(!matches("a*b*c", "aXXbYYb"));
        assert!(matches("*", ""));
        assert!(matches("**x", "abx"));
    }

    #[test]
    fn test_directory_listing_filters() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["b.mp3", "a.wav", "notes.txt", "c.3gp"]);
        fs::create_dir(dir.path().join("nested.wav")).unwrap();

        let files = discover(dir.path().to_str().unwrap()).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["a.wav", "b.mp3", "c.3gp"]);
        assert_eq!(files[1].format, AudioFormat::Mp3);
    }

    #[test]
    fn test_pattern() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["word1.wav", "word2.wav", "word1.mp3", "other.wav", "word3.txt"]);

        let pattern = dir.path().join("word*").to_string_lossy().into_owned();
        let names: Vec<String> = discover(&pattern).unwrap().iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["word1.mp3", "word1.wav", "word2.wav"]);
    }

    #[test]
    fn test_pattern_in_directory_rejected() {
        assert!(matches!(
            discover("/tmp/*/clip.wav"),
            Err(CleanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_single_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["one.wav", "readme.md"]);

        let one = discover(dir.path().join("one.wav").to_str().unwrap()).unwrap();
        assert_eq!(one.len(), 1);

        let skipped = discover(dir.path().join("readme.md").to_str().unwrap()).unwrap();
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_missing_input() {
        assert!(matches!(
            discover("/nonexistent/path/clip.wav"),
            Err(CleanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_discover_all_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.wav", "b.wav"]);
        let a = dir.path().join("a.wav").to_string_lossy().into_owned();
        let all = dir.path().to_string_lossy().into_owned();

        let files = discover_all(&[a, all]).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["a.wav", "b.wav"]);
    }
}
