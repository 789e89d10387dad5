//! Batch Processing Module
//!
//! Input collection for batch runs and the per-run success/failure tally.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source containers offered by the file picker.
pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] =
    &["mp4", "mov", "avi", "mkv", "wmv", "flv", "webm", "m4v"];

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

pub fn collect_files(dir: &Path, extensions: &[&str], recursive: bool) -> Vec<PathBuf> {
    let walker = if recursive {
        WalkDir::new(dir).follow_links(true)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(e.path(), extensions))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Expand a mixed list of files and directories into video files, keeping the
/// caller's order. Explicit files are kept even with an unknown extension so
/// the prober can report on them.
pub fn collect_inputs(inputs: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(collect_files(input, SUPPORTED_VIDEO_EXTENSIONS, recursive));
        } else {
            files.push(input.clone());
        }
    }
    files
}

#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<(PathBuf, String)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn fail(&mut self, path: PathBuf, error: String) {
        self.total += 1;
        self.failed += 1;
        self.errors.push((path, error));
    }

    pub fn skip(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }
}
