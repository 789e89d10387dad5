//! Batch session
//!
//! Owns the list of queued files and drives each one through
//! `Ready → Converting → Completed | Error`. Conversion is sequential: at most
//! one file is `Converting` at any time.

use crate::error::{GifError, Result};
use crate::filter_graph::FilterGraph;
use crate::settings::ConversionSettings;
use crate::size_estimate::{self, SizeEstimate};
use crate::video_info::VideoInfo;
use serde::Serialize;
use shared_utils::batch::BatchResult;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const PROBE_FAILED_MESSAGE: &str = "Could not read video information";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ready,
    Converting,
    Completed,
    Error,
}

impl FileStatus {
    pub fn can_transition_to(self, next: FileStatus) -> bool {
        matches!(
            (self, next),
            (FileStatus::Ready, FileStatus::Converting)
                | (FileStatus::Converting, FileStatus::Completed)
                | (FileStatus::Converting, FileStatus::Error)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FileStatus::Completed | FileStatus::Error)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Ready => "ready",
            FileStatus::Converting => "converting",
            FileStatus::Completed => "completed",
            FileStatus::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub info: Option<VideoInfo>,
    status: FileStatus,
    progress: u8,
    output_path: Option<PathBuf>,
    error: Option<String>,
}

impl FileEntry {
    fn probed(path: PathBuf, info: VideoInfo) -> Self {
        Self {
            name: display_name(&path),
            path,
            info: Some(info),
            status: FileStatus::Ready,
            progress: 0,
            output_path: None,
            error: None,
        }
    }

    /// Probe failed: the entry starts in `Error` and is never converted.
    fn unreadable(path: PathBuf) -> Self {
        Self {
            name: display_name(&path),
            path,
            info: None,
            status: FileStatus::Error,
            progress: 0,
            output_path: None,
            error: Some(PROBE_FAILED_MESSAGE.to_string()),
        }
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    /// Percent, 0..=100.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn estimate(&self, settings: &ConversionSettings) -> Option<SizeEstimate> {
        size_estimate::estimate(self.info.as_ref(), settings)
    }

    fn transition(&mut self, to: FileStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(GifError::InvalidTransition {
                path: self.path.clone(),
                from: self.status,
                to,
            });
        }
        debug!(path = %self.path.display(), from = %self.status, to = %to, "File status change");
        self.status = to;
        Ok(())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<stem>.gif` in `output_dir`, or next to the source.
pub fn output_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    dir.join(format!("{}.gif", stem))
}

/// Reads source metadata.
pub trait VideoProber {
    fn probe(&self, path: &Path) -> Result<VideoInfo>;
}

/// Everything an encoder needs for one file.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub graph: FilterGraph,
    /// Frames the GIF will contain, when the duration is known.
    pub expected_frames: Option<u64>,
    pub duration_secs: f64,
}

/// Writes one GIF, reporting integer percent progress.
pub trait GifEncoder {
    fn convert(&self, job: &ConversionJob, on_progress: &mut dyn FnMut(u8)) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub output_dir: Option<PathBuf>,
    /// Overwrite existing GIFs instead of skipping them.
    pub force: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AddOutcome {
    pub added: usize,
    pub duplicates: usize,
    pub unreadable: usize,
}

/// Progress notifications from `convert_all`, keyed by source path.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent<'a> {
    Started { path: &'a Path, index: usize },
    Progress { path: &'a Path, percent: u8 },
    Finished { path: &'a Path, output: &'a Path, bytes: u64 },
    Failed { path: &'a Path, error: &'a str },
    Skipped { path: &'a Path, reason: &'a str },
    Stats { completed: usize, total: usize },
}

#[derive(Debug, Clone, Default)]
pub struct ConvertSummary {
    pub result: BatchResult,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

#[derive(Debug, Default)]
pub struct Session {
    files: Vec<FileEntry>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn is_converting(&self) -> bool {
        self.files.iter().any(|f| f.status == FileStatus::Converting)
    }

    pub fn has_ready_files(&self) -> bool {
        self.files.iter().any(|f| f.status == FileStatus::Ready)
    }

    /// Probe and queue `paths`. Paths already in the session are skipped; a
    /// failed probe queues the file in `Error`.
    pub fn add_files<I>(&mut self, paths: I, prober: &dyn VideoProber) -> AddOutcome
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut outcome = AddOutcome::default();

        for path in paths {
            if self.files.iter().any(|f| f.path == path) {
                debug!(path = %path.display(), "Already queued, skipping");
                outcome.duplicates += 1;
                continue;
            }

            let entry = match prober.probe(&path) {
                Ok(info) => {
                    info!(path = %path.display(), info = %info.info_line(), "Queued");
                    FileEntry::probed(path, info)
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Probe failed");
                    outcome.unreadable += 1;
                    FileEntry::unreadable(path)
                }
            };
            outcome.added += 1;
            self.files.push(entry);
        }

        outcome
    }

    pub fn remove(&mut self, index: usize) -> Result<FileEntry> {
        if self.is_converting() {
            return Err(GifError::Busy);
        }
        if index >= self.files.len() {
            return Err(GifError::NoSuchFile(index));
        }
        Ok(self.files.remove(index))
    }

    pub fn clear(&mut self) -> Result<()> {
        if self.is_converting() {
            return Err(GifError::Busy);
        }
        self.files.clear();
        Ok(())
    }

    /// Move a `Ready` file to `Converting` and build its job.
    pub fn start_conversion(
        &mut self,
        index: usize,
        settings: &ConversionSettings,
        output: &OutputOptions,
    ) -> Result<ConversionJob> {
        if self.is_converting() {
            return Err(GifError::Busy);
        }
        let entry = self.files.get_mut(index).ok_or(GifError::NoSuchFile(index))?;
        entry.transition(FileStatus::Converting)?;
        entry.progress = 0;

        let source = entry.info.as_ref().map(VideoInfo::dimensions);
        let graph = FilterGraph::build(settings, source);
        let duration_secs = entry.info.as_ref().map(|i| i.duration_secs).unwrap_or(0.0);
        let expected_frames = Some(size_estimate::total_frames(duration_secs, graph.frame_rate))
            .filter(|&n| n > 0);

        Ok(ConversionJob {
            input: entry.path.clone(),
            output: output_path_for(&entry.path, output.output_dir.as_deref()),
            graph,
            expected_frames,
            duration_secs,
        })
    }

    pub fn set_progress(&mut self, index: usize, percent: u8) -> Result<()> {
        let entry = self.files.get_mut(index).ok_or(GifError::NoSuchFile(index))?;
        if entry.status == FileStatus::Converting {
            entry.progress = percent.min(100);
        }
        Ok(())
    }

    /// Record the encoder's outcome for a `Converting` file.
    pub fn finish_conversion(
        &mut self,
        index: usize,
        outcome: std::result::Result<PathBuf, String>,
    ) -> Result<()> {
        let entry = self.files.get_mut(index).ok_or(GifError::NoSuchFile(index))?;
        match outcome {
            Ok(output) => {
                entry.transition(FileStatus::Completed)?;
                entry.progress = 100;
                entry.output_path = Some(output);
            }
            Err(message) => {
                entry.transition(FileStatus::Error)?;
                entry.error = Some(message);
            }
        }
        Ok(())
    }

    /// Convert every `Ready` file in list order, one at a time.
    ///
    /// `Stats` counts against the files that were `Ready` when the batch
    /// started. A file whose output was already written earlier in the same
    /// batch (`a.mp4` and `a.mov` both map to `a.gif`) is skipped, even with
    /// `force`.
    pub fn convert_all(
        &mut self,
        settings: &ConversionSettings,
        encoder: &dyn GifEncoder,
        output: &OutputOptions,
        observer: &mut dyn FnMut(SessionEvent<'_>),
    ) -> Result<ConvertSummary> {
        if self.is_converting() {
            return Err(GifError::Busy);
        }
        if let Some(dir) = &output.output_dir {
            std::fs::create_dir_all(dir)?;
        }

        let mut summary = ConvertSummary::default();
        let mut written: HashSet<PathBuf> = HashSet::new();
        let total = self
            .files
            .iter()
            .filter(|f| f.status == FileStatus::Ready)
            .count();
        info!(settings = %settings, files = total, "Starting batch conversion");

        for index in 0..self.files.len() {
            if self.files[index].status != FileStatus::Ready {
                continue;
            }
            let path = self.files[index].path.clone();
            let target = output_path_for(&path, output.output_dir.as_deref());

            if target == path {
                let reason = "Output would overwrite the source";
                warn!(path = %path.display(), "{}", reason);
                observer(SessionEvent::Skipped { path: &path, reason });
                summary.result.skip();
                continue;
            }
            if written.contains(&target) {
                let reason = "Another file in this batch already wrote this output";
                warn!(path = %path.display(), output = %target.display(), "{}", reason);
                observer(SessionEvent::Skipped { path: &path, reason });
                summary.result.skip();
                continue;
            }
            if target.exists() && !output.force {
                let reason = "Output exists (use --force to overwrite)";
                info!(path = %path.display(), output = %target.display(), "Skipping, output exists");
                observer(SessionEvent::Skipped { path: &path, reason });
                summary.result.skip();
                continue;
            }

            let job = self.start_conversion(index, settings, output)?;
            observer(SessionEvent::Started { path: &path, index });

            let mut last_percent = 0u8;
            let result = encoder.convert(&job, &mut |percent| {
                last_percent = percent;
                observer(SessionEvent::Progress { path: &path, percent });
            });
            self.set_progress(index, last_percent)?;

            let input_bytes = self.files[index]
                .info
                .as_ref()
                .map(|i| i.size_bytes)
                .unwrap_or(0);

            match result {
                Ok(gif) => {
                    let bytes = std::fs::metadata(&gif).map(|m| m.len()).unwrap_or(0);
                    info!(path = %path.display(), output = %gif.display(), bytes, "GIF written");
                    observer(SessionEvent::Finished { path: &path, output: &gif, bytes });
                    summary.result.success();
                    summary.input_bytes += input_bytes;
                    summary.output_bytes += bytes;
                    written.insert(target);
                    self.finish_conversion(index, Ok(gif))?;
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!(path = %path.display(), error = %message, "Conversion failed");
                    observer(SessionEvent::Failed { path: &path, error: &message });
                    summary.result.fail(path.clone(), message.clone());
                    self.finish_conversion(index, Err(message))?;
                }
            }

            observer(SessionEvent::Stats {
                completed: summary.result.succeeded,
                total,
            });
        }

        Ok(summary)
    }
}
