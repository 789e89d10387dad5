//! GIF Conversion API Module
//!
//! ffprobe / ffmpeg backed implementations of the session's prober and
//! encoder. The GIF is written to `<name>.gif.part` and renamed on success, so
//! a failed or interrupted run never leaves a truncated `.gif` behind.

use crate::error::Result;
use crate::session::{ConversionJob, GifEncoder, VideoProber};
use crate::video_info::VideoInfo;
use crate::filter_graph::OUTPUT_LABEL;
use shared_utils::errors::MediaToolError;
use shared_utils::ffmpeg_process::{
    format_ffmpeg_error, get_error_suggestion, FfmpegProcess, FfmpegProgressParser,
};
use shared_utils::ffprobe::probe_video;
use std::ffi::OsString;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct FfprobeProber {
    ffprobe: PathBuf,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe: PathBuf, timeout: Duration) -> Self {
        Self { ffprobe, timeout }
    }
}

impl VideoProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<VideoInfo> {
        let result = probe_video(&self.ffprobe, path, self.timeout)?;
        Ok(VideoInfo::from_probe(&result, path)?)
    }
}

pub struct FfmpegGifEncoder {
    ffmpeg: PathBuf,
}

impl FfmpegGifEncoder {
    pub fn new(ffmpeg: PathBuf) -> Self {
        Self { ffmpeg }
    }

    /// Full argument list for writing `job` to `output`. Paths are passed as
    /// `OsString` so names that are not valid UTF-8 reach ffmpeg unchanged.
    pub fn build_args(job: &ConversionJob, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-nostats", "-progress", "pipe:1", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(job.input.as_os_str().to_os_string());
        args.push("-filter_complex".into());
        args.push(job.graph.to_filter_complex().into());
        args.push("-map".into());
        args.push(format!("[{}]", OUTPUT_LABEL).into());
        args.push("-f".into());
        args.push("gif".into());
        args.push(output.as_os_str().to_os_string());
        args
    }
}

pub fn partial_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    output.with_file_name(name)
}

/// Map a 0.0..=1.0 fraction to whole percent.
pub fn to_percent(fraction: f64) -> u8 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

impl GifEncoder for FfmpegGifEncoder {
    fn convert(&self, job: &ConversionJob, on_progress: &mut dyn FnMut(u8)) -> Result<PathBuf> {
        let temp = partial_path(&job.output);
        info!(
            input = %job.input.display(),
            output = %job.output.display(),
            filter = %job.graph,
            "🎞️  Converting to GIF"
        );

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(Self::build_args(job, &temp));
        let mut process = FfmpegProcess::spawn(&mut cmd)?;

        let mut parser = FfmpegProgressParser::new(job.expected_frames);
        if job.duration_secs > 0.0 {
            parser = parser.with_duration(job.duration_secs);
        }

        let mut last_percent = None;
        if let Some(stdout) = process.take_stdout() {
            for line in BufReader::new(stdout).lines().map_while(|l| l.ok()) {
                if let Some(fraction) = parser.parse_line(&line) {
                    let percent = to_percent(fraction);
                    if last_percent != Some(percent) {
                        last_percent = Some(percent);
                        on_progress(percent);
                    }
                }
            }
        }

        let (status, stderr) = process.wait_with_output()?;
        if !status.success() {
            if let Err(e) = fs::remove_file(&temp) {
                debug!(path = %temp.display(), error = %e, "No partial output to remove");
            }
            let mut message = format_ffmpeg_error(&stderr);
            if let Some(hint) = get_error_suggestion(&stderr) {
                message = format!("{} ({})", message, hint);
            }
            return Err(MediaToolError::FfmpegFailed {
                message,
                exit_code: status.code(),
            }
            .into());
        }

        fs::rename(&temp, &job.output).map_err(|e| {
            warn!(from = %temp.display(), to = %job.output.display(), error = %e, "Rename failed");
            e
        })?;
        if last_percent != Some(100) {
            on_progress(100);
        }
        Ok(job.output.clone())
    }
}
