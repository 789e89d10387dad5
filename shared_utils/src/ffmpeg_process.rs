//! FFmpeg process management
//!
//! ffmpeg is run with `-progress pipe:1`, so progress arrives on stdout as
//! `key=value` lines while the diagnostic log goes to stderr. Reading only
//! stdout would let stderr fill its pipe buffer and stall ffmpeg, so stderr is
//! drained on its own thread for the lifetime of the process.
//!
//! ```ignore
//! use shared_utils::ffmpeg_process::{FfmpegProcess, FfmpegProgressParser};
//! use std::io::{BufRead, BufReader};
//! use std::process::Command;
//!
//! let mut cmd = Command::new("ffmpeg");
//! cmd.args(["-progress", "pipe:1", "-i", "in.mp4", "out.gif"]);
//! let mut process = FfmpegProcess::spawn(&mut cmd)?;
//! let mut parser = FfmpegProgressParser::new(Some(120));
//! if let Some(stdout) = process.take_stdout() {
//!     for line in BufReader::new(stdout).lines() {
//!         if let Some(p) = parser.parse_line(&line?) {
//!             println!("{:.0}%", p * 100.0);
//!         }
//!     }
//! }
//! let (status, stderr) = process.wait_with_output()?;
//! ```

use crate::errors::{MediaToolError, Result};
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Running ffmpeg child with its stderr drained in the background.
pub struct FfmpegProcess {
    child: Child,
    stderr_thread: Option<JoinHandle<String>>,
}

impl FfmpegProcess {
    /// Spawn `cmd` with stdout and stderr piped.
    pub fn spawn(cmd: &mut Command) -> Result<Self> {
        info!(command = ?cmd, "Executing FFmpeg command");

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MediaToolError::ToolNotFound(format!("ffmpeg could not be started: {}", e))
            } else {
                MediaToolError::Io(e)
            }
        })?;

        let stderr = child.stderr.take().ok_or_else(|| MediaToolError::FfmpegFailed {
            message: "Failed to capture FFmpeg stderr".to_string(),
            exit_code: None,
        })?;

        let stderr_thread = thread::spawn(move || {
            let mut buf = String::new();
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                buf.push_str(&line);
                buf.push('\n');
            }
            buf
        });

        Ok(Self {
            child,
            stderr_thread: Some(stderr_thread),
        })
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Wait for exit; returns the status and everything ffmpeg wrote to stderr.
    pub fn wait_with_output(mut self) -> Result<(ExitStatus, String)> {
        let status = self.child.wait()?;
        let stderr = self
            .stderr_thread
            .take()
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();

        if status.success() {
            info!(exit_code = status.code(), "FFmpeg process completed successfully");
            debug!(stderr_output = %stderr, "FFmpeg stderr output");
        } else {
            error!(
                exit_code = status.code(),
                stderr_output = %stderr,
                "FFmpeg process failed"
            );
        }

        Ok((status, stderr))
    }
}

/// Turns `-progress` key/value lines into a completion fraction.
///
/// Understands `frame=`, `fps=`, `out_time=` (and the legacy `time=` from
/// `-stats` lines) and `progress=end`.
#[derive(Debug, Clone)]
pub struct FfmpegProgressParser {
    total_frames: Option<u64>,
    total_duration: Option<f64>,
    current_frame: u64,
    current_time: f64,
    current_fps: f64,
    finished: bool,
}

impl FfmpegProgressParser {
    pub fn new(total_frames: Option<u64>) -> Self {
        Self {
            total_frames,
            total_duration: None,
            current_frame: 0,
            current_time: 0.0,
            current_fps: 0.0,
            finished: false,
        }
    }

    pub fn with_duration(mut self, total_duration: f64) -> Self {
        self.total_duration = Some(total_duration);
        self
    }

    /// Feed one line; returns the progress in `0.0..=1.0` when it can be computed.
    pub fn parse_line(&mut self, line: &str) -> Option<f64> {
        let (key, value) = line.trim().split_once('=')?;
        let value = value.trim();

        match key.trim() {
            "frame" => {
                if let Ok(frame) = value.parse::<u64>() {
                    self.current_frame = frame;
                }
            }
            "fps" => {
                if let Ok(fps) = value.parse::<f64>() {
                    self.current_fps = fps;
                }
            }
            "out_time" | "time" => {
                if let Some(time) = Self::parse_time(value) {
                    self.current_time = time;
                }
            }
            "progress" if value == "end" => {
                self.finished = true;
            }
            _ => {}
        }

        self.calculate_progress()
    }

    /// `HH:MM:SS.micro`; ffmpeg prints a negative time before the first frame.
    fn parse_time(time_str: &str) -> Option<f64> {
        let mut parts = time_str.split(':');
        let hours: f64 = parts.next()?.parse().ok()?;
        let minutes: f64 = parts.next()?.parse().ok()?;
        let seconds: f64 = parts.next()?.parse().ok()?;
        if parts.next().is_some() || hours < 0.0 {
            return None;
        }
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    }

    fn calculate_progress(&self) -> Option<f64> {
        if self.finished {
            return Some(1.0);
        }

        if let Some(total) = self.total_frames {
            if total > 0 && self.current_frame > 0 {
                return Some((self.current_frame as f64 / total as f64).min(1.0));
            }
        }

        if let Some(total) = self.total_duration {
            if total > 0.0 && self.current_time > 0.0 {
                return Some((self.current_time / total).min(1.0));
            }
        }

        None
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn current_fps(&self) -> f64 {
        self.current_fps
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Pick the most meaningful line out of ffmpeg's stderr.
///
/// Prefers the last line mentioning an error, then the last non-progress
/// line, then a generic message.
pub fn format_ffmpeg_error(stderr: &str) -> String {
    if let Some(error_line) = stderr
        .lines()
        .rev()
        .find(|line| line.contains("Error") || line.contains("error"))
    {
        return error_line.trim().to_string();
    }

    stderr
        .lines()
        .rev()
        .find(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && !trimmed.starts_with("frame=")
                && !trimmed.starts_with("fps=")
                && !trimmed.starts_with("size=")
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "Unknown FFmpeg error".to_string())
}

/// A hint for the common ffmpeg failures seen when writing GIFs.
pub fn get_error_suggestion(stderr: &str) -> Option<&'static str> {
    const PATTERNS: &[(&str, &str)] = &[
        ("No such file or directory", "Check that the input file and output folder exist"),
        ("Invalid data found", "The input file may be corrupted; try re-exporting it"),
        ("Permission denied", "Check read/write permissions on the input and output"),
        ("No space left on device", "Free some disk space or pick another output folder"),
        ("Output file is empty", "Nothing was encoded; check the source has video frames"),
        ("moov atom not found", "The MP4 is incomplete (interrupted recording or download)"),
    ];

    PATTERNS
        .iter()
        .find(|(pattern, _)| stderr.contains(pattern))
        .map(|(_, suggestion)| *suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ffmpeg_error_with_error_line() {
        let stderr = r#"
frame=  100 fps=25.0 q=-0.0 size=    1024kB time=00:00:04.00 bitrate=2097.2kbits/s
[Parsed_palettegen_3 @ 0x7f8b8c000000] Error: invalid max_colors
"#;
        let error = format_ffmpeg_error(stderr);
        assert!(error.contains("Error"));
        assert!(error.contains("max_colors"));
    }

    #[test]
    fn test_format_ffmpeg_error_no_error_line() {
        let stderr = r#"
frame=  100 fps=25.0 q=-0.0 size=    1024kB time=00:00:04.00
Conversion failed!
"#;
        assert_eq!(format_ffmpeg_error(stderr), "Conversion failed!");
    }

    #[test]
    fn test_format_ffmpeg_error_empty() {
        assert_eq!(format_ffmpeg_error(""), "Unknown FFmpeg error");
    }

    #[test]
    fn test_progress_parser_frame() {
        let mut parser = FfmpegProgressParser::new(Some(120));
        assert_eq!(parser.parse_line("frame=60"), Some(0.5));
        assert_eq!(parser.current_frame(), 60);
    }

    #[test]
    fn test_progress_parser_out_time() {
        let mut parser = FfmpegProgressParser::new(None).with_duration(120.0);
        assert_eq!(parser.parse_line("out_time=00:01:00.000000"), Some(0.5));
        assert!((parser.current_time() - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_progress_parser_negative_time_ignored() {
        let mut parser = FfmpegProgressParser::new(None).with_duration(10.0);
        assert_eq!(parser.parse_line("out_time=-577014:32:22.775808"), None);
    }

    #[test]
    fn test_progress_parser_end() {
        let mut parser = FfmpegProgressParser::new(Some(1000));
        parser.parse_line("frame=10");
        assert_eq!(parser.parse_line("progress=end"), Some(1.0));
        assert!(parser.is_finished());
    }

    #[test]
    fn test_progress_parser_fps_and_noise() {
        let mut parser = FfmpegProgressParser::new(None);
        assert_eq!(parser.parse_line("fps=29.97"), None);
        assert!((parser.current_fps() - 29.97).abs() < 0.01);
        assert_eq!(parser.parse_line("bitrate=N/A"), None);
        assert_eq!(parser.parse_line("garbage without equals"), None);
    }

    #[test]
    fn test_error_suggestion() {
        assert!(get_error_suggestion("out.gif: Permission denied").is_some());
        assert!(get_error_suggestion("all good").is_none());
    }
}
