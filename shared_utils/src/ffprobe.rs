//! FFprobe wrapper module
//!
//! Reads the container and first video stream of a source file. Used by the
//! vid-gif prober before any size prediction or conversion happens.

use crate::errors::{MediaToolError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// How long a single probe may run before it is killed.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Frame rate assumed when the stream does not report a usable one.
pub const FALLBACK_FRAME_RATE: f64 = 30.0;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FFprobeResult {
    pub format_name: String,
    pub duration: f64,
    /// Container size as reported by ffprobe; 0 when missing.
    pub size: u64,
    pub video_codec: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
}

/// Probe `path` with the ffprobe binary at `ffprobe`.
///
/// Errors carry user-facing messages; the raw stderr is logged.
pub fn probe_video(ffprobe: &Path, path: &Path, timeout: Duration) -> Result<FFprobeResult> {
    if !path.exists() {
        return Err(MediaToolError::ProbeFailed {
            path: path.to_path_buf(),
            message: "File does not exist".to_string(),
        });
    }
    if !path.is_file() {
        return Err(MediaToolError::ProbeFailed {
            path: path.to_path_buf(),
            message: format!("Not a file (is it a directory?): {}", path.display()),
        });
    }

    debug!(path = %path.display(), "Running ffprobe");

    let mut child = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "--",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            error!(tool = %ffprobe.display(), error = %e, "Failed to spawn ffprobe");
            if e.kind() == std::io::ErrorKind::NotFound {
                MediaToolError::ToolNotFound(
                    "Video processing tools are missing. Please check your ffmpeg installation."
                        .to_string(),
                )
            } else {
                MediaToolError::Io(e)
            }
        })?;

    // Drain both pipes on their own threads so a chatty ffprobe cannot block.
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let stdout_thread = thread::spawn(move || {
        let mut buf = String::new();
        if let Some(out) = stdout.as_mut() {
            let _ = out.read_to_string(&mut buf);
        }
        buf
    });
    let stderr_thread = thread::spawn(move || {
        let mut buf = String::new();
        if let Some(err) = stderr.as_mut() {
            let _ = err.read_to_string(&mut buf);
        }
        buf
    });

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if started.elapsed() >= timeout {
            error!(
                path = %path.display(),
                timeout_secs = timeout.as_secs(),
                "ffprobe timed out, killing"
            );
            let _ = child.kill();
            let _ = child.wait();
            return Err(MediaToolError::Timeout {
                tool: "Video analysis".to_string(),
                after: timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let json_str = stdout_thread.join().unwrap_or_default();
    let stderr_str = stderr_thread.join().unwrap_or_default();

    if !status.success() {
        error!(
            path = %path.display(),
            exit_code = ?status.code(),
            stderr = %stderr_str.trim(),
            "ffprobe failed"
        );
        return Err(MediaToolError::ProbeFailed {
            path: path.to_path_buf(),
            message: probe_error_message(&stderr_str).to_string(),
        });
    }

    let result = parse_probe_output(&json_str).map_err(|e| match e {
        MediaToolError::ProbeFailed { message, .. } => MediaToolError::ProbeFailed {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })?;

    info!(
        path = %path.display(),
        duration = result.duration,
        width = result.width,
        height = result.height,
        fps = result.frame_rate,
        "Video info extracted"
    );
    Ok(result)
}

/// Parse `-print_format json -show_format -show_streams` output.
pub fn parse_probe_output(json_str: &str) -> Result<FFprobeResult> {
    let json: serde_json::Value =
        serde_json::from_str(json_str).map_err(|e| MediaToolError::ParseError(e.to_string()))?;

    let format = &json["format"];
    let format_name = format["format_name"]
        .as_str()
        .unwrap_or("unknown")
        .to_string();
    let duration = format["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);
    let size = format["size"]
        .as_str()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let no_video = || MediaToolError::ProbeFailed {
        path: Default::default(),
        message: NO_VIDEO_MESSAGE.to_string(),
    };

    let streams = json["streams"].as_array().ok_or_else(no_video)?;
    let video_stream = streams
        .iter()
        .find(|s| s["codec_type"].as_str() == Some("video"))
        .ok_or_else(no_video)?;

    let video_codec = video_stream["codec_name"]
        .as_str()
        .unwrap_or("unknown")
        .to_string();
    let width = video_stream["width"].as_u64().unwrap_or(0) as u32;
    let height = video_stream["height"].as_u64().unwrap_or(0) as u32;

    let raw_rate = video_stream["r_frame_rate"].as_str().unwrap_or("");
    let frame_rate = parse_frame_rate(raw_rate).unwrap_or_else(|| {
        if !raw_rate.is_empty() && raw_rate != "0/0" {
            warn!(
                raw = raw_rate,
                fallback = FALLBACK_FRAME_RATE,
                "Failed to parse frame rate, using fallback"
            );
        }
        FALLBACK_FRAME_RATE
    });

    Ok(FFprobeResult {
        format_name,
        duration,
        size,
        video_codec,
        width,
        height,
        frame_rate,
    })
}

/// Parse an ffprobe frame-rate string: a rational `num/den` or a plain decimal.
///
/// Returns `None` for anything that is not a positive finite rate. Nothing is
/// evaluated beyond one division.
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    let s = s.trim();
    let rate = match s.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => s.parse::<f64>().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

const NO_VIDEO_MESSAGE: &str =
    "No video content found in this file. Please try a different video file.";

/// Map ffprobe stderr to the message shown next to the file.
pub fn probe_error_message(stderr: &str) -> &'static str {
    if stderr.contains("Invalid data") {
        "This file appears to be corrupted or is not a valid video file."
    } else if stderr.contains("Permission denied") {
        "Permission denied accessing the video file."
    } else {
        "Could not read video file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"codec_type": "audio", "codec_name": "aac"},
            {"codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080,
             "r_frame_rate": "30000/1001"}
        ],
        "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "10.010000", "size": "5242880"}
    }"#;

    #[test]
    fn test_parse_frame_rate() {
        let cases: &[(&str, f64, f64)] = &[
            ("30/1", 30.0, 0.001),
            ("24/1", 24.0, 0.001),
            ("25/1", 25.0, 0.001),
            ("30000/1001", 30000.0 / 1001.0, 0.0001),
            ("24000/1001", 24000.0 / 1001.0, 0.0001),
            ("60000/1001", 60000.0 / 1001.0, 0.0001),
            ("24", 24.0, 0.001),
            ("29.97", 29.97, 0.01),
            (" 120/1 ", 120.0, 0.001),
        ];

        for (input, expected, tolerance) in cases {
            let result = parse_frame_rate(input).unwrap();
            assert!(
                (result - expected).abs() < *tolerance,
                "parse_frame_rate({:?}): expected {}, got {}",
                input,
                expected,
                result
            );
        }
    }

    #[test]
    fn test_parse_frame_rate_rejects_garbage() {
        assert_eq!(parse_frame_rate("30/0"), None);
        assert_eq!(parse_frame_rate("0/1"), None);
        assert_eq!(parse_frame_rate("invalid"), None);
        assert_eq!(parse_frame_rate(""), None);
        assert_eq!(parse_frame_rate("30/1/extra"), None);
        assert_eq!(parse_frame_rate("-25/1"), None);
        assert_eq!(parse_frame_rate("process.exit()"), None);
    }

    #[test]
    fn test_parse_probe_output() {
        let r = parse_probe_output(SAMPLE).unwrap();
        assert_eq!(r.width, 1920);
        assert_eq!(r.height, 1080);
        assert_eq!(r.video_codec, "h264");
        assert_eq!(r.size, 5_242_880);
        assert!((r.duration - 10.01).abs() < 1e-9);
        assert!((r.frame_rate - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_probe_output_fallbacks() {
        let json = r#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 360, "r_frame_rate": "0/0"}],
            "format": {}
        }"#;
        let r = parse_probe_output(json).unwrap();
        assert_eq!(r.frame_rate, FALLBACK_FRAME_RATE);
        assert_eq!(r.duration, 0.0);
        assert_eq!(r.size, 0);
        assert_eq!(r.format_name, "unknown");
    }

    #[test]
    fn test_parse_probe_output_no_video() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(err.to_string().starts_with("No video content found"));
    }

    #[test]
    fn test_parse_probe_output_bad_json() {
        assert!(matches!(
            parse_probe_output("not json"),
            Err(MediaToolError::ParseError(_))
        ));
    }

    #[test]
    fn test_probe_error_message() {
        assert_eq!(
            probe_error_message("input.mp4: Invalid data found when processing input"),
            "This file appears to be corrupted or is not a valid video file."
        );
        assert_eq!(
            probe_error_message("input.mp4: Permission denied"),
            "Permission denied accessing the video file."
        );
        assert_eq!(probe_error_message(""), "Could not read video file");
        assert_eq!(
            probe_error_message("clip.mp4: No such file or directory"),
            "Could not read video file"
        );
    }

    #[test]
    fn test_probe_missing_file() {
        let err = probe_video(
            Path::new("ffprobe"),
            Path::new("/no/such/clip.mp4"),
            DEFAULT_PROBE_TIMEOUT,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "File does not exist");
    }
}
