use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures of the external media tools (ffprobe / ffmpeg).
///
/// The variants carry a message that can be shown to the user as-is; the raw
/// tool output goes to the log, not into the message.
#[derive(Error, Debug)]
pub enum MediaToolError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("{message}")]
    ProbeFailed { path: PathBuf, message: String },

    #[error("Failed to parse tool output: {0}")]
    ParseError(String),

    #[error("{tool} timed out after {}s", .after.as_secs())]
    Timeout { tool: String, after: Duration },

    #[error("FFmpeg failed: {message}")]
    FfmpegFailed {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaToolError {
    /// True when the failure is about the tool itself, not the input file.
    pub fn is_tool_missing(&self) -> bool {
        matches!(self, MediaToolError::ToolNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, MediaToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = MediaToolError::Timeout {
            tool: "ffprobe".to_string(),
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "ffprobe timed out after 30s");
    }

    #[test]
    fn test_probe_failed_shows_message_only() {
        let err = MediaToolError::ProbeFailed {
            path: PathBuf::from("/tmp/clip.mp4"),
            message: "No video content found in this file".to_string(),
        };
        assert_eq!(err.to_string(), "No video content found in this file");
        assert!(!err.is_tool_missing());
    }
}
