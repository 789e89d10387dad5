//! Shared Utilities for the vid-gif tools
//!
//! Infrastructure shared by the binaries:
//! - External tool discovery (ffmpeg / ffprobe)
//! - FFprobe wrapper for video analysis
//! - FFmpeg process management and `-progress` parsing
//! - Logging (tracing, daily-rolling file + stderr)
//! - Batch file collection and result tally
//! - Progress bars and the end-of-run report

pub mod batch;
pub mod errors;
pub mod ffmpeg_process;
pub mod ffprobe;
pub mod logging;
pub mod progress;
pub mod progress_mode;
pub mod report;
pub mod tools;

pub use batch::{collect_files, collect_inputs, has_extension, BatchResult, SUPPORTED_VIDEO_EXTENSIONS};
pub use errors::MediaToolError;
pub use ffmpeg_process::{format_ffmpeg_error, get_error_suggestion, FfmpegProcess, FfmpegProgressParser};
pub use ffprobe::{
    parse_frame_rate, probe_video, FFprobeResult, DEFAULT_PROBE_TIMEOUT, FALLBACK_FRAME_RATE,
};
pub use logging::{init_logging, LogConfig};
pub use progress::{
    create_file_progress_bar, create_multi_progress, create_progress_bar, create_spinner,
    format_duration, format_file_size,
};
pub use progress_mode::{disable_quiet_mode, enable_quiet_mode, is_quiet_mode};
pub use report::print_summary_report;
pub use tools::{find_tool, ToolPaths};
