//! vid-gif - Video to animated GIF conversion API
//!
//! Turns videos into palette-optimized GIFs with ffmpeg:
//! - Resolution presets fitted to the source aspect ratio (never upscaled)
//! - Quality tiers controlling frame rate and palette size
//! - Output size prediction before anything is encoded
//!
//! ```rust,ignore
//! use vid_gif::{estimate, ConversionSettings, FilterGraph, QualityPreset, ResolutionPreset};
//!
//! let settings = ConversionSettings::preset(ResolutionPreset::WebMedium, QualityPreset::Medium);
//! let graph = FilterGraph::build(&settings, Some(info.dimensions()));
//! let size = estimate(Some(&info), &settings);
//! ```

pub mod config;
pub mod conversion_api;
pub mod error;
pub mod filter_graph;
pub mod geometry;
pub mod presets;
pub mod session;
pub mod settings;
pub mod size_estimate;
pub mod video_info;

// Re-exports
pub use config::ConversionConfig;
pub use conversion_api::{FfmpegGifEncoder, FfprobeProber};
pub use error::{GifError, Result};
pub use filter_graph::{Filter, FilterGraph, ScaleTarget, Stage};
pub use geometry::{fit_within, Dimensions};
pub use presets::{QualityPreset, ResolutionPreset};
pub use session::{
    output_path_for, AddOutcome, ConversionJob, ConvertSummary, FileEntry, FileStatus,
    GifEncoder, OutputOptions, Session, SessionEvent, VideoProber,
};
pub use settings::{ConversionSettings, InvalidSettings, Resolution};
pub use size_estimate::{estimate, SizeEstimate, SIZE_WARNING_MESSAGE, SIZE_WARNING_THRESHOLD};
pub use video_info::VideoInfo;
