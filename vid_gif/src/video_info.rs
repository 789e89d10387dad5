//! Source video metadata used for sizing and estimates.

use crate::geometry::Dimensions;
use serde::{Deserialize, Serialize};
use shared_utils::errors::MediaToolError;
use shared_utils::ffprobe::FFprobeResult;
use shared_utils::progress::format_file_size;
use std::path::Path;

pub const NO_DIMENSIONS_MESSAGE: &str = "The video stream has no frame size.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    pub frame_rate: f64,
}

impl VideoInfo {
    /// Build from a probe result. A missing container size is taken from the
    /// filesystem; a stream without a frame size is rejected.
    pub fn from_probe(probe: &FFprobeResult, path: &Path) -> Result<Self, MediaToolError> {
        if probe.width == 0 || probe.height == 0 {
            return Err(MediaToolError::ProbeFailed {
                path: path.to_path_buf(),
                message: NO_DIMENSIONS_MESSAGE.to_string(),
            });
        }

        let size_bytes = if probe.size > 0 {
            probe.size
        } else {
            std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(Self {
            duration_secs: probe.duration.max(0.0),
            width: probe.width,
            height: probe.height,
            size_bytes,
            frame_rate: probe.frame_rate,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// `10s • 1920×1080 • 1.78:1 ratio • 5 MB`
    pub fn info_line(&self) -> String {
        format!(
            "{}s • {} • {:.2}:1 ratio • {}",
            self.duration_secs.round() as u64,
            self.dimensions(),
            self.dimensions().aspect_ratio(),
            format_file_size(self.size_bytes)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn probe(size: u64) -> FFprobeResult {
        FFprobeResult {
            format_name: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            duration: 10.01,
            size,
            video_codec: "h264".to_string(),
            width: 1920,
            height: 1080,
            frame_rate: 29.97,
        }
    }

    #[test]
    fn test_info_line() {
        let info = VideoInfo::from_probe(&probe(5 * 1024 * 1024), Path::new("clip.mp4")).unwrap();
        assert_eq!(info.info_line(), "10s • 1920×1080 • 1.78:1 ratio • 5 MB");
    }

    #[test]
    fn test_size_falls_back_to_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, vec![0u8; 4096]).unwrap();

        let info = VideoInfo::from_probe(&probe(0), &path).unwrap();
        assert_eq!(info.size_bytes, 4096);
    }

    #[test]
    fn test_missing_frame_size_rejected() {
        let mut result = probe(1024);
        result.width = 0;
        result.height = 0;
        match VideoInfo::from_probe(&result, Path::new("audio.m4v")) {
            Err(MediaToolError::ProbeFailed { path, message }) => {
                assert_eq!(path, Path::new("audio.m4v"));
                assert_eq!(message, NO_DIMENSIONS_MESSAGE);
            }
            other => panic!("expected ProbeFailed, got {:?}", other),
        }
    }
}
