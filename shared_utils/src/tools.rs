//! External tool discovery
//!
//! Resolves ffmpeg / ffprobe once per run: an explicit path wins, then `PATH`.

use crate::errors::{MediaToolError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// Paths of the external tools used by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// Resolve both tools, preferring the explicit overrides.
    pub fn resolve(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Result<Self> {
        let paths = Self {
            ffmpeg: find_tool(FFMPEG, ffmpeg)?,
            ffprobe: find_tool(FFPROBE, ffprobe)?,
        };
        info!(
            ffmpeg = %paths.ffmpeg.display(),
            ffprobe = %paths.ffprobe.display(),
            "External tools resolved"
        );
        Ok(paths)
    }
}

/// Locate `name`. An override must point at an existing file; otherwise the
/// tool is looked up on `PATH`.
pub fn find_tool(name: &str, override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        debug!(tool = name, path = %path.display(), "Testing tool override");
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(MediaToolError::ToolNotFound(format!(
            "{} not found at {}",
            name,
            path.display()
        )));
    }

    which::which(name).map_err(|_| {
        MediaToolError::ToolNotFound(format!(
            "{} not found on PATH. Install with: brew install ffmpeg",
            name
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_must_exist() {
        let err = find_tool(FFMPEG, Some(Path::new("/definitely/not/here/ffmpeg"))).unwrap_err();
        assert!(err.is_tool_missing());
        assert!(err.to_string().contains("/definitely/not/here/ffmpeg"));
    }

    #[test]
    fn test_override_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffmpeg");
        std::fs::write(&fake, b"#!/bin/sh\n").unwrap();
        assert_eq!(find_tool(FFMPEG, Some(&fake)).unwrap(), fake);
    }

    #[test]
    fn test_override_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_tool(FFPROBE, Some(dir.path())).is_err());
    }
}
