//! Run configuration assembled by the CLI.

use crate::session::OutputOptions;
use crate::settings::ConversionSettings;
use shared_utils::ffprobe::DEFAULT_PROBE_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;

pub const FFMPEG_ENV: &str = "VID_GIF_FFMPEG";
pub const FFPROBE_ENV: &str = "VID_GIF_FFPROBE";

#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// `None` writes each GIF next to its source.
    pub output_dir: Option<PathBuf>,
    pub force: bool,
    pub recursive: bool,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    pub probe_timeout: Duration,
    pub settings: ConversionSettings,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            force: false,
            recursive: false,
            ffmpeg: None,
            ffprobe: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            settings: ConversionSettings::default(),
        }
    }
}

impl ConversionConfig {
    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            output_dir: self.output_dir.clone(),
            force: self.force,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::default();
        assert_eq!(config.probe_timeout, Duration::from_secs(30));
        assert!(!config.recursive);
        assert!(!config.force);
        assert_eq!(config.settings, ConversionSettings::default());
        assert_eq!(config.output_options(), OutputOptions::default());
    }
}
