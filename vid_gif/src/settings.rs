//! Conversion settings
//!
//! `ConversionSettings` is only ever built through validated constructors, so a
//! custom size outside the allowed range cannot reach the filter graph or the
//! estimator.

use crate::geometry::Dimensions;
use crate::presets::{QualityPreset, ResolutionPreset};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

pub const CUSTOM_WIDTH_RANGE: (u32, u32) = (100, 1920);
pub const CUSTOM_HEIGHT_RANGE: (u32, u32) = (100, 1080);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSettings {
    #[error("Custom resolution needs both a width and a height")]
    MissingDimensions,

    #[error("Custom width {0} is outside 100..=1920")]
    WidthOutOfRange(u32),

    #[error("Custom height {0} is outside 100..=1080")]
    HeightOutOfRange(u32),

    #[error("Unknown resolution '{0}'")]
    UnknownResolution(String),
}

/// Which output size is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Resolution {
    Original,
    Preset { preset: ResolutionPreset },
    Custom { width: u32, height: u32 },
}

impl Resolution {
    /// Box to fit into; `None` for `Original`.
    pub fn bounding_box(&self) -> Option<Dimensions> {
        match self {
            Resolution::Original => None,
            Resolution::Preset { preset } => Some(preset.bounding_box()),
            Resolution::Custom { width, height } => Some(Dimensions::new(*width, *height)),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Resolution::Original => crate::presets::ORIGINAL_DESCRIPTION,
            Resolution::Preset { preset } => preset.description(),
            Resolution::Custom { .. } => crate::presets::CUSTOM_DESCRIPTION,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Original => f.write_str("original"),
            Resolution::Preset { preset } => write!(f, "{}", preset),
            Resolution::Custom { width, height } => write!(f, "custom {}×{}", width, height),
        }
    }
}

/// A resolution choice before custom sizes are attached: `original`,
/// `custom` or a preset key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKey {
    Original,
    Custom,
    Preset(ResolutionPreset),
}

impl FromStr for ResolutionKey {
    type Err = InvalidSettings;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(ResolutionKey::Original),
            "custom" => Ok(ResolutionKey::Custom),
            key => ResolutionPreset::from_str(key, true)
                .map(ResolutionKey::Preset)
                .map_err(|_| InvalidSettings::UnknownResolution(s.to_string())),
        }
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionKey::Original => f.write_str("original"),
            ResolutionKey::Custom => f.write_str("custom"),
            ResolutionKey::Preset(p) => write!(f, "{}", p),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionSettings {
    resolution: Resolution,
    quality: QualityPreset,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::Preset {
                preset: ResolutionPreset::WebMedium,
            },
            quality: QualityPreset::Medium,
        }
    }
}

impl ConversionSettings {
    pub fn original(quality: QualityPreset) -> Self {
        Self {
            resolution: Resolution::Original,
            quality,
        }
    }

    pub fn preset(preset: ResolutionPreset, quality: QualityPreset) -> Self {
        Self {
            resolution: Resolution::Preset { preset },
            quality,
        }
    }

    /// Width and height are checked independently; width first.
    pub fn custom(width: u32, height: u32, quality: QualityPreset) -> Result<Self, InvalidSettings> {
        if !(CUSTOM_WIDTH_RANGE.0..=CUSTOM_WIDTH_RANGE.1).contains(&width) {
            return Err(InvalidSettings::WidthOutOfRange(width));
        }
        if !(CUSTOM_HEIGHT_RANGE.0..=CUSTOM_HEIGHT_RANGE.1).contains(&height) {
            return Err(InvalidSettings::HeightOutOfRange(height));
        }
        Ok(Self {
            resolution: Resolution::Custom { width, height },
            quality,
        })
    }

    /// Build from a parsed resolution key plus optional custom sizes.
    pub fn from_key(
        key: ResolutionKey,
        quality: QualityPreset,
        custom_width: Option<u32>,
        custom_height: Option<u32>,
    ) -> Result<Self, InvalidSettings> {
        match key {
            ResolutionKey::Original => Ok(Self::original(quality)),
            ResolutionKey::Preset(preset) => Ok(Self::preset(preset, quality)),
            ResolutionKey::Custom => match (custom_width, custom_height) {
                (Some(w), Some(h)) => Self::custom(w, h, quality),
                _ => Err(InvalidSettings::MissingDimensions),
            },
        }
    }

    /// Build from the loose form a form or config file supplies:
    /// a preset key, `"original"` or `"custom"`, plus optional custom sizes.
    ///
    /// Only a bad custom size is an error. An unknown quality key falls back to
    /// `medium`; an unknown resolution key passes the video through unscaled.
    pub fn from_raw(
        resolution: &str,
        quality: &str,
        custom_width: Option<u32>,
        custom_height: Option<u32>,
    ) -> Result<Self, InvalidSettings> {
        let quality = QualityPreset::from_str(quality, true).unwrap_or_else(|_| {
            warn!(quality, "Unknown quality, using default");
            QualityPreset::default()
        });
        let key = resolution.parse::<ResolutionKey>().unwrap_or_else(|e| {
            warn!(error = %e, "Keeping original size");
            ResolutionKey::Original
        });
        Self::from_key(key, quality, custom_width, custom_height)
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn quality(&self) -> QualityPreset {
        self.quality
    }
}

impl fmt::Display for ConversionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.resolution, self.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_width_too_small() {
        assert_eq!(
            ConversionSettings::custom(50, 200, QualityPreset::Medium),
            Err(InvalidSettings::WidthOutOfRange(50))
        );
    }

    #[test]
    fn test_custom_bounds_inclusive() {
        assert!(ConversionSettings::custom(100, 100, QualityPreset::Low).is_ok());
        assert!(ConversionSettings::custom(1920, 1080, QualityPreset::Low).is_ok());
        assert_eq!(
            ConversionSettings::custom(1921, 500, QualityPreset::Low),
            Err(InvalidSettings::WidthOutOfRange(1921))
        );
        assert_eq!(
            ConversionSettings::custom(500, 1081, QualityPreset::Low),
            Err(InvalidSettings::HeightOutOfRange(1081))
        );
    }

    #[test]
    fn test_from_raw_custom_missing_dimension() {
        assert_eq!(
            ConversionSettings::from_raw("custom", "medium", Some(400), None),
            Err(InvalidSettings::MissingDimensions)
        );
    }

    #[test]
    fn test_from_raw_keys() {
        let s = ConversionSettings::from_raw("720p", "ultra-high", None, None).unwrap();
        assert_eq!(
            s.resolution(),
            Resolution::Preset {
                preset: ResolutionPreset::P720
            }
        );
        assert_eq!(s.quality(), QualityPreset::UltraHigh);

        let s = ConversionSettings::from_raw("original", "low", Some(1), Some(1)).unwrap();
        assert_eq!(s.resolution(), Resolution::Original);

        let s = ConversionSettings::from_raw("custom", "high", Some(400), Some(300)).unwrap();
        assert_eq!(s.resolution().bounding_box(), Some(Dimensions::new(400, 300)));
    }

    #[test]
    fn test_from_raw_unknown_keys_fall_back() {
        assert_eq!(
            ConversionSettings::from_raw("8k", "high", None, None),
            Ok(ConversionSettings::original(QualityPreset::High))
        );
        assert_eq!(
            ConversionSettings::from_raw("hd", "best", None, None),
            Ok(ConversionSettings::preset(ResolutionPreset::Hd, QualityPreset::Medium))
        );
        assert_eq!(
            "8k".parse::<ResolutionKey>(),
            Err(InvalidSettings::UnknownResolution("8k".to_string()))
        );
    }

    #[test]
    fn test_resolution_key_parse() {
        assert_eq!("original".parse(), Ok(ResolutionKey::Original));
        assert_eq!("Custom".parse(), Ok(ResolutionKey::Custom));
        assert_eq!(
            "480p".parse(),
            Ok(ResolutionKey::Preset(ResolutionPreset::P480))
        );
        assert_eq!(
            "ultra-compact".parse::<ResolutionKey>().map(|k| k.to_string()),
            Ok("ultra-compact".to_string())
        );
        assert!("1080i".parse::<ResolutionKey>().is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            InvalidSettings::WidthOutOfRange(50).to_string(),
            "Custom width 50 is outside 100..=1920"
        );
        assert_eq!(
            InvalidSettings::HeightOutOfRange(2000).to_string(),
            "Custom height 2000 is outside 100..=1080"
        );
    }

    #[test]
    fn test_default_and_display() {
        let s = ConversionSettings::default();
        assert_eq!(s.to_string(), "web-medium @ medium");
        let c = ConversionSettings::custom(400, 300, QualityPreset::Low).unwrap();
        assert_eq!(c.to_string(), "custom 400×300 @ low");
    }
}
