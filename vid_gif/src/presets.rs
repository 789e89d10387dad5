//! Resolution and quality presets
//!
//! Both tables are closed enums: every key the CLI accepts maps to exactly one
//! variant, and every variant has its numbers in one `match`.

use crate::geometry::Dimensions;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named output box. The video is fitted inside it, never stretched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPreset {
    InstagramStory,
    InstagramPost,
    Twitter,
    WebSmall,
    WebMedium,
    WebLarge,
    Mobile,
    Email,
    Hd,
    UltraCompact,
    #[value(name = "720p")]
    #[serde(rename = "720p")]
    P720,
    #[value(name = "480p")]
    #[serde(rename = "480p")]
    P480,
    #[value(name = "360p")]
    #[serde(rename = "360p")]
    P360,
}

impl ResolutionPreset {
    pub const ALL: [ResolutionPreset; 13] = [
        ResolutionPreset::InstagramStory,
        ResolutionPreset::InstagramPost,
        ResolutionPreset::Twitter,
        ResolutionPreset::WebSmall,
        ResolutionPreset::WebMedium,
        ResolutionPreset::WebLarge,
        ResolutionPreset::Mobile,
        ResolutionPreset::Email,
        ResolutionPreset::Hd,
        ResolutionPreset::UltraCompact,
        ResolutionPreset::P720,
        ResolutionPreset::P480,
        ResolutionPreset::P360,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ResolutionPreset::InstagramStory => "instagram-story",
            ResolutionPreset::InstagramPost => "instagram-post",
            ResolutionPreset::Twitter => "twitter",
            ResolutionPreset::WebSmall => "web-small",
            ResolutionPreset::WebMedium => "web-medium",
            ResolutionPreset::WebLarge => "web-large",
            ResolutionPreset::Mobile => "mobile",
            ResolutionPreset::Email => "email",
            ResolutionPreset::Hd => "hd",
            ResolutionPreset::UltraCompact => "ultra-compact",
            ResolutionPreset::P720 => "720p",
            ResolutionPreset::P480 => "480p",
            ResolutionPreset::P360 => "360p",
        }
    }

    /// Bounding box (width × height).
    pub fn bounding_box(&self) -> Dimensions {
        let (w, h) = match self {
            ResolutionPreset::InstagramStory => (1080, 1920),
            ResolutionPreset::InstagramPost => (1080, 1080),
            ResolutionPreset::Twitter => (1280, 720),
            ResolutionPreset::WebSmall => (480, 270),
            ResolutionPreset::WebMedium => (720, 405),
            ResolutionPreset::WebLarge => (1280, 720),
            ResolutionPreset::Mobile => (640, 360),
            ResolutionPreset::Email => (320, 180),
            ResolutionPreset::Hd => (1920, 1080),
            ResolutionPreset::UltraCompact => (240, 135),
            ResolutionPreset::P720 => (1280, 720),
            ResolutionPreset::P480 => (854, 480),
            ResolutionPreset::P360 => (640, 360),
        };
        Dimensions::new(w, h)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ResolutionPreset::InstagramStory => {
                "📖 Vertical format optimized for Instagram and Facebook stories"
            }
            ResolutionPreset::InstagramPost => "📸 Perfect square format for Instagram feed posts",
            ResolutionPreset::Twitter => "🐦 Optimized for Twitter posts and social media timelines",
            ResolutionPreset::WebSmall => "🚀 Ultra-fast loading for websites where speed is critical",
            ResolutionPreset::WebMedium => "📝 Best balance of quality and file size for most web uses",
            ResolutionPreset::WebLarge => "💎 High quality for professional websites and portfolios",
            ResolutionPreset::Mobile => "📱 Optimized for mobile devices and social messaging apps",
            ResolutionPreset::Email => {
                "📧 Very small file size perfect for email attachments and quick sharing"
            }
            ResolutionPreset::Hd => "🎬 Maximum quality preservation for archival or high-end uses",
            ResolutionPreset::UltraCompact => {
                "🗜️ Absolute smallest file size for bandwidth-critical uses"
            }
            ResolutionPreset::P720 => "📺 Standard HD quality, widely compatible and good balance",
            ResolutionPreset::P480 => {
                "📺 Standard definition, good for older devices and slower connections"
            }
            ResolutionPreset::P360 => "📺 Basic quality for simple animations and small displays",
        }
    }
}

impl fmt::Display for ResolutionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub const ORIGINAL_DESCRIPTION: &str =
    "📏 Keeps the exact original dimensions and quality of your video";
pub const CUSTOM_DESCRIPTION: &str =
    "⚙️ Set your own exact dimensions (aspect ratio will be preserved)";

/// Frame rate, palette size and empirical compression factor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum QualityPreset {
    UltraHigh,
    High,
    #[default]
    Medium,
    Low,
    UltraLow,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 5] = [
        QualityPreset::UltraHigh,
        QualityPreset::High,
        QualityPreset::Medium,
        QualityPreset::Low,
        QualityPreset::UltraLow,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            QualityPreset::UltraHigh => "ultra-high",
            QualityPreset::High => "high",
            QualityPreset::Medium => "medium",
            QualityPreset::Low => "low",
            QualityPreset::UltraLow => "ultra-low",
        }
    }

    pub fn frame_rate(&self) -> u32 {
        match self {
            QualityPreset::UltraHigh => 20,
            QualityPreset::High => 15,
            QualityPreset::Medium => 12,
            QualityPreset::Low => 10,
            QualityPreset::UltraLow => 8,
        }
    }

    /// `max_colors` for palettegen; always a power of two in 2..=256.
    pub fn palette_colors(&self) -> u32 {
        match self {
            QualityPreset::UltraHigh | QualityPreset::High => 256,
            QualityPreset::Medium => 128,
            QualityPreset::Low => 64,
            QualityPreset::UltraLow => 32,
        }
    }

    pub fn compression_factor(&self) -> f64 {
        match self {
            QualityPreset::UltraHigh => 0.8,
            QualityPreset::High => 0.9,
            QualityPreset::Medium => 1.0,
            QualityPreset::Low => 1.2,
            QualityPreset::UltraLow => 1.5,
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
