//! Output size prediction
//!
//! Empirical model: every output pixel of every frame costs half a byte, scaled
//! by palette depth and the quality tier's compression factor, plus 10% for GIF
//! headers and palettes.

use crate::geometry::{fit_within, Dimensions};
use crate::settings::ConversionSettings;
use crate::video_info::VideoInfo;
use serde::Serialize;

pub const BASE_BYTES_PER_PIXEL: f64 = 0.5;
pub const FORMAT_OVERHEAD: f64 = 1.1;

/// GIFs above this size get a warning.
pub const SIZE_WARNING_THRESHOLD: u64 = 30 * 1024 * 1024;

pub const SIZE_WARNING_MESSAGE: &str = "Files over 30MB are not optimal for Google Slides";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeEstimate {
    pub bytes: u64,
    pub exceeds_threshold: bool,
    pub target: Dimensions,
    pub total_frames: u64,
}

impl SizeEstimate {
    pub fn warning(&self) -> Option<&'static str> {
        self.exceeds_threshold.then_some(SIZE_WARNING_MESSAGE)
    }
}

/// Output dimensions for `source` under `settings`; same arithmetic as the
/// scale stage of the filter graph.
pub fn target_dimensions(source: Dimensions, settings: &ConversionSettings) -> Dimensions {
    match settings.resolution().bounding_box() {
        None => source,
        Some(bounds) => fit_within(source, bounds),
    }
}

/// Frames written for `duration_secs` at `fps`.
pub fn total_frames(duration_secs: f64, fps: u32) -> u64 {
    (duration_secs.max(0.0) * fps as f64).ceil() as u64
}

pub fn estimate_bytes(target: Dimensions, frames: u64, palette_colors: u32, compression: f64) -> u64 {
    let color_factor = (palette_colors.max(1) as f64).log2() / 8.0;
    let raw = target.pixels() as f64
        * frames as f64
        * BASE_BYTES_PER_PIXEL
        * color_factor
        * compression;
    (raw * FORMAT_OVERHEAD).round() as u64
}

/// `None` when the source could not be probed or has no frame size.
pub fn estimate(video: Option<&VideoInfo>, settings: &ConversionSettings) -> Option<SizeEstimate> {
    let video = video.filter(|v| !v.dimensions().is_empty())?;
    let quality = settings.quality();

    let target = target_dimensions(video.dimensions(), settings);
    let frames = total_frames(video.duration_secs, quality.frame_rate());
    let bytes = estimate_bytes(
        target,
        frames,
        quality.palette_colors(),
        quality.compression_factor(),
    );

    Some(SizeEstimate {
        bytes,
        exceeds_threshold: bytes > SIZE_WARNING_THRESHOLD,
        target,
        total_frames: frames,
    })
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::presets::QualityPreset;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_bytes_non_decreasing_in_duration(
            d1 in 0.0f64..600.0,
            extra in 0.0f64..600.0,
            quality_idx in 0usize..5
        ) {
            let settings = ConversionSettings::original(QualityPreset::ALL[quality_idx]);
            let info = |d: f64| VideoInfo {
                duration_secs: d, width: 640, height: 360, size_bytes: 0, frame_rate: 30.0,
            };
            let short = estimate(Some(&info(d1)), &settings).unwrap();
            let long = estimate(Some(&info(d1 + extra)), &settings).unwrap();
            prop_assert!(long.bytes >= short.bytes);
        }

        #[test]
        fn prop_bytes_non_decreasing_in_colors(
            c1 in 1u32..=8,
            c2 in 1u32..=8,
            frames in 0u64..2000
        ) {
            let (lo, hi) = if c1 <= c2 { (c1, c2) } else { (c2, c1) };
            let target = Dimensions::new(480, 270);
            let fewer = estimate_bytes(target, frames, 1 << lo, 1.0);
            let more = estimate_bytes(target, frames, 1 << hi, 1.0);
            prop_assert!(more >= fewer);
        }
    }
}
