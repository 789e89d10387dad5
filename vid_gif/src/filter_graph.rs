//! GIF filter graph
//!
//! Two-pass palette pipeline fed to ffmpeg as `-filter_complex`:
//!
//! ```text
//! [0:v] scale [scaled] -> fps [fps] -> split [a][b]
//! [a] palettegen [p]
//! [b][p] paletteuse [gif]
//! ```
//!
//! The scale stage is left out for `Original`.

use crate::geometry::{fit_within, Dimensions};
use crate::settings::ConversionSettings;
use serde::Serialize;
use std::fmt;

pub const INPUT_LABEL: &str = "0:v";
pub const OUTPUT_LABEL: &str = "gif";

const BAYER_SCALE: u8 = 5;

/// How the scale stage sizes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ScaleTarget {
    /// Source size known: exact aspect-fitted dimensions.
    Exact(Dimensions),
    /// Source size unknown: ffmpeg fits into the box, clamped to the input.
    FitBox(Dimensions),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "filter", rename_all = "lowercase")]
pub enum Filter {
    Scale { target: ScaleTarget },
    Fps { rate: u32 },
    Split { outputs: u8 },
    PaletteGen { max_colors: u32, reserve_transparent: bool },
    PaletteUse { bayer_scale: u8 },
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Scale {
                target: ScaleTarget::Exact(d),
            } => write!(f, "scale={}:{}:flags=lanczos", d.width, d.height),
            Filter::Scale {
                target: ScaleTarget::FitBox(d),
            } => write!(
                f,
                "scale='min(iw,{})':'min(ih,{})':force_original_aspect_ratio=decrease:flags=lanczos",
                d.width, d.height
            ),
            Filter::Fps { rate } => write!(f, "fps={}", rate),
            Filter::Split { outputs } if *outputs == 2 => f.write_str("split"),
            Filter::Split { outputs } => write!(f, "split={}", outputs),
            Filter::PaletteGen {
                max_colors,
                reserve_transparent,
            } => write!(
                f,
                "palettegen=max_colors={}:reserve_transparent={}",
                max_colors,
                u8::from(*reserve_transparent)
            ),
            Filter::PaletteUse { bayer_scale } => {
                write!(f, "paletteuse=dither=bayer:bayer_scale={}", bayer_scale)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub inputs: Vec<&'static str>,
    pub filter: Filter,
    pub outputs: Vec<&'static str>,
}

impl Stage {
    fn new(inputs: &[&'static str], filter: Filter, outputs: &[&'static str]) -> Self {
        Self {
            inputs: inputs.to_vec(),
            filter,
            outputs: outputs.to_vec(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in &self.inputs {
            write!(f, "[{}]", label)?;
        }
        write!(f, "{}", self.filter)?;
        for label in &self.outputs {
            write!(f, "[{}]", label)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterGraph {
    pub stages: Vec<Stage>,
    pub frame_rate: u32,
    pub palette_colors: u32,
    /// Output size when the source size was known (or `Original` with a source).
    pub target: Option<Dimensions>,
}

impl FilterGraph {
    /// Build the pipeline for `settings`. `source` enables exact scaling; a
    /// source with a zero side is treated as unknown.
    pub fn build(settings: &ConversionSettings, source: Option<Dimensions>) -> Self {
        let source = source.filter(|d| !d.is_empty());
        let quality = settings.quality();
        let mut stages = Vec::with_capacity(5);
        let mut label = INPUT_LABEL;

        let target = match settings.resolution().bounding_box() {
            None => source,
            Some(bounds) => {
                let (scale, target) = match source {
                    Some(src) => {
                        let fitted = fit_within(src, bounds);
                        (ScaleTarget::Exact(fitted), Some(fitted))
                    }
                    None => (ScaleTarget::FitBox(bounds), None),
                };
                stages.push(Stage::new(&[label], Filter::Scale { target: scale }, &["scaled"]));
                label = "scaled";
                target
            }
        };

        stages.push(Stage::new(
            &[label],
            Filter::Fps {
                rate: quality.frame_rate(),
            },
            &["fps"],
        ));
        stages.push(Stage::new(&["fps"], Filter::Split { outputs: 2 }, &["a", "b"]));
        stages.push(Stage::new(
            &["a"],
            Filter::PaletteGen {
                max_colors: quality.palette_colors(),
                reserve_transparent: false,
            },
            &["p"],
        ));
        stages.push(Stage::new(
            &["b", "p"],
            Filter::PaletteUse {
                bayer_scale: BAYER_SCALE,
            },
            &[OUTPUT_LABEL],
        ));

        Self {
            stages,
            frame_rate: quality.frame_rate(),
            palette_colors: quality.palette_colors(),
            target,
        }
    }

    /// `-filter_complex` argument.
    pub fn to_filter_complex(&self) -> String {
        self.to_string()
    }

    pub fn has_scale_stage(&self) -> bool {
        self.stages
            .iter()
            .any(|s| matches!(s.filter, Filter::Scale { .. }))
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", stage)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{QualityPreset, ResolutionPreset};

    const HD_SOURCE: Dimensions = Dimensions::new(1920, 1080);

    #[test]
    fn test_preset_with_known_source() {
        let settings = ConversionSettings::preset(ResolutionPreset::WebMedium, QualityPreset::Medium);
        let graph = FilterGraph::build(&settings, Some(HD_SOURCE));
        assert_eq!(
            graph.to_filter_complex(),
            "[0:v]scale=720:405:flags=lanczos[scaled];\
             [scaled]fps=12[fps];\
             [fps]split[a][b];\
             [a]palettegen=max_colors=128:reserve_transparent=0[p];\
             [b][p]paletteuse=dither=bayer:bayer_scale=5[gif]"
        );
        assert_eq!(graph.target, Some(Dimensions::new(720, 405)));
        assert_eq!(graph.frame_rate, 12);
        assert_eq!(graph.palette_colors, 128);
    }

    #[test]
    fn test_preset_without_source_uses_box() {
        let settings = ConversionSettings::preset(ResolutionPreset::Email, QualityPreset::UltraLow);
        let graph = FilterGraph::build(&settings, None);
        assert_eq!(
            graph.stages[0].to_string(),
            "[0:v]scale='min(iw,320)':'min(ih,180)':force_original_aspect_ratio=decrease:flags=lanczos[scaled]"
        );
        assert_eq!(graph.target, None);
        assert!(graph.to_filter_complex().contains("palettegen=max_colors=32:"));
        assert!(graph.to_filter_complex().contains("fps=8[fps]"));
    }

    #[test]
    fn test_original_has_no_scale_stage() {
        let settings = ConversionSettings::original(QualityPreset::High);
        let graph = FilterGraph::build(&settings, Some(HD_SOURCE));
        assert!(!graph.has_scale_stage());
        assert_eq!(graph.stages.len(), 4);
        assert_eq!(graph.stages[0].inputs, vec![INPUT_LABEL]);
        assert!(graph.to_filter_complex().starts_with("[0:v]fps=15[fps];"));
        assert_eq!(graph.target, Some(HD_SOURCE));
    }

    #[test]
    fn test_custom_fits_source_aspect() {
        let settings = ConversionSettings::custom(400, 400, QualityPreset::Low).unwrap();
        let graph = FilterGraph::build(&settings, Some(Dimensions::new(1920, 800)));
        assert_eq!(graph.target, Some(Dimensions::new(400, 167)));
        assert!(graph.to_filter_complex().starts_with("[0:v]scale=400:167:flags=lanczos[scaled];"));
    }

    #[test]
    fn test_zero_sized_source_falls_back_to_box() {
        let settings = ConversionSettings::preset(ResolutionPreset::WebMedium, QualityPreset::Medium);
        let graph = FilterGraph::build(&settings, Some(Dimensions::new(0, 0)));
        assert_eq!(graph, FilterGraph::build(&settings, None));
        assert!(graph
            .to_filter_complex()
            .starts_with("[0:v]scale='min(iw,720)':'min(ih,405)':force_original_aspect_ratio=decrease"));

        let original = FilterGraph::build(&ConversionSettings::original(QualityPreset::Medium), Some(Dimensions::new(0, 0)));
        assert_eq!(original.target, None);
    }

    #[test]
    fn test_small_source_not_upscaled() {
        let settings = ConversionSettings::preset(ResolutionPreset::Hd, QualityPreset::Medium);
        let graph = FilterGraph::build(&settings, Some(Dimensions::new(320, 240)));
        assert_eq!(graph.target, Some(Dimensions::new(320, 240)));
    }

    #[test]
    fn test_final_stage_labels() {
        let settings = ConversionSettings::default();
        let graph = FilterGraph::build(&settings, None);
        let last = graph.stages.last().unwrap();
        assert_eq!(last.inputs, vec!["b", "p"]);
        assert_eq!(last.outputs, vec![OUTPUT_LABEL]);
    }

    #[test]
    fn test_deterministic() {
        let settings = ConversionSettings::preset(ResolutionPreset::P480, QualityPreset::UltraHigh);
        let a = FilterGraph::build(&settings, Some(HD_SOURCE)).to_filter_complex();
        let b = FilterGraph::build(&settings, Some(HD_SOURCE)).to_filter_complex();
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::presets::{QualityPreset, ResolutionPreset};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_every_preset_fits_its_box(
            preset_idx in 0usize..13,
            quality_idx in 0usize..5,
            sw in 16u32..4000,
            sh in 16u32..4000
        ) {
            let preset = ResolutionPreset::ALL[preset_idx];
            let settings = ConversionSettings::preset(preset, QualityPreset::ALL[quality_idx]);
            let graph = FilterGraph::build(&settings, Some(Dimensions::new(sw, sh)));
            let target = graph.target.unwrap();
            let bounds = preset.bounding_box();
            prop_assert!(target.width <= bounds.width && target.height <= bounds.height);
            prop_assert_eq!(graph.stages.len(), 5);
        }
    }
}
