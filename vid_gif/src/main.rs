use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

use shared_utils::batch::collect_inputs;
use shared_utils::quiet_eprintln;
use shared_utils::progress::{
    create_file_progress_bar, create_multi_progress, create_progress_bar, create_spinner,
    format_file_size,
};
use shared_utils::tools::{find_tool, ToolPaths, FFPROBE};
use vid_gif::config::{ConversionConfig, FFMPEG_ENV, FFPROBE_ENV};
use vid_gif::presets::{CUSTOM_DESCRIPTION, ORIGINAL_DESCRIPTION};
use vid_gif::settings::ResolutionKey;
use vid_gif::{
    ConversionSettings, Dimensions, FfmpegGifEncoder, FfprobeProber, FileEntry, FileStatus,
    FilterGraph, QualityPreset, ResolutionPreset, Session, SessionEvent, SizeEstimate,
    VideoInfo, VideoProber,
};

#[derive(Parser)]
#[command(name = "vid-gif")]
#[command(version, about = "Batch video to GIF converter with size prediction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct SettingsArgs {
    /// original, custom, or a preset key (see `vid-gif presets`)
    #[arg(long, default_value = "web-medium")]
    resolution: ResolutionKey,
    #[arg(long, value_enum, default_value_t = QualityPreset::Medium)]
    quality: QualityPreset,
    /// Custom box width (100-1920), with --resolution custom
    #[arg(long)]
    width: Option<u32>,
    /// Custom box height (100-1080), with --resolution custom
    #[arg(long)]
    height: Option<u32>,
}

impl SettingsArgs {
    fn to_settings(&self) -> anyhow::Result<ConversionSettings> {
        Ok(ConversionSettings::from_key(
            self.resolution,
            self.quality,
            self.width,
            self.height,
        )?)
    }
}

#[derive(Args, Clone)]
struct ToolArgs {
    #[arg(long, env = FFMPEG_ENV)]
    ffmpeg: Option<PathBuf>,
    #[arg(long, env = FFPROBE_ENV)]
    ffprobe: Option<PathBuf>,
    /// Seconds before a probe is abandoned
    #[arg(long, default_value_t = 30)]
    probe_timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert videos (files or directories) to GIF
    #[command(name = "run")]
    Run {
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        force: bool,
        #[arg(short, long)]
        recursive: bool,
        #[command(flatten)]
        settings: SettingsArgs,
        #[command(flatten)]
        tools: ToolArgs,
        #[arg(short, long)]
        verbose: bool,
        #[arg(short, long)]
        quiet: bool,
    },

    /// Predict GIF sizes without converting
    Estimate {
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        recursive: bool,
        #[command(flatten)]
        settings: SettingsArgs,
        #[command(flatten)]
        tools: ToolArgs,
        #[arg(long)]
        json: bool,
    },

    /// Print the -filter_complex graph for the given settings
    Filter {
        #[command(flatten)]
        settings: SettingsArgs,
        /// Source size (e.g. 1920x1080) for exact scaling
        #[arg(long)]
        source: Option<Dimensions>,
        #[arg(long)]
        json: bool,
    },

    /// List resolution presets and quality tiers
    Presets,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    if let Err(e) = shared_utils::logging::init_logging(
        "vid_gif",
        shared_utils::logging::LogConfig::default().verbose(verbose),
    ) {
        eprintln!("⚠️  Logging unavailable: {}", e);
    }

    match cli.command {
        Commands::Run {
            inputs,
            output,
            force,
            recursive,
            settings,
            tools,
            verbose: _,
            quiet,
        } => {
            if quiet {
                shared_utils::progress_mode::enable_quiet_mode();
            }
            let config = ConversionConfig {
                output_dir: output,
                force,
                recursive,
                ffmpeg: tools.ffmpeg,
                ffprobe: tools.ffprobe,
                probe_timeout: Duration::from_secs(tools.probe_timeout),
                settings: settings.to_settings()?,
            };
            run(&inputs, &config)?;
        }

        Commands::Estimate {
            inputs,
            recursive,
            settings,
            tools,
            json,
        } => {
            if json {
                shared_utils::progress_mode::enable_quiet_mode();
            }
            let settings = settings.to_settings()?;
            let ffprobe = find_tool(FFPROBE, tools.ffprobe.as_deref())?;
            let prober = FfprobeProber::new(ffprobe, Duration::from_secs(tools.probe_timeout));
            estimate_files(&collect_inputs(&inputs, recursive), &settings, &prober, json)?;
        }

        Commands::Filter {
            settings,
            source,
            json,
        } => {
            let graph = FilterGraph::build(&settings.to_settings()?, source);
            if json {
                println!("{}", serde_json::to_string_pretty(&graph)?);
            } else {
                println!("{}", graph.to_filter_complex());
            }
        }

        Commands::Presets => print_presets(),
    }

    Ok(())
}

fn run(inputs: &[PathBuf], config: &ConversionConfig) -> anyhow::Result<()> {
    let files = collect_inputs(inputs, config.recursive);
    if files.is_empty() {
        bail!(
            "❌ No video files found\n💡 Supported video formats: {}",
            shared_utils::batch::SUPPORTED_VIDEO_EXTENSIONS.join(", ")
        );
    }

    let tools = ToolPaths::resolve(config.ffmpeg.as_deref(), config.ffprobe.as_deref())
        .context("Video processing tools are missing")?;

    info!("🎬 GIF Conversion");
    info!("   Settings: {}", config.settings);
    info!("   Files: {}", files.len());

    let prober = FfprobeProber::new(tools.ffprobe, config.probe_timeout);
    let spinner = create_spinner(&format!("Analyzing {} videos", files.len()));
    let mut session = Session::new();
    let added = session.add_files(files, &prober);
    spinner.finish_and_clear();

    if added.duplicates > 0 {
        quiet_eprintln!("⏭️  Skipped {} duplicate input(s)", added.duplicates);
    }
    for entry in session.files() {
        print_entry(entry, &config.settings);
    }
    if !session.has_ready_files() {
        bail!("❌ No readable videos to convert");
    }

    let ready = session
        .files()
        .iter()
        .filter(|f| f.status() == FileStatus::Ready)
        .count() as u64;
    let unreadable: Vec<(PathBuf, String)> = session
        .files()
        .iter()
        .filter(|f| f.status() == FileStatus::Error)
        .map(|f| (f.path.clone(), f.error().unwrap_or_default().to_string()))
        .collect();

    let encoder = FfmpegGifEncoder::new(tools.ffmpeg);
    let multi = create_multi_progress();
    let batch_bar = multi.add(create_progress_bar(ready, "GIF"));
    let mut file_bar: Option<ProgressBar> = None;
    let start = Instant::now();

    let mut summary = session.convert_all(
        &config.settings,
        &encoder,
        &config.output_options(),
        &mut |event| match event {
            SessionEvent::Started { path, .. } => {
                file_bar = Some(multi.add(create_file_progress_bar(&file_name(path))));
            }
            SessionEvent::Progress { percent, .. } => {
                if let Some(bar) = &file_bar {
                    bar.set_position(percent as u64);
                }
            }
            SessionEvent::Finished { path, output, bytes } => {
                if let Some(bar) = file_bar.take() {
                    bar.finish_and_clear();
                }
                batch_bar.inc(1);
                batch_bar.println(format!(
                    "✅ {} → {} ({})",
                    file_name(path),
                    output.display(),
                    format_file_size(bytes)
                ));
            }
            SessionEvent::Failed { path, error } => {
                if let Some(bar) = file_bar.take() {
                    bar.abandon();
                }
                batch_bar.inc(1);
                batch_bar.println(format!("❌ {} → FAILED ({})", file_name(path), error));
            }
            SessionEvent::Skipped { path, reason } => {
                batch_bar.inc(1);
                batch_bar.println(format!("⏭️  {} → SKIP ({})", file_name(path), reason));
            }
            SessionEvent::Stats { completed, total } => {
                batch_bar.set_message(format!("{} of {} completed", completed, total));
            }
        },
    )?;
    batch_bar.finish_and_clear();

    for (path, error) in unreadable {
        summary.result.fail(path, error);
    }

    shared_utils::report::print_summary_report(
        &summary.result,
        start.elapsed(),
        summary.input_bytes,
        summary.output_bytes,
        "GIF",
    );

    if summary.result.failed > 0 {
        bail!("{} file(s) failed", summary.result.failed);
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn estimate_line(estimate: Option<SizeEstimate>) -> String {
    match estimate {
        Some(est) => {
            let line = format!(
                "~{} ({}, {} frames)",
                format_file_size(est.bytes),
                est.target,
                est.total_frames
            );
            match est.warning() {
                Some(warning) => format!("{}  {}", line, style(format!("⚠️ {}", warning)).yellow()),
                None => line,
            }
        }
        None => "size unknown".to_string(),
    }
}

fn print_entry(entry: &FileEntry, settings: &ConversionSettings) {
    match &entry.info {
        Some(info) => quiet_eprintln!(
            "📹 {}  {}  →  {}",
            style(&entry.name).cyan().bold(),
            info.info_line(),
            estimate_line(entry.estimate(settings))
        ),
        None => quiet_eprintln!(
            "📹 {}  {}",
            style(&entry.name).cyan().bold(),
            style(entry.error().unwrap_or_default()).red()
        ),
    }
}

#[derive(Serialize)]
struct EstimateRow {
    path: PathBuf,
    info: Option<VideoInfo>,
    estimate: Option<SizeEstimate>,
    warning: Option<&'static str>,
    error: Option<String>,
}

fn estimate_files(
    files: &[PathBuf],
    settings: &ConversionSettings,
    prober: &dyn VideoProber,
    json: bool,
) -> anyhow::Result<()> {
    if files.is_empty() {
        bail!("❌ No video files found");
    }

    let mut rows = Vec::with_capacity(files.len());
    for path in files {
        let (info, error) = match prober.probe(path) {
            Ok(info) => (Some(info), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let estimate = vid_gif::estimate(info.as_ref(), settings);
        rows.push(EstimateRow {
            path: path.clone(),
            warning: estimate.and_then(|e| e.warning()),
            info,
            estimate,
            error,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Settings: {} ({})", settings, settings.resolution().description());
    for row in &rows {
        match (&row.info, &row.error) {
            (Some(info), _) => println!(
                "{}  {}  →  {}",
                style(file_name(&row.path)).cyan().bold(),
                info.info_line(),
                estimate_line(row.estimate)
            ),
            (None, error) => println!(
                "{}  {}",
                style(file_name(&row.path)).cyan().bold(),
                style(error.as_deref().unwrap_or("Could not read video information")).red()
            ),
        }
    }
    Ok(())
}

fn print_presets() {
    println!("{}", style("Resolution presets").bold());
    println!("  {:<16} {:>10}  {}", "original", "source", ORIGINAL_DESCRIPTION);
    for preset in ResolutionPreset::ALL {
        println!(
            "  {:<16} {:>10}  {}",
            preset.key(),
            preset.bounding_box().to_string(),
            preset.description()
        );
    }
    println!("  {:<16} {:>10}  {}", "custom", "W×H", CUSTOM_DESCRIPTION);

    println!();
    println!("{}", style("Quality tiers").bold());
    println!("  {:<12} {:>4} {:>7} {:>12}", "key", "fps", "colors", "compression");
    for quality in QualityPreset::ALL {
        let default_marker = if quality == QualityPreset::default() { " (default)" } else { "" };
        println!(
            "  {:<12} {:>4} {:>7} {:>12.1}{}",
            quality.key(),
            quality.frame_rate(),
            quality.palette_colors(),
            quality.compression_factor(),
            default_marker
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags_default_to_config() {
        let cli = Cli::try_parse_from(["vid-gif", "run", "clip.mp4"]).unwrap();
        let defaults = ConversionConfig::default();
        match cli.command {
            Commands::Run {
                recursive, force, output, ..
            } => {
                assert_eq!(recursive, defaults.recursive);
                assert_eq!(force, defaults.force);
                assert_eq!(output, defaults.output_dir);
            }
            _ => panic!("expected run"),
        }
    }
}
