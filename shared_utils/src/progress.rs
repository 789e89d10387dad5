//! Progress Bar Module
//!
//! One look for every bar in the workspace: ████████▓░░░░░░
//! - batch bar: files done out of files queued
//! - file bar: percent of the file currently being converted

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

pub mod progress_style {
    /// indicatif wants (filled, current, empty).
    pub const PROGRESS_CHARS: &str = "█▓░";

    pub const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

    pub const BATCH_TEMPLATE: &str = "{spinner:.green} {prefix:.cyan.bold} ▕{bar:35.green/black}▏ {percent:>3}% • {pos}/{len} • ⏱️ {elapsed_precise} (ETA: {eta}) • {msg}";

    pub const FILE_TEMPLATE: &str =
        "  {prefix:.cyan} ▕{bar:30.green/black}▏ {pos:>3}% {msg:.dim}";

    pub const SPINNER_TEMPLATE: &str =
        "{spinner:.green} {prefix:.cyan.bold} • ⏱️ {elapsed_precise} • {msg}";
}

fn styled(pb: ProgressBar, template: &str, prefix: &str) -> ProgressBar {
    if crate::progress_mode::is_quiet_mode() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }
    match ProgressStyle::default_bar().template(template) {
        Ok(style) => pb.set_style(
            style
                .progress_chars(progress_style::PROGRESS_CHARS)
                .tick_chars(progress_style::SPINNER_CHARS),
        ),
        Err(e) => tracing::warn!(error = %e, "Invalid progress template, using default"),
    }
    pb.set_prefix(prefix.to_string());
    pb
}

/// Files-done bar for a batch of `total` files.
pub fn create_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let pb = styled(ProgressBar::new(total), progress_style::BATCH_TEMPLATE, prefix);
    if !crate::progress_mode::is_quiet_mode() {
        pb.enable_steady_tick(Duration::from_millis(100));
    }
    pb
}

/// 0..=100 percent bar for the file being converted.
pub fn create_file_progress_bar(prefix: &str) -> ProgressBar {
    styled(ProgressBar::new(100), progress_style::FILE_TEMPLATE, prefix)
}

pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();

    if crate::progress_mode::is_quiet_mode() {
        spinner.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        match ProgressStyle::default_spinner().template(progress_style::SPINNER_TEMPLATE) {
            Ok(style) => spinner.set_style(style.tick_chars(progress_style::SPINNER_CHARS)),
            Err(e) => tracing::warn!(error = %e, "Invalid spinner template, using default"),
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
    }
    spinner
}

pub fn create_multi_progress() -> MultiProgress {
    if crate::progress_mode::is_quiet_mode() {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    } else {
        MultiProgress::new()
    }
}

/// Human file size, 1024-based with one decimal: "0 B", "512 B", "16.1 MB".
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        let cases: &[(u64, &str)] = &[
            (0, "0 B"),
            (1, "1 B"),
            (1023, "1023 B"),
            (1024, "1 KB"),
            (1536, "1.5 KB"),
            (16_839_900, "16.1 MB"),
            (30 * 1024 * 1024, "30 MB"),
            (182_476_800, "174 MB"),
            (5 * 1024 * 1024 * 1024, "5 GB"),
        ];
        for (bytes, expected) in cases {
            assert_eq!(format_file_size(*bytes), *expected, "bytes = {}", bytes);
        }
    }

    #[test]
    fn test_format_file_size_caps_at_gb() {
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn test_quiet_bars_hidden() {
        crate::progress_mode::enable_quiet_mode();
        let pb = create_file_progress_bar("clip.mp4");
        assert!(pb.is_hidden());
        crate::progress_mode::disable_quiet_mode();
    }
}
