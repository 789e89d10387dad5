//! Report Module
//!
//! End-of-run summary for batch conversions.

use crate::batch::BatchResult;
use crate::progress::{format_duration, format_file_size};
use std::time::Duration;

/// Signed change from `input_bytes` to `output_bytes`, in percent.
/// GIFs are often larger than their source, so this can be positive.
pub fn size_change_percent(input_bytes: u64, output_bytes: u64) -> f64 {
    if input_bytes == 0 {
        return 0.0;
    }
    (output_bytes as f64 / input_bytes as f64 - 1.0) * 100.0
}

pub fn print_summary_report(
    result: &BatchResult,
    duration: Duration,
    input_bytes: u64,
    output_bytes: u64,
    operation_name: &str,
) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  📊 {:<56} ║", format!("{} Summary Report", operation_name));
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  📁 Files Processed:    {:>10}                           ║", result.total);
    println!("║  ✅ Succeeded:          {:>10}                           ║", result.succeeded);
    println!("║  ❌ Failed:             {:>10}                           ║", result.failed);
    println!("║  ⏭️  Skipped:            {:>10}                           ║", result.skipped);
    println!(
        "║  📈 Success Rate:       {:>9.1}%                           ║",
        result.success_rate()
    );
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  💾 Input Size:         {:>10}                           ║",
        format_file_size(input_bytes)
    );
    println!(
        "║  💾 Output Size:        {:>10}                           ║",
        format_file_size(output_bytes)
    );
    println!(
        "║  📉 Size Change:        {:>+9.1}%                           ║",
        size_change_percent(input_bytes, output_bytes)
    );
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  ⏱️  Total Time:         {:>10}                           ║",
        format_duration(duration)
    );
    if result.total > 0 {
        let avg_time = duration.as_secs_f64() / result.total as f64;
        println!("║  ⏱️  Avg Time/File:      {:>9.2}s                           ║", avg_time);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");

    if !result.errors.is_empty() {
        println!();
        println!("❌ Errors encountered:");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for (path, error) in &result.errors {
            println!("   {} → {}", path.display(), error);
        }
    }
}
