//! Console summary of a finished run

use crate::downloader::RunSummary;

/// Prints a run summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Download Summary ===\n");

    println!("Overview:");
    println!("  Favorites in package: {}", summary.favorites_found);
    println!("  Queued for download: {}", summary.total);
    println!("  Saved: {}", summary.succeeded);
    println!("  Failed: {}", summary.failed());
    println!("  Skipped (wrong content type): {}", summary.skipped.len());
    println!(
        "  Duration: {:.1}s",
        summary.duration().num_milliseconds() as f64 / 1000.0
    );
    println!();

    if !summary.report.is_empty() {
        println!("Failed Downloads:");
        for record in summary.report.entries() {
            match record.status {
                Some(status) => println!("  - {} ({})", record.url, status),
                None => println!("  - {} ({})", record.url, record.reason),
            }
        }
        println!();
    }

    if !summary.skipped.is_empty() {
        println!("Skipped Downloads:");
        for record in &summary.skipped {
            println!(
                "  - {} ({})",
                record.url,
                record.content_type.as_deref().unwrap_or("no content type")
            );
        }
        println!();
    }

    println!("Success Rate: {:.1}%", success_rate(summary));
}

/// Share of queued downloads that were saved, as a percentage
pub fn success_rate(summary: &RunSummary) -> f64 {
    if summary.total == 0 {
        return 0.0;
    }
    (summary.succeeded as f64 / summary.total as f64) * 100.0
}
