//! Output formatting for CLI results.

use svgpack::ops::{EntryInfo, ExportResult, ImportResult, ImportStatus};

use crate::OutputFormat;

/// Prints a listing in the selected format.
pub fn print_listing(infos: &[EntryInfo], format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(infos) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: cannot render listing: {}", e),
        },
        OutputFormat::Human => {
            if infos.is_empty() {
                println!("No embedded files found.");
                return;
            }
            println!(
                "{:<40} {:>10} {:<24} {}",
                "PATH", "SIZE", "MEDIA TYPE", "ENCODING"
            );
            for info in infos {
                println!(
                    "{:<40} {:>10} {:<24} {}",
                    info.path, info.raw_size, info.media_type, info.encoding
                );
            }
            println!("{} entries", infos.len());
        }
    }
}

/// Prints an import manifest.
pub fn print_import_result(result: &ImportResult, format: OutputFormat, quiet: bool) {
    match format {
        OutputFormat::Json => {
            let items: Vec<serde_json::Value> = result
                .outcomes
                .iter()
                .map(|o| {
                    serde_json::json!({
                        "path": o.path,
                        "status": status_label(&o.status),
                        "reason": match &o.status {
                            ImportStatus::Failed { reason } => Some(reason.clone()),
                            _ => None,
                        },
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "added": result.added(),
                    "skipped": result.skipped(),
                    "overwritten": result.overwritten(),
                    "failed": result.failed(),
                    "cancelled": result.cancelled,
                    "outcomes": items,
                })
            );
        }
        OutputFormat::Human => {
            if !quiet {
                for outcome in &result.outcomes {
                    match &outcome.status {
                        ImportStatus::Failed { reason } => {
                            println!("failed      {} ({})", outcome.path, reason)
                        }
                        status => println!("{:<11} {}", status_label(status), outcome.path),
                    }
                }
            }
            println!(
                "{} added, {} skipped, {} overwritten, {} failed",
                result.added(),
                result.skipped(),
                result.overwritten(),
                result.failed()
            );
        }
    }
}

/// Prints an export manifest.
pub fn print_export_result(result: &ExportResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "exported": result.exported(),
                    "removed": result.removed(),
                    "failed": result.failed(),
                    "cancelled": result.cancelled,
                })
            );
        }
        OutputFormat::Human => {
            println!(
                "{} exported, {} removed, {} failed",
                result.exported(),
                result.removed(),
                result.failed()
            );
        }
    }
}

fn status_label(status: &ImportStatus) -> &'static str {
    match status {
        ImportStatus::Added => "added",
        ImportStatus::SkippedDuplicate => "skipped",
        ImportStatus::Overwritten => "overwritten",
        ImportStatus::Failed { .. } => "failed",
    }
}
