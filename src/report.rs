use log::*;

use crate::string_utils::*;
use deduper::{FileEntry, Processor, ProcessorStats, RunSummary};

pub fn print_file_summary(files: &[FileEntry]) {
    let total_size: u64 = files.iter().map(|f| f.size).sum();
    info!(
        "Got {} files, total size: {} (avg: {})",
        files.len(),
        size_to_str(total_size),
        size_to_str(total_size / files.len().max(1) as u64)
    );
}

// Single report line for one processor.
fn processor_line(label: &str, stats: &ProcessorStats, summary: &RunSummary) -> String {
    let avg = stats.unique_size / summary.files.max(1) as u64;
    let ratio = match summary.source_size {
        0 => "n/a".to_string(),
        source_size => {
            let ratio = stats.unique_size as f64 / source_size as f64;
            if stats.unique_size == 0 {
                format!("{:6.2}% of total", ratio * 100.0)
            } else {
                format!(
                    "{:6.2}% of total ({:5.2}x effective space)",
                    ratio * 100.0,
                    1.0 / ratio
                )
            }
        }
    };
    format!(
        "{:>40}  size: {} (avg: {}), {}  chunks: {} (total: {}, duplicate: {})",
        label,
        size_to_str(stats.unique_size),
        size_to_str(avg),
        ratio,
        stats.unique_chunks,
        stats.total_chunks,
        stats.duplicate_chunks,
    )
}

pub fn print_report(summary: &RunSummary, processors: &[Processor]) {
    info!(
        "Processed successfully {} files, total size: {}",
        summary.files,
        size_to_str(summary.source_size)
    );
    if summary.skipped > 0 {
        info!("Skipped {} unreadable files", summary.skipped);
    }
    info!("");
    for processor in processors {
        info!(
            "{}",
            processor_line(&processor.label(), &processor.stats(), summary)
        );
    }
}
