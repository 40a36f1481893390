mod cli;
mod report;
mod scan;
mod string_utils;

use anyhow::{Context, Result};
use log::*;

use crate::cli::Options;
use deduper::{run_processors, Processor};

pub static PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub static PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_log(level: log::LevelFilter) -> Result<()> {
    let local_level = level;
    fern::Dispatch::new()
        .format(move |out, message, record| {
            if local_level > log::LevelFilter::Info {
                // Add some extra info to each message in debug
                out.finish(format_args!(
                    "[{}]({})({}) {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.target(),
                    record.level(),
                    message
                ))
            } else {
                out.finish(format_args!("{}", message))
            }
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("Failed to set up logging")?;
    Ok(())
}

fn run(opts: Options) -> Result<()> {
    let root = opts
        .root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", opts.root.display()))?;
    info!("Scanning files in: {}", root.display());

    let files = scan::list_files(&root);
    if files.is_empty() {
        info!("No files found");
        return Ok(());
    }
    report::print_file_summary(&files);

    let processors: Vec<Processor> = opts
        .processors
        .into_iter()
        .map(|p| Processor::new(p.chunker_config, p.compression))
        .collect();
    for processor in &processors {
        debug!("Processor: {}", processor);
    }

    let summary = run_processors(&files, &processors, &opts.run)
        .context("Failed to process files")?;
    info!("");
    report::print_report(&summary, &processors);
    Ok(())
}

fn main() -> Result<()> {
    let (opts, log_opts) = cli::parse_opts(std::env::args_os()).unwrap_or_else(|e| e.exit());
    init_log(log_opts.filter)?;
    run(opts)
}
