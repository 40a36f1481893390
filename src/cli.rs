use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::string_utils::*;
use crate::PKG_NAME;
use crate::PKG_VERSION;
use deduper::chunker;
use deduper::{Compression, RunOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOpts {
    pub filter: LevelFilter,
}

impl LogOpts {
    fn new(filter: LevelFilter) -> Self {
        Self { filter }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkerKind {
    None,
    Fixed,
    Gear,
}

/// A chunker and compression combination to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorOpts {
    pub chunker_config: chunker::Config,
    pub compression: Option<Compression>,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub root: PathBuf,
    pub processors: Vec<ProcessorOpts>,
    pub run: RunOptions,
}

pub fn parse_opts<I, T>(args: I) -> Result<(Options, LogOpts), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut cmd = add_chunker_args(
        Command::new(PKG_NAME)
            .version(PKG_VERSION)
            .about("Measure how well a file tree deduplicates and compresses when chunked")
            .arg(
                Arg::new("DIR")
                    .value_name("DIR")
                    .value_parser(value_parser!(PathBuf))
                    .default_value(".")
                    .help("Root directory to scan for files"),
            )
            .arg(
                Arg::new("workers")
                    .short('j')
                    .long("workers")
                    .value_name("COUNT")
                    .value_parser(value_parser!(usize))
                    .help("Number of concurrent workers [default: number of cpus]"),
            )
            .arg(
                Arg::new("max-files")
                    .long("max-files")
                    .value_name("COUNT")
                    .value_parser(value_parser!(usize))
                    .help("Maximum number of files to process"),
            )
            .arg(
                Arg::new("read-buffer")
                    .long("read-buffer")
                    .value_name("SIZE")
                    .value_parser(parse_human_size)
                    .default_value("1MiB")
                    .help("Size of buffer used while reading files"),
            )
            .arg(
                Arg::new("processor")
                    .short('p')
                    .long("processor")
                    .value_name("CHUNKER:COMPRESSION")
                    .value_parser(parse_processor)
                    .action(ArgAction::Append)
                    .help(
                        "Chunker (none, fixed, gear) and compression (none, brotli[-LEVEL], \
                         zstd[-LEVEL], lzma[-LEVEL]) to evaluate, may be given multiple times",
                    ),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .global(true)
                    .action(ArgAction::Count)
                    .help("Set verbosity level"),
            ),
    );

    let matches = cmd.try_get_matches_from_mut(args)?;
    let log_opts = LogOpts::new(match matches.get_count("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });

    let fixed_size = *matches.get_one::<usize>("fixed-size").unwrap();
    if fixed_size == 0 {
        return Err(cmd.error(ErrorKind::ValueValidation, "Fixed chunk size can't be zero"));
    }
    let gear_config = parse_gear_config(&mut cmd, &matches)?;
    let processors = match matches.get_many::<(ChunkerKind, Option<Compression>)>("processor") {
        Some(values) => values.cloned().collect(),
        None => default_processors(),
    }
    .into_iter()
    .map(|(kind, compression)| ProcessorOpts {
        chunker_config: match kind {
            ChunkerKind::None => chunker::Config::None,
            ChunkerKind::Fixed => chunker::Config::FixedSize(fixed_size),
            ChunkerKind::Gear => chunker::Config::Gear(gear_config.clone()),
        },
        compression,
    })
    .collect();

    let root = matches.get_one::<PathBuf>("DIR").unwrap().clone();
    Ok((
        Options {
            root,
            processors,
            run: RunOptions {
                workers: matches
                    .get_one::<usize>("workers")
                    .copied()
                    .filter(|&workers| workers > 0)
                    .unwrap_or_else(num_cpus::get),
                max_files: matches
                    .get_one::<usize>("max-files")
                    .copied()
                    .filter(|&max_files| max_files > 0),
                read_buffer_size: *matches.get_one::<usize>("read-buffer").unwrap(),
            },
        },
        log_opts,
    ))
}

fn default_processors() -> Vec<(ChunkerKind, Option<Compression>)> {
    #[cfg(feature = "zstd-compression")]
    let compression = Compression::zstd(1).ok();
    #[cfg(not(feature = "zstd-compression"))]
    let compression = Compression::brotli(1).ok();
    vec![
        (ChunkerKind::None, compression),
        (ChunkerKind::Fixed, compression),
        (ChunkerKind::Gear, compression),
    ]
}

fn parse_gear_config(
    cmd: &mut Command,
    matches: &ArgMatches,
) -> Result<chunker::GearConfig, clap::Error> {
    let avg_chunk_size = *matches.get_one::<usize>("avg-chunk-size").unwrap();
    let min_chunk_size = *matches.get_one::<usize>("min-chunk-size").unwrap();
    let max_chunk_size = *matches.get_one::<usize>("max-chunk-size").unwrap();
    if min_chunk_size > avg_chunk_size {
        return Err(cmd.error(
            ErrorKind::ValueValidation,
            "Min chunk size can't be bigger than the target average chunk size",
        ));
    }
    if max_chunk_size < avg_chunk_size {
        return Err(cmd.error(
            ErrorKind::ValueValidation,
            "Max chunk size can't be smaller than the target average chunk size",
        ));
    }
    let avg_chunk_size = u32::try_from(avg_chunk_size).map_err(|_| {
        cmd.error(
            ErrorKind::ValueValidation,
            "Target average chunk size is too big",
        )
    })?;
    Ok(chunker::GearConfig {
        filter_bits: chunker::FilterBits::from_size(avg_chunk_size),
        min_chunk_size,
        max_chunk_size,
    })
}

fn parse_compression(value: &str) -> Result<Option<Compression>, String> {
    let (name, level) = match value.split_once('-') {
        Some((name, level)) => (
            name,
            Some(
                level
                    .parse::<u32>()
                    .map_err(|e| format!("invalid compression level '{}': {}", level, e))?,
            ),
        ),
        None => (value, None),
    };
    let level = level.unwrap_or(match name {
        "zstd" => 3,
        _ => 6,
    });
    Ok(match name {
        #[cfg(feature = "lzma-compression")]
        "lzma" => Some(Compression::lzma(level).map_err(|e| e.to_string())?),
        #[cfg(feature = "zstd-compression")]
        "zstd" => Some(Compression::zstd(level).map_err(|e| e.to_string())?),
        "brotli" => Some(Compression::brotli(level).map_err(|e| e.to_string())?),
        "none" => None,
        name => return Err(format!("invalid compression '{}'", name)),
    })
}

fn parse_processor(value: &str) -> Result<(ChunkerKind, Option<Compression>), String> {
    let (chunker, compression) = value.split_once(':').unwrap_or((value, "none"));
    let chunker = match chunker {
        "none" => ChunkerKind::None,
        "fixed" => ChunkerKind::Fixed,
        "gear" => ChunkerKind::Gear,
        name => return Err(format!("invalid chunker '{}'", name)),
    };
    Ok((chunker, parse_compression(compression)?))
}

fn add_chunker_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("avg-chunk-size")
            .long("avg-chunk-size")
            .value_name("SIZE")
            .value_parser(parse_human_size)
            .default_value("1MiB")
            .help("Indication of target chunk size for the gear chunker"),
    )
    .arg(
        Arg::new("min-chunk-size")
            .long("min-chunk-size")
            .value_name("SIZE")
            .value_parser(parse_human_size)
            .default_value("64KiB")
            .help("Set minimal size of gear chunks"),
    )
    .arg(
        Arg::new("max-chunk-size")
            .long("max-chunk-size")
            .value_name("SIZE")
            .value_parser(parse_human_size)
            .default_value("16MiB")
            .help("Set maximal size of gear chunks"),
    )
    .arg(
        Arg::new("fixed-size")
            .long("fixed-size")
            .value_name("SIZE")
            .value_parser(parse_human_size)
            .default_value("1MiB")
            .help("Set chunk size of the fixed size chunker"),
    )
}
