//! NeoX CLI - Command-line tool for NeoX game archive extraction.
//!
//! This is the main entry point for the neox command-line application.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, LevelFilter};

use neox::prelude::*;
use neox::wpk::output_path;

/// NeoX - game archive extraction tool
#[derive(Parser)]
#[command(name = "neox")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace). Overrides RUST_LOG.
    #[arg(long, global = true, env = "NEOX_LOG_LEVEL")]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract files from a WPK/IDX archive
    Wpk {
        #[command(flatten)]
        archive: ArchiveArgs,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER", default_value = ".")]
        output: PathBuf,

        /// Filter pattern on resolved file names (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// List contents of a WPK/IDX archive
    WpkList {
        #[command(flatten)]
        archive: ArchiveArgs,

        /// Only list entries of this category
        #[arg(short, long)]
        category: Option<Category>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,

        /// Print the listing as JSON
        #[arg(long, conflicts_with = "detailed")]
        json: bool,
    },
}

#[derive(Args)]
struct ArchiveArgs {
    /// Path to the index (.idx) or data (.wpk) file
    #[arg(env = "INPUT_WPK")]
    path: PathBuf,

    /// Path to the companion file, when it is not a sibling
    wpk_path: Option<PathBuf>,

    /// Decryption key (decimal or 0x-prefixed hex)
    #[arg(short, long, value_parser = parse_key)]
    key: Option<u32>,

    /// AES key material as hex
    #[arg(long, value_parser = parse_hex)]
    aes_key: Option<Vec<u8>>,

    /// Size of the index info header to skip
    #[arg(long)]
    info_size: Option<usize>,
}

impl ArchiveArgs {
    fn open(&self) -> Result<WpkArchive> {
        let paths = ArchivePaths::resolve(&self.path, self.wpk_path.as_deref())
            .with_context(|| format!("Failed to locate archive pair for {}", self.path.display()))?;

        let mut options = ReadOptions::new();
        if let Some(key) = self.key {
            options = options.with_key(key);
        }
        if let Some(material) = &self.aes_key {
            options = options.with_key_material(material.clone());
        }
        if let Some(size) = self.info_size {
            options = options.with_info_size(size);
        }

        let start = Instant::now();
        let archive = WpkArchive::open_paths(paths, options).context("Failed to open WPK archive")?;
        info!(
            "Loaded {} entries in {:?}",
            archive.record_count(),
            start.elapsed()
        );

        Ok(archive)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Commands::Wpk {
            archive,
            output,
            filter,
        } => {
            cmd_wpk_extract(&archive, &output, filter.as_deref())?;
        }
        Commands::WpkList {
            archive,
            category,
            detailed,
            json,
        } => {
            cmd_wpk_list(&archive, category, detailed, json)?;
        }
    }

    Ok(())
}

fn init_logging(level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

fn cmd_wpk_extract(args: &ArchiveArgs, output: &Path, filter: Option<&str>) -> Result<()> {
    let archive = args.open()?;
    let pattern = filter
        .map(Pattern::new)
        .transpose()
        .context("Invalid filter pattern")?;

    let pb = progress_bar(archive.record_count() as u64)?;
    let start = Instant::now();

    let (written, failed) = match pattern {
        None => {
            let never = AtomicBool::new(false);
            let mut failed = 0;
            let written = archive
                .extract_all_with(output, &never, |done, _, name| {
                    if archive.cached(done - 1).is_some_and(|e| e.has_error() || e.is_locked()) {
                        failed += 1;
                    }
                    pb.set_position(done as u64);
                    pb.set_message(name.to_string());
                })
                .context("Extraction failed")?;
            (written, failed)
        }
        Some(pattern) => extract_matching(&archive, output, &pattern, &pb)?,
    };

    pb.finish_with_message("Done");
    info!(
        "Extracted {} entries to {} in {:?}",
        written,
        output.display(),
        start.elapsed()
    );
    if failed > 0 {
        warn!("{} entries could not be decoded and were written raw", failed);
    }

    Ok(())
}

fn extract_matching(
    archive: &WpkArchive,
    output: &Path,
    pattern: &Pattern,
    pb: &ProgressBar,
) -> Result<(usize, usize)> {
    let mut written = 0;
    let mut failed = 0;

    for ordinal in 0..archive.record_count() {
        let entry = archive
            .resolve(ordinal)
            .with_context(|| format!("Failed to read entry {ordinal}"))?;
        pb.inc(1);

        if !pattern.matches(entry.filename()) {
            continue;
        }

        let path = output_path(output, entry.filename(), ordinal);
        entry
            .save_to_file(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        if entry.has_error() || entry.is_locked() {
            failed += 1;
        }
        written += 1;
        pb.set_message(entry.filename().to_string());
    }

    Ok((written, failed))
}

fn cmd_wpk_list(
    args: &ArchiveArgs,
    category: Option<Category>,
    detailed: bool,
    json: bool,
) -> Result<()> {
    let archive = args.open()?;
    let mut filter = EntryFilter::new();
    if let Some(category) = category {
        filter = filter.with_category(category);
    }

    let mut entries: Vec<Arc<ResolvedEntry>> = Vec::new();
    for ordinal in 0..archive.record_count() {
        let entry = archive
            .resolve(ordinal)
            .with_context(|| format!("Failed to read entry {ordinal}"))?;
        if filter.matches(&entry) {
            entries.push(entry);
        }
    }

    if json {
        let listing: Vec<&ResolvedEntry> = entries.iter().map(Arc::as_ref).collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for entry in &entries {
        if detailed {
            println!(
                "{:>12} {:>12} {:<5} {:<5} {:<8} {:<24} {}",
                entry.record.file_length,
                entry.data().len(),
                entry.record.compression,
                entry.record.encryption,
                entry.category,
                entry.flags,
                entry.display_label()
            );
        } else {
            println!("{}", entry.display_label());
        }
    }

    println!("\nTotal: {} entries", entries.len());

    Ok(())
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {wide_msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Parse a key given in decimal or as 0x-prefixed hex.
fn parse_key(s: &str) -> std::result::Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid key {s:?}: {e}"))
}

fn parse_hex(s: &str) -> std::result::Result<Vec<u8>, String> {
    hex::decode(s.trim_start_matches("0x")).map_err(|e| format!("invalid hex {s:?}: {e}"))
}
