//! pbdump - Dump Protocol Buffer payloads without a schema
//!
//! This tool decodes captured protobuf messages (optionally carrying a gRPC
//! frame header) and prints the inferred field tree.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser};
use pbdump_core::{
    render_chunks, ChunkStats, ConsoleConfig, ConsoleRenderer, Decoder, DecoderConfig,
};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Dump Protocol Buffer payloads without a schema
#[derive(Parser, Debug)]
#[command(name = "pbdump")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Input is hex text instead of raw bytes (whitespace is ignored)
    #[arg(long)]
    hex: bool,

    /// Do not strip a leading gRPC frame header
    #[arg(long)]
    no_framing: bool,

    /// Maximum number of nested levels resolved below the top level
    #[arg(long, default_value = "64")]
    max_depth: usize,

    /// Indentation used for nested messages
    #[arg(long, default_value = "  ")]
    indent: String,

    /// Show the wire type of every field
    #[arg(long)]
    show_types: bool,

    /// Maximum characters or bytes shown per opaque payload (0 = unlimited)
    #[arg(long, default_value = "0")]
    max_preview: usize,

    /// Print the fields decoded before an error instead of failing
    #[arg(long, conflicts_with = "best_effort")]
    partial: bool,

    /// Print nothing for undecodable input instead of failing
    #[arg(long)]
    best_effort: bool,

    /// Print field statistics instead of the field tree
    #[arg(long)]
    stats: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
struct InputMode {
    /// Path to a single captured payload (reads stdin when no input is given)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory of captured payloads to process
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

/// Tracks seen payloads for deduplication
#[derive(Default)]
struct PayloadRegistry {
    /// Maps content hash -> first path it was seen at
    seen: HashMap<String, PathBuf>,
    /// Statistics
    stats: RegistryStats,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RegistryStats {
    total_found: usize,
    duplicates_skipped: usize,
    decoded: usize,
    failed: usize,
}

impl PayloadRegistry {
    fn new() -> Self {
        Self::default()
    }

    /// Compute the hex blake3 hash of a payload
    fn content_hash(data: &[u8]) -> String {
        blake3::hash(data).to_hex().to_string()
    }

    /// Count a payload; returns the first path that dumped identical content
    /// if this one is a duplicate
    fn find_duplicate(&mut self, path: &Path, hash: &str) -> Option<PathBuf> {
        self.stats.total_found += 1;

        if let Some(first) = self.seen.get(hash) {
            debug!(
                "Skipping duplicate: {} (same as {}, hash: {})",
                path.display(),
                first.display(),
                &hash[..8]
            );
            self.stats.duplicates_skipped += 1;
            return Some(first.clone());
        }
        None
    }

    /// Remember content that was dumped successfully
    fn record(&mut self, hash: String, path: &Path) {
        self.seen.insert(hash, path.to_path_buf());
        self.stats.decoded += 1;
    }

    fn print_summary(&self) {
        info!(
            "Summary: {} found, {} duplicates skipped, {} decoded, {} failed",
            self.stats.total_found,
            self.stats.duplicates_skipped,
            self.stats.decoded,
            self.stats.failed
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Dispatch based on input mode
    if let Some(ref file) = cli.input.file {
        process_single_file(&cli, file, &mut out)
    } else if let Some(ref directory) = cli.input.directory {
        process_directory(&cli, directory, &mut out).map(|_| ())
    } else {
        process_stdin(&cli, &mut out)
    }
}

/// Build the decoder described by the command line
fn decoder(cli: &Cli) -> Decoder {
    let config = DecoderConfig::new()
        .strip_framing(!cli.no_framing)
        .max_depth(cli.max_depth);
    Decoder::with_config(config)
}

/// Build the renderer described by the command line
fn renderer(cli: &Cli) -> ConsoleRenderer {
    let config = ConsoleConfig::new()
        .indent_str(cli.indent.clone())
        .show_wire_type(cli.show_types)
        .max_preview(cli.max_preview);
    ConsoleRenderer::with_config(config)
}

/// Turn file contents into payload bytes, decoding hex text when requested
fn payload_bytes(cli: &Cli, raw: Vec<u8>) -> Result<Vec<u8>> {
    if !cli.hex {
        return Ok(raw);
    }

    let text: String = String::from_utf8(raw)
        .context("Hex input is not valid UTF-8")?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let text = text.strip_prefix("0x").unwrap_or(&text);

    hex::decode(text).context("Failed to parse hex input")
}

/// Decode a payload and render it according to the command line
fn render_payload(cli: &Cli, data: &[u8]) -> Result<String> {
    let (chunks, error) = decoder(cli).decode(data).into_parts();

    if let Some(e) = error {
        if cli.partial {
            warn!("Decoding stopped early: {}", e);
        } else if cli.best_effort {
            debug!("Decoding failed, printing nothing: {}", e);
            return Ok(String::new());
        } else {
            return Err(e).context("Failed to decode payload");
        }
    }

    if cli.stats {
        return Ok(format!("{}\n", ChunkStats::collect(&chunks)));
    }

    Ok(render_chunks(&chunks, &renderer(cli)))
}

/// Process payload bytes from stdin
fn process_stdin(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let mut raw = Vec::new();
    io::stdin()
        .read_to_end(&mut raw)
        .context("Failed to read stdin")?;

    trace!("Read {} bytes from stdin", raw.len());

    let data = payload_bytes(cli, raw)?;
    let text = render_payload(cli, &data)?;
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Process a single payload file
fn process_single_file(cli: &Cli, file: &Path, out: &mut impl Write) -> Result<()> {
    if !file.exists() {
        bail!("Input file does not exist: {}", file.display());
    }
    if !file.is_file() {
        bail!("Input path is not a file: {}", file.display());
    }

    let raw = fs::read(file)
        .with_context(|| format!("Failed to read input file: {}", file.display()))?;
    trace!("Read {} bytes from {}", raw.len(), file.display());

    let data = payload_bytes(cli, raw)?;
    let text = render_payload(cli, &data)
        .with_context(|| format!("Failed to dump {}", file.display()))?;
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Process a directory of payloads recursively
fn process_directory(
    cli: &Cli,
    directory: &Path,
    out: &mut impl Write,
) -> Result<RegistryStats> {
    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let mut registry = PayloadRegistry::new();

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error walking {}: {}", directory.display(), e);
                registry.stats.failed += 1;
                continue;
            }
        };
        let path = entry.path();

        if !path.is_file() || is_hidden(path) {
            continue;
        }

        if let Err(e) = process_entry(cli, path, &mut registry, out) {
            // Log error but continue with other files
            warn!("Error processing {}: {:#}", path.display(), e);
            registry.stats.failed += 1;
        }
    }

    registry.print_summary();
    Ok(registry.stats)
}

/// Dump one payload found while walking a directory
fn process_entry(
    cli: &Cli,
    path: &Path,
    registry: &mut PayloadRegistry,
    out: &mut impl Write,
) -> Result<()> {
    let raw = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let data = payload_bytes(cli, raw)?;

    let hash = PayloadRegistry::content_hash(&data);
    if let Some(first) = registry.find_duplicate(path, &hash) {
        writeln!(out, "# {} (same as {})", path.display(), first.display())?;
        return Ok(());
    }

    // Failed content is not recorded, so its copies fail on their own
    let text = render_payload(cli, &data)?;
    writeln!(out, "# {} ({} bytes)", path.display(), data.len())?;
    out.write_all(text.as_bytes())?;
    registry.record(hash, path);
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
