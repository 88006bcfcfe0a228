//! cardgrid - rebuild card tables from OCR detections
//!
//! Reads one or more JSON detection files, runs the layout engine over each
//! and writes the reconstructed grid as JSON or as a plain text transcript.

use anyhow::{Context, Result};
use cardgrid_core::engine::EngineConfig;
use cardgrid_core::ingest::ImageSize;
use cardgrid_core::source::parse_detections;
use cardgrid_core::{LayoutEngine, LayoutResult};
use clap::{ArgAction, Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Output type for the reconstructed grid.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputType {
    /// The full result as JSON (default)
    #[default]
    Json,
    /// Cell texts in reading order, one card per paragraph
    Text,
}

/// Rebuild card tables from OCR text detections.
#[derive(Parser, Debug)]
#[command(name = "cardgrid")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more JSON detection files, "-" reads stdin
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// JSON engine configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    // === Layout options ===
    /// Column boundary threshold as a fraction of the largest horizontal gap
    #[arg(long = "column-gap-ratio")]
    column_gap_ratio: Option<f64>,

    /// Card break threshold as a multiple of the median line height
    #[arg(long = "row-gap-multiplier")]
    row_gap_multiplier: Option<f64>,

    /// Drop detections below this confidence
    #[arg(long = "min-confidence")]
    min_confidence: Option<f64>,

    /// Source image width, blocks entirely outside the image are dropped
    #[arg(long = "image-width", requires = "image_height")]
    image_width: Option<f64>,

    /// Source image height
    #[arg(long = "image-height", requires = "image_width")]
    image_height: Option<f64>,

    /// Only apply corrections from the configuration file
    #[arg(long = "no-builtin-rules", action = ArgAction::SetTrue)]
    no_builtin_rules: bool,

    /// Cluster columns on the calling thread
    #[arg(long, action = ArgAction::SetTrue)]
    serial: bool,

    // === Output options ===
    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Type of output to generate
    #[arg(short = 't', long = "output-type", value_enum, default_value = "json")]
    output_type: OutputType,
}

/// Load the configuration file, then apply command line overrides.
fn build_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(ratio) = args.column_gap_ratio {
        config.column_gap_ratio = ratio;
    }
    if let Some(multiplier) = args.row_gap_multiplier {
        config.row_gap_multiplier = multiplier;
    }
    if let Some(min) = args.min_confidence {
        config.min_confidence_filter = min;
    }
    if args.no_builtin_rules {
        config.use_builtin_rules = false;
    }
    if args.serial {
        config.parallel = false;
    }
    Ok(config)
}

fn image_size(args: &Args) -> Option<ImageSize> {
    match (args.image_width, args.image_height) {
        (Some(width), Some(height)) => Some(ImageSize { width, height }),
        _ => None,
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return io::read_to_string(io::stdin()).context("failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Process a single detection file.
fn process_file(path: &Path, engine: &LayoutEngine, args: &Args) -> Result<LayoutResult> {
    let json = read_input(path)?;
    let document = parse_detections(&json)?;
    // the command line wins over dimensions embedded in the document
    let image = image_size(args).or(document.image);
    debug!(
        path = %path.display(),
        detections = document.detections.len(),
        "decoded detections"
    );

    let result = engine.reconstruct(&document.detections, image)?;
    for warning in &result.warnings {
        warn!(path = %path.display(), "{warning}");
    }
    Ok(result)
}

fn write_result<W: Write>(
    writer: &mut W,
    result: &LayoutResult,
    output_type: OutputType,
) -> Result<()> {
    match output_type {
        OutputType::Json => {
            serde_json::to_writer_pretty(&mut *writer, result)?;
            writeln!(writer)?;
        }
        OutputType::Text => {
            for row in &result.cells {
                for cell in row.iter().filter(|c| c.present && !c.text.is_empty()) {
                    writeln!(writer, "{}", cell.text)?;
                    writeln!(writer)?;
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let engine = match build_config(&args).and_then(|config| Ok(config.build()?)) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    debug!(
        rules = %engine.normalizer().rules().version,
        params = ?engine.params(),
        "engine ready"
    );

    // Open output file or use stdout
    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("failed to create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    for path in &args.files {
        let result = match process_file(path, &engine, &args) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error processing {}: {e:#}", path.display());
                std::process::exit(1);
            }
        };
        write_result(&mut output, &result, args.output_type)?;
    }

    output.flush()?;
    Ok(())
}
